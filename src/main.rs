//! Remotia - headless smoke runner
//!
//! Replays a short scripted session through the frame loop: two host
//! windows, a draw batch that references an image the host only sends
//! later, some keyboard input. Without a transport this is the quickest way
//! to watch the client work end to end.

use log::{debug, info, warn};

use remotia::backend::{FrameDriven, FrameLoop};
use remotia::compositor::{
    HostEvent, Rect, WindowCompositor, WindowDescriptor, WindowId, WindowKind, WindowUpdate,
};
use remotia::config::ClientConfig;
use remotia::input::{ClientKeyEvent, InputTranslator, Modifiers};
use remotia::renderer::{Canvas, Image, ImageId, PaintCommand};

const FRAMES: u64 = 6;
const LOGO: ImageId = ImageId(7);

/// Scripted session driven by the frame loop
struct Session {
    compositor: WindowCompositor,
    frames: u64,
    signal: calloop::LoopSignal,
}

impl FrameDriven for Session {
    fn on_frame(&mut self) {
        self.frames += 1;
        let summary = self.compositor.render_frame();
        info!(
            "Frame {}: {} windows, {} commands applied, {} stalled",
            summary.frame, summary.windows, summary.applied, summary.stalled
        );

        // The host answers image requests one frame late
        for id in self.compositor.take_image_requests() {
            debug!("Host sends image {:?}", id);
            self.compositor.insert_image(id, Image::solid(16, 16, 0xFF4A_88C7));
        }

        if self.frames == 3 {
            self.compositor.handle_event(HostEvent::WindowUpdated {
                id: WindowId(2),
                update: WindowUpdate::ZOrder(5),
            });
        }
        if self.frames >= FRAMES {
            self.signal.stop();
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ClientConfig::from_env()?;
    info!("Starting Remotia smoke run");

    let mut compositor: WindowCompositor = WindowCompositor::new(config.clone());
    compositor.handle_event(HostEvent::WindowSet(vec![
        WindowDescriptor::new(WindowId(1), Rect::new(40.0, 60.0, 320.0, 200.0))
            .with_title("Editor")
            .with_z_order(1),
        WindowDescriptor::new(WindowId(2), Rect::new(120.0, 120.0, 160.0, 90.0))
            .with_kind(WindowKind::Popup)
            .with_z_order(2),
    ]));

    compositor.enqueue_draw(
        WindowId(1),
        [
            PaintCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 320.0, 200.0),
                color: 0xFF1E_1F22,
            },
            PaintCommand::DrawImage {
                image: LOGO,
                rect: Rect::new(8.0, 8.0, 32.0, 32.0),
            },
            PaintCommand::FillRect {
                rect: Rect::new(0.0, 180.0, 320.0, 20.0),
                color: 0xFF3C_3F41,
            },
        ],
    )?;
    compositor.enqueue_draw(
        WindowId(2),
        [PaintCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 160.0, 90.0),
            color: 0xFF2B_2D30,
        }],
    )?;

    let mut frame_loop = FrameLoop::new(config.frame_interval)?;
    let mut session = Session {
        compositor,
        frames: 0,
        signal: frame_loop.signal(),
    };
    frame_loop.run(&mut session)?;

    let compositor = session.compositor;
    let scaling = compositor.layout().scaling;
    let screen_width = (480.0 * scaling.pixel_ratio()).ceil() as u32;
    let screen_height = (320.0 * scaling.pixel_ratio()).ceil() as u32;
    let mut screen = Canvas::new(screen_width, screen_height);
    compositor.compose(&mut screen);
    info!(
        "Composed {} nodes onto a {}x{} screen",
        compositor.stacking_order().len(),
        screen.width(),
        screen.height()
    );

    for id in compositor.window_ids() {
        if let Some(window) = compositor.window(id) {
            if window.queue().has_pending() {
                warn!("Window {:?} still has {} pending commands", id, window.queue().pending_len());
            }
        }
    }

    let mut translator = InputTranslator::new(scaling);
    let script = [
        ClientKeyEvent::down("ShiftLeft", "Shift"),
        ClientKeyEvent::down("KeyH", "H").with_hint(Modifiers::SHIFT),
        ClientKeyEvent::up("KeyH", "H").with_hint(Modifiers::SHIFT),
        ClientKeyEvent::up("ShiftLeft", "Shift"),
    ];
    for event in &script {
        for native in translator.translate_key(event) {
            info!(
                "Key {} -> id {} code {} char {:#x} location {} modifiers {:#x}",
                event.code,
                native.id.code(),
                native.key_code,
                native.key_char as u32,
                native.key_location.code(),
                native.modifiers.bits()
            );
        }
    }

    info!("Smoke run finished");
    Ok(())
}
