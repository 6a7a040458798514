//! Draw-command processor
//!
//! Applies a window's queued commands to its rendering surface once per
//! frame. Commands are applied strictly in enqueue order and at most once:
//! when one fails, it and everything behind it wait in the pending queue,
//! and nothing newer is applied until the pending queue has drained.

use log::{debug, error, warn};

use super::command::{DrawCommand, DrawTarget};
use super::images::ImageCache;
use super::queue::{DrawQueue, QueueState};
use super::surface::RenderingSurface;

/// Errors raised by the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    /// New commands were about to be applied while older ones were still
    /// pending. Applying them would reorder the command stream.
    #[error("Ordering violation: {incoming} new commands applied ahead of {pending} pending")]
    OrderingViolation { pending: usize, incoming: usize },
}

/// Outcome of one frame for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Commands applied this frame
    pub applied: usize,
    /// Commands moved to the pending queue this frame
    pub deferred: usize,
    /// Commands pending once the frame finished
    pub pending: usize,
}

impl FrameReport {
    /// Check if the window finished the frame with work left over
    pub fn is_stalled(&self) -> bool {
        self.pending > 0
    }
}

/// Applies draw queues to rendering surfaces
#[derive(Debug, Default)]
pub struct DrawCommandProcessor {
    frames: u64,
    applied: u64,
    failures: u64,
}

impl DrawCommandProcessor {
    /// Create a new processor
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Commands applied so far
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Failed apply attempts so far
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Apply the pending commands in order. A command that fails again stops
    /// the drain and stays pending together with everything behind it.
    /// Returns the number of commands applied.
    pub fn process_pending<C: DrawCommand>(
        &mut self,
        queue: &mut DrawQueue<C>,
        surface: &mut dyn RenderingSurface,
        images: &mut ImageCache,
    ) -> usize {
        if queue.is_disposed() || !queue.has_pending() {
            return 0;
        }

        let ratio = surface.scaling_ratio();
        let canvas = match surface.canvas_mut() {
            Ok(canvas) => canvas,
            Err(e) => {
                warn!("Cannot drain pending draw commands: {}", e);
                return 0;
            }
        };
        let mut target = DrawTarget::new(canvas, ratio, images);

        let mut applied = 0;
        while let Some(command) = queue.front_pending() {
            match command.apply(&mut target) {
                Ok(()) => {
                    queue.pop_pending();
                    applied += 1;
                }
                Err(e) => {
                    self.failures += 1;
                    debug!(
                        "Pending draw command failed again, {} left pending: {}",
                        queue.pending_len(),
                        e
                    );
                    break;
                }
            }
        }

        self.applied += applied as u64;
        applied
    }

    /// Apply a fresh batch from index 0. Returns the index of the first
    /// command that failed, or None if all of them applied. Commands after
    /// a failure are not attempted.
    pub fn process_new<C: DrawCommand>(
        &mut self,
        queue: &DrawQueue<C>,
        commands: &[C],
        surface: &mut dyn RenderingSurface,
        images: &mut ImageCache,
    ) -> Result<Option<usize>, ProcessError> {
        if queue.is_disposed() || commands.is_empty() {
            return Ok(None);
        }
        if queue.has_pending() {
            let violation = ProcessError::OrderingViolation {
                pending: queue.pending_len(),
                incoming: commands.len(),
            };
            error!("{}", violation);
            return Err(violation);
        }

        let ratio = surface.scaling_ratio();
        let canvas = match surface.canvas_mut() {
            Ok(canvas) => canvas,
            Err(e) => {
                warn!("Cannot apply draw commands: {}", e);
                return Ok(Some(0));
            }
        };
        let mut target = DrawTarget::new(canvas, ratio, images);

        for (index, command) in commands.iter().enumerate() {
            if let Err(e) = command.apply(&mut target) {
                self.failures += 1;
                self.applied += index as u64;
                debug!(
                    "Draw command {} of {} failed, deferring the rest: {}",
                    index,
                    commands.len(),
                    e
                );
                return Ok(Some(index));
            }
        }

        self.applied += commands.len() as u64;
        Ok(None)
    }

    /// Run one frame: retry pending work or apply the new batch, then flush
    /// the surface. The surface is flushed even if nothing was applied.
    pub fn render_frame<C: DrawCommand>(
        &mut self,
        queue: &mut DrawQueue<C>,
        surface: &mut dyn RenderingSurface,
        images: &mut ImageCache,
    ) -> FrameReport {
        if queue.is_disposed() {
            return FrameReport::default();
        }

        let mut batch = queue.take_incoming();
        let mut report = FrameReport::default();

        if queue.has_pending() {
            queue.set_state(QueueState::DrainingPending);
            report.deferred = batch.len();
            queue.defer(batch);
            report.applied = self.process_pending(queue, surface, images);
        } else {
            queue.set_state(QueueState::ApplyingNew);
            match self.process_new(queue, &batch, surface, images) {
                Ok(None) => report.applied = batch.len(),
                Ok(Some(index)) => {
                    let failed = batch.split_off(index);
                    report.applied = index;
                    report.deferred = failed.len();
                    queue.defer(failed);
                }
                Err(_) => {
                    // Already logged; keep every command, in order.
                    report.deferred = batch.len();
                    queue.defer(batch);
                }
            }
        }

        queue.finish_frame();
        surface.flush();
        self.frames += 1;

        report.pending = queue.pending_len();
        report
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::compositor::{PixelRect, Rect};
    use crate::renderer::command::{DrawError, PaintCommand};
    use crate::renderer::images::{Image, ImageId};
    use crate::renderer::surface::{DirectSurface, DoubleBufferedSurface};

    /// Command that logs when it is applied and fails while not ready
    #[derive(Clone)]
    struct Probe {
        id: usize,
        ready: Rc<Cell<bool>>,
        log: Rc<RefCell<Vec<usize>>>,
    }

    impl DrawCommand for Probe {
        fn apply(&self, target: &mut DrawTarget<'_>) -> Result<(), DrawError> {
            if !self.ready.get() {
                return Err(DrawError::ImageUnavailable(ImageId(self.id as u64)));
            }
            self.log.borrow_mut().push(self.id);
            let x = (self.id % 8) as i32;
            target
                .canvas()
                .fill_rect(PixelRect::new(x, 0, 1, 1), self.id as u32 + 1);
            Ok(())
        }
    }

    struct Probes {
        log: Rc<RefCell<Vec<usize>>>,
        flags: Vec<Rc<Cell<bool>>>,
    }

    impl Probes {
        fn new() -> Self {
            Self {
                log: Rc::new(RefCell::new(Vec::new())),
                flags: Vec::new(),
            }
        }

        fn make(&mut self, ready: bool) -> Probe {
            let flag = Rc::new(Cell::new(ready));
            self.flags.push(flag.clone());
            Probe {
                id: self.flags.len() - 1,
                ready: flag,
                log: self.log.clone(),
            }
        }
    }

    #[test]
    fn test_process_pending_empty() {
        let mut processor = DrawCommandProcessor::new();
        let mut queue: DrawQueue<Probe> = DrawQueue::new();
        let mut surface = DirectSurface::new(8, 1, 1.0);
        let mut images = ImageCache::new();

        assert_eq!(processor.process_pending(&mut queue, &mut surface, &mut images), 0);
    }

    #[test]
    fn test_process_new_returns_first_failure() {
        let mut probes = Probes::new();
        let batch = vec![probes.make(true), probes.make(false), probes.make(true)];

        let mut processor = DrawCommandProcessor::new();
        let queue = DrawQueue::new();
        let mut surface = DirectSurface::new(8, 1, 1.0);
        let mut images = ImageCache::new();

        let result = processor.process_new(&queue, &batch, &mut surface, &mut images);
        assert_eq!(result, Ok(Some(1)));
        assert_eq!(*probes.log.borrow(), vec![0]);
    }

    #[test]
    fn test_process_new_all_applied() {
        let mut probes = Probes::new();
        let batch = vec![probes.make(true), probes.make(true)];

        let mut processor = DrawCommandProcessor::new();
        let queue = DrawQueue::new();
        let mut surface = DirectSurface::new(8, 1, 1.0);
        let mut images = ImageCache::new();

        assert_eq!(
            processor.process_new(&queue, &batch, &mut surface, &mut images),
            Ok(None)
        );
        assert_eq!(processor.applied(), 2);
    }

    #[test]
    fn test_process_new_with_pending_is_ordering_violation() {
        let mut probes = Probes::new();
        let mut queue = DrawQueue::new();
        queue.defer([probes.make(false)]);
        let batch = vec![probes.make(true)];

        let mut processor = DrawCommandProcessor::new();
        let mut surface = DirectSurface::new(8, 1, 1.0);
        let mut images = ImageCache::new();

        let result = processor.process_new(&queue, &batch, &mut surface, &mut images);
        assert_eq!(
            result,
            Err(ProcessError::OrderingViolation {
                pending: 1,
                incoming: 1
            })
        );
        assert!(probes.log.borrow().is_empty());
    }

    #[test]
    fn test_failed_suffix_moves_to_pending() {
        let mut probes = Probes::new();
        let mut queue = DrawQueue::new();
        let first = probes.make(true);
        let blocked = probes.make(false);
        let after = probes.make(true);
        queue.enqueue([first, blocked, after]);

        let mut processor = DrawCommandProcessor::new();
        let mut surface = DirectSurface::new(8, 1, 1.0);
        let mut images = ImageCache::new();

        let report = processor.render_frame(&mut queue, &mut surface, &mut images);
        assert_eq!(
            report,
            FrameReport {
                applied: 1,
                deferred: 2,
                pending: 2
            }
        );
        assert_eq!(queue.state(), QueueState::Stalled);

        // Newer commands queue up behind the stalled ones
        queue.enqueue([probes.make(true)]);
        let report = processor.render_frame(&mut queue, &mut surface, &mut images);
        assert_eq!(report.applied, 0);
        assert_eq!(report.pending, 3);

        probes.flags[1].set(true);
        let report = processor.render_frame(&mut queue, &mut surface, &mut images);
        assert_eq!(report.applied, 3);
        assert_eq!(queue.state(), QueueState::Idle);
        assert_eq!(*probes.log.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_flush_every_frame() {
        let mut processor = DrawCommandProcessor::new();
        let mut queue: DrawQueue<PaintCommand> = DrawQueue::new();
        let mut surface = DoubleBufferedSurface::new(4, 4, 1.0);
        let mut images = ImageCache::new();

        processor.render_frame(&mut queue, &mut surface, &mut images);
        processor.render_frame(&mut queue, &mut surface, &mut images);
        assert_eq!(surface.presents(), 2);
        assert_eq!(processor.frames(), 2);
    }

    #[test]
    fn test_disposed_queue_is_noop() {
        let mut probes = Probes::new();
        let mut queue = DrawQueue::new();
        queue.enqueue([probes.make(true)]);
        queue.dispose();

        let mut processor = DrawCommandProcessor::new();
        let mut surface = DoubleBufferedSurface::new(4, 4, 1.0);
        let mut images = ImageCache::new();

        let report = processor.render_frame(&mut queue, &mut surface, &mut images);
        assert_eq!(report, FrameReport::default());
        assert_eq!(surface.presents(), 0);
        assert!(probes.log.borrow().is_empty());
    }

    #[test]
    fn test_image_arrival_unblocks_pending() {
        let mut processor = DrawCommandProcessor::new();
        let mut queue = DrawQueue::new();
        let mut surface = DirectSurface::new(4, 4, 1.0);
        let mut images = ImageCache::new();

        queue.enqueue([
            PaintCommand::DrawImage {
                image: ImageId(9),
                rect: Rect::new(0.0, 0.0, 4.0, 4.0),
            },
            PaintCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
                color: 0xFF00_FF00,
            },
        ]);

        let report = processor.render_frame(&mut queue, &mut surface, &mut images);
        assert!(report.is_stalled());
        assert_eq!(images.take_requests(), vec![ImageId(9)]);
        assert_eq!(surface.visible().pixel(0, 0), Some(0));

        images.insert(ImageId(9), Image::solid(2, 2, 0xFF00_00FF));
        let report = processor.render_frame(&mut queue, &mut surface, &mut images);
        assert!(!report.is_stalled());
        assert_eq!(surface.visible().pixel(0, 0), Some(0xFF00_FF00));
        assert_eq!(surface.visible().pixel(3, 3), Some(0xFF00_00FF));
    }

    /// Small deterministic generator so the replay test needs no extra crates
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: usize) -> usize {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((self.0 >> 33) as usize) % bound
        }
    }

    #[test]
    fn test_replay_with_failures_matches_single_frame() {
        for seed in 0..50u64 {
            let mut rng = Lcg(seed);
            let total = 1 + rng.next(40);

            // Reference: everything in one frame, nothing fails
            let mut reference = Probes::new();
            let commands: Vec<Probe> = (0..total).map(|_| reference.make(true)).collect();
            let mut processor = DrawCommandProcessor::new();
            let mut queue = DrawQueue::new();
            let mut expected = DirectSurface::new(8, 1, 1.0);
            let mut images = ImageCache::new();
            queue.enqueue(commands);
            processor.render_frame(&mut queue, &mut expected, &mut images);

            // Same commands split into batches, some failing for a while
            let mut probes = Probes::new();
            let commands: Vec<Probe> = (0..total)
                .map(|_| {
                    let ready = rng.next(4) != 0;
                    probes.make(ready)
                })
                .collect();
            let mut processor = DrawCommandProcessor::new();
            let mut queue = DrawQueue::new();
            let mut actual = DirectSurface::new(8, 1, 1.0);

            let mut remaining = commands.into_iter().peekable();
            let mut frames = 0;
            while remaining.peek().is_some() || queue.has_pending() {
                let take = rng.next(5);
                queue.enqueue(remaining.by_ref().take(take));
                processor.render_frame(&mut queue, &mut actual, &mut images);

                // Resources trickle in
                let flag = rng.next(probes.flags.len());
                probes.flags[flag].set(true);

                frames += 1;
                if frames > 200 {
                    for flag in &probes.flags {
                        flag.set(true);
                    }
                }
            }

            let log = probes.log.borrow();
            assert_eq!(*log, (0..total).collect::<Vec<_>>(), "seed {}", seed);
            assert_eq!(actual.visible().pixels(), expected.visible().pixels());
        }
    }
}
