//! Frame loop
//!
//! Drives the client at a fixed frame rate using a calloop timer. Anything
//! that implements [`FrameDriven`] can be ticked by it.

use std::time::Duration;

use anyhow::anyhow;
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop as CalLoop, LoopHandle, LoopSignal};
use log::{debug, error};

/// State that does work once per frame
pub trait FrameDriven {
    fn on_frame(&mut self);
}

/// Fixed-rate frame loop around a calloop event loop
pub struct FrameLoop<S: 'static> {
    /// Calloop event loop
    event_loop: CalLoop<'static, S>,
    /// Loop signal for waking/stopping
    signal: LoopSignal,
    interval: Duration,
}

impl<S: FrameDriven + 'static> FrameLoop<S> {
    /// Create a frame loop ticking every `interval`
    pub fn new(interval: Duration) -> anyhow::Result<Self> {
        let event_loop = CalLoop::try_new()?;
        let signal = event_loop.get_signal();

        event_loop
            .handle()
            .insert_source(Timer::from_duration(interval), move |_, _, state: &mut S| {
                state.on_frame();
                TimeoutAction::ToDuration(interval)
            })
            .map_err(|e| anyhow!("Failed to register frame timer: {}", e.error))?;

        debug!("Frame loop ready, interval {:?}", interval);
        Ok(Self {
            event_loop,
            signal,
            interval,
        })
    }

    /// Get a handle to register more event sources
    pub fn handle(&self) -> LoopHandle<'static, S> {
        self.event_loop.handle()
    }

    /// Get the loop signal for waking
    pub fn signal(&self) -> LoopSignal {
        self.signal.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one iteration of the event loop
    pub fn dispatch(&mut self, timeout: Option<Duration>, state: &mut S) -> anyhow::Result<()> {
        self.event_loop.dispatch(timeout, state)?;
        Ok(())
    }

    /// Run until [`FrameLoop::stop`] is called or the loop signal fires
    pub fn run(&mut self, state: &mut S) -> anyhow::Result<()> {
        debug!("Starting frame loop");

        if let Err(e) = self.event_loop.run(self.interval, state, |_| {}) {
            error!("Frame loop error: {}", e);
            return Err(e.into());
        }
        debug!("Frame loop stopped");
        Ok(())
    }

    /// Stop the loop
    pub fn stop(&self) {
        self.signal.stop();
    }

    /// Wake the loop from another thread
    pub fn wake(&self) {
        self.signal.wakeup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        frames: u32,
        stop_after: Option<(u32, LoopSignal)>,
    }

    impl FrameDriven for Counter {
        fn on_frame(&mut self) {
            self.frames += 1;
            if let Some((limit, signal)) = &self.stop_after {
                if self.frames >= *limit {
                    signal.stop();
                }
            }
        }
    }

    #[test]
    fn test_frame_loop_new() {
        let frame_loop = FrameLoop::<Counter>::new(Duration::from_millis(16));
        assert!(frame_loop.is_ok());
    }

    #[test]
    fn test_dispatch_ticks_frames() {
        let mut frame_loop = FrameLoop::new(Duration::from_millis(1)).unwrap();
        let mut counter = Counter::default();

        for _ in 0..5 {
            frame_loop
                .dispatch(Some(Duration::from_millis(100)), &mut counter)
                .unwrap();
        }
        assert!(counter.frames >= 1);
    }

    #[test]
    fn test_run_until_stopped() {
        let mut frame_loop = FrameLoop::new(Duration::from_millis(1)).unwrap();
        let mut counter = Counter {
            frames: 0,
            stop_after: Some((3, frame_loop.signal())),
        };

        frame_loop.run(&mut counter).unwrap();
        assert_eq!(counter.frames, 3);
    }
}
