//! Per-frame uniform bookkeeping and the loop's stop signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::ShaderConstants;

use crate::pointer::PointerTracker;

/// Shader time wraps around after this many seconds to keep `f32` precision.
pub const TIME_WRAP_SECS: f64 = 180.0;

pub fn wrap_time(elapsed: Duration) -> f32 {
    wrap_secs(elapsed.as_secs_f64())
}

/// Folds any number of seconds into `[0, TIME_WRAP_SECS)`.
pub fn wrap_secs(secs: f64) -> f32 {
    secs.rem_euclid(TIME_WRAP_SECS) as f32
}

/// Cloneable flag that ends the frame loop at its next tick.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FrameDriver {
    start: Instant,
    width: u32,
    height: u32,
    pointers: PointerTracker,
    stop: StopHandle,
    frames: u64,
}

impl FrameDriver {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            start: Instant::now(),
            width,
            height,
            pointers: PointerTracker::new(),
            stop: StopHandle::default(),
            frames: 0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pointers_mut(&mut self) -> &mut PointerTracker {
        &mut self.pointers
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn constants_at(&self, elapsed: Duration) -> ShaderConstants {
        let (pointer_x, pointer_y) = match self.pointers.active() {
            // Window coordinates are top-left based, the shader wants bottom-left.
            Some(position) => (position.x, self.height as f32 - position.y),
            None => (0.0, 0.0),
        };
        ShaderConstants {
            width: self.width,
            height: self.height,
            time: wrap_time(elapsed),
            pointer_x,
            pointer_y,
            pointer_count: self.pointers.count() as u32,
        }
    }

    /// Constants for the next frame, or `None` once the loop has been asked
    /// to stop or the surface has no area to draw into.
    pub fn tick(&mut self) -> Option<ShaderConstants> {
        if self.stop.is_stopped() || self.width == 0 || self.height == 0 {
            return None;
        }
        self.frames += 1;
        Some(self.constants_at(self.start.elapsed()))
    }
}
