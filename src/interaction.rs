//! Pointer tracking: spring smoothing, scroll anchoring and change detection.

use std::time::Duration;

/// Damping shared by every cursor spring.
pub const DEFAULT_DAMPING: f32 = 100.0;

/// Stiffness at smoothing 0 and smoothing 100.
const STIFFNESS_RANGE: (f32, f32) = (2000.0, 50.0);

/// Longest integration step; longer frames are split.
const MAX_SUBSTEP: f32 = 1.0 / 240.0;

const SETTLE_EPSILON: f32 = 1e-4;

/// Linear map of `value` from one range to another. The input is clamped to
/// its range first; a zero-width input range maps to `out_min`.
///
/// ```
/// use glyphgrid::interaction::map_range;
/// assert_eq!(map_range(50.0, 0.0, 100.0, 2000.0, 50.0), 1025.0);
/// assert_eq!(map_range(150.0, 0.0, 100.0, 0.0, 1.0), 1.0);
/// ```
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if in_min == in_max || !value.is_finite() {
        return out_min;
    }
    let (lo, hi) = if in_min < in_max {
        (in_min, in_max)
    } else {
        (in_max, in_min)
    };
    let t = (value.clamp(lo, hi) - in_min) / (in_max - in_min);
    out_min + (out_max - out_min) * t
}

/// One-dimensional damped spring (unit mass).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub position: f32,
    pub velocity: f32,
    pub target: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    /// Spring for a 0 (snappy) to 100 (floaty) smoothing setting.
    pub fn with_smoothing(smoothing: f32) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            stiffness: map_range(smoothing, 0.0, 100.0, STIFFNESS_RANGE.0, STIFFNESS_RANGE.1),
            damping: DEFAULT_DAMPING,
        }
    }

    /// Snap to `position` and stop.
    pub fn jump(&mut self, position: f32) {
        self.position = position;
        self.target = position;
        self.velocity = 0.0;
    }

    /// Move both the position and the target by `delta`, keeping velocity.
    pub fn shift(&mut self, delta: f32) {
        self.position += delta;
        self.target += delta;
    }

    /// Advance by `dt` seconds with semi-implicit Euler.
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let substeps = (dt / MAX_SUBSTEP).ceil().max(1.0);
        let h = dt / substeps;
        for _ in 0..substeps as u32 {
            let accel = self.stiffness * (self.target - self.position) - self.damping * self.velocity;
            self.velocity += accel * h;
            self.position += self.velocity * h;
        }
    }

    pub fn is_settled(&self) -> bool {
        (self.target - self.position).abs() < SETTLE_EPSILON && self.velocity.abs() < SETTLE_EPSILON
    }
}

/// Fractional (0..1) pointer position relative to the rendered content.
///
/// Until the first pointer event there is no position at all, and that first
/// event places the cursor directly instead of animating from the origin.
#[derive(Debug, Clone)]
pub struct CursorTracker {
    x: Spring,
    y: Spring,
    smoothed: bool,
    initialized: bool,
}

impl CursorTracker {
    /// Tracker that follows the pointer exactly.
    pub fn new() -> Self {
        Self {
            x: Spring::with_smoothing(0.0),
            y: Spring::with_smoothing(0.0),
            smoothed: false,
            initialized: false,
        }
    }

    /// Tracker that follows the pointer through a spring.
    pub fn smoothed(smoothing: f32) -> Self {
        Self {
            x: Spring::with_smoothing(smoothing),
            y: Spring::with_smoothing(smoothing),
            smoothed: true,
            initialized: false,
        }
    }

    /// Record a pointer position, as a fraction of the container.
    pub fn pointer(&mut self, x: f32, y: f32) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        if !self.initialized || !self.smoothed {
            self.x.jump(x);
            self.y.jump(y);
            self.initialized = true;
        } else {
            self.x.target = x;
            self.y.target = y;
        }
    }

    /// Fold a scroll of `delta` pixels into the position so the cursor stays
    /// over the same content.
    pub fn scroll(&mut self, delta: (f32, f32), container: (f32, f32)) {
        if !self.initialized {
            return;
        }
        if container.0 > 0.0 && delta.0.is_finite() {
            self.x.shift(delta.0 / container.0);
        }
        if container.1 > 0.0 && delta.1.is_finite() {
            self.y.shift(delta.1 / container.1);
        }
    }

    /// Advance the springs.
    pub fn step(&mut self, dt: Duration) {
        if self.smoothed && self.initialized {
            let dt = dt.as_secs_f32();
            self.x.step(dt);
            self.y.step(dt);
        }
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.initialized.then_some((self.x.position, self.y.position))
    }

    pub fn is_settled(&self) -> bool {
        !self.initialized || (self.x.is_settled() && self.y.is_settled())
    }
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Remembers the last sampled value and reports when it changes.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector<T> {
    last: Option<T>,
}

impl<T: PartialEq + Clone> ChangeDetector<T> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// True on the first sample and whenever `value` differs from the last one.
    pub fn changed(&mut self, value: &T) -> bool {
        if self.last.as_ref() == Some(value) {
            return false;
        }
        self.last = Some(value.clone());
        true
    }

    /// Forget the last value so the next sample counts as a change.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range_endpoints() {
        assert_eq!(map_range(0.0, 0.0, 100.0, 2000.0, 50.0), 2000.0);
        assert_eq!(map_range(100.0, 0.0, 100.0, 2000.0, 50.0), 50.0);
        assert_eq!(map_range(-5.0, 0.0, 100.0, 2000.0, 50.0), 2000.0);
        assert_eq!(map_range(3.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn test_spring_stiffness_from_smoothing() {
        assert_eq!(Spring::with_smoothing(0.0).stiffness, 2000.0);
        assert_eq!(Spring::with_smoothing(100.0).stiffness, 50.0);
        assert_eq!(Spring::with_smoothing(50.0).damping, DEFAULT_DAMPING);
    }

    #[test]
    fn test_spring_converges() {
        let mut s = Spring::with_smoothing(0.0);
        s.target = 1.0;
        for _ in 0..120 {
            s.step(1.0 / 60.0);
        }
        assert!((s.position - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_spring_large_step_is_stable() {
        let mut s = Spring::with_smoothing(0.0);
        s.target = 1.0;
        s.step(1.0);
        assert!(s.position.is_finite());
        assert!(s.position > 0.5 && s.position < 1.5);
    }

    #[test]
    fn test_spring_jump_stops() {
        let mut s = Spring::with_smoothing(50.0);
        s.target = 1.0;
        s.step(0.05);
        s.jump(0.3);
        assert_eq!((s.position, s.velocity, s.target), (0.3, 0.0, 0.3));
        assert!(s.is_settled());
    }

    #[test]
    fn test_first_pointer_event_jumps() {
        let mut t = CursorTracker::smoothed(80.0);
        assert_eq!(t.position(), None);
        t.pointer(0.7, 0.2);
        assert_eq!(t.position(), Some((0.7, 0.2)));
        t.pointer(0.1, 0.1);
        // later events animate
        assert_eq!(t.position(), Some((0.7, 0.2)));
        t.step(Duration::from_millis(16));
        let (x, _) = t.position().unwrap();
        assert!(x < 0.7 && x > 0.1);
    }

    #[test]
    fn test_unsmoothed_tracks_exactly() {
        let mut t = CursorTracker::new();
        t.pointer(0.2, 0.2);
        t.pointer(0.9, 0.4);
        assert_eq!(t.position(), Some((0.9, 0.4)));
    }

    #[test]
    fn test_scroll_anchors_to_content() {
        let mut t = CursorTracker::new();
        t.scroll((0.0, 50.0), (200.0, 200.0));
        assert_eq!(t.position(), None);
        t.pointer(0.5, 0.5);
        t.scroll((0.0, 50.0), (200.0, 200.0));
        assert_eq!(t.position(), Some((0.5, 0.75)));
    }

    #[test]
    fn test_change_detector() {
        let mut d = ChangeDetector::new();
        assert!(d.changed(&(1, 2)));
        assert!(!d.changed(&(1, 2)));
        assert!(d.changed(&(1, 3)));
        d.reset();
        assert!(d.changed(&(1, 3)));
    }
}
