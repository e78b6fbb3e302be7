//! Async event loop that decides when the pipeline re-runs.
//!
//! Two mutually exclusive triggers feed one re-run routine:
//!
//! 1. **Poll** (every 24 ms) - re-run only if the cursor position or the
//!    render settings changed since the last run
//! 2. **Static** (every `max(50 ms, requested)`) - re-seed the RNG and re-run
//!    unconditionally, producing a noise animation
//!
//! When a static interval is configured it replaces polling. Pointer and
//! settings events arrive over a channel; the loop stops when the shutdown
//! watch flips to `true` or its sender is dropped, and every timer is dropped
//! with it.

use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::ascii::SeededRng;
use crate::error::Result;
use crate::interaction::{ChangeDetector, CursorTracker};
use crate::pipeline::RenderConfig;

/// Interval for change-driven re-runs.
pub const POLL_INTERVAL: Duration = Duration::from_millis(24);

/// Floor for the static re-seed interval.
pub const MIN_STATIC_INTERVAL: Duration = Duration::from_millis(50);

/// Input to the loop.
#[derive(Debug, Clone)]
pub enum LoopEvent {
    /// Pointer position as a fraction of the container
    Pointer { x: f32, y: f32 },
    /// Scroll by `delta` pixels within a container of `container` pixels
    Scroll {
        delta: (f32, f32),
        container: (f32, f32),
    },
    /// New render settings
    Config(Box<RenderConfig>),
}

/// What fired a re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Poll,
    Static,
}

/// Arguments handed to the re-run routine.
#[derive(Debug, Clone)]
pub struct Rerun<'a> {
    pub trigger: Trigger,
    pub config: &'a RenderConfig,
    /// `None` until the first pointer event.
    pub cursor: Option<(f32, f32)>,
    pub seed: u32,
}

/// Loop settings.
#[derive(Debug, Clone, Default)]
pub struct LoopSettings {
    /// Requested static interval; `None` selects polling.
    pub static_interval: Option<Duration>,
    /// Cursor spring smoothing (0-100); `None` follows the pointer exactly.
    pub smoothing: Option<f32>,
    /// Initial seed; the static trigger derives new seeds from it.
    pub seed: u32,
    /// Stop after this many re-runs.
    pub max_frames: Option<u64>,
}

impl LoopSettings {
    /// Effective static interval, floored at [`MIN_STATIC_INTERVAL`].
    pub fn effective_static_interval(&self) -> Option<Duration> {
        self.static_interval.map(|d| d.max(MIN_STATIC_INTERVAL))
    }
}

/// Run until shutdown (or `max_frames`), calling `rerun` for every re-run.
///
/// Returns the number of re-runs. An error from `rerun` ends the loop.
pub async fn run<F>(
    mut events: mpsc::Receiver<LoopEvent>,
    mut shutdown: watch::Receiver<bool>,
    settings: LoopSettings,
    config: RenderConfig,
    mut rerun: F,
) -> Result<u64>
where
    F: FnMut(Rerun<'_>) -> Result<()>,
{
    let static_interval = settings.effective_static_interval();
    let (period, trigger) = match static_interval {
        Some(d) => (d, Trigger::Static),
        None => (POLL_INTERVAL, Trigger::Poll),
    };
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut tracker = match settings.smoothing {
        Some(s) => CursorTracker::smoothed(s),
        None => CursorTracker::new(),
    };
    let mut config = config;
    let mut detector: ChangeDetector<(Option<(f32, f32)>, RenderConfig)> = ChangeDetector::new();
    let mut rng = SeededRng::new(settings.seed);
    let mut seed = settings.seed;
    let mut last_step = Instant::now();
    let mut events_open = true;
    // Starts set so the first poll tick always takes a snapshot
    let mut dirty = true;
    let mut frames = 0u64;

    log::debug!("Event loop started ({:?} trigger, {:?} period)", trigger, period);

    loop {
        if settings.max_frames.is_some_and(|max| frames >= max) {
            break;
        }

        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            maybe_event = events.recv(), if events_open => {
                match maybe_event {
                    Some(LoopEvent::Pointer { x, y }) => {
                        tracker.pointer(x, y);
                        dirty = true;
                    }
                    Some(LoopEvent::Scroll { delta, container }) => {
                        tracker.scroll(delta, container);
                        dirty = true;
                    }
                    Some(LoopEvent::Config(new_config)) => {
                        config = *new_config;
                        dirty = true;
                    }
                    // No more input; timers keep running until shutdown
                    None => events_open = false,
                }
            }

            _ = ticker.tick() => {
                let now = Instant::now();
                let moving = !tracker.is_settled();
                tracker.step(now - last_step);
                last_step = now;

                match trigger {
                    Trigger::Static => {
                        rng.next();
                        seed = rng.state();
                    }
                    Trigger::Poll => {
                        // A resting cursor with no new input cannot have changed
                        if !moving && !dirty {
                            continue;
                        }
                        dirty = false;
                        let snapshot = (tracker.position(), config.clone());
                        if !detector.changed(&snapshot) {
                            continue;
                        }
                    }
                }

                rerun(Rerun {
                    trigger,
                    config: &config,
                    cursor: tracker.position(),
                    seed,
                })?;
                frames += 1;
            }
        }
    }

    log::debug!("Event loop stopped after {} re-runs", frames);
    Ok(frames)
}
