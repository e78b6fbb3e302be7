//! Scale-to-fit / scale-to-fill layout for rendered grids.

use serde::{Deserialize, Serialize};

/// How to scale when both container dimensions are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    /// Whole grid visible (`min` of the two scales)
    #[default]
    Fit,
    /// Container fully covered (`max` of the two scales)
    Fill,
}

/// Container size; `None` on an axis means "auto" (sized to content).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Container {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// A uniform scale applied around the content's centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { scale: 1.0 };

    /// CSS transform: centre on the anchor, then scale.
    pub fn to_css(&self) -> String {
        format!("translate(-50%, -50%) scale({})", self.scale)
    }

    /// Top-left offset that centres `natural * scale` inside `canvas`.
    pub fn centered_offset(&self, natural: (f32, f32), canvas: (f32, f32)) -> (f32, f32) {
        (
            (canvas.0 - natural.0 * self.scale) / 2.0,
            (canvas.1 - natural.1 * self.scale) / 2.0,
        )
    }
}

/// Uniform scale for content of `natural` size in `container`.
///
/// Width-only or height-only containers scale to that axis; both fixed uses
/// `mode`; neither keeps the natural size. Zero or invalid natural sizes
/// are treated as 1.
pub fn compute_scale(natural: (f32, f32), container: Container, mode: SizingMode) -> f32 {
    let nw = positive_or_one(natural.0);
    let nh = positive_or_one(natural.1);
    let cw = container.width.filter(|w| w.is_finite() && *w >= 0.0);
    let ch = container.height.filter(|h| h.is_finite() && *h >= 0.0);

    match (cw, ch) {
        (Some(w), None) => w / nw,
        (None, Some(h)) => h / nh,
        (Some(w), Some(h)) => {
            let (sx, sy) = (w / nw, h / nh);
            match mode {
                SizingMode::Fit => sx.min(sy),
                SizingMode::Fill => sx.max(sy),
            }
        }
        (None, None) => 1.0,
    }
}

fn positive_or_one(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        1.0
    }
}

/// Tracks layout inputs and recomputes the transform when any of them change.
///
/// Container resizes count as changes, not only new content.
#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    last: Option<((f32, f32), Container, SizingMode)>,
    transform: Option<Transform>,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current inputs; returns the new transform if anything changed.
    pub fn update(
        &mut self,
        natural: (f32, f32),
        container: Container,
        mode: SizingMode,
    ) -> Option<Transform> {
        let inputs = (natural, container, mode);
        if self.last == Some(inputs) {
            return None;
        }
        self.last = Some(inputs);
        let transform = Transform {
            scale: compute_scale(natural, container, mode),
        };
        self.transform = Some(transform);
        Some(transform)
    }

    pub fn transform(&self) -> Transform {
        self.transform.unwrap_or(Transform::IDENTITY)
    }
}
