use serde::Serialize;

use crate::ir::StepKind;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Dims {
    pub width: f64,
    pub height: f64,
}

impl Dims {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A pixel offset added after a position is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        }
    }
}

/// One step box; `[x, x2) × [y, y2)` in diagram data units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRect {
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
}

impl StepRect {
    pub fn mid_y(&self) -> f64 {
        (self.y + self.y2) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelAnchor {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub align: TextAlign,
    /// Horizontal pixel nudge applied by the text mark.
    pub dx: f64,
}

/// Deterministic geometry of one step diagram, before it is turned into chart marks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepGeometry {
    pub kind: StepKind,
    pub rects: Vec<StepRect>,
    pub segments: Vec<Segment>,
    pub labels: Vec<LabelAnchor>,
    /// Fixed vertical domain, when the diagram must not auto-rescale.
    pub y_domain: Option<[f64; 2]>,
    pub width: f64,
    pub height: f64,
}
