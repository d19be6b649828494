use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::error::ValidationError;

/// Symbolic placement keyword for text layers and panel docking.
///
/// Parsing never fails: unrecognised keywords are kept as `Other` and resolve to the
/// default coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    Left,
    Right,
    Top,
    Bottom,
    Center,
    SideLeft,
    SideRight,
    Other(String),
}

/// Keywords are matched trimmed and ASCII-lowercased.
fn keyword(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

impl Position {
    pub fn parse(input: &str) -> Self {
        match keyword(input).as_str() {
            "left" => Position::Left,
            "right" => Position::Right,
            "top" => Position::Top,
            "bottom" => Position::Bottom,
            "center" => Position::Center,
            "side-left" => Position::SideLeft,
            "side-right" => Position::SideRight,
            _ => Position::Other(input.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Position::Left => "left",
            Position::Right => "right",
            Position::Top => "top",
            Position::Bottom => "bottom",
            Position::Center => "center",
            Position::SideLeft => "side-left",
            Position::SideRight => "side-right",
            Position::Other(keyword) => keyword,
        }
    }

    /// The docking slot for a panel placed at this position, if any.
    pub fn slot(&self) -> Option<PanelSlot> {
        match self {
            Position::Left => Some(PanelSlot::Left),
            Position::Right => Some(PanelSlot::Right),
            Position::Top => Some(PanelSlot::Top),
            Position::Bottom => Some(PanelSlot::Bottom),
            _ => None,
        }
    }
}

impl From<&str> for Position {
    fn from(keyword: &str) -> Self {
        Position::parse(keyword)
    }
}

impl From<String> for Position {
    fn from(keyword: String) -> Self {
        Position::parse(&keyword)
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.as_str().to_string()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelSlot {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum StepKind {
    Button,
    LineSteps,
    StairSteps,
}

impl StepKind {
    pub fn name(self) -> &'static str {
        match self {
            StepKind::Button => "button",
            StepKind::LineSteps => "line_steps",
            StepKind::StairSteps => "stair_steps",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StepKind {
    type Err = ValidationError;

    /// Case-insensitive; `_` and `-` separators are optional (`line_steps`, `lineSteps`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = keyword(s)
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .collect();
        match normalized.as_str() {
            "button" => Ok(StepKind::Button),
            "linesteps" => Ok(StepKind::LineSteps),
            "stairsteps" => Ok(StepKind::StairSteps),
            _ => Err(ValidationError::InvalidMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for StepKind {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl FromStr for Orientation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match keyword(s).as_str() {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            _ => Err(ValidationError::InvalidOrientation(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArrowDirection {
    Left,
    #[default]
    Right,
    Up,
    Down,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    LeftUp,
    LeftDown,
    RightUp,
    RightDown,
    UpLeftCurve,
    UpRightCurve,
}

const ARROW_TABLE: [(ArrowDirection, &str, &str); 14] = [
    (ArrowDirection::Left, "left", "←"),
    (ArrowDirection::Right, "right", "→"),
    (ArrowDirection::Up, "up", "↑"),
    (ArrowDirection::Down, "down", "↓"),
    (ArrowDirection::UpLeft, "upleft", "↖"),
    (ArrowDirection::UpRight, "upright", "↗"),
    (ArrowDirection::DownLeft, "downleft", "↙"),
    (ArrowDirection::DownRight, "downright", "↘"),
    (ArrowDirection::LeftUp, "leftup", "↰"),
    (ArrowDirection::LeftDown, "leftdown", "↲"),
    (ArrowDirection::RightUp, "rightup", "↱"),
    (ArrowDirection::RightDown, "rightdown", "↳"),
    (ArrowDirection::UpLeftCurve, "upleftcurve", "↺"),
    (ArrowDirection::UpRightCurve, "uprightcurve", "↻"),
];

impl ArrowDirection {
    pub fn valid_names() -> Vec<&'static str> {
        ARROW_TABLE.iter().map(|(_, name, _)| *name).collect()
    }

    pub fn name(self) -> &'static str {
        ARROW_TABLE
            .iter()
            .find(|(direction, _, _)| *direction == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("right")
    }

    /// The directional glyph drawn as text.
    pub fn glyph(self) -> &'static str {
        ARROW_TABLE
            .iter()
            .find(|(direction, _, _)| *direction == self)
            .map(|(_, _, glyph)| *glyph)
            .unwrap_or("→")
    }
}

impl FromStr for ArrowDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = keyword(s);
        ARROW_TABLE
            .iter()
            .find(|(_, known, _)| *known == name)
            .map(|(direction, _, _)| *direction)
            .ok_or_else(|| ValidationError::InvalidArrowDirection {
                given: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleLayer {
    pub text: String,
    pub subtitle: Option<String>,
    pub color: String,
    pub subtitle_color: String,
    pub font_size: f64,
    pub subtitle_font_size: f64,
    pub dx: f64,
    pub dy: f64,
    pub subtitle_dx: f64,
    pub subtitle_dy: f64,
}

/// Context, source and plain call-to-action text share one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub text: String,
    pub position: Position,
    pub vertical: bool,
    pub color: String,
    pub dx: f64,
    pub dy: f64,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepPanel {
    pub kind: StepKind,
    pub position: Position,
    pub chart: Chart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NarrativeLayer {
    Title(TitleLayer),
    Context(TextLayer),
    Source(TextLayer),
    CallToAction(TextLayer),
    StepPanel(StepPanel),
    Annotation(Chart),
    ReferenceLine(Chart),
}

impl NarrativeLayer {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NarrativeLayer::Title(_) => "title",
            NarrativeLayer::Context(_) => "context",
            NarrativeLayer::Source(_) => "source",
            NarrativeLayer::CallToAction(_) => "cta",
            NarrativeLayer::StepPanel(panel) => panel.kind.name(),
            NarrativeLayer::Annotation(_) => "annotation",
            NarrativeLayer::ReferenceLine(_) => "line",
        }
    }

    /// Step diagrams dock beside the chart; everything else is drawn on it.
    pub fn is_panel(&self) -> bool {
        matches!(self, NarrativeLayer::StepPanel(_))
    }
}
