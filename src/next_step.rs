use serde::Deserialize;

use crate::config::NextStepOverrides;
use crate::ir::{Position, StepKind};
use crate::story::NextStepRequest;

/// A pre-filled bundle of next-step options for one diagram kind.
///
/// It carries no validation of its own: converting it yields the same
/// [`NextStepRequest`] that [`Story::add_next_steps`](crate::story::Story::add_next_steps)
/// validates. Unset sizes and colours fall back to the story's configured defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStep {
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default = "default_position")]
    pub position: Position,
    /// Diagram heading. When unset, buttons get none and step strips get the story default.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "texts")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub title_color: Option<String>,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub title_font_size: Option<f64>,
    #[serde(default)]
    pub title_font_family: Option<String>,
    #[serde(default)]
    pub button_width: Option<f64>,
    #[serde(default)]
    pub button_height: Option<f64>,
    #[serde(default)]
    pub button_corner_radius: Option<f64>,
    #[serde(default)]
    pub rect_width: Option<f64>,
    #[serde(default)]
    pub rect_height: Option<f64>,
    #[serde(default)]
    pub rect_space: Option<f64>,
    #[serde(default)]
    pub chart_width: Option<f64>,
    #[serde(default)]
    pub chart_height: Option<f64>,
    /// Step height for stair steps; `rect_height` only applies to line steps.
    #[serde(default)]
    pub stair_height: Option<f64>,
}

fn default_position() -> Position {
    Position::Bottom
}

impl NextStep {
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            position: default_position(),
            title: None,
            labels: Vec::new(),
            text: None,
            url: None,
            primary_color: None,
            text_color: None,
            title_color: None,
            opacity: None,
            font_family: None,
            font_size: None,
            title_font_size: None,
            title_font_family: None,
            button_width: None,
            button_height: None,
            button_corner_radius: None,
            rect_width: None,
            rect_height: None,
            rect_space: None,
            chart_width: None,
            chart_height: None,
            stair_height: None,
        }
    }

    pub fn button(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            url: Some(url.into()),
            ..Self::new(StepKind::Button)
        }
    }

    pub fn line_steps<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            ..Self::new(StepKind::LineSteps)
        }
    }

    pub fn stair_steps<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            ..Self::new(StepKind::StairSteps)
        }
    }

    pub fn with_position(mut self, position: impl Into<Position>) -> Self {
        self.position = position.into();
        self
    }

    pub fn into_request(self) -> NextStepRequest {
        let mut overrides = NextStepOverrides {
            color: self.primary_color,
            opacity: self.opacity,
            text_color: self.text_color,
            font_family: self.font_family,
            font_size: self.font_size,
            title_color: self.title_color,
            title_font_family: self.title_font_family,
            title_font_size: self.title_font_size,
            chart_width: self.chart_width,
            chart_height: self.chart_height,
            ..Default::default()
        };
        let labels = match self.kind {
            StepKind::Button => {
                overrides.rect_width = self.button_width;
                overrides.rect_height = self.button_height;
                overrides.corner_radius = self.button_corner_radius;
                None
            }
            StepKind::LineSteps => {
                overrides.rect_width = self.rect_width;
                overrides.rect_height = self.rect_height;
                overrides.space = self.rect_space;
                Some(self.labels)
            }
            StepKind::StairSteps => {
                overrides.rect_width = self.rect_width;
                overrides.rect_height = self.stair_height;
                Some(self.labels)
            }
        };

        let title = match (self.kind, self.title) {
            (_, Some(title)) => Some(title),
            (StepKind::Button, None) => Some(String::new()),
            (_, None) => None,
        };
        NextStepRequest {
            mode: Some(self.kind.name().to_string()),
            position: Some(self.position),
            text: self.text,
            labels,
            url: self.url,
            title,
            overrides,
        }
    }
}

impl From<NextStep> for NextStepRequest {
    fn from(step: NextStep) -> Self {
        step.into_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::ir::NarrativeLayer;
    use crate::story::Story;

    #[test]
    fn button_bundle_has_no_heading() {
        let request = NextStep::button("Go", "http://x").into_request();
        assert_eq!(request.mode.as_deref(), Some("button"));
        assert_eq!(request.title.as_deref(), Some(""));
        assert_eq!(request.labels, None);

        let mut story = Story::default();
        story.add_next_steps(request).unwrap();
        let NarrativeLayer::StepPanel(panel) = &story.layers()[0] else {
            panic!("expected a step panel");
        };
        assert!(panel.chart.props().title.is_none());
    }

    #[test]
    fn position_picks_the_docking_slot() {
        let mut story = Story::default();
        story
            .add_next_steps(NextStep::line_steps(["a", "b"]).with_position("left").into())
            .unwrap()
            .add_next_steps(NextStep::stair_steps(["a"]).into())
            .unwrap();
        let plan = story.layout_plan();
        assert_eq!(plan.left, vec![0]);
        assert_eq!(plan.bottom, vec![1]);
    }

    #[test]
    fn stair_height_maps_to_step_height() {
        let step = NextStep {
            stair_height: Some(7.0),
            rect_height: Some(99.0),
            ..NextStep::stair_steps(["a", "b"])
        };
        let request = step.into_request();
        assert_eq!(request.overrides.rect_height, Some(7.0));
        assert_eq!(request.title, None);
    }

    #[test]
    fn bundle_is_validated_by_the_story() {
        let mut story = Story::default();
        let too_many = NextStep::line_steps(["1", "2", "3", "4", "5", "6"]);
        assert_eq!(
            story.add_next_steps(too_many.into()).err(),
            Some(ValidationError::TooManySteps(6))
        );
        let no_url = NextStep {
            url: None,
            ..NextStep::button("Go", "")
        };
        assert_eq!(
            story.add_next_steps(no_url.into()).err(),
            Some(ValidationError::MissingUrl)
        );
        assert!(story.layers().is_empty());
    }

    #[test]
    fn deserializes_from_document_shape() {
        let step: NextStep = json5::from_str(
            r#"{ type: "line_steps", texts: ["a", "b", "c"], position: "left", rectSpace: 2 }"#,
        )
        .unwrap();
        assert_eq!(step.kind, StepKind::LineSteps);
        assert_eq!(step.position, Position::Left);
        assert_eq!(step.rect_space, Some(2.0));
        assert_eq!(step.title, None);
    }
}
