//! The `Story` builder: a base chart plus an ordered list of narrative layers.

use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::chart::{Chart, Data, UnitChart};
use crate::config::{Config, NextStepDefaults, NextStepOverrides, resolve_step_style};
use crate::error::ValidationError;
use crate::ir::{
    ArrowDirection, NarrativeLayer, Orientation, Position, StepKind, StepPanel, TextLayer,
    TitleLayer,
};
use crate::layout::{
    AnnotationSpec, ComposeContext, GlyphStyle, LayoutPlan, PointStyle, ReferenceLineSpec,
    StepDiagramSpec, build_annotation, build_reference_line, build_step_chart, compose,
    infer_axis_types, plan_layers,
};
use crate::theme::Theme;

pub const DEFAULT_WIDTH: f64 = 600.0;
pub const DEFAULT_HEIGHT: f64 = 400.0;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleOptions {
    pub subtitle: Option<String>,
    pub color: Option<String>,
    pub subtitle_color: Option<String>,
    pub font_size: Option<f64>,
    pub subtitle_font_size: Option<f64>,
    pub dx: f64,
    pub dy: f64,
    pub subtitle_dx: f64,
    pub subtitle_dy: f64,
}

/// Options for context, source and plain call-to-action text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextOptions {
    pub position: Option<Position>,
    pub vertical: bool,
    pub color: Option<String>,
    pub dx: f64,
    pub dy: f64,
    pub font_size: Option<f64>,
}

/// A next-step request. Without a `mode` it is a plain call-to-action text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NextStepRequest {
    #[serde(alias = "type")]
    pub mode: Option<String>,
    pub position: Option<Position>,
    /// Call-to-action or button caption.
    pub text: Option<String>,
    #[serde(alias = "texts")]
    pub labels: Option<Vec<String>>,
    pub url: Option<String>,
    /// Diagram heading; `None` uses the configured default, an empty string draws none.
    pub title: Option<String>,
    /// Step styling; for a plain call-to-action only `color` applies, as the text colour.
    #[serde(flatten)]
    pub overrides: NextStepOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationOptions {
    pub text: Option<String>,
    pub arrow_direction: Option<String>,
    pub show_point: Option<bool>,
    pub point_color: Option<String>,
    pub point_size: Option<f64>,
    pub arrow_color: Option<String>,
    pub arrow_size: Option<f64>,
    pub arrow_dx: Option<f64>,
    pub arrow_dy: Option<f64>,
    pub label_color: Option<String>,
    pub label_size: Option<f64>,
    pub label_dx: Option<f64>,
    pub label_dy: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineOptions {
    pub orientation: Option<String>,
    pub color: Option<String>,
    pub stroke_width: Option<f64>,
    pub stroke_dash: Vec<f64>,
}

fn merge_glyph(
    mut style: GlyphStyle,
    color: Option<String>,
    size: Option<f64>,
    dx: Option<f64>,
    dy: Option<f64>,
) -> GlyphStyle {
    if let Some(color) = color {
        style.color = color;
    }
    style.size = size.unwrap_or(style.size);
    style.dx = dx.unwrap_or(style.dx);
    style.dy = dy.unwrap_or(style.dy);
    style
}

fn rejected(kind: &str, err: ValidationError) -> ValidationError {
    debug!(layer = kind, error = err.to_string(); "Rejected narrative layer");
    err
}

/// A base chart with narrative layers attached.
///
/// Every `add_*` call appends at most one layer; a call that fails validation appends
/// nothing. [`Story::render`] only reads the story, so it can be called any number of times.
#[derive(Debug, Clone)]
pub struct Story {
    chart: UnitChart,
    theme: Theme,
    next_step_defaults: NextStepDefaults,
    layers: Vec<NarrativeLayer>,
    view_config: Option<Map<String, Value>>,
}

impl Default for Story {
    fn default() -> Self {
        Self::new(None, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Story {
    pub fn new(data: Option<Data>, width: f64, height: f64) -> Self {
        Self {
            chart: UnitChart::new(data).with_size(width, height),
            theme: Theme::default(),
            next_step_defaults: NextStepDefaults::default(),
            layers: Vec::new(),
            view_config: None,
        }
    }

    pub fn from_config(data: Option<Data>, width: f64, height: f64, config: &Config) -> Self {
        let mut story = Self::new(data, width, height);
        story.theme = config.theme.clone();
        story.next_step_defaults = config.next_steps.clone();
        story
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// The base chart.
    pub fn chart(&self) -> &UnitChart {
        &self.chart
    }

    /// Mutable access to the base chart, for marks and encodings the builder does not cover.
    pub fn chart_mut(&mut self) -> &mut UnitChart {
        &mut self.chart
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn layers(&self) -> &[NarrativeLayer] {
        &self.layers
    }

    pub fn view_config(&self) -> Option<&Map<String, Value>> {
        self.view_config.as_ref()
    }

    pub fn em_to_px(&self, em: f64) -> f64 {
        self.theme.em_to_px(em)
    }

    fn push(&mut self, layer: NarrativeLayer) -> &mut Self {
        debug!(
            layer = layer.kind_name(),
            index = self.layers.len(),
            panel = layer.is_panel();
            "Appended narrative layer"
        );
        self.layers.push(layer);
        self
    }

    pub fn add_title(&mut self, text: impl Into<String>, options: TitleOptions) -> &mut Self {
        let layer = TitleLayer {
            text: text.into(),
            subtitle: options.subtitle,
            color: options
                .color
                .unwrap_or_else(|| self.theme.colors.title.clone()),
            subtitle_color: options
                .subtitle_color
                .unwrap_or_else(|| self.theme.colors.subtitle.clone()),
            font_size: options
                .font_size
                .unwrap_or_else(|| self.em_to_px(self.theme.font_sizes.title)),
            subtitle_font_size: options
                .subtitle_font_size
                .unwrap_or_else(|| self.em_to_px(self.theme.font_sizes.subtitle)),
            dx: options.dx,
            dy: options.dy,
            subtitle_dx: options.subtitle_dx,
            subtitle_dy: options.subtitle_dy,
        };
        self.push(NarrativeLayer::Title(layer))
    }

    fn text_layer(
        &self,
        text: String,
        options: TextOptions,
        default_position: Position,
        default_color: &str,
        scale: f64,
    ) -> TextLayer {
        TextLayer {
            text,
            position: options.position.unwrap_or(default_position),
            vertical: options.vertical,
            color: options.color.unwrap_or_else(|| default_color.to_string()),
            dx: options.dx,
            dy: options.dy,
            font_size: options.font_size.unwrap_or_else(|| self.em_to_px(scale)),
        }
    }

    /// Adds explanatory text, on the left by default.
    pub fn add_context(&mut self, text: impl Into<String>, options: TextOptions) -> &mut Self {
        let layer = self.text_layer(
            text.into(),
            options,
            Position::Left,
            &self.theme.colors.context,
            self.theme.font_sizes.context,
        );
        self.push(NarrativeLayer::Context(layer))
    }

    /// Adds a data source credit, at the bottom by default.
    pub fn add_source(&mut self, text: impl Into<String>, options: TextOptions) -> &mut Self {
        let layer = self.text_layer(
            text.into(),
            options,
            Position::Bottom,
            &self.theme.colors.source,
            self.theme.font_sizes.source,
        );
        self.push(NarrativeLayer::Source(layer))
    }

    /// Adds a call-to-action: plain text when no mode is given, otherwise a docked step diagram.
    pub fn add_next_steps(
        &mut self,
        request: NextStepRequest,
    ) -> Result<&mut Self, ValidationError> {
        let position = request.position.unwrap_or(Position::Bottom);
        let Some(mode) = request.mode.as_deref() else {
            let text = match request.text {
                Some(text) if !text.is_empty() => text,
                _ => {
                    return Err(rejected(
                        "cta",
                        ValidationError::MissingText("the basic call-to-action"),
                    ));
                }
            };
            let layer = self.text_layer(
                text,
                TextOptions {
                    position: Some(position),
                    color: request.overrides.color,
                    ..Default::default()
                },
                Position::Bottom,
                &self.theme.colors.cta,
                self.theme.font_sizes.cta,
            );
            return Ok(self.push(NarrativeLayer::CallToAction(layer)));
        };

        let kind: StepKind = mode.parse().map_err(|err| rejected("next_steps", err))?;
        let spec = StepDiagramSpec {
            kind,
            labels: request.labels,
            text: request.text,
            url: request.url,
            style: resolve_step_style(kind, &self.next_step_defaults, &request.overrides),
            title: Some(
                request
                    .title
                    .unwrap_or_else(|| self.next_step_defaults.title.clone()),
            ),
        };
        let chart = build_step_chart(&spec).map_err(|err| rejected(kind.name(), err))?;
        Ok(self.push(NarrativeLayer::StepPanel(StepPanel {
            kind,
            position,
            chart,
        })))
    }

    /// Marks a data-space point with a directional glyph and a label.
    pub fn add_annotation(
        &mut self,
        x: impl Into<Value>,
        y: impl Into<Value>,
        options: AnnotationOptions,
    ) -> Result<&mut Self, ValidationError> {
        let direction = options
            .arrow_direction
            .as_deref()
            .map(str::parse::<ArrowDirection>)
            .transpose()
            .map_err(|err| rejected("annotation", err))?
            .unwrap_or_default();

        let defaults = AnnotationSpec::new(x, y);
        let point = match options.show_point {
            Some(false) => None,
            _ => {
                let mut point = PointStyle::default();
                if let Some(color) = options.point_color {
                    point.color = color;
                }
                point.size = options.point_size.unwrap_or(point.size);
                Some(point)
            }
        };
        let spec = AnnotationSpec {
            text: options.text.unwrap_or_else(|| defaults.text.clone()),
            direction,
            point,
            arrow: merge_glyph(
                defaults.arrow.clone(),
                options.arrow_color,
                options.arrow_size,
                options.arrow_dx,
                options.arrow_dy,
            ),
            label: merge_glyph(
                defaults.label.clone(),
                options.label_color,
                options.label_size,
                options.label_dx,
                options.label_dy,
            ),
            ..defaults
        };
        let chart = build_annotation(&spec, infer_axis_types(&self.chart.encoding));
        Ok(self.push(NarrativeLayer::Annotation(chart)))
    }

    /// Draws a reference rule at `value`, horizontal unless told otherwise.
    pub fn add_line(
        &mut self,
        value: impl Into<Value>,
        options: LineOptions,
    ) -> Result<&mut Self, ValidationError> {
        let orientation = options
            .orientation
            .as_deref()
            .map(str::parse::<Orientation>)
            .transpose()
            .map_err(|err| rejected("line", err))?
            .unwrap_or_default();

        let defaults = ReferenceLineSpec::new(value);
        let spec = ReferenceLineSpec {
            orientation,
            color: options.color.unwrap_or_else(|| defaults.color.clone()),
            stroke_width: options.stroke_width.unwrap_or(defaults.stroke_width),
            stroke_dash: options.stroke_dash,
            ..defaults
        };
        let chart = build_reference_line(&spec, infer_axis_types(&self.chart.encoding));
        Ok(self.push(NarrativeLayer::ReferenceLine(chart)))
    }

    /// Stores view-level overrides applied at render time, replacing earlier ones.
    pub fn configure_view(&mut self, view: Map<String, Value>) -> &mut Self {
        self.view_config = Some(view);
        self
    }

    pub fn layout_plan(&self) -> LayoutPlan {
        plan_layers(&self.layers)
    }

    pub fn render(&self) -> Chart {
        compose(
            ComposeContext {
                base: &self.chart,
                font: &self.theme.font,
                view_config: self.view_config.as_ref(),
            },
            &self.layers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Channel, Encoding, Mark, MarkKind};
    use serde_json::json;

    fn story() -> Story {
        let mut story = Story::default();
        story.chart_mut().mark = Some(Mark::new(MarkKind::Bar));
        story
    }

    fn steps(mode: &str, labels: &[&str]) -> NextStepRequest {
        NextStepRequest {
            mode: Some(mode.to_string()),
            labels: Some(labels.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_follow_classic_theme() {
        let mut story = story();
        story
            .add_title("Revenue", TitleOptions::default())
            .add_context("Up 20%", TextOptions::default())
            .add_source("Source: ACME", TextOptions::default());

        match &story.layers()[0] {
            NarrativeLayer::Title(title) => {
                assert_eq!(title.font_size, 32.0);
                assert_eq!(title.subtitle_font_size, 24.0);
                assert_eq!(title.color, "black");
            }
            other => panic!("unexpected layer {other:?}"),
        }
        match &story.layers()[1] {
            NarrativeLayer::Context(text) => {
                assert_eq!(text.position, Position::Left);
                assert_eq!(text.font_size, 19.0);
            }
            other => panic!("unexpected layer {other:?}"),
        }
        match &story.layers()[2] {
            NarrativeLayer::Source(text) => {
                assert_eq!(text.position, Position::Bottom);
                assert_eq!(text.color, "gray");
                assert!(!text.vertical);
            }
            other => panic!("unexpected layer {other:?}"),
        }
    }

    #[test]
    fn failed_calls_leave_story_unchanged() {
        let mut story = story();
        story.add_context("kept", TextOptions::default());

        assert_eq!(
            story
                .add_next_steps(steps("line_steps", &["1", "2", "3", "4", "5", "6"]))
                .err(),
            Some(ValidationError::TooManySteps(6))
        );
        assert_eq!(
            story.add_next_steps(steps("stairSteps", &[])).err(),
            Some(ValidationError::NoSteps)
        );
        assert!(matches!(
            story.add_next_steps(steps("wizard", &["a"])),
            Err(ValidationError::InvalidMode(_))
        ));
        assert!(matches!(
            story.add_next_steps(NextStepRequest::default()),
            Err(ValidationError::MissingText(_))
        ));
        let button = NextStepRequest {
            mode: Some("button".to_string()),
            text: Some("Go".to_string()),
            ..Default::default()
        };
        assert_eq!(
            story.add_next_steps(button).err(),
            Some(ValidationError::MissingUrl)
        );
        let bad_arrow = AnnotationOptions {
            arrow_direction: Some("up-down-left".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            story.add_annotation(1, 1, bad_arrow),
            Err(ValidationError::InvalidArrowDirection { .. })
        ));
        let bad_line = LineOptions {
            orientation: Some("diagonal".to_string()),
            ..Default::default()
        };
        assert!(story.add_line(3, bad_line).is_err());

        assert_eq!(story.layers().len(), 1);
    }

    #[test]
    fn plain_call_to_action_is_an_overlay() {
        let mut story = story();
        story
            .add_next_steps(NextStepRequest {
                text: Some("Subscribe".to_string()),
                ..Default::default()
            })
            .unwrap();
        match &story.layers()[0] {
            NarrativeLayer::CallToAction(text) => {
                assert_eq!(text.color, "blue");
                assert_eq!(text.font_size, 20.0);
                assert_eq!(text.position, Position::Bottom);
            }
            other => panic!("unexpected layer {other:?}"),
        }
        assert_eq!(story.layout_plan().overlays, vec![0]);
    }

    #[test]
    fn line_steps_panel_uses_overrides_and_default_title() {
        let mut story = story();
        let request = NextStepRequest {
            overrides: NextStepOverrides {
                rect_width: Some(10.0),
                rect_height: Some(10.0),
                space: Some(5.0),
                ..Default::default()
            },
            ..steps("lineSteps", &["A", "B", "C"])
        };
        story.add_next_steps(request).unwrap();

        let NarrativeLayer::StepPanel(panel) = &story.layers()[0] else {
            panic!("expected a step panel");
        };
        assert_eq!(panel.kind, StepKind::LineSteps);
        assert_eq!(panel.position, Position::Bottom);
        let json = panel.chart.to_json().unwrap();
        assert_eq!(json["title"]["text"], json!(["What can we do next?"]));
        let xs: Vec<f64> = json["layer"][0]["data"]["values"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["x"].as_f64().unwrap())
            .collect();
        assert_eq!(xs, vec![0.0, 15.0, 30.0]);
        assert_eq!(
            json["layer"][1]["data"]["values"].as_array().unwrap().len(),
            2
        );
    }

    #[test]
    fn annotation_on_untyped_chart_defaults_to_quantitative() {
        let mut story = story();
        story
            .add_annotation(
                5,
                5,
                AnnotationOptions {
                    text: Some("Here".to_string()),
                    arrow_direction: Some("left".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let NarrativeLayer::Annotation(chart) = &story.layers()[0] else {
            panic!("expected an annotation");
        };
        let json = chart.to_json().unwrap();
        assert_eq!(json["layer"][1]["mark"]["text"], "←");
        assert_eq!(json["layer"][1]["mark"]["dy"], json!(-45.0));
        assert_eq!(json["layer"][2]["mark"]["dx"], json!(37.0));
        assert_eq!(json["layer"][2]["encoding"]["y"]["type"], "quantitative");
    }

    #[test]
    fn annotation_follows_base_chart_axis_types() {
        let mut story = story();
        story.chart_mut().encoding = Encoding {
            x: Some(Channel::field("month:O")),
            y: Some(Channel::field("sales:Q")),
            ..Default::default()
        };
        story
            .add_annotation("Mar", 120, AnnotationOptions::default())
            .unwrap()
            .add_line(100, LineOptions::default())
            .unwrap();
        let rendered = story.render().to_json().unwrap();
        assert_eq!(rendered["layer"][1]["layer"][0]["encoding"]["x"]["type"], "ordinal");
        assert_eq!(rendered["layer"][1]["layer"][2]["mark"]["text"], "Point of interest");
        assert_eq!(rendered["layer"][2]["mark"]["type"], "rule");
    }

    #[test]
    fn render_is_repeatable_and_read_only() {
        let mut story = story();
        story
            .add_title("T", TitleOptions::default())
            .add_next_steps(steps("stair_steps", &["a", "b"]))
            .unwrap()
            .configure_view(Map::from_iter([("stroke".to_string(), Value::Null)]));
        let first = story.render();
        let second = story.render();
        assert_eq!(first, second);
        assert_eq!(story.layers().len(), 2);
        assert!(first.props().config.is_some());
    }

    #[test]
    fn empty_title_suppresses_diagram_heading() {
        let mut story = story();
        let request = NextStepRequest {
            mode: Some("button".to_string()),
            text: Some("Go".to_string()),
            url: Some("http://x".to_string()),
            title: Some(String::new()),
            position: Some(Position::Right),
            ..Default::default()
        };
        story.add_next_steps(request).unwrap();
        let NarrativeLayer::StepPanel(panel) = &story.layers()[0] else {
            panic!("expected a step panel");
        };
        assert!(panel.chart.props().title.is_none());
        assert_eq!(story.layout_plan().right, vec![0]);
    }

    #[test]
    fn next_step_request_deserializes_both_spellings() {
        let request: NextStepRequest = serde_json::from_value(json!({
            "type": "line_steps",
            "texts": ["a", "b"],
            "position": "top",
            "rectWidth": 20,
        }))
        .unwrap();
        assert_eq!(request.mode.as_deref(), Some("line_steps"));
        assert_eq!(request.labels.map(|l| l.len()), Some(2));
        assert_eq!(request.position, Some(Position::Top));
        assert_eq!(request.overrides.rect_width, Some(20.0));
    }
}
