//! Story documents: a JSON5 description of the base chart plus an ordered list of
//! narrative layer operations.
//!
//! ```json5
//! {
//!   chart: {
//!     width: 600, height: 400,
//!     data: { values: [{ month: "Jan", sales: 10 }] },
//!     mark: "bar",
//!     encoding: { x: "month:O", y: "sales:Q" },
//!   },
//!   view: { stroke: null },
//!   layers: [
//!     { kind: "title", text: "Sales", subtitle: "2024" },
//!     { kind: "nextSteps", mode: "line_steps", labels: ["Plan", "Act"], position: "top" },
//!   ],
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::chart::{Channel, Chart, Data, Encoding, Mark, MarkKind};
use crate::config::{Config, merge_config_value};
use crate::next_step::NextStep;
use crate::story::{
    AnnotationOptions, DEFAULT_HEIGHT, DEFAULT_WIDTH, LineOptions, NextStepRequest, Story,
    TextOptions, TitleOptions,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDocument {
    /// Inline configuration merged over the caller's configuration.
    #[serde(default)]
    pub config: Option<Value>,
    #[serde(default)]
    pub chart: ChartDoc,
    #[serde(default)]
    pub view: Option<Map<String, Value>>,
    #[serde(default)]
    pub layers: Vec<LayerOp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartDoc {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub data: Option<Data>,
    pub mark: Option<MarkDoc>,
    pub encoding: EncodingDoc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MarkDoc {
    Kind(String),
    Def {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        opacity: Option<f64>,
        #[serde(default)]
        point: Option<bool>,
    },
}

/// Channel shorthands such as `"sales:Q"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingDoc {
    pub x: Option<String>,
    pub y: Option<String>,
    pub x2: Option<String>,
    pub y2: Option<String>,
    pub color: Option<String>,
    pub text: Option<String>,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayerOp {
    Title {
        text: String,
        #[serde(flatten)]
        options: TitleOptions,
    },
    Context {
        text: String,
        #[serde(flatten)]
        options: TextOptions,
    },
    Source {
        text: String,
        #[serde(flatten)]
        options: TextOptions,
    },
    NextSteps(NextStepRequest),
    /// A [`NextStep`] bundle under `step`.
    NextStep { step: NextStep },
    Annotation {
        x: Value,
        y: Value,
        #[serde(flatten)]
        options: AnnotationOptions,
    },
    Line {
        value: Value,
        #[serde(flatten)]
        options: LineOptions,
    },
}

impl LayerOp {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LayerOp::Title { .. } => "title",
            LayerOp::Context { .. } => "context",
            LayerOp::Source { .. } => "source",
            LayerOp::NextSteps(_) => "nextSteps",
            LayerOp::NextStep { .. } => "nextStep",
            LayerOp::Annotation { .. } => "annotation",
            LayerOp::Line { .. } => "line",
        }
    }
}

pub fn parse_document(input: &str) -> Result<StoryDocument> {
    let value: Value = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(_) => json5::from_str(input).context("story document is neither JSON nor JSON5")?,
    };
    let document = serde_json::from_value(value)?;
    Ok(document)
}

fn build_mark(doc: &MarkDoc) -> Result<Mark> {
    let (kind, color, opacity, point) = match doc {
        MarkDoc::Kind(kind) => (kind, None, None, None),
        MarkDoc::Def {
            kind,
            color,
            opacity,
            point,
        } => (kind, color.as_ref(), *opacity, *point),
    };
    let kind: MarkKind = kind.parse().map_err(|err: String| anyhow!(err))?;
    let mut mark = Mark::new(kind);
    if let Some(color) = color {
        mark = mark.with_color(color.clone());
    }
    if let Some(opacity) = opacity {
        mark = mark.with_opacity(opacity);
    }
    if point == Some(true) {
        mark = mark.with_points();
    }
    Ok(mark)
}

fn build_encoding(doc: &EncodingDoc) -> Encoding {
    let channel = |shorthand: &Option<String>| shorthand.as_deref().map(Channel::field);
    Encoding {
        x: channel(&doc.x),
        y: channel(&doc.y),
        x2: channel(&doc.x2),
        y2: channel(&doc.y2),
        text: channel(&doc.text),
        href: channel(&doc.href),
        color: channel(&doc.color),
    }
}

fn apply_layer(story: &mut Story, op: LayerOp) -> Result<()> {
    match op {
        LayerOp::Title { text, options } => {
            story.add_title(text, options);
        }
        LayerOp::Context { text, options } => {
            story.add_context(text, options);
        }
        LayerOp::Source { text, options } => {
            story.add_source(text, options);
        }
        LayerOp::NextSteps(request) => {
            story.add_next_steps(request)?;
        }
        LayerOp::NextStep { step } => {
            story.add_next_steps(step.into_request())?;
        }
        LayerOp::Annotation { x, y, options } => {
            story.add_annotation(x, y, options)?;
        }
        LayerOp::Line { value, options } => {
            story.add_line(value, options)?;
        }
    }
    Ok(())
}

/// Builds a story from a parsed document. Layer operations run in document order and the
/// first rejected one aborts the build.
pub fn build_story(document: StoryDocument, config: &Config) -> Result<Story> {
    let mut config = config.clone();
    if let Some(inline) = document.config {
        merge_config_value(&mut config, inline).context("invalid inline config")?;
    }

    let chart = &document.chart;
    let mut story = Story::from_config(
        chart.data.clone(),
        chart.width.unwrap_or(DEFAULT_WIDTH),
        chart.height.unwrap_or(DEFAULT_HEIGHT),
        &config,
    );
    if let Some(mark) = &chart.mark {
        story.chart_mut().mark = Some(build_mark(mark)?);
    }
    story.chart_mut().encoding = build_encoding(&chart.encoding);

    for (idx, op) in document.layers.into_iter().enumerate() {
        let kind = op.kind_name();
        apply_layer(&mut story, op).with_context(|| format!("layer {idx} ({kind})"))?;
    }
    if let Some(view) = document.view {
        story.configure_view(view);
    }
    debug!(layers = story.layers().len(); "Built story from document");
    Ok(story)
}

pub fn parse_story(input: &str, config: &Config) -> Result<Story> {
    build_story(parse_document(input)?, config)
}

/// Parses a story document and returns its composed chart.
pub fn render_document(input: &str, config: &Config) -> Result<Chart> {
    Ok(parse_story(input, config)?.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::FieldType;
    use crate::error::ValidationError;
    use crate::ir::{NarrativeLayer, Position, StepKind};

    #[test]
    fn parses_base_chart_and_layers() {
        let input = r#"{
            // comments and trailing commas are fine
            chart: {
                width: 500,
                height: 300,
                data: { values: [{ month: "Jan", sales: 10 }, { month: "Feb", sales: 14 }] },
                mark: { type: "line", point: true },
                encoding: { x: "month:O", y: "sales:Q" },
            },
            layers: [
                { kind: "title", text: "Sales", subtitle: "2024" },
                { kind: "context", text: "Growing", position: "right", vertical: true },
                { kind: "nextSteps", type: "stair_steps", texts: ["a", "b"], position: "left" },
                { kind: "annotation", x: "Feb", y: 14, text: "Peak", arrowDirection: "down" },
                { kind: "line", value: 12, strokeDash: [4, 4] },
            ],
        }"#;
        let story = parse_story(input, &Config::default()).unwrap();
        assert_eq!(story.chart().width(), 500.0);
        assert_eq!(
            story.chart().encoding.x.as_ref().and_then(Channel::field_type),
            Some(FieldType::Ordinal)
        );
        assert_eq!(story.layers().len(), 5);
        match &story.layers()[1] {
            NarrativeLayer::Context(text) => {
                assert_eq!(text.position, Position::Right);
                assert!(text.vertical);
            }
            other => panic!("unexpected layer {other:?}"),
        }
        match &story.layers()[2] {
            NarrativeLayer::StepPanel(panel) => assert_eq!(panel.kind, StepKind::StairSteps),
            other => panic!("unexpected layer {other:?}"),
        }
        assert_eq!(story.layout_plan().left, vec![2]);
    }

    #[test]
    fn rejected_layer_reports_its_index() {
        let input = r#"{ layers: [
            { kind: "source", text: "ok" },
            { kind: "annotation", x: 1, y: 2, arrowDirection: "sideways" },
        ] }"#;
        let err = parse_story(input, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("layer 1 (annotation)"));
        let cause = err.downcast_ref::<ValidationError>();
        assert!(matches!(
            cause,
            Some(ValidationError::InvalidArrowDirection { .. })
        ));
    }

    #[test]
    fn inline_config_overrides_caller_config() {
        let input = r#"{
            config: { themeVariables: { baseFontSize: 10 } },
            layers: [{ kind: "title", text: "T" }],
        }"#;
        let story = parse_story(input, &Config::default()).unwrap();
        match &story.layers()[0] {
            NarrativeLayer::Title(title) => assert_eq!(title.font_size, 20.0),
            other => panic!("unexpected layer {other:?}"),
        }
    }

    #[test]
    fn next_step_bundle_layer() {
        let input = r#"{ layers: [
            { kind: "nextStep", step: { type: "button", text: "Read more", url: "https://example.com" } },
        ] }"#;
        let chart = render_document(input, &Config::default()).unwrap();
        let json = chart.to_json().unwrap();
        assert_eq!(json["vconcat"][1]["hconcat"][0]["layer"][1]["mark"]["align"], "center");
        assert!(json["vconcat"][1]["hconcat"][0].get("title").is_none());
    }

    #[test]
    fn color_styles_the_steps_or_the_plain_text() {
        let input = r##"{ layers: [
            { kind: "nextSteps", mode: "line_steps", labels: ["a", "b"], color: "#ff0000" },
        ] }"##;
        let json = render_document(input, &Config::default())
            .unwrap()
            .to_json()
            .unwrap();
        assert_eq!(json["vconcat"][1]["hconcat"][0]["layer"][0]["mark"]["color"], "#ff0000");

        let input = r#"{ layers: [{ kind: "nextSteps", text: "Act", color: "darkblue" }] }"#;
        let json = render_document(input, &Config::default())
            .unwrap()
            .to_json()
            .unwrap();
        assert_eq!(json["layer"][1]["mark"]["color"], "darkblue");
    }

    #[test]
    fn unknown_mark_and_channel_are_errors() {
        assert!(parse_story(r#"{ chart: { mark: "donut" } }"#, &Config::default()).is_err());
        assert!(parse_story(r#"{ chart: { encoding: { z: "a:Q" } } }"#, &Config::default()).is_err());
    }

    #[test]
    fn view_overrides_are_applied_at_render() {
        let chart = render_document(r#"{ view: { strokeWidth: 0 } }"#, &Config::default()).unwrap();
        let json = chart.to_json().unwrap();
        assert_eq!(json["config"]["view"]["strokeWidth"].as_f64(), Some(0.0));
    }
}
