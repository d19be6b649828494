use crate::chart::Chart;
use crate::ir::NarrativeLayer;
use crate::story::Story;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f64,
    pub height: f64,
    pub font: String,
    pub overlays: Vec<LayerDump>,
    pub left: Vec<LayerDump>,
    pub right: Vec<LayerDump>,
    pub top: Vec<LayerDump>,
    pub bottom: Vec<LayerDump>,
    pub unplaced: Vec<LayerDump>,
    pub view_config: bool,
}

#[derive(Debug, Serialize)]
pub struct LayerDump {
    pub index: usize,
    pub kind: String,
    pub position: Option<String>,
    pub text: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl LayerDump {
    fn from_layer(index: usize, layer: &NarrativeLayer) -> Self {
        let (position, text, size) = match layer {
            NarrativeLayer::Title(title) => (None, Some(title.text.clone()), None),
            NarrativeLayer::Context(text)
            | NarrativeLayer::Source(text)
            | NarrativeLayer::CallToAction(text) => (
                Some(text.position.to_string()),
                Some(text.text.clone()),
                None,
            ),
            NarrativeLayer::StepPanel(panel) => (
                Some(panel.position.to_string()),
                None,
                Some(declared_size(&panel.chart)),
            ),
            NarrativeLayer::Annotation(_) | NarrativeLayer::ReferenceLine(_) => (None, None, None),
        };
        let (width, height) = size.unwrap_or((None, None));
        LayerDump {
            index,
            kind: layer.kind_name().to_string(),
            position,
            text,
            width,
            height,
        }
    }
}

/// The first width/height found walking down from the chart root.
fn declared_size(chart: &Chart) -> (Option<f64>, Option<f64>) {
    let props = chart.props();
    if props.width.is_some() || props.height.is_some() {
        return (props.width, props.height);
    }
    chart
        .children()
        .iter()
        .map(declared_size)
        .find(|(width, height)| width.is_some() || height.is_some())
        .unwrap_or((None, None))
}

impl LayoutDump {
    pub fn from_story(story: &Story) -> Self {
        let layers = story.layers();
        let plan = story.layout_plan();
        let dump = |indices: &[usize]| -> Vec<LayerDump> {
            indices
                .iter()
                .filter_map(|&idx| layers.get(idx).map(|layer| LayerDump::from_layer(idx, layer)))
                .collect()
        };

        LayoutDump {
            width: story.chart().width(),
            height: story.chart().height(),
            font: story.theme().font.clone(),
            overlays: dump(&plan.overlays),
            left: dump(&plan.left),
            right: dump(&plan.right),
            top: dump(&plan.top),
            bottom: dump(&plan.bottom),
            unplaced: dump(&plan.unplaced),
            view_config: story.view_config().is_some(),
        }
    }
}

pub fn write_layout_dump<W: Write>(writer: W, story: &Story) -> anyhow::Result<()> {
    let dump = LayoutDump::from_story(story);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{NextStepRequest, TextOptions};

    #[test]
    fn dump_lists_layers_per_bucket() {
        let mut story = Story::default();
        story
            .add_context("context", TextOptions::default())
            .add_next_steps(NextStepRequest {
                mode: Some("line_steps".to_string()),
                labels: Some(vec!["a".to_string()]),
                position: Some("top".into()),
                ..Default::default()
            })
            .unwrap();

        let dump = LayoutDump::from_story(&story);
        assert_eq!(dump.overlays.len(), 1);
        assert_eq!(dump.overlays[0].position.as_deref(), Some("left"));
        assert_eq!(dump.top.len(), 1);
        assert_eq!(dump.top[0].kind, "line_steps");
        assert_eq!(dump.top[0].width, Some(700.0));
        assert_eq!(dump.top[0].height, Some(100.0));

        let mut out = Vec::new();
        write_layout_dump(&mut out, &story).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["width"], serde_json::json!(600.0));
        assert_eq!(value["bottom"], serde_json::json!([]));
    }
}
