use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use super::overlay::{text_overlay, title_overlay};
use super::types::Dims;
use crate::chart::{Chart, UnitChart};
use crate::ir::{NarrativeLayer, PanelSlot};

/// How the layers of a story are distributed, as indices into the layer list.
///
/// Every index appears at most once. Panels whose position has no slot are listed in
/// `unplaced` and are not drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    pub overlays: Vec<usize>,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
    pub top: Vec<usize>,
    pub bottom: Vec<usize>,
    pub unplaced: Vec<usize>,
}

impl LayoutPlan {
    pub fn slot(&self, slot: PanelSlot) -> &[usize] {
        match slot {
            PanelSlot::Left => &self.left,
            PanelSlot::Right => &self.right,
            PanelSlot::Top => &self.top,
            PanelSlot::Bottom => &self.bottom,
        }
    }

    fn slot_mut(&mut self, slot: PanelSlot) -> &mut Vec<usize> {
        match slot {
            PanelSlot::Left => &mut self.left,
            PanelSlot::Right => &mut self.right,
            PanelSlot::Top => &mut self.top,
            PanelSlot::Bottom => &mut self.bottom,
        }
    }

    pub fn panel_count(&self) -> usize {
        self.left.len() + self.right.len() + self.top.len() + self.bottom.len()
    }
}

/// Partitions layers into overlays and docked panels, keeping insertion order in each bucket.
pub fn plan_layers(layers: &[NarrativeLayer]) -> LayoutPlan {
    let mut plan = LayoutPlan::default();
    for (idx, layer) in layers.iter().enumerate() {
        match layer {
            NarrativeLayer::StepPanel(panel) => match panel.position.slot() {
                Some(slot) => plan.slot_mut(slot).push(idx),
                None => plan.unplaced.push(idx),
            },
            _ => plan.overlays.push(idx),
        }
    }
    plan
}

/// Render-time inputs that live next to the layer list.
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    pub base: &'a UnitChart,
    pub font: &'a str,
    pub view_config: Option<&'a Map<String, Value>>,
}

fn overlay_chart(layer: &NarrativeLayer, font: &str, dims: Dims) -> Chart {
    match layer {
        NarrativeLayer::Title(title) => title_overlay(title, font, dims),
        NarrativeLayer::Context(text)
        | NarrativeLayer::Source(text)
        | NarrativeLayer::CallToAction(text) => text_overlay(text, font, dims),
        NarrativeLayer::Annotation(chart) | NarrativeLayer::ReferenceLine(chart) => chart.clone(),
        NarrativeLayer::StepPanel(panel) => panel.chart.clone(),
    }
}

fn panel_charts(layers: &[NarrativeLayer], indices: &[usize]) -> Vec<Chart> {
    indices
        .iter()
        .filter_map(|&idx| match layers.get(idx) {
            Some(NarrativeLayer::StepPanel(panel)) => Some(panel.chart.clone()),
            _ => None,
        })
        .collect()
}

/// Assembles the final chart. Reads the layers only.
///
/// Overlays are layered onto the base chart in insertion order. Panel slots then wrap the
/// result one at a time, left, right, top and bottom, so earlier slots end up nested
/// deeper. Each concatenation gets independent x and y scales.
pub fn compose(ctx: ComposeContext<'_>, layers: &[NarrativeLayer]) -> Chart {
    let plan = plan_layers(layers);
    debug!(
        overlays = plan.overlays.len(),
        left = plan.left.len(),
        right = plan.right.len(),
        top = plan.top.len(),
        bottom = plan.bottom.len(),
        unplaced = plan.unplaced.len();
        "Composing story layers"
    );

    let dims = Dims::new(ctx.base.width(), ctx.base.height());
    let mut composed: Chart = ctx.base.clone().into();
    for &idx in &plan.overlays {
        if let Some(layer) = layers.get(idx) {
            composed = composed + overlay_chart(layer, ctx.font, dims);
        }
    }

    let left = panel_charts(layers, plan.slot(PanelSlot::Left));
    if !left.is_empty() {
        composed = Chart::hconcat(vec![Chart::vconcat(left), composed]).resolve_independent();
    }
    let right = panel_charts(layers, plan.slot(PanelSlot::Right));
    if !right.is_empty() {
        composed = Chart::hconcat(vec![composed, Chart::vconcat(right)]).resolve_independent();
    }
    let top = panel_charts(layers, plan.slot(PanelSlot::Top));
    if !top.is_empty() {
        composed = Chart::vconcat(vec![Chart::hconcat(top), composed]).resolve_independent();
    }
    let bottom = panel_charts(layers, plan.slot(PanelSlot::Bottom));
    if !bottom.is_empty() {
        composed = Chart::vconcat(vec![composed, Chart::hconcat(bottom)]).resolve_independent();
    }

    match ctx.view_config {
        Some(view) => composed.configure_view(view.clone()),
        None => composed,
    }
}
