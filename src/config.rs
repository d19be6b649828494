use crate::ir::StepKind;
use crate::theme::Theme;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_STEP_COLOR: &str = "#80C11E";
pub const DEFAULT_NEXT_STEP_TITLE: &str = "What can we do next?";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonDefaults {
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub opacity: f64,
    pub corner_radius: f64,
    pub text_color: String,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    /// Panel size; follows the button size when unset.
    pub chart_width: Option<f64>,
    pub chart_height: Option<f64>,
}

impl Default for ButtonDefaults {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 40.0,
            color: DEFAULT_STEP_COLOR.to_string(),
            opacity: 0.2,
            corner_radius: 5.0,
            text_color: "black".to_string(),
            font_family: None,
            font_size: None,
            chart_width: None,
            chart_height: None,
        }
    }
}

/// Defaults shared by the two label-driven diagrams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepsDefaults {
    pub rect_width: f64,
    pub rect_height: f64,
    pub space: f64,
    pub chart_width: f64,
    pub chart_height: f64,
    pub color: String,
    pub opacity: f64,
    pub text_color: String,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
}

impl StepsDefaults {
    pub fn line_steps() -> Self {
        Self {
            rect_width: 10.0,
            rect_height: 10.0,
            space: 5.0,
            chart_width: 700.0,
            chart_height: 100.0,
            color: DEFAULT_STEP_COLOR.to_string(),
            opacity: 0.2,
            text_color: "black".to_string(),
            font_family: None,
            font_size: None,
        }
    }

    pub fn stair_steps() -> Self {
        Self {
            rect_width: 10.0,
            rect_height: 3.0,
            space: 0.0,
            chart_width: 700.0,
            chart_height: 300.0,
            ..Self::line_steps()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextStepDefaults {
    pub title: String,
    pub title_color: String,
    pub title_font_family: Option<String>,
    pub title_font_size: Option<f64>,
    pub font_family: String,
    pub font_size: f64,
    pub button: ButtonDefaults,
    pub line_steps: StepsDefaults,
    pub stair_steps: StepsDefaults,
}

impl Default for NextStepDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_NEXT_STEP_TITLE.to_string(),
            title_color: "black".to_string(),
            title_font_family: None,
            title_font_size: None,
            font_family: "Arial".to_string(),
            font_size: 14.0,
            button: ButtonDefaults::default(),
            line_steps: StepsDefaults::line_steps(),
            stair_steps: StepsDefaults::stair_steps(),
        }
    }
}

/// Per-call style and geometry overrides for a step diagram.
///
/// For buttons `rect_width`/`rect_height` are the button size; `space` only affects
/// line steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NextStepOverrides {
    pub rect_width: Option<f64>,
    pub rect_height: Option<f64>,
    pub space: Option<f64>,
    pub chart_width: Option<f64>,
    pub chart_height: Option<f64>,
    pub corner_radius: Option<f64>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub text_color: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub title_color: Option<String>,
    pub title_font_family: Option<String>,
    pub title_font_size: Option<f64>,
}

/// Fully resolved style and geometry for one step diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct StepStyle {
    pub rect_width: f64,
    pub rect_height: f64,
    pub space: f64,
    pub chart_width: f64,
    pub chart_height: f64,
    pub corner_radius: f64,
    pub color: String,
    pub opacity: f64,
    pub text_color: String,
    pub font_family: String,
    pub font_size: f64,
    pub title_color: String,
    pub title_font_family: String,
    pub title_font_size: f64,
}

/// Merges overrides onto defaults.
///
/// Precedence per field: explicit override, then the kind-specific default, then the general
/// next-step fallback, then the global default.
pub fn resolve_step_style(
    kind: StepKind,
    defaults: &NextStepDefaults,
    overrides: &NextStepOverrides,
) -> StepStyle {
    let base = match kind {
        StepKind::Button => KindDefaults::button(&defaults.button),
        StepKind::LineSteps => KindDefaults::steps(&defaults.line_steps),
        StepKind::StairSteps => KindDefaults::steps(&defaults.stair_steps),
    };
    let KindDefaults {
        rect_width,
        rect_height,
        space,
        chart_width,
        chart_height,
        corner_radius,
        color,
        opacity,
        text_color,
        font_family: kind_font_family,
        font_size: kind_font_size,
    } = base;

    let rect_width = overrides.rect_width.unwrap_or(rect_width);
    let rect_height = overrides.rect_height.unwrap_or(rect_height);
    // A resized button keeps its chart the same size as the button.
    let (chart_width, chart_height) = if kind == StepKind::Button {
        (
            overrides
                .chart_width
                .or(defaults.button.chart_width)
                .unwrap_or(rect_width),
            overrides
                .chart_height
                .or(defaults.button.chart_height)
                .unwrap_or(rect_height),
        )
    } else {
        (
            overrides.chart_width.unwrap_or(chart_width),
            overrides.chart_height.unwrap_or(chart_height),
        )
    };

    let font_family = overrides
        .font_family
        .clone()
        .or_else(|| kind_font_family.cloned())
        .unwrap_or_else(|| defaults.font_family.clone());
    let font_size = overrides
        .font_size
        .or(kind_font_size)
        .unwrap_or(defaults.font_size);

    StepStyle {
        rect_width,
        rect_height,
        space: overrides.space.unwrap_or(space),
        chart_width,
        chart_height,
        corner_radius: overrides.corner_radius.unwrap_or(corner_radius),
        color: overrides.color.clone().unwrap_or_else(|| color.clone()),
        opacity: overrides.opacity.unwrap_or(opacity),
        text_color: overrides
            .text_color
            .clone()
            .unwrap_or_else(|| text_color.clone()),
        title_color: overrides
            .title_color
            .clone()
            .unwrap_or_else(|| defaults.title_color.clone()),
        title_font_family: overrides
            .title_font_family
            .clone()
            .or_else(|| defaults.title_font_family.clone())
            .unwrap_or_else(|| font_family.clone()),
        title_font_size: overrides
            .title_font_size
            .or(defaults.title_font_size)
            .unwrap_or(font_size * 1.4),
        font_family,
        font_size,
    }
}

struct KindDefaults<'a> {
    rect_width: f64,
    rect_height: f64,
    space: f64,
    chart_width: f64,
    chart_height: f64,
    corner_radius: f64,
    color: &'a String,
    opacity: f64,
    text_color: &'a String,
    font_family: Option<&'a String>,
    font_size: Option<f64>,
}

impl<'a> KindDefaults<'a> {
    fn button(b: &'a ButtonDefaults) -> Self {
        Self {
            rect_width: b.width,
            rect_height: b.height,
            space: 0.0,
            chart_width: b.width,
            chart_height: b.height,
            corner_radius: b.corner_radius,
            color: &b.color,
            opacity: b.opacity,
            text_color: &b.text_color,
            font_family: b.font_family.as_ref(),
            font_size: b.font_size,
        }
    }

    fn steps(s: &'a StepsDefaults) -> Self {
        Self {
            rect_width: s.rect_width,
            rect_height: s.rect_height,
            space: s.space,
            chart_width: s.chart_width,
            chart_height: s.chart_height,
            corner_radius: 0.0,
            color: &s.color,
            opacity: s.opacity,
            text_color: &s.text_color,
            font_family: s.font_family.as_ref(),
            font_size: s.font_size,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub next_steps: NextStepDefaults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    next_steps: Option<NextStepsFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font: Option<String>,
    base_font_size: Option<f64>,
    title_size: Option<f64>,
    subtitle_size: Option<f64>,
    context_size: Option<f64>,
    cta_size: Option<f64>,
    source_size: Option<f64>,
    title_color: Option<String>,
    subtitle_color: Option<String>,
    context_color: Option<String>,
    cta_color: Option<String>,
    source_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextStepsFile {
    title: Option<String>,
    title_color: Option<String>,
    title_font_family: Option<String>,
    title_font_size: Option<f64>,
    font_family: Option<String>,
    font_size: Option<f64>,
    button: Option<NextStepOverrides>,
    line_steps: Option<NextStepOverrides>,
    stair_steps: Option<NextStepOverrides>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        debug!("No configuration file given, using default configuration");
        return Ok(config);
    };

    info!(path = path.display().to_string(); "Loading configuration");
    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(&contents)?,
    };
    apply_config_file(&mut config, parsed);
    Ok(config)
}

/// Merges an inline configuration object, shaped like a config file, over `config`.
pub fn merge_config_value(config: &mut Config, value: serde_json::Value) -> anyhow::Result<()> {
    let parsed: ConfigFile = serde_json::from_value(value)?;
    apply_config_file(config, parsed);
    Ok(())
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font {
            theme.font = v;
        }
        if let Some(v) = vars.base_font_size {
            theme.base_font_size = v;
        }
        if let Some(v) = vars.title_size {
            theme.font_sizes.title = v;
        }
        if let Some(v) = vars.subtitle_size {
            theme.font_sizes.subtitle = v;
        }
        if let Some(v) = vars.context_size {
            theme.font_sizes.context = v;
        }
        if let Some(v) = vars.cta_size {
            theme.font_sizes.cta = v;
        }
        if let Some(v) = vars.source_size {
            theme.font_sizes.source = v;
        }
        if let Some(v) = vars.title_color {
            theme.colors.title = v;
        }
        if let Some(v) = vars.subtitle_color {
            theme.colors.subtitle = v;
        }
        if let Some(v) = vars.context_color {
            theme.colors.context = v;
        }
        if let Some(v) = vars.cta_color {
            theme.colors.cta = v;
        }
        if let Some(v) = vars.source_color {
            theme.colors.source = v;
        }
    }

    if let Some(steps) = parsed.next_steps {
        let defaults = &mut config.next_steps;
        if let Some(v) = steps.title {
            defaults.title = v;
        }
        if let Some(v) = steps.title_color {
            defaults.title_color = v;
        }
        if steps.title_font_family.is_some() {
            defaults.title_font_family = steps.title_font_family;
        }
        if steps.title_font_size.is_some() {
            defaults.title_font_size = steps.title_font_size;
        }
        if let Some(v) = steps.font_family {
            defaults.font_family = v;
        }
        if let Some(v) = steps.font_size {
            defaults.font_size = v;
        }
        if let Some(o) = steps.button {
            apply_button_overrides(&mut defaults.button, o);
        }
        if let Some(o) = steps.line_steps {
            apply_steps_overrides("lineSteps", &mut defaults.line_steps, o);
        }
        if let Some(o) = steps.stair_steps {
            apply_steps_overrides("stairSteps", &mut defaults.stair_steps, o);
        }
    }
}

/// Per-kind blocks share the override shape; fields a kind has no use for are reported.
fn skip_unused(kind: &str, fields: &[(&str, bool)]) {
    for (field, set) in fields {
        if *set {
            debug!(
                kind = kind,
                field = *field;
                "Ignoring next-step default with no effect for this kind"
            );
        }
    }
}

fn skip_title_fields(kind: &str, o: &NextStepOverrides) {
    skip_unused(
        kind,
        &[
            ("titleColor", o.title_color.is_some()),
            ("titleFontFamily", o.title_font_family.is_some()),
            ("titleFontSize", o.title_font_size.is_some()),
        ],
    );
}

fn apply_button_overrides(button: &mut ButtonDefaults, o: NextStepOverrides) {
    skip_unused("button", &[("space", o.space.is_some())]);
    skip_title_fields("button", &o);
    if o.chart_width.is_some() {
        button.chart_width = o.chart_width;
    }
    if o.chart_height.is_some() {
        button.chart_height = o.chart_height;
    }
    if let Some(v) = o.rect_width {
        button.width = v;
    }
    if let Some(v) = o.rect_height {
        button.height = v;
    }
    if let Some(v) = o.corner_radius {
        button.corner_radius = v;
    }
    if let Some(v) = o.color {
        button.color = v;
    }
    if let Some(v) = o.opacity {
        button.opacity = v;
    }
    if let Some(v) = o.text_color {
        button.text_color = v;
    }
    if o.font_family.is_some() {
        button.font_family = o.font_family;
    }
    if o.font_size.is_some() {
        button.font_size = o.font_size;
    }
}

fn apply_steps_overrides(kind: &str, steps: &mut StepsDefaults, o: NextStepOverrides) {
    skip_unused(kind, &[("cornerRadius", o.corner_radius.is_some())]);
    skip_title_fields(kind, &o);
    if let Some(v) = o.rect_width {
        steps.rect_width = v;
    }
    if let Some(v) = o.rect_height {
        steps.rect_height = v;
    }
    if let Some(v) = o.space {
        steps.space = v;
    }
    if let Some(v) = o.chart_width {
        steps.chart_width = v;
    }
    if let Some(v) = o.chart_height {
        steps.chart_height = v;
    }
    if let Some(v) = o.color {
        steps.color = v;
    }
    if let Some(v) = o.opacity {
        steps.opacity = v;
    }
    if let Some(v) = o.text_color {
        steps.text_color = v;
    }
    if o.font_family.is_some() {
        steps.font_family = o.font_family;
    }
    if o.font_size.is_some() {
        steps.font_size = o.font_size;
    }
}
