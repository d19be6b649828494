use crate::chart::Chart;
use crate::config::Config;
use crate::parser::render_document;
use crate::theme::Theme;
use anyhow::{Result, anyhow};
use serde_json::Value;
use std::io::Write;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub config: Config,
    pub pretty: bool,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        let mut options = Self::default();
        options.config.theme = Theme::modern();
        options
    }
}

/// Serializes a composed chart as a standalone Vega-Lite specification.
pub fn render_spec(chart: &Chart, pretty: bool) -> Result<String> {
    let Value::Object(body) = chart.to_json()? else {
        return Err(anyhow!("composed chart did not serialize to an object"));
    };
    let mut spec = serde_json::Map::with_capacity(body.len() + 1);
    spec.insert("$schema".to_string(), Value::String(VEGA_LITE_SCHEMA.to_string()));
    spec.extend(body);
    let spec = Value::Object(spec);
    let out = if pretty {
        serde_json::to_string_pretty(&spec)?
    } else {
        serde_json::to_string(&spec)?
    };
    Ok(out)
}

/// Parses a story document and renders it to a Vega-Lite JSON string.
pub fn render_with_options(input: &str, options: RenderOptions) -> Result<String> {
    let chart = render_document(input, &options.config)?;
    render_spec(&chart, options.pretty)
}

pub fn write_output<W: Write>(mut writer: W, spec: &str) -> Result<()> {
    writer.write_all(spec.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Mark, UnitChart};

    #[test]
    fn schema_is_attached_to_the_root() {
        let chart: Chart = UnitChart::default().with_mark(Mark::point()).into();
        let out = render_spec(&chart, false).unwrap();
        assert!(out.starts_with(r#"{"$schema":"https://vega.github.io/schema/vega-lite/v5.json""#));
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["mark"]["type"], "point");
    }

    #[test]
    fn pretty_output_is_indented() {
        let chart: Chart = UnitChart::default().into();
        let out = render_spec(&chart, true).unwrap();
        assert!(out.contains("\n  \"$schema\""));
    }

    #[test]
    fn renders_document_end_to_end() {
        let out = render_with_options(
            r#"{ layers: [{ kind: "title", text: "Hello" }] }"#,
            RenderOptions::modern(),
        )
        .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["layer"][1]["mark"]["text"], "Hello");
        assert_eq!(value["layer"][1]["mark"]["fontSize"], serde_json::json!(30.0));
    }

    #[test]
    fn write_output_appends_newline() {
        let mut buf = Vec::new();
        write_output(&mut buf, "{}").unwrap();
        assert_eq!(buf, b"{}\n");
    }
}
