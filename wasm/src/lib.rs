use narrative_chart::{RenderOptions, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoryRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    base_font_size: Option<f64>,
    pretty: Option<bool>,
}

fn build_render_options(options: StoryRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.config.theme.font = font_family;
    }
    if let Some(size) = options.base_font_size {
        render_options.config.theme.base_font_size = size;
    }
    render_options.pretty = options.pretty.unwrap_or(false);

    render_options
}

#[wasm_bindgen]
pub fn render_story_spec(document: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<StoryRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        StoryRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(document, render_options)
        .map_err(|error| JsValue::from_str(&format!("{error:#}")))
}
