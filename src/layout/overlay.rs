use super::position::resolve_position;
use super::types::{Dims, Offset};
use crate::chart::{Channel, Chart, Data, Encoding, Mark, UnitChart};
use crate::ir::{TextLayer, TitleLayer};

const TITLE_Y: f64 = 20.0;
const SUBTITLE_Y: f64 = 50.0;
const VERTICAL_ANGLE: f64 = 270.0;

fn anchored_text(mark: Mark, x: f64, y: f64) -> Chart {
    UnitChart::new(Some(Data::single()))
        .with_mark(mark)
        .with_encoding(Encoding {
            x: Some(Channel::value(x)),
            y: Some(Channel::value(y)),
            ..Default::default()
        })
        .into()
}

/// Bold centred title, plus the subtitle below it when one is set.
pub fn title_overlay(layer: &TitleLayer, font: &str, dims: Dims) -> Chart {
    let center = dims.width / 2.0;
    let title = anchored_text(
        Mark::text()
            .with_text(layer.text.clone())
            .with_font_size(layer.font_size)
            .with_font_weight("bold")
            .with_align("center")
            .with_font(font)
            .with_color(layer.color.clone()),
        center + layer.dx,
        TITLE_Y + layer.dy,
    );

    match layer.subtitle.as_deref() {
        Some(subtitle) if !subtitle.is_empty() => {
            let subtitle = anchored_text(
                Mark::text()
                    .with_text(subtitle)
                    .with_font_size(layer.subtitle_font_size)
                    .with_align("center")
                    .with_font(font)
                    .with_color(layer.subtitle_color.clone()),
                center + layer.subtitle_dx,
                SUBTITLE_Y + layer.subtitle_dy,
            );
            title + subtitle
        }
        _ => title,
    }
}

/// Context, source or call-to-action text at its resolved position.
pub fn text_overlay(layer: &TextLayer, font: &str, dims: Dims) -> Chart {
    let (x, y) = resolve_position(&layer.position, dims, Offset::new(layer.dx, layer.dy));
    let mut mark = Mark::text()
        .with_text(layer.text.clone())
        .with_font_size(layer.font_size)
        .with_align("center")
        .with_baseline("middle")
        .with_font(font)
        .with_color(layer.color.clone());
    if layer.vertical {
        mark = mark.with_angle(VERTICAL_ANGLE);
    }
    anchored_text(mark, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Position;
    use serde_json::json;

    fn title(subtitle: Option<&str>) -> TitleLayer {
        TitleLayer {
            text: "Sales".to_string(),
            subtitle: subtitle.map(str::to_string),
            color: "black".to_string(),
            subtitle_color: "gray".to_string(),
            font_size: 32.0,
            subtitle_font_size: 24.0,
            dx: 0.0,
            dy: 0.0,
            subtitle_dx: 5.0,
            subtitle_dy: -2.0,
        }
    }

    #[test]
    fn title_without_subtitle_is_a_single_mark() {
        let json = title_overlay(&title(None), "Arial", Dims::new(600.0, 400.0))
            .to_json()
            .unwrap();
        assert_eq!(json["mark"]["fontWeight"], "bold");
        assert_eq!(json["mark"]["fontSize"], json!(32.0));
        assert_eq!(json["encoding"]["x"]["value"], json!(300.0));
        assert_eq!(json["encoding"]["y"]["value"], json!(20.0));
        assert_eq!(json["data"]["values"], json!([{}]));
    }

    #[test]
    fn subtitle_is_layered_under_its_own_offsets() {
        let chart = title_overlay(&title(Some("2024")), "Arial", Dims::new(600.0, 400.0));
        let json = chart.to_json().unwrap();
        assert_eq!(json["layer"][1]["mark"]["text"], "2024");
        assert_eq!(json["layer"][1]["encoding"]["x"]["value"], json!(305.0));
        assert_eq!(json["layer"][1]["encoding"]["y"]["value"], json!(48.0));
        assert!(json["layer"][1]["mark"].get("fontWeight").is_none());
    }

    #[test]
    fn vertical_source_is_rotated_but_not_moved() {
        let layer = TextLayer {
            text: "Data: survey".to_string(),
            position: Position::Bottom,
            vertical: true,
            color: "gray".to_string(),
            dx: 0.0,
            dy: 0.0,
            font_size: 16.0,
        };
        let json = text_overlay(&layer, "Arial", Dims::new(600.0, 400.0))
            .to_json()
            .unwrap();
        assert_eq!(json["mark"]["angle"], json!(270.0));
        assert_eq!(json["mark"]["baseline"], "middle");
        assert_eq!(json["encoding"]["x"]["value"], json!(300.0));
        assert_eq!(json["encoding"]["y"]["value"], json!(440.0));
    }
}
