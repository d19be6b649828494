use serde_json::{Value, json};

use super::types::{LabelAnchor, Segment, StepGeometry, StepRect, TextAlign};
use crate::chart::{Channel, Chart, Data, Encoding, FieldDef, FieldType, Mark, TitleParams, UnitChart};
use crate::config::StepStyle;
use crate::error::{MAX_STEPS, ValidationError};
use crate::ir::StepKind;

const LABEL_DX: f64 = 10.0;
const LABEL_LINE_HEIGHT: f64 = 18.0;
const CONNECTOR_STROKE_WIDTH: f64 = 2.0;
const TITLE_OFFSET: f64 = 10.0;

/// Everything needed to draw one step diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDiagramSpec {
    pub kind: StepKind,
    /// Step labels for line and stair steps; `None` when none were given at all.
    pub labels: Option<Vec<String>>,
    /// Button caption.
    pub text: Option<String>,
    /// Button click-through target.
    pub url: Option<String>,
    pub style: StepStyle,
    pub title: Option<String>,
}

/// Checks the inputs a diagram of `spec.kind` needs.
pub fn validate_step_diagram(spec: &StepDiagramSpec) -> Result<(), ValidationError> {
    match spec.kind {
        StepKind::Button => {
            if spec.text.as_deref().is_none_or(str::is_empty) {
                return Err(ValidationError::MissingText("the button type"));
            }
            if spec.url.as_deref().is_none_or(str::is_empty) {
                return Err(ValidationError::MissingUrl);
            }
            Ok(())
        }
        StepKind::LineSteps | StepKind::StairSteps => {
            let Some(labels) = spec.labels.as_ref() else {
                return Err(ValidationError::MissingLabels(spec.kind));
            };
            validate_label_count(labels.len())
        }
    }
}

fn validate_label_count(count: usize) -> Result<(), ValidationError> {
    if count > MAX_STEPS {
        return Err(ValidationError::TooManySteps(count));
    }
    if count < 1 {
        return Err(ValidationError::NoSteps);
    }
    Ok(())
}

pub fn step_geometry(spec: &StepDiagramSpec) -> Result<StepGeometry, ValidationError> {
    validate_step_diagram(spec)?;
    let style = &spec.style;
    let labels = spec.labels.as_deref().unwrap_or_default();
    let geometry = match spec.kind {
        StepKind::Button => button_geometry(spec.text.as_deref().unwrap_or_default(), style),
        StepKind::LineSteps => line_steps_geometry(labels, style),
        StepKind::StairSteps => stair_steps_geometry(labels, style),
    };
    Ok(geometry)
}

fn button_geometry(text: &str, style: &StepStyle) -> StepGeometry {
    let rect = StepRect {
        x: 0.0,
        y: 0.0,
        x2: style.rect_width,
        y2: style.rect_height,
    };
    StepGeometry {
        kind: StepKind::Button,
        labels: vec![LabelAnchor {
            text: text.to_string(),
            x: style.rect_width / 2.0,
            y: style.rect_height / 2.0,
            align: TextAlign::Center,
            dx: 0.0,
        }],
        rects: vec![rect],
        segments: Vec::new(),
        y_domain: None,
        width: style.chart_width,
        height: style.chart_height,
    }
}

fn line_steps_geometry(labels: &[String], style: &StepStyle) -> StepGeometry {
    let w = style.rect_width;
    let h = style.rect_height;
    let space = style.space;

    let rects: Vec<StepRect> = (0..labels.len())
        .map(|i| {
            let x = i as f64 * (w + space);
            StepRect {
                x,
                y: 0.0,
                x2: x + w,
                y2: h,
            }
        })
        .collect();

    let segments = (1..labels.len())
        .map(|i| {
            let i = i as f64;
            Segment {
                x: w * i + space * (i - 1.0),
                y: h / 2.0,
                x2: (w + space) * i,
                y2: h / 2.0,
            }
        })
        .collect();

    let labels = labels
        .iter()
        .zip(&rects)
        .map(|(text, rect)| LabelAnchor {
            text: text.clone(),
            x: rect.x,
            y: rect.y2 / 2.0,
            align: TextAlign::Left,
            dx: LABEL_DX,
        })
        .collect();

    StepGeometry {
        kind: StepKind::LineSteps,
        rects,
        segments,
        labels,
        y_domain: None,
        width: style.chart_width,
        height: style.chart_height,
    }
}

fn stair_steps_geometry(labels: &[String], style: &StepStyle) -> StepGeometry {
    let w = style.rect_width;
    let h = style.rect_height;

    let rects: Vec<StepRect> = (0..labels.len())
        .map(|i| {
            let i = i as f64;
            StepRect {
                x: i * w,
                y: i * h,
                x2: (i + 1.0) * w,
                y2: (i + 1.0) * h,
            }
        })
        .collect();

    // Bottom-right corner of each step to the top-left corner of the next.
    let segments = rects
        .windows(2)
        .map(|pair| Segment {
            x: pair[0].x2,
            y: pair[0].y2,
            x2: pair[1].x,
            y2: pair[1].y,
        })
        .collect();

    let labels = labels
        .iter()
        .zip(&rects)
        .map(|(text, rect)| LabelAnchor {
            text: text.clone(),
            x: rect.x,
            y: rect.mid_y(),
            align: TextAlign::Left,
            dx: LABEL_DX,
        })
        .collect();

    StepGeometry {
        kind: StepKind::StairSteps,
        y_domain: Some([0.0, rects.len() as f64 * h]),
        rects,
        segments,
        labels,
        width: style.chart_width,
        height: style.chart_height,
    }
}

/// Validates `spec` and builds its layered chart.
pub fn build_step_chart(spec: &StepDiagramSpec) -> Result<Chart, ValidationError> {
    let geometry = step_geometry(spec)?;
    let style = &spec.style;
    let chart = match spec.kind {
        StepKind::Button => button_chart(spec, &geometry, style),
        StepKind::LineSteps | StepKind::StairSteps => steps_chart(&geometry, style),
    };

    let chart = match spec.title.as_deref() {
        Some(title) if !title.is_empty() => chart.with_title(TitleParams {
            text: vec![title.to_string()],
            font_size: Some(style.title_font_size),
            font: Some(style.title_font_family.clone()),
            color: Some(style.title_color.clone()),
            offset: Some(TITLE_OFFSET),
        }),
        _ => chart,
    };
    Ok(chart)
}

fn hidden_axis(field: &str) -> Channel {
    FieldDef::typed(field, FieldType::Quantitative)
        .without_axis()
        .into()
}

fn button_chart(spec: &StepDiagramSpec, geometry: &StepGeometry, style: &StepStyle) -> Chart {
    let data = Data::from_rows([json!({
        "text": spec.text.as_deref().unwrap_or_default(),
        "url": spec.url.as_deref().unwrap_or_default(),
        "x": 0,
        "y": 0,
    })]);
    let anchor = Encoding {
        x: Some(hidden_axis("x")),
        y: Some(hidden_axis("y")),
        ..Default::default()
    };

    let background = UnitChart::new(Some(data.clone()))
        .with_mark(
            Mark::rect()
                .with_color(style.color.clone())
                .with_opacity(style.opacity)
                .with_corner_radius(style.corner_radius)
                .with_size(style.rect_width, style.rect_height),
        )
        .with_encoding(Encoding {
            href: Some(FieldDef::typed("url", FieldType::Nominal).into()),
            ..anchor.clone()
        });

    let caption = UnitChart::new(Some(data))
        .with_mark(
            Mark::text()
                .with_font_size(style.font_size)
                .with_font(style.font_family.clone())
                .with_align(TextAlign::Center.as_str())
                .with_baseline("middle")
                .with_color(style.text_color.clone()),
        )
        .with_encoding(Encoding {
            text: Some(FieldDef::typed("text", FieldType::Nominal).into()),
            ..anchor
        });

    Chart::layer(vec![background.into(), caption.into()]).with_size(geometry.width, geometry.height)
}

fn steps_chart(geometry: &StepGeometry, style: &StepStyle) -> Chart {
    let rows: Vec<Value> = geometry
        .rects
        .iter()
        .zip(&geometry.labels)
        .map(|(rect, label)| {
            json!({
                "x": rect.x,
                "y": rect.y,
                "x2": rect.x2,
                "y2": rect.y2,
                "text": label.text,
                "y_mid": label.y,
            })
        })
        .collect();
    let data = Data::from_rows(rows);

    let mut y = FieldDef::typed("y", FieldType::Quantitative).without_axis();
    if let Some(domain) = geometry.y_domain {
        y = y.with_domain(domain.to_vec());
    }
    let boxes = UnitChart::new(Some(data.clone()))
        .with_mark(
            Mark::rect()
                .with_color(style.color.clone())
                .with_opacity(style.opacity),
        )
        .with_encoding(Encoding {
            x: Some(hidden_axis("x")),
            y: Some(y.into()),
            x2: Some(Channel::field("x2:Q")),
            y2: Some(Channel::field("y2:Q")),
            ..Default::default()
        });

    let mut label_mark = Mark::text()
        .with_font_size(style.font_size)
        .with_font(style.font_family.clone())
        .with_align(TextAlign::Left.as_str())
        .with_offset(LABEL_DX, 0.0)
        .with_color(style.text_color.clone());
    if geometry.kind == StepKind::LineSteps {
        label_mark = label_mark.with_line_height(LABEL_LINE_HEIGHT);
    }
    let labels = UnitChart::new(Some(data))
        .with_mark(label_mark)
        .with_encoding(Encoding {
            text: Some(Channel::field("text:N")),
            x: Some(hidden_axis("x")),
            y: Some(hidden_axis("y_mid")),
            ..Default::default()
        });

    let mut layers: Vec<Chart> = vec![boxes.into()];
    if !geometry.segments.is_empty() {
        let rows = geometry.segments.iter().map(|segment| {
            json!({
                "x": segment.x,
                "y": segment.y,
                "x2": segment.x2,
                "y2": segment.y2,
            })
        });
        let connectors = UnitChart::new(Some(Data::from_rows(rows)))
            .with_mark(
                Mark::line()
                    .with_points()
                    .with_stroke(CONNECTOR_STROKE_WIDTH, Vec::new()),
            )
            .with_encoding(Encoding {
                x: Some(hidden_axis("x")),
                y: Some(hidden_axis("y")),
                x2: Some(Channel::field("x2:Q")),
                y2: Some(Channel::field("y2:Q")),
                ..Default::default()
            });
        layers.push(connectors.into());
    }
    layers.push(labels.into());
    Chart::layer(layers).with_size(geometry.width, geometry.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NextStepDefaults, NextStepOverrides, resolve_step_style};
    use proptest::prelude::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Step {}", i + 1)).collect()
    }

    fn spec(kind: StepKind, overrides: NextStepOverrides) -> StepDiagramSpec {
        StepDiagramSpec {
            kind,
            labels: None,
            text: None,
            url: None,
            style: resolve_step_style(kind, &NextStepDefaults::default(), &overrides),
            title: None,
        }
    }

    fn steps_spec(kind: StepKind, n: usize) -> StepDiagramSpec {
        StepDiagramSpec {
            labels: Some(labels(n)),
            ..spec(kind, NextStepOverrides::default())
        }
    }

    #[test]
    fn line_steps_scenario_geometry() {
        let overrides = NextStepOverrides {
            rect_width: Some(10.0),
            rect_height: Some(10.0),
            space: Some(5.0),
            ..Default::default()
        };
        let spec = StepDiagramSpec {
            labels: Some(vec!["A".into(), "B".into(), "C".into()]),
            ..spec(StepKind::LineSteps, overrides)
        };
        let geometry = step_geometry(&spec).unwrap();
        let starts: Vec<f64> = geometry.rects.iter().map(|r| r.x).collect();
        let ends: Vec<f64> = geometry.rects.iter().map(|r| r.x2).collect();
        assert_eq!(starts, vec![0.0, 15.0, 30.0]);
        assert_eq!(ends, vec![10.0, 25.0, 40.0]);
        assert_eq!(geometry.segments.len(), 2);
        assert_eq!(
            geometry.segments[0],
            Segment {
                x: 10.0,
                y: 5.0,
                x2: 15.0,
                y2: 5.0
            }
        );
        assert_eq!(geometry.segments[1].x, 25.0);
        assert_eq!(geometry.segments[1].x2, 30.0);
        assert_eq!(geometry.labels[1].y, 5.0);
        assert_eq!(geometry.labels[1].dx, 10.0);
    }

    #[test]
    fn single_step_has_no_connectors() {
        let geometry = step_geometry(&steps_spec(StepKind::LineSteps, 1)).unwrap();
        assert_eq!(geometry.rects.len(), 1);
        assert!(geometry.segments.is_empty());

        let chart = build_step_chart(&steps_spec(StepKind::StairSteps, 1)).unwrap();
        assert_eq!(chart.children().len(), 2);
    }

    #[test]
    fn stair_steps_fix_vertical_domain() {
        let geometry = step_geometry(&steps_spec(StepKind::StairSteps, 4)).unwrap();
        assert_eq!(geometry.y_domain, Some([0.0, 12.0]));
        assert_eq!(geometry.rects[2].y, 6.0);
        assert_eq!(geometry.rects[2].y2, 9.0);
        assert_eq!(geometry.labels[2].y, 7.5);
        assert_eq!(
            geometry.segments[0],
            Segment {
                x: 10.0,
                y: 3.0,
                x2: 10.0,
                y2: 3.0
            }
        );

        let chart = build_step_chart(&steps_spec(StepKind::StairSteps, 4)).unwrap();
        let json = chart.to_json().unwrap();
        assert_eq!(
            json["layer"][0]["encoding"]["y"]["scale"]["domain"],
            json!([0.0, 12.0])
        );
        assert_eq!(json["width"], json!(700.0));
        assert_eq!(json["height"], json!(300.0));
        assert!(json["layer"][0].get("width").is_none());
    }

    #[test]
    fn empty_or_oversized_label_lists_are_rejected() {
        for kind in [StepKind::LineSteps, StepKind::StairSteps] {
            assert_eq!(
                step_geometry(&steps_spec(kind, 0)),
                Err(ValidationError::NoSteps)
            );
            assert_eq!(
                step_geometry(&steps_spec(kind, 6)),
                Err(ValidationError::TooManySteps(6))
            );
            assert_eq!(
                step_geometry(&spec(kind, NextStepOverrides::default())),
                Err(ValidationError::MissingLabels(kind))
            );
        }
    }

    #[test]
    fn button_requires_text_and_url() {
        let missing_url = StepDiagramSpec {
            text: Some("Go".into()),
            ..spec(StepKind::Button, NextStepOverrides::default())
        };
        assert_eq!(
            validate_step_diagram(&missing_url),
            Err(ValidationError::MissingUrl)
        );

        let empty_text = StepDiagramSpec {
            text: Some(String::new()),
            url: Some("http://x".into()),
            ..spec(StepKind::Button, NextStepOverrides::default())
        };
        assert!(matches!(
            validate_step_diagram(&empty_text),
            Err(ValidationError::MissingText(_))
        ));
    }

    #[test]
    fn default_button_is_one_rect_with_centered_label() {
        let button = StepDiagramSpec {
            text: Some("Go".into()),
            url: Some("http://x".into()),
            ..spec(StepKind::Button, NextStepOverrides::default())
        };
        let geometry = step_geometry(&button).unwrap();
        assert_eq!(
            geometry.rects,
            vec![StepRect {
                x: 0.0,
                y: 0.0,
                x2: 120.0,
                y2: 40.0
            }]
        );
        assert_eq!(geometry.labels.len(), 1);
        assert_eq!(geometry.labels[0].text, "Go");
        assert_eq!(geometry.labels[0].align, TextAlign::Center);

        let json = build_step_chart(&button).unwrap().to_json().unwrap();
        assert_eq!(json["width"], json!(120.0));
        assert_eq!(json["height"], json!(40.0));
        assert_eq!(json["layer"][0]["mark"]["type"], "rect");
        assert_eq!(json["layer"][0]["mark"]["cornerRadius"], json!(5.0));
        assert_eq!(json["layer"][0]["encoding"]["href"]["field"], "url");
        assert_eq!(json["layer"][1]["mark"]["align"], "center");
        assert_eq!(json["layer"][1]["data"]["values"][0]["text"], "Go");
    }

    #[test]
    fn title_uses_resolved_title_style() {
        let spec = StepDiagramSpec {
            title: Some("What can we do next?".into()),
            ..steps_spec(StepKind::LineSteps, 2)
        };
        let json = build_step_chart(&spec).unwrap().to_json().unwrap();
        assert_eq!(json["title"]["text"], json!(["What can we do next?"]));
        assert_eq!(json["title"]["font"], "Arial");
        assert_eq!(json["title"]["offset"], json!(10.0));
        assert_eq!(json["layer"][1]["mark"]["type"], "line");
        assert_eq!(json["layer"][1]["mark"]["point"], json!(true));
    }

    proptest! {
        #[test]
        fn line_steps_layout_holds_for_every_count(
            n in 1usize..=5,
            w in 1.0f64..50.0,
            space in 0.0f64..20.0,
        ) {
            let overrides = NextStepOverrides {
                rect_width: Some(w),
                space: Some(space),
                ..Default::default()
            };
            let spec = StepDiagramSpec {
                labels: Some(labels(n)),
                ..spec(StepKind::LineSteps, overrides)
            };
            let geometry = step_geometry(&spec).unwrap();
            prop_assert_eq!(geometry.rects.len(), n);
            prop_assert_eq!(geometry.segments.len(), n - 1);
            for (i, rect) in geometry.rects.iter().enumerate() {
                prop_assert!((rect.x - i as f64 * (w + space)).abs() < 1e-9);
                prop_assert!((rect.x2 - rect.x - w).abs() < 1e-9);
            }
        }

        #[test]
        fn stair_steps_occupy_their_diagonal_cell(n in 1usize..=5) {
            let geometry = step_geometry(&steps_spec(StepKind::StairSteps, n)).unwrap();
            prop_assert_eq!(geometry.segments.len(), n - 1);
            for (i, rect) in geometry.rects.iter().enumerate() {
                let i = i as f64;
                prop_assert_eq!(rect.x, i * 10.0);
                prop_assert_eq!(rect.x2, (i + 1.0) * 10.0);
                prop_assert_eq!(rect.y, i * 3.0);
                prop_assert_eq!(rect.y2, (i + 1.0) * 3.0);
            }
        }
    }
}
