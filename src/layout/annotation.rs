use serde_json::{Value, json};

use crate::chart::{Channel, Chart, Data, Encoding, FieldDef, FieldType, Mark, UnitChart};
use crate::ir::{ArrowDirection, Orientation};

/// Semantic types of the base chart's x and y axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisTypes {
    pub x: FieldType,
    pub y: FieldType,
}

impl Default for AxisTypes {
    fn default() -> Self {
        Self {
            x: FieldType::Quantitative,
            y: FieldType::Quantitative,
        }
    }
}

/// Reads the axis types off an existing encoding. Axes that are missing or untyped are
/// treated as quantitative.
pub fn infer_axis_types(encoding: &Encoding) -> AxisTypes {
    let of = |channel: Option<&Channel>| {
        channel
            .and_then(Channel::field_type)
            .unwrap_or(FieldType::Quantitative)
    };
    AxisTypes {
        x: of(encoding.x.as_ref()),
        y: of(encoding.y.as_ref()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            color: "red".to_string(),
            size: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlyphStyle {
    pub color: String,
    pub size: f64,
    pub dx: f64,
    pub dy: f64,
}

/// A data-space callout: optional point, directional glyph and text label.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSpec {
    pub x: Value,
    pub y: Value,
    pub text: String,
    pub direction: ArrowDirection,
    /// `None` hides the point marker.
    pub point: Option<PointStyle>,
    pub arrow: GlyphStyle,
    pub label: GlyphStyle,
}

impl AnnotationSpec {
    pub fn new(x: impl Into<Value>, y: impl Into<Value>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            text: "Point of interest".to_string(),
            direction: ArrowDirection::default(),
            point: Some(PointStyle::default()),
            arrow: GlyphStyle {
                color: "blue".to_string(),
                size: 40.0,
                dx: 0.0,
                dy: -45.0,
            },
            label: GlyphStyle {
                color: "black".to_string(),
                size: 12.0,
                dx: 37.0,
                dy: -37.0,
            },
        }
    }
}

/// Builds the annotation layer under the base chart's coordinate system.
pub fn build_annotation(spec: &AnnotationSpec, axes: AxisTypes) -> Chart {
    let data = Data::from_rows([json!({"x": spec.x, "y": spec.y})]);
    let encoding = Encoding {
        x: Some(FieldDef::typed("x", axes.x).into()),
        y: Some(FieldDef::typed("y", axes.y).into()),
        ..Default::default()
    };
    let unit = |mark: Mark| -> Chart {
        UnitChart::new(Some(data.clone()))
            .with_mark(mark)
            .with_encoding(encoding.clone())
            .into()
    };

    let mut layers = Vec::with_capacity(3);
    if let Some(point) = &spec.point {
        layers.push(unit(
            Mark::point()
                .with_color(point.color.clone())
                .with_point_size(point.size),
        ));
    }
    layers.push(unit(
        Mark::text()
            .with_text(spec.direction.glyph())
            .with_font_size(spec.arrow.size)
            .with_offset(spec.arrow.dx, spec.arrow.dy)
            .with_color(spec.arrow.color.clone()),
    ));
    layers.push(unit(
        Mark::text()
            .with_align("left")
            .with_baseline("top")
            .with_offset(spec.label.dx, spec.label.dy)
            .with_font_size(spec.label.size)
            .with_color(spec.label.color.clone())
            .with_text(spec.text.clone()),
    ));
    Chart::layer(layers)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLineSpec {
    pub value: Value,
    pub orientation: Orientation,
    pub color: String,
    pub stroke_width: f64,
    pub stroke_dash: Vec<f64>,
}

impl ReferenceLineSpec {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            orientation: Orientation::Horizontal,
            color: "red".to_string(),
            stroke_width: 2.0,
            stroke_dash: Vec::new(),
        }
    }
}

/// A rule across the plot at `value`; horizontal lines sit on the y axis.
pub fn build_reference_line(spec: &ReferenceLineSpec, axes: AxisTypes) -> Chart {
    let data = Data::from_rows([json!({"value": spec.value})]);
    let encoding = match spec.orientation {
        Orientation::Horizontal => Encoding {
            y: Some(FieldDef::typed("value", axes.y).into()),
            ..Default::default()
        },
        Orientation::Vertical => Encoding {
            x: Some(FieldDef::typed("value", axes.x).into()),
            ..Default::default()
        },
    };
    UnitChart::new(Some(data))
        .with_mark(
            Mark::rule()
                .with_color(spec.color.clone())
                .with_stroke(spec.stroke_width, spec.stroke_dash.clone()),
        )
        .with_encoding(encoding)
        .into()
}
