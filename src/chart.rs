//! Chart values handed to the rendering backend.
//!
//! These mirror the Vega-Lite v5 grammar closely enough that serializing a [`Chart`] with
//! `serde_json` yields a specification a Vega-Lite runtime can draw. Only the parts of the
//! grammar the narrative layers need are modelled; pixel rendering happens elsewhere.

use std::ops::Add;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static SHORTHAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<field>.+?)(?::(?P<ty>[QONTqont]|quantitative|ordinal|nominal|temporal))?$")
        .unwrap()
});

/// One row of a tabular dataset: named scalar fields.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Data {
    Values(Vec<Row>),
    Url(String),
}

impl Data {
    /// Builds inline data from JSON objects; non-object values are skipped.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Data::Values(
            rows.into_iter()
                .filter_map(|row| match row {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
        )
    }

    /// A single empty datum, so value-encoded marks draw exactly once.
    pub fn single() -> Self {
        Data::Values(vec![Row::new()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Quantitative,
    Ordinal,
    Nominal,
    Temporal,
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "q" | "quantitative" => Ok(FieldType::Quantitative),
            "o" | "ordinal" => Ok(FieldType::Ordinal),
            "n" | "nominal" => Ok(FieldType::Nominal),
            "t" | "temporal" => Ok(FieldType::Temporal),
            other => Err(format!("unknown field type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub field: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    /// `Some(Value::Null)` hides the axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
}

impl FieldDef {
    /// Parses an Altair-style shorthand such as `"price:Q"` or `"date:temporal"`.
    pub fn shorthand(shorthand: &str) -> Self {
        let (field, field_type) = match SHORTHAND_RE.captures(shorthand.trim()) {
            Some(caps) => (
                caps.name("field")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                caps.name("ty").and_then(|m| m.as_str().parse().ok()),
            ),
            None => (shorthand.to_string(), None),
        };
        Self {
            field,
            field_type,
            axis: None,
            scale: None,
        }
    }

    pub fn typed(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            field_type: Some(field_type),
            axis: None,
            scale: None,
        }
    }

    pub fn without_axis(mut self) -> Self {
        self.axis = Some(Value::Null);
        self
    }

    pub fn with_domain(mut self, domain: Vec<f64>) -> Self {
        self.scale = Some(Scale {
            domain: Some(domain),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Channel {
    Field(FieldDef),
    Value { value: Value },
}

impl Channel {
    pub fn field(shorthand: &str) -> Self {
        Channel::Field(FieldDef::shorthand(shorthand))
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Channel::Value {
            value: value.into(),
        }
    }

    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Channel::Field(def) => def.field_type,
            Channel::Value { .. } => None,
        }
    }
}

impl From<FieldDef> for Channel {
    fn from(def: FieldDef) -> Self {
        Channel::Field(def)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x2: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Channel>,
}

impl Encoding {
    pub fn is_empty(&self) -> bool {
        *self == Encoding::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Text,
    Rect,
    Line,
    Point,
    Rule,
    Bar,
    Area,
}

impl FromStr for MarkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MarkKind::Text),
            "rect" => Ok(MarkKind::Rect),
            "line" => Ok(MarkKind::Line),
            "point" => Ok(MarkKind::Point),
            "rule" => Ok(MarkKind::Rule),
            "bar" => Ok(MarkKind::Bar),
            "area" => Ok(MarkKind::Area),
            other => Err(format!("unknown mark type '{other}'")),
        }
    }
}

/// A mark definition: the mark type plus its constant styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: MarkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dash: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<bool>,
}

impl Mark {
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            text: None,
            color: None,
            opacity: None,
            font: None,
            font_size: None,
            font_weight: None,
            align: None,
            baseline: None,
            angle: None,
            dx: None,
            dy: None,
            line_height: None,
            corner_radius: None,
            width: None,
            height: None,
            size: None,
            stroke_width: None,
            stroke_dash: None,
            point: None,
        }
    }

    pub fn text() -> Self {
        Self::new(MarkKind::Text)
    }

    pub fn rect() -> Self {
        Self::new(MarkKind::Rect)
    }

    pub fn line() -> Self {
        Self::new(MarkKind::Line)
    }

    pub fn point() -> Self {
        Self::new(MarkKind::Point)
    }

    pub fn rule() -> Self {
        Self::new(MarkKind::Rule)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn with_font_weight(mut self, weight: impl Into<String>) -> Self {
        self.font_weight = Some(weight.into());
        self
    }

    pub fn with_align(mut self, align: impl Into<String>) -> Self {
        self.align = Some(align.into());
        self
    }

    pub fn with_baseline(mut self, baseline: impl Into<String>) -> Self {
        self.baseline = Some(baseline.into());
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.dx = Some(dx);
        self.dy = Some(dy);
        self
    }

    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = Some(line_height);
        self
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_point_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_stroke(mut self, stroke_width: f64, stroke_dash: Vec<f64>) -> Self {
        self.stroke_width = Some(stroke_width);
        if !stroke_dash.is_empty() {
            self.stroke_dash = Some(stroke_dash);
        }
        self
    }

    pub fn with_points(mut self) -> Self {
        self.point = Some(true);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleParams {
    pub text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    Shared,
    Independent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveScale {
    pub x: ResolveMode,
    pub y: ResolveMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolve {
    pub scale: ResolveScale,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartConfig {
    pub view: Map<String, Value>,
}

/// View-level properties shared by every chart shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ViewProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve: Option<Resolve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ChartConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UnitChart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<Mark>,
    #[serde(skip_serializing_if = "Encoding::is_empty")]
    pub encoding: Encoding,
    #[serde(flatten)]
    pub props: ViewProps,
}

impl UnitChart {
    pub fn new(data: Option<Data>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.mark = Some(mark);
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.props.width = Some(width);
        self.props.height = Some(height);
        self
    }

    pub fn width(&self) -> f64 {
        self.props.width.unwrap_or(0.0)
    }

    pub fn height(&self) -> f64 {
        self.props.height.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayerChart {
    pub layer: Vec<Chart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
    #[serde(flatten)]
    pub props: ViewProps,
}

impl LayerChart {
    /// Appends a member, hoisting its size onto the layer.
    pub fn push(&mut self, mut chart: Chart) {
        let child = chart.props_mut();
        let (width, height) = (child.width.take(), child.height.take());
        self.props.width = self.props.width.or(width);
        self.props.height = self.props.height.or(height);
        self.layer.push(chart);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HConcatChart {
    pub hconcat: Vec<Chart>,
    #[serde(flatten)]
    pub props: ViewProps,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VConcatChart {
    pub vconcat: Vec<Chart>,
    #[serde(flatten)]
    pub props: ViewProps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Chart {
    Unit(UnitChart),
    Layer(LayerChart),
    HConcat(HConcatChart),
    VConcat(VConcatChart),
}

impl Chart {
    /// Layers `charts`. A width or height declared on a child moves up to the layer, the
    /// first declaring child winning, since layer members cannot be sized on their own.
    pub fn layer(charts: Vec<Chart>) -> Self {
        let mut layer = LayerChart::default();
        for chart in charts {
            layer.push(chart);
        }
        Chart::Layer(layer)
    }

    pub fn hconcat(charts: Vec<Chart>) -> Self {
        Chart::HConcat(HConcatChart {
            hconcat: charts,
            ..Default::default()
        })
    }

    pub fn vconcat(charts: Vec<Chart>) -> Self {
        Chart::VConcat(VConcatChart {
            vconcat: charts,
            ..Default::default()
        })
    }

    pub fn props(&self) -> &ViewProps {
        match self {
            Chart::Unit(chart) => &chart.props,
            Chart::Layer(chart) => &chart.props,
            Chart::HConcat(chart) => &chart.props,
            Chart::VConcat(chart) => &chart.props,
        }
    }

    pub fn props_mut(&mut self) -> &mut ViewProps {
        match self {
            Chart::Unit(chart) => &mut chart.props,
            Chart::Layer(chart) => &mut chart.props,
            Chart::HConcat(chart) => &mut chart.props,
            Chart::VConcat(chart) => &mut chart.props,
        }
    }

    pub fn with_title(mut self, title: TitleParams) -> Self {
        self.props_mut().title = Some(title);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        let props = self.props_mut();
        props.width = Some(width);
        props.height = Some(height);
        self
    }

    /// Gives every concatenated panel its own x and y scales.
    pub fn resolve_independent(mut self) -> Self {
        self.props_mut().resolve = Some(Resolve {
            scale: ResolveScale {
                x: ResolveMode::Independent,
                y: ResolveMode::Independent,
            },
        });
        self
    }

    pub fn configure_view(mut self, view: Map<String, Value>) -> Self {
        self.props_mut().config = Some(ChartConfig { view });
        self
    }

    /// Sub-charts of a layer or concatenation, in order; empty for unit charts.
    pub fn children(&self) -> &[Chart] {
        match self {
            Chart::Unit(_) => &[],
            Chart::Layer(chart) => &chart.layer,
            Chart::HConcat(chart) => &chart.hconcat,
            Chart::VConcat(chart) => &chart.vconcat,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl From<UnitChart> for Chart {
    fn from(chart: UnitChart) -> Self {
        Chart::Unit(chart)
    }
}

impl Add for Chart {
    type Output = Chart;

    /// Layer union; appending to an existing layer keeps it flat.
    fn add(self, rhs: Chart) -> Chart {
        match self {
            Chart::Layer(mut layer) => {
                layer.push(rhs);
                Chart::Layer(layer)
            }
            other => Chart::layer(vec![other, rhs]),
        }
    }
}
