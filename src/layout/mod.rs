//! Geometry and composition: where narrative layers go and how they are stitched onto the
//! base chart.

pub mod annotation;
pub mod compose;
mod overlay;
pub mod position;
pub mod steps;
pub(crate) mod types;

pub use annotation::{
    AnnotationSpec, AxisTypes, GlyphStyle, PointStyle, ReferenceLineSpec, build_annotation,
    build_reference_line, infer_axis_types,
};
pub use compose::{ComposeContext, LayoutPlan, compose, plan_layers};
pub use position::resolve_position;
pub use steps::{StepDiagramSpec, build_step_chart, step_geometry, validate_step_diagram};
pub use types::*;
