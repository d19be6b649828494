pub mod chart;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod next_step;
pub mod parser;
pub mod render;
pub mod story;
pub mod theme;

pub use chart::{Channel, Chart, Data, Encoding, FieldType, Mark, MarkKind, UnitChart};
#[cfg(feature = "cli")]
pub use cli::{Args, run};
pub use config::{Config, load_config};
pub use error::ValidationError;
pub use ir::{ArrowDirection, NarrativeLayer, Orientation, Position, StepKind};
pub use layout::{LayoutPlan, resolve_position};
pub use next_step::NextStep;
pub use parser::{parse_story, render_document};
pub use render::{RenderOptions, render_spec, render_with_options};
pub use story::{
    AnnotationOptions, LineOptions, NextStepRequest, Story, TextOptions, TitleOptions,
};
pub use theme::Theme;
