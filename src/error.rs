use thiserror::Error;

use crate::ir::{ArrowDirection, StepKind};

pub const MAX_STEPS: usize = 5;

/// Raised synchronously by the `Story` builder when a call violates its contract.
///
/// A rejected call never appends a layer; the story stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("maximum number of steps is 5 (got {0})")]
    TooManySteps(usize),
    #[error("must provide at least one step")]
    NoSteps,
    #[error("a list of labels is required for {0}")]
    MissingLabels(StepKind),
    #[error("the parameter 'text' is required for {0}")]
    MissingText(&'static str),
    #[error("the parameter 'url' is required for the button type")]
    MissingUrl,
    #[error("invalid next-step mode '{0}', use one of: button, line_steps, stair_steps")]
    InvalidMode(String),
    #[error("invalid arrow direction '{given}', use one of: {}", ArrowDirection::valid_names().join(", "))]
    InvalidArrowDirection { given: String },
    #[error("invalid line orientation '{0}', use one of: horizontal, vertical")]
    InvalidOrientation(String),
}
