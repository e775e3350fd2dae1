//! Workflow error taxonomy.

use std::fmt;

use concierge_core::Segment;
use thiserror::Error;

use crate::bridge::BridgeError;
use crate::profile::StoreError;
use crate::sink::SinkError;

/// Message shown when the terminal refuses a discount.
pub const DISCOUNT_FAILED_MESSAGE: &str = "Discount failed to apply!";

/// Workflow step, used to label errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Startup,
    AccountResolution,
    ProfileResolution,
    ManualResolution,
    Submission,
    Close,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Startup => "Startup",
            Self::AccountResolution => "Account resolution",
            Self::ProfileResolution => "Profile resolution",
            Self::ManualResolution => "Manual resolution",
            Self::Submission => "Form submission",
            Self::Close => "Close",
        })
    }
}

/// Errors raised by workflow steps.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Something a step needs is not there yet.
    #[error("Missing dependency: {0}")]
    DependencyMissing(&'static str),

    /// Required form fields are blank.
    #[error("Missing required fields: {}", .0.join(", "))]
    ValidationFailed(Vec<&'static str>),

    /// The customer's segment has no registered strategy.
    #[error("No discount strategy for segment \"{0}\"")]
    StrategyNotFound(Segment),

    /// A terminal bridge call failed.
    #[error("Terminal call failed: {0}")]
    BridgeCallFailed(#[from] BridgeError),

    /// The profile store could not be queried.
    #[error("Profile lookup failed: {0}")]
    StoreLookupFailed(#[from] StoreError),

    /// The form sink refused the submission.
    #[error("Form submission failed: {0}")]
    SubmissionFailed(#[from] SinkError),

    /// The soft error path could not report the error.
    #[error("Error escalation failed: {0}")]
    EscalationFailure(String),

    /// An error labelled with the step it happened in.
    #[error("{step} failed: {source}")]
    Step {
        step: WorkflowStep,
        #[source]
        source: Box<WorkflowError>,
    },
}

impl WorkflowError {
    /// Label this error with `step`. Already labelled errors keep their step.
    #[must_use]
    pub fn in_step(self, step: WorkflowStep) -> Self {
        match self {
            Self::Step { .. } => self,
            other => Self::Step {
                step,
                source: Box::new(other),
            },
        }
    }

    /// The step this error was labelled with, if any.
    #[must_use]
    pub const fn step(&self) -> Option<WorkflowStep> {
        match self {
            Self::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The error without its step label.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Step { source, .. } => source.root(),
            other => other,
        }
    }
}
