//! Facade error type.

use thiserror::Error;

use quire_package::ValidateError;
use quire_safety::SafetyError;

use crate::telemetry::TelemetryError;

/// Any failure surfaced by the facade.
#[derive(Debug, Error)]
pub enum QuireError {
    /// A file safety operation failed.
    #[error(transparent)]
    Safety(#[from] SafetyError),
    /// A package could not be inspected.
    #[error(transparent)]
    Validate(#[from] ValidateError),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}
