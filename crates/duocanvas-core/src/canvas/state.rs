//! Machine state definitions.

use crate::tools::Environment;
use serde::{Deserialize, Serialize};

/// Whether a recoverable fault is currently recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CanvasStatus {
    /// No error recorded.
    #[default]
    Normal,
    /// An error message is recorded; transitions keep working.
    Error,
}

/// The observable machine state: environment × status.
///
/// Always derived from the context, never stored next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CanvasState {
    pub environment: Environment,
    pub status: CanvasStatus,
}

impl CanvasState {
    pub fn is_error(&self) -> bool {
        self.status == CanvasStatus::Error
    }

    pub fn is_design(&self) -> bool {
        self.environment == Environment::Design
    }

    pub fn is_practical(&self) -> bool {
        self.environment == Environment::Practical
    }
}
