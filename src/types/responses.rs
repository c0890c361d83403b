//! Response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::grid::GridError;

/// Classification of a submitted grid.
///
/// Unlike the plain boolean answer, `Invalid` keeps malformed input
/// apart from a computed "not mutant".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Two or more runs found.
    Mutant,
    /// Fewer than two runs found.
    Human,
    /// The grid was rejected before scanning.
    Invalid(GridError),
}

impl Verdict {
    /// Verdict for a detector result.
    pub fn from_mutant(mutant: bool) -> Self {
        if mutant {
            Verdict::Mutant
        } else {
            Verdict::Human
        }
    }

    /// Collapses to the boolean answer; `Invalid` reads as `false`.
    pub fn is_mutant(&self) -> bool {
        matches!(self, Verdict::Mutant)
    }

    /// Whether the grid was rejected.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Verdict::Invalid(_))
    }

    /// HTTP-style status: 200 mutant, 403 human, 400 invalid.
    pub fn status_code(&self) -> u16 {
        match self {
            Verdict::Mutant => 200,
            Verdict::Human => 403,
            Verdict::Invalid(_) => 400,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Mutant => write!(f, "mutant"),
            Verdict::Human => write!(f, "human"),
            Verdict::Invalid(reason) => write!(f, "invalid: {}", reason),
        }
    }
}

/// Error body returned to transport clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    /// Creates an error body.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Liveness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    /// A healthy report stamped now.
    pub fn up() -> Self {
        Self {
            status: "UP".to_string(),
            timestamp: Utc::now(),
        }
    }
}
