//! Shared vocabulary for the game world
//!
//! Ids, detection-risk levels, and the clue journal.

pub mod journal;

pub use journal::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bands of detection risk, derived from the 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Calm,
    Uneasy,
    Exposed,
    Hunted,
}

impl RiskLevel {
    /// Band for a raw detection-risk score
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => RiskLevel::Calm,
            30..=59 => RiskLevel::Uneasy,
            60..=79 => RiskLevel::Exposed,
            _ => RiskLevel::Hunted,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Calm => "green",
            RiskLevel::Uneasy => "yellow",
            RiskLevel::Exposed => "red",
            RiskLevel::Hunted => "magenta",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            RiskLevel::Calm => "○",
            RiskLevel::Uneasy => "◆",
            RiskLevel::Exposed => "▲",
            RiskLevel::Hunted => "⬤",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Calm => write!(f, "CALM"),
            RiskLevel::Uneasy => write!(f, "UNEASY"),
            RiskLevel::Exposed => write!(f, "EXPOSED"),
            RiskLevel::Hunted => write!(f, "HUNTED"),
        }
    }
}

/// A unique identifier wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id(pub Uuid);

impl Id {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}
