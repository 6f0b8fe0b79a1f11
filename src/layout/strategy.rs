//! Named layout strategies used to diversify candidates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A layout approach; one candidate is produced per strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    LeftSide,
    BottomBanner,
    RightSide,
    TopCenter,
}

impl Strategy {
    /// All strategies in tie-break priority order.
    pub const ALL: [Strategy; 4] = [
        Strategy::LeftSide,
        Strategy::BottomBanner,
        Strategy::RightSide,
        Strategy::TopCenter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::LeftSide => "left-side",
            Strategy::BottomBanner => "bottom-banner",
            Strategy::RightSide => "right-side",
            Strategy::TopCenter => "top-center",
        }
    }

    /// Tie-break rank; lower wins when scores are equal.
    pub fn priority(&self) -> usize {
        match self {
            Strategy::LeftSide => 0,
            Strategy::BottomBanner => 1,
            Strategy::RightSide => 2,
            Strategy::TopCenter => 3,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
