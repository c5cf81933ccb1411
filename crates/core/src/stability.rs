use std::fmt;

use serde::{Deserialize, Serialize};

/// Release stability of a service or plan.
///
/// Ordered so that catalog filtering is a plain comparison:
/// `Experimental < Preview < Stable`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stability {
    #[default]
    Experimental,
    Preview,
    Stable,
}

impl Stability {
    /// Parse a stability level from its (case-insensitive) name.
    pub fn parse(s: &str) -> Option<Stability> {
        match s.to_ascii_uppercase().as_str() {
            "EXPERIMENTAL" => Some(Stability::Experimental),
            "PREVIEW" => Some(Stability::Preview),
            "STABLE" => Some(Stability::Stable),
            _ => None,
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stability::Experimental => write!(f, "EXPERIMENTAL"),
            Stability::Preview => write!(f, "PREVIEW"),
            Stability::Stable => write!(f, "STABLE"),
        }
    }
}
