use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Starch preference for a single garment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StarchLevel {
    None,
    Light,
    Medium,
    Heavy,
}

impl StarchLevel {
    /// Interprets free-form input from the cart.
    ///
    /// Only the exact values `none`, `light`, `medium` and `heavy` are
    /// accepted; anything else leaves the starch preference unset.
    pub fn coerce(raw: Option<&str>) -> Option<StarchLevel> {
        raw.and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for StarchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarchLevel::None => write!(f, "none"),
            StarchLevel::Light => write!(f, "light"),
            StarchLevel::Medium => write!(f, "medium"),
            StarchLevel::Heavy => write!(f, "heavy"),
        }
    }
}

impl FromStr for StarchLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(StarchLevel::None),
            "light" => Ok(StarchLevel::Light),
            "medium" => Ok(StarchLevel::Medium),
            "heavy" => Ok(StarchLevel::Heavy),
            _ => Err(format!(
                "Invalid starch level '{}'. Valid options: none, light, medium, heavy",
                s
            )),
        }
    }
}
