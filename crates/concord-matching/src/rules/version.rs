//! Contract specification versions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version of the contract specification a rule set is written against.
/// Some matchers are only legal from a given version onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpecVersion {
    V1,
    V1_1,
    V2,
    V3,
    #[default]
    V4,
}

impl SpecVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecVersion::V1 => "V1",
            SpecVersion::V1_1 => "V1_1",
            SpecVersion::V2 => "V2",
            SpecVersion::V3 => "V3",
            SpecVersion::V4 => "V4",
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().trim_start_matches('V') {
            "1" | "1.0" | "1.0.0" => Ok(SpecVersion::V1),
            "1_1" | "1.1" | "1.1.0" => Ok(SpecVersion::V1_1),
            "2" | "2.0" | "2.0.0" => Ok(SpecVersion::V2),
            "3" | "3.0" | "3.0.0" => Ok(SpecVersion::V3),
            "4" | "4.0" | "4.0.0" => Ok(SpecVersion::V4),
            _ => Err(format!("Unknown specification version '{s}'")),
        }
    }
}

impl TryFrom<String> for SpecVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SpecVersion> for String {
    fn from(value: SpecVersion) -> Self {
        value.as_str().to_string()
    }
}
