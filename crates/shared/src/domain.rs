use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Query parameter that marks a request as a service call.
pub const SERVICE_PARAM: &str = "__service__";

/// Subsystem names that are never routed as service calls.
pub const RESERVED_SUBSYSTEMS: [&str; 2] = ["middlewares", "utils"];

pub fn is_reserved_subsystem(name: &str) -> bool {
    RESERVED_SUBSYSTEMS.contains(&name)
}

/// Parsed `<subsystem>.<action>` value of the `__service__` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub subsystem: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed service target '{0}', expected <subsystem>.<action>")]
pub struct MalformedTarget(pub String);

impl ServiceTarget {
    /// Splits on the first `.`; both halves must be non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    pub fn is_reserved(&self) -> bool {
        is_reserved_subsystem(&self.subsystem)
    }
}

impl FromStr for ServiceTarget {
    type Err = MalformedTarget;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.split_once('.') {
            Some((subsystem, action)) if !subsystem.is_empty() && !action.is_empty() => {
                Ok(Self {
                    subsystem: subsystem.to_string(),
                    action: action.to_string(),
                })
            }
            _ => Err(MalformedTarget(raw.to_string())),
        }
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.subsystem, self.action)
    }
}
