use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reachability of the monitored endpoint as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "up",
            Status::Down => "down",
            Status::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Status::Up),
            "down" => Ok(Status::Down),
            "unknown" => Ok(Status::Unknown),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Outcome of a single probe. Only `status` is ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub status: Status,
    /// HTTP status of the response, or 0 when no response was received.
    pub http_code: u16,
}

impl ProbeResult {
    pub fn up(http_code: u16) -> Self {
        Self {
            status: Status::Up,
            http_code,
        }
    }

    pub fn down(http_code: u16) -> Self {
        Self {
            status: Status::Down,
            http_code,
        }
    }

    /// A probe that never got an HTTP response (connect error, timeout...).
    pub fn unreachable() -> Self {
        Self::down(0)
    }
}

/// Record returned to the invoking scheduler after each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub previous: Status,
    pub current: Status,
    #[serde(rename = "http")]
    pub http_code: u16,
}

impl CheckOutcome {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}
