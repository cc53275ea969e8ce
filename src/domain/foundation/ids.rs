//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier of a dashboard user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Creates a UserId from the numeric id the API returns.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the inner numeric id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Generation counter for the in-memory session.
///
/// Every transition that starts or ends a session advances the epoch. An
/// asynchronous call captures the epoch it started in and only applies its
/// result if the epoch is unchanged when it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    /// The epoch a freshly constructed session starts in.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the epoch that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns the raw counter value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_parses_from_string() {
        let id: UserId = "42".parse().unwrap();
        assert_eq!(id.as_u64(), 42);
    }

    #[test]
    fn user_id_rejects_non_numeric() {
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn user_id_serializes_transparently() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");

        let parsed: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, UserId::new(7));
    }

    #[test]
    fn session_epoch_advances_monotonically() {
        let first = SessionEpoch::initial();
        let second = first.next();
        let third = second.next();

        assert!(first < second);
        assert!(second < third);
        assert_eq!(third.as_u64(), 2);
    }

    #[test]
    fn session_epoch_displays_with_prefix() {
        assert_eq!(SessionEpoch::initial().next().to_string(), "epoch-1");
    }
}
