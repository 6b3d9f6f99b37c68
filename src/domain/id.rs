//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Route identifier - a tracked (symbol, venue) combination.
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(String);

impl RouteId {
    /// Create a new `RouteId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the canonical route ID for a symbol traded on a venue.
    #[must_use]
    pub fn for_route(symbol: &str, venue: &str) -> Self {
        Self(format!("{symbol}@{venue}"))
    }

    /// Get the route ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RouteId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for RouteId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique identifier for a scored decision.
///
/// Generated as UUID v4 when the Scorer produces a decision, or
/// constructed from an existing string for replay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(String);

impl DecisionId {
    /// Create a new `DecisionId` with a generated UUID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the decision ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DecisionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DecisionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_id_for_route_joins_symbol_and_venue() {
        let id = RouteId::for_route("ETH-USDC", "uniswap-v3");
        assert_eq!(id.as_str(), "ETH-USDC@uniswap-v3");
    }

    #[test]
    fn route_id_display() {
        let id = RouteId::new("display-test");
        assert_eq!(format!("{}", id), "display-test");
    }

    #[test]
    fn route_id_from_str() {
        let id = RouteId::from("world");
        assert_eq!(id.as_str(), "world");
    }

    #[test]
    fn decision_id_generates_unique_ids() {
        let id1 = DecisionId::new();
        let id2 = DecisionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn decision_id_as_str_returns_uuid_format() {
        let id = DecisionId::new();
        // UUID v4 format: 8-4-4-4-12 hex chars
        assert_eq!(id.as_str().len(), 36);
        assert!(id.as_str().chars().filter(|c| *c == '-').count() == 4);
    }

    #[test]
    fn decision_id_from_string() {
        let id = DecisionId::from("existing-id".to_string());
        assert_eq!(id.as_str(), "existing-id");
    }
}
