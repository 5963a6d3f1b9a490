//! Edge types for the kinship graph.
//!
//! Only two relations are ever stored. Everything else a user might ask
//! about (siblings, in particular) is derived from the shape of a path.

use crate::error::KinError;
use kindred_core::PersonId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The type of relationship an edge stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Directed from parent to child.
    Child,

    /// Marriage. Stored with a direction, but that direction carries no meaning.
    Spouse,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Child => "CHILD",
            Self::Spouse => "SPOUSE",
        }
    }

    /// Whether traversal must ignore the stored direction.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::Spouse)
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = KinError;

    /// Accepts any casing, so `"child"` and `"CHILD"` are the same kind.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CHILD" => Ok(Self::Child),
            "SPOUSE" => Ok(Self::Spouse),
            _ => Err(KinError::UnknownEdgeKind(s.to_string())),
        }
    }
}

/// An edge weight in the kinship graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(kind: EdgeKind) -> Self {
        Self { kind }
    }
}

/// An edge with its stored endpoints, as it appears in a path or an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: PersonId,
    pub to: PersonId,
    pub kind: EdgeKind,
}

impl GraphEdge {
    pub fn new(from: PersonId, to: PersonId, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }

    /// True if this edge joins `a` and `b`, in either stored direction.
    pub fn connects(&self, a: PersonId, b: PersonId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("child".parse::<EdgeKind>().unwrap(), EdgeKind::Child);
        assert_eq!("Spouse".parse::<EdgeKind>().unwrap(), EdgeKind::Spouse);
        assert_eq!(" CHILD ".parse::<EdgeKind>().unwrap(), EdgeKind::Child);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "cousin".parse::<EdgeKind>().unwrap_err();
        assert!(matches!(err, KinError::UnknownEdgeKind(ref s) if s == "cousin"));
    }

    #[test]
    fn test_connects_ignores_direction() {
        let e = GraphEdge::new(PersonId::new(1), PersonId::new(2), EdgeKind::Spouse);
        assert!(e.connects(PersonId::new(2), PersonId::new(1)));
        assert!(!e.connects(PersonId::new(1), PersonId::new(3)));
    }
}
