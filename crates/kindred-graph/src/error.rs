use kindred_core::PersonId;
use thiserror::Error;

/// Failures of kinship queries and mutations.
///
/// All of these describe the shape of the data, so none of them are
/// worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KinError {
    /// No person has children without having a recorded parent.
    #[error("No root ancestor found")]
    NoRootFound,

    /// A person was reached again on their own line of descent, or the
    /// descent exceeded the configured depth bound.
    #[error("Cyclic CHILD relation detected at person {person}")]
    CyclicGraph { person: PersonId },

    /// The two people are not connected by any path.
    #[error("No relation path between {from} and {to}")]
    Disconnected { from: PersonId, to: PersonId },

    /// A relation was requested between a person and themselves.
    #[error("Person {0} cannot be related to themselves")]
    SameIdentity(PersonId),

    /// The id does not exist in the store.
    #[error("Person not found: {0}")]
    NotFound(PersonId),

    /// The edge is structurally invalid (self-loop, duplicate).
    #[error("Invalid relation: {0}")]
    InvalidRelation(String),

    #[error("Unknown relation type: {0}")]
    UnknownEdgeKind(String),
}

pub type Result<T> = std::result::Result<T, KinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KinError::Disconnected {
            from: PersonId::new(1),
            to: PersonId::new(9),
        };
        assert_eq!(err.to_string(), "No relation path between 1 and 9");

        let err = KinError::NotFound(PersonId::new(4));
        assert!(err.to_string().contains("4"));
    }
}
