//! People and their identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a person.
///
/// Ids are non-negative and handed out as "largest existing id + 1",
/// so they are stable for the lifetime of the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(u64);

impl PersonId {
    /// Wraps a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The id that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PersonId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// A single individual in the family graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier.
    pub id: PersonId,

    /// Given name.
    pub name: String,

    /// Family name.
    pub surname: String,
}

impl Person {
    /// Creates a person with an already assigned id.
    pub fn new(id: PersonId, name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            surname: surname.into(),
        }
    }

    /// Name and surname joined by a single space.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (#{})", self.name, self.surname, self.id)
    }
}

/// Payload for creating a person. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub name: String,
    pub surname: String,
}

impl NewPerson {
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
        }
    }

    /// Attaches an id, producing the stored person.
    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            name: self.name,
            surname: self.surname,
        }
    }
}
