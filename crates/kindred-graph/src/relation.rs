//! Relationship interpretation.
//!
//! A shortest path is first turned into relation tokens, one per leg,
//! read from the point of view of the walk: `CHILD` when the next person
//! is a child of the current one, `PARENT` when they are a parent, and
//! `SPOUSE` for marriages.
//!
//! The tokens are then compressed. Whenever the walk goes up to a parent
//! and straight back down to one of that parent's children, the two
//! people on either side are siblings: the pair of legs becomes a single
//! `SIBLING` token and the shared parent is dropped from the output.
//!
//! Only that exact up-one, down-one shape is collapsed. Longer shapes
//! such as cousins come out as a mix of `PARENT`, `SIBLING` and `CHILD`.

use crate::edge::EdgeKind;
use crate::error::Result;
use crate::path::KinPath;
use crate::store::GraphStore;
use kindred_core::{Person, PersonId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Relation vocabulary of an interpreted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationToken {
    Parent,
    Child,
    Spouse,
    /// Derived only; never stored as an edge.
    Sibling,
}

impl RelationToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "PARENT",
            Self::Child => "CHILD",
            Self::Spouse => "SPOUSE",
            Self::Sibling => "SIBLING",
        }
    }
}

impl fmt::Display for RelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One element of an interpreted relationship: a person or the relation
/// to the next person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationEntry {
    Person(Person),
    Relation(RelationToken),
}

impl RelationEntry {
    pub fn person(&self) -> Option<&Person> {
        match self {
            Self::Person(p) => Some(p),
            Self::Relation(_) => None,
        }
    }

    pub fn token(&self) -> Option<RelationToken> {
        match self {
            Self::Relation(t) => Some(*t),
            Self::Person(_) => None,
        }
    }
}

impl fmt::Display for RelationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person(p) => write!(f, "{}", p.display_name()),
            Self::Relation(t) => write!(f, "{}", t),
        }
    }
}

/// A path with every leg turned into a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedPath {
    pub start: Person,
    pub legs: Vec<(RelationToken, Person)>,
}

/// Turns each edge of the path into a token, taking its stored
/// direction into account.
pub fn tokenize(path: &KinPath) -> TokenizedPath {
    let legs = path
        .legs()
        .map(|leg| {
            let token = match leg.edge.kind {
                EdgeKind::Spouse => RelationToken::Spouse,
                EdgeKind::Child if leg.is_forward() => RelationToken::Child,
                EdgeKind::Child => RelationToken::Parent,
            };
            (token, leg.to.clone())
        })
        .collect();

    TokenizedPath {
        start: path.start().clone(),
        legs,
    }
}

/// Compressor state between legs.
#[derive(Debug)]
enum State {
    /// Nothing held back; the next leg is emitted as-is unless it is `PARENT`.
    ExpectNode,
    /// A `PARENT` leg is held back until we know whether the walk turns down.
    AfterParent { parent: Person },
    /// A sibling pair was just emitted.
    SiblingEmitted,
}

/// Collapses every `PARENT` leg that is immediately followed by a
/// `CHILD` leg into a single `SIBLING` token, suppressing the parent.
pub fn compress(path: TokenizedPath) -> Vec<RelationEntry> {
    let mut out = Vec::with_capacity(path.legs.len() * 2 + 1);
    out.push(RelationEntry::Person(path.start));

    let mut state = State::ExpectNode;

    for (token, person) in path.legs {
        state = match (state, token) {
            (State::AfterParent { .. }, RelationToken::Child) => {
                out.push(RelationEntry::Relation(RelationToken::Sibling));
                out.push(RelationEntry::Person(person));
                State::SiblingEmitted
            }
            (State::AfterParent { parent }, token) => {
                out.push(RelationEntry::Relation(RelationToken::Parent));
                out.push(RelationEntry::Person(parent));
                hold_or_emit(&mut out, token, person)
            }
            (State::ExpectNode | State::SiblingEmitted, token) => {
                hold_or_emit(&mut out, token, person)
            }
        };
    }

    if let State::AfterParent { parent } = state {
        out.push(RelationEntry::Relation(RelationToken::Parent));
        out.push(RelationEntry::Person(parent));
    }

    out
}

fn hold_or_emit(out: &mut Vec<RelationEntry>, token: RelationToken, person: Person) -> State {
    if token == RelationToken::Parent {
        return State::AfterParent { parent: person };
    }
    out.push(RelationEntry::Relation(token));
    out.push(RelationEntry::Person(person));
    State::ExpectNode
}

/// Interprets an already fetched path.
pub fn interpret_path(path: &KinPath) -> Vec<RelationEntry> {
    compress(tokenize(path))
}

/// Finds the shortest path between two people and describes it.
pub fn interpret_relationship<S: GraphStore + ?Sized>(
    store: &S,
    from: PersonId,
    to: PersonId,
) -> Result<Vec<RelationEntry>> {
    let path = store.shortest_path(from, to)?;
    let relation = interpret_path(&path);
    debug!(
        "Relation {} -> {}: {} legs compressed to {} entries",
        from,
        to,
        path.len(),
        relation.len()
    );
    Ok(relation)
}

/// Joins an interpreted relationship into a readable line,
/// e.g. `Ann Doe -> SIBLING -> Bob Doe`.
pub fn describe(relation: &[RelationEntry]) -> String {
    relation
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
