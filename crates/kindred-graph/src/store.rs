//! The query surface the tree builder and path interpreter depend on.

use crate::edge::EdgeKind;
use crate::error::Result;
use crate::path::KinPath;
use kindred_core::{NewPerson, Person, PersonId};

/// Storage and query operations over a kinship graph.
///
/// Implementations must return lists in a deterministic order so that
/// repeated queries over an unchanged graph give identical answers.
pub trait GraphStore {
    /// The root ancestor with the deepest line of descendants.
    fn find_oldest_root_person(&self) -> Result<Person>;

    /// Everyone married to `person`, regardless of stored edge direction.
    fn find_spouses(&self, person: PersonId) -> Result<Vec<Person>>;

    /// Children that have both `person` and `spouse` as parents.
    fn find_common_children(&self, person: PersonId, spouse: PersonId) -> Result<Vec<Person>>;

    /// Shortest path over the undirected view of the graph.
    fn shortest_path(&self, from: PersonId, to: PersonId) -> Result<KinPath>;

    /// Stores a new person and returns the assigned id.
    fn create_person(&mut self, person: NewPerson) -> Result<PersonId>;

    /// Stores a relation. Both ends must already exist.
    fn create_edge(&mut self, from: PersonId, to: PersonId, kind: EdgeKind) -> Result<()>;
}
