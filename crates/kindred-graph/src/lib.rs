//! Kindred Graph - kinship storage and interpretation
//!
//! This crate stores people and their CHILD and SPOUSE relations, and
//! answers the two questions that need real work:
//!
//! - the nested family tree below the oldest root ancestor
//! - how two arbitrary people are related, with siblings inferred from
//!   the shape of the path between them
//!
//! # Architecture
//!
//! The graph uses petgraph internally behind the [`GraphStore`] trait.
//! [`TreeBuilder`] and [`interpret_relationship`] only talk to that
//! trait, so any store with the same queries can back them.
//!
//! # Example
//!
//! ```
//! use kindred_core::NewPerson;
//! use kindred_graph::{interpret_relationship, EdgeKind, GraphStore, KinGraph, RelationToken};
//!
//! let mut graph = KinGraph::new();
//! let mum = graph.create_person(NewPerson::new("Mary", "Smith")).unwrap();
//! let ann = graph.create_person(NewPerson::new("Ann", "Smith")).unwrap();
//! let bob = graph.create_person(NewPerson::new("Bob", "Smith")).unwrap();
//! graph.create_edge(mum, ann, EdgeKind::Child).unwrap();
//! graph.create_edge(mum, bob, EdgeKind::Child).unwrap();
//!
//! let relation = interpret_relationship(&graph, ann, bob).unwrap();
//! assert_eq!(relation[1].token(), Some(RelationToken::Sibling));
//! ```

mod edge;
mod error;
mod graph;
mod path;
mod relation;
mod snapshot;
mod store;
mod tree;

pub use edge::{Edge, EdgeKind, GraphEdge};
pub use error::{KinError, Result};
pub use graph::{GraphStats, KinGraph, NodeId};
pub use path::{KinPath, Leg};
pub use relation::{
    compress, describe, interpret_path, interpret_relationship, tokenize, RelationEntry,
    RelationToken, TokenizedPath,
};
pub use snapshot::{SnapshotStore, StoreError};
pub use store::GraphStore;
pub use tree::{
    build_family_tree, FamilyTreeNode, Marriage, PersonRef, SpouseNode, TreeBuilder,
    DEFAULT_MAX_DEPTH,
};
