//! Paths through the kinship graph.
//!
//! A path alternates people and edges: `p0, e0, p1, e1, ..., pn`. The
//! edges keep their stored direction so the interpreter can tell a
//! parent from a child.

use crate::edge::GraphEdge;
use crate::error::{KinError, Result};
use kindred_core::Person;
use serde::Serialize;

/// A shortest path between two distinct people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KinPath {
    nodes: Vec<Person>,
    edges: Vec<GraphEdge>,
}

/// One step of a path: the edge between two consecutive people.
#[derive(Debug, Clone, Copy)]
pub struct Leg<'a> {
    pub from: &'a Person,
    pub edge: &'a GraphEdge,
    pub to: &'a Person,
}

impl Leg<'_> {
    /// True when the stored edge points the same way the path walks.
    pub fn is_forward(&self) -> bool {
        self.edge.from == self.from.id && self.edge.to == self.to.id
    }
}

impl KinPath {
    /// Builds a path, checking that it alternates correctly.
    ///
    /// A path needs at least one edge, exactly one fewer edge than
    /// people, and every edge must join the people on either side of it.
    pub fn new(nodes: Vec<Person>, edges: Vec<GraphEdge>) -> Result<Self> {
        let first = match nodes.first() {
            Some(p) => p.id,
            None => return Err(KinError::InvalidRelation("empty path".to_string())),
        };

        if edges.is_empty() {
            return Err(KinError::SameIdentity(first));
        }

        if nodes.len() != edges.len() + 1 {
            return Err(KinError::InvalidRelation(format!(
                "path has {} people but {} edges",
                nodes.len(),
                edges.len()
            )));
        }

        for (i, edge) in edges.iter().enumerate() {
            let (a, b) = (nodes[i].id, nodes[i + 1].id);
            if !edge.connects(a, b) {
                return Err(KinError::InvalidRelation(format!(
                    "edge {} -> {} does not join {} and {}",
                    edge.from, edge.to, a, b
                )));
            }
        }

        Ok(Self { nodes, edges })
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Always false for a constructed path; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn start(&self) -> &Person {
        &self.nodes[0]
    }

    pub fn end(&self) -> &Person {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn nodes(&self) -> &[Person] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Iterates over consecutive `(from, edge, to)` steps.
    pub fn legs(&self) -> impl Iterator<Item = Leg<'_>> + '_ {
        self.edges.iter().enumerate().map(move |(i, edge)| Leg {
            from: &self.nodes[i],
            edge,
            to: &self.nodes[i + 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeKind;
    use kindred_core::PersonId;

    fn person(id: u64) -> Person {
        Person::new(PersonId::new(id), format!("p{}", id), "Test")
    }

    fn edge(from: u64, to: u64, kind: EdgeKind) -> GraphEdge {
        GraphEdge::new(PersonId::new(from), PersonId::new(to), kind)
    }

    #[test]
    fn test_valid_path() {
        let path = KinPath::new(
            vec![person(1), person(0), person(2)],
            vec![edge(0, 1, EdgeKind::Child), edge(0, 2, EdgeKind::Child)],
        )
        .unwrap();

        assert_eq!(path.len(), 2);
        assert_eq!(path.start().id, PersonId::new(1));
        assert_eq!(path.end().id, PersonId::new(2));

        let forward: Vec<bool> = path.legs().map(|l| l.is_forward()).collect();
        assert_eq!(forward, vec![false, true]);
    }

    #[test]
    fn test_single_node_path_is_same_identity() {
        let err = KinPath::new(vec![person(5)], vec![]).unwrap_err();
        assert_eq!(err, KinError::SameIdentity(PersonId::new(5)));
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = KinPath::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, KinError::InvalidRelation(_)));
    }

    #[test]
    fn test_serializes_validated_path() {
        let path = KinPath::new(vec![person(0), person(1)], vec![edge(0, 1, EdgeKind::Spouse)])
            .unwrap();
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json["nodes"][1]["id"], 1);
        assert_eq!(json["edges"][0]["kind"], "SPOUSE");
    }

    #[test]
    fn test_mismatched_counts_rejected() {
        let err = KinPath::new(
            vec![person(1), person(2), person(3)],
            vec![edge(1, 2, EdgeKind::Spouse)],
        )
        .unwrap_err();
        assert!(matches!(err, KinError::InvalidRelation(_)));
    }

    #[test]
    fn test_edge_must_join_neighbours() {
        let err = KinPath::new(
            vec![person(1), person(2)],
            vec![edge(1, 3, EdgeKind::Child)],
        )
        .unwrap_err();
        assert!(matches!(err, KinError::InvalidRelation(_)));
    }
}
