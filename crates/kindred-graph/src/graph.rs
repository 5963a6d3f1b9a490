//! Core graph data structure.
//!
//! KinGraph wraps petgraph and keeps an index from person ids to graph
//! nodes. It's the in-memory GraphStore everything else is built on.

use crate::edge::{Edge, EdgeKind, GraphEdge};
use crate::error::{KinError, Result};
use crate::path::KinPath;
use crate::store::GraphStore;
use kindred_core::{NewPerson, Person, PersonId};
use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Index of a person inside the petgraph graph.
pub type NodeId = NodeIndex;

/// The family graph.
///
/// People are nodes; CHILD and SPOUSE relations are edges. SPOUSE edges
/// are stored with whatever direction they were created with and read
/// back in both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KinGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<Person, Edge>,

    /// Maps person ids to graph node indexes.
    id_index: HashMap<PersonId, NodeId>,

    /// One past the largest id ever inserted.
    next_id: PersonId,
}

impl KinGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a person whose id is already assigned. Fails if the id is
    /// taken. [`GraphStore::create_person`] assigns the id and calls this.
    pub fn insert_person(&mut self, person: Person) -> Result<NodeId> {
        if self.id_index.contains_key(&person.id) {
            return Err(KinError::InvalidRelation(format!(
                "person {} already exists",
                person.id
            )));
        }
        let id = person.id;
        let index = self.graph.add_node(person);
        self.id_index.insert(id, index);
        self.next_id = self.next_id.max(id.next());
        Ok(index)
    }

    /// Gets a person by id.
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        let index = self.id_index.get(&id)?;
        self.graph.node_weight(*index)
    }

    fn index_of(&self, id: PersonId) -> Result<NodeId> {
        self.id_index.get(&id).copied().ok_or(KinError::NotFound(id))
    }

    fn person_at(&self, index: NodeId) -> &Person {
        &self.graph[index]
    }

    /// The id the next created person will receive.
    pub fn next_id(&self) -> PersonId {
        self.next_id
    }

    /// Every person, ordered by id.
    pub fn members(&self) -> Vec<&Person> {
        let mut people: Vec<&Person> = self.graph.node_weights().collect();
        people.sort_by_key(|p| p.id);
        people
    }

    /// Every stored SPOUSE edge as a pair, in stored direction and
    /// creation order.
    pub fn spouse_pairs(&self) -> Vec<(&Person, &Person)> {
        self.graph
            .edge_references()
            .filter(|e| e.weight().kind == EdgeKind::Spouse)
            .map(|e| (self.person_at(e.source()), self.person_at(e.target())))
            .collect()
    }

    /// All edges with their endpoint ids, in creation order.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        self.graph
            .edge_references()
            .map(|e| self.graph_edge(e))
            .collect()
    }

    fn graph_edge(&self, edge: EdgeReference<'_, Edge>) -> GraphEdge {
        GraphEdge::new(
            self.person_at(edge.source()).id,
            self.person_at(edge.target()).id,
            edge.weight().kind,
        )
    }

    /// Returns the number of people.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of stored relations.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct children of a node, in ascending id order.
    fn children(&self, index: NodeId) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .filter(|e| e.weight().kind == EdgeKind::Child)
            .map(|e| e.target())
            .collect();
        children.sort_by_key(|idx| self.person_at(*idx).id);
        children.dedup();
        children
    }

    fn has_parent(&self, index: NodeId) -> bool {
        self.graph
            .edges_directed(index, Direction::Incoming)
            .any(|e| e.weight().kind == EdgeKind::Child)
    }

    /// Has descendants and no recorded parent.
    fn is_root_candidate(&self, index: NodeId) -> bool {
        !self.has_parent(index) && !self.children(index).is_empty()
    }

    /// Neighbours over both edge kinds and both directions, ordered by
    /// person id and then by edge index so traversal is repeatable.
    fn undirected_neighbors(&self, index: NodeId) -> Vec<(NodeId, EdgeIndex, GraphEdge)> {
        let mut out: Vec<(NodeId, EdgeIndex, GraphEdge)> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|e| (e.target(), e.id(), self.graph_edge(e)))
            .chain(
                self.graph
                    .edges_directed(index, Direction::Incoming)
                    .map(|e| (e.source(), e.id(), self.graph_edge(e))),
            )
            .collect();
        out.sort_by_key(|(node, edge, _)| (self.person_at(*node).id, *edge));
        out
    }

    fn has_edge(&self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        let forward = self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight().kind == kind);
        if forward || !kind.is_symmetric() {
            return forward;
        }
        self.graph
            .edges_connecting(to, from)
            .any(|e| e.weight().kind == kind)
    }

    /// Length of the longest CHILD-only chain below `index`.
    ///
    /// `memo` holds finished nodes; `open` holds the nodes on the explicit
    /// DFS stack. Meeting a node that is still open means the CHILD
    /// relation loops.
    fn descent_depth(
        &self,
        index: NodeId,
        memo: &mut HashMap<NodeId, usize>,
        open: &mut HashSet<NodeId>,
    ) -> Result<usize> {
        if let Some(depth) = memo.get(&index) {
            return Ok(*depth);
        }

        open.insert(index);
        let mut stack = vec![DescentFrame::new(index, self.children(index))];

        while let Some(frame) = stack.last_mut() {
            if let Some(&child) = frame.children.get(frame.next) {
                frame.next += 1;
                if memo.contains_key(&child) {
                    continue;
                }
                if !open.insert(child) {
                    return Err(KinError::CyclicGraph {
                        person: self.person_at(child).id,
                    });
                }
                let children = self.children(child);
                stack.push(DescentFrame::new(child, children));
                continue;
            }

            let deepest = frame
                .children
                .iter()
                .filter_map(|child| memo.get(child))
                .map(|depth| depth + 1)
                .max()
                .unwrap_or(0);
            let node = frame.node;
            stack.pop();
            open.remove(&node);
            memo.insert(node, deepest);
        }

        Ok(memo.get(&index).copied().unwrap_or(0))
    }
}

/// One level of the descent walk: a node and how many of its children
/// have been visited.
struct DescentFrame {
    node: NodeId,
    children: Vec<NodeId>,
    next: usize,
}

impl DescentFrame {
    fn new(node: NodeId, children: Vec<NodeId>) -> Self {
        Self {
            node,
            children,
            next: 0,
        }
    }
}

impl GraphStore for KinGraph {
    fn find_oldest_root_person(&self) -> Result<Person> {
        let mut memo = HashMap::new();
        let mut open = HashSet::new();
        let mut best: Option<(usize, NodeId)> = None;

        for index in self.graph.node_indices() {
            if !self.is_root_candidate(index) {
                continue;
            }
            let depth = self.descent_depth(index, &mut memo, &mut open)?;
            let id = self.person_at(index).id;

            // Equal depths go to the lower id.
            let better = match best {
                None => true,
                Some((best_depth, best_index)) => {
                    depth > best_depth
                        || (depth == best_depth && id < self.person_at(best_index).id)
                }
            };
            if better {
                best = Some((depth, index));
            }
        }

        let (depth, index) = best.ok_or(KinError::NoRootFound)?;
        let root = self.person_at(index).clone();
        debug!("Oldest root is {} with descent depth {}", root, depth);
        Ok(root)
    }

    fn find_spouses(&self, person: PersonId) -> Result<Vec<Person>> {
        let index = self.index_of(person)?;

        let mut spouses: Vec<NodeId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .filter(|e| e.weight().kind == EdgeKind::Spouse)
            .map(|e| e.target())
            .chain(
                self.graph
                    .edges_directed(index, Direction::Incoming)
                    .filter(|e| e.weight().kind == EdgeKind::Spouse)
                    .map(|e| e.source()),
            )
            .collect();
        spouses.sort_by_key(|idx| self.person_at(*idx).id);
        spouses.dedup();

        Ok(spouses
            .into_iter()
            .map(|idx| self.person_at(idx).clone())
            .collect())
    }

    fn find_common_children(&self, person: PersonId, spouse: PersonId) -> Result<Vec<Person>> {
        let a = self.index_of(person)?;
        let b = self.index_of(spouse)?;

        let of_b: HashSet<NodeId> = self.children(b).into_iter().collect();
        Ok(self
            .children(a)
            .into_iter()
            .filter(|child| of_b.contains(child))
            .map(|idx| self.person_at(idx).clone())
            .collect())
    }

    fn shortest_path(&self, from: PersonId, to: PersonId) -> Result<KinPath> {
        let start = self.index_of(from)?;
        let goal = self.index_of(to)?;
        if start == goal {
            return Err(KinError::SameIdentity(from));
        }

        let mut came_from: HashMap<NodeId, (NodeId, GraphEdge)> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                break;
            }
            for (next, _, edge) in self.undirected_neighbors(current) {
                if visited.insert(next) {
                    came_from.insert(next, (current, edge));
                    queue.push_back(next);
                }
            }
        }

        if !came_from.contains_key(&goal) {
            return Err(KinError::Disconnected { from, to });
        }

        let mut nodes = vec![self.person_at(goal).clone()];
        let mut edges = Vec::new();
        let mut cursor = goal;
        while let Some((prev, edge)) = came_from.remove(&cursor) {
            edges.push(edge);
            nodes.push(self.person_at(prev).clone());
            cursor = prev;
        }
        nodes.reverse();
        edges.reverse();

        debug!("Shortest path {} -> {} has {} legs", from, to, edges.len());
        KinPath::new(nodes, edges)
    }

    fn create_person(&mut self, person: NewPerson) -> Result<PersonId> {
        let id = self.next_id();
        self.insert_person(person.into_person(id))?;
        debug!("Created person {}", id);
        Ok(id)
    }

    fn create_edge(&mut self, from: PersonId, to: PersonId, kind: EdgeKind) -> Result<()> {
        let a = self.index_of(from)?;
        let b = self.index_of(to)?;

        if a == b {
            return Err(KinError::InvalidRelation(format!(
                "{} edge from {} to itself",
                kind, from
            )));
        }
        if self.has_edge(a, b, kind) {
            return Err(KinError::InvalidRelation(format!(
                "{} edge between {} and {} already exists",
                kind, from, to
            )));
        }

        self.graph.add_edge(a, b, Edge::new(kind));
        debug!("Created {} edge {} -> {}", kind, from, to);
        Ok(())
    }
}

/// Graph statistics for the info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub people: usize,
    pub child_edges: usize,
    pub spouse_edges: usize,
}

impl KinGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let spouse_edges = self
            .graph
            .edge_weights()
            .filter(|e| e.kind == EdgeKind::Spouse)
            .count();
        GraphStats {
            people: self.node_count(),
            child_edges: self.edge_count() - spouse_edges,
            spouse_edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(graph: &mut KinGraph, name: &str) -> PersonId {
        graph.create_person(NewPerson::new(name, "Test")).unwrap()
    }

    #[test]
    fn test_ids_are_max_plus_one() {
        let mut graph = KinGraph::new();
        assert_eq!(add(&mut graph, "a"), PersonId::new(0));
        assert_eq!(add(&mut graph, "b"), PersonId::new(1));

        graph
            .insert_person(Person::new(PersonId::new(10), "c", "Test"))
            .unwrap();
        assert_eq!(add(&mut graph, "d"), PersonId::new(11));

        let taken = graph.insert_person(Person::new(PersonId::new(10), "e", "Test"));
        assert!(matches!(taken, Err(KinError::InvalidRelation(_))));
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.next_id(), PersonId::new(12));
    }

    #[test]
    fn test_edge_requires_existing_endpoints() {
        let mut graph = KinGraph::new();
        let a = add(&mut graph, "a");
        let err = graph
            .create_edge(a, PersonId::new(42), EdgeKind::Child)
            .unwrap_err();
        assert_eq!(err, KinError::NotFound(PersonId::new(42)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_rejects_self_and_duplicate_edges() {
        let mut graph = KinGraph::new();
        let a = add(&mut graph, "a");
        let b = add(&mut graph, "b");

        assert!(matches!(
            graph.create_edge(a, a, EdgeKind::Spouse),
            Err(KinError::InvalidRelation(_))
        ));

        graph.create_edge(a, b, EdgeKind::Spouse).unwrap();
        // Reversed spouse edge is the same marriage.
        assert!(matches!(
            graph.create_edge(b, a, EdgeKind::Spouse),
            Err(KinError::InvalidRelation(_))
        ));

        graph.create_edge(a, b, EdgeKind::Child).unwrap();
        assert!(matches!(
            graph.create_edge(a, b, EdgeKind::Child),
            Err(KinError::InvalidRelation(_))
        ));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_spouses_are_undirected() {
        let mut graph = KinGraph::new();
        let a = add(&mut graph, "a");
        let b = add(&mut graph, "b");
        let c = add(&mut graph, "c");
        graph.create_edge(a, c, EdgeKind::Spouse).unwrap();
        graph.create_edge(b, a, EdgeKind::Spouse).unwrap();

        let ids: Vec<PersonId> = graph
            .find_spouses(a)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![b, c]);

        let ids: Vec<PersonId> = graph
            .find_spouses(b)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![a]);
    }

    #[test]
    fn test_common_children() {
        let mut graph = KinGraph::new();
        let mum = add(&mut graph, "mum");
        let dad = add(&mut graph, "dad");
        let step = add(&mut graph, "step");
        let one = add(&mut graph, "one");
        let two = add(&mut graph, "two");
        let half = add(&mut graph, "half");

        for child in [one, two] {
            graph.create_edge(mum, child, EdgeKind::Child).unwrap();
            graph.create_edge(dad, child, EdgeKind::Child).unwrap();
        }
        graph.create_edge(mum, half, EdgeKind::Child).unwrap();
        graph.create_edge(step, half, EdgeKind::Child).unwrap();

        let ids: Vec<PersonId> = graph
            .find_common_children(mum, dad)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![one, two]);

        let ids: Vec<PersonId> = graph
            .find_common_children(mum, step)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![half]);
    }

    #[test]
    fn test_oldest_root_prefers_deepest_line() {
        // shallow -> x
        // deep -> y -> z
        let mut graph = KinGraph::new();
        let shallow = add(&mut graph, "shallow");
        let x = add(&mut graph, "x");
        let deep = add(&mut graph, "deep");
        let y = add(&mut graph, "y");
        let z = add(&mut graph, "z");
        graph.create_edge(shallow, x, EdgeKind::Child).unwrap();
        graph.create_edge(deep, y, EdgeKind::Child).unwrap();
        graph.create_edge(y, z, EdgeKind::Child).unwrap();

        assert_eq!(graph.find_oldest_root_person().unwrap().id, deep);
    }

    #[test]
    fn test_oldest_root_tie_goes_to_lowest_id() {
        let mut graph = KinGraph::new();
        let a = add(&mut graph, "a");
        let b = add(&mut graph, "b");
        let a_child = add(&mut graph, "ac");
        let b_child = add(&mut graph, "bc");
        graph.create_edge(b, b_child, EdgeKind::Child).unwrap();
        graph.create_edge(a, a_child, EdgeKind::Child).unwrap();

        assert_eq!(graph.find_oldest_root_person().unwrap().id, a);
    }

    #[test]
    fn test_no_root_in_empty_or_childless_graph() {
        let mut graph = KinGraph::new();
        assert_eq!(
            graph.find_oldest_root_person().unwrap_err(),
            KinError::NoRootFound
        );

        let a = add(&mut graph, "a");
        let b = add(&mut graph, "b");
        graph.create_edge(a, b, EdgeKind::Spouse).unwrap();
        assert_eq!(
            graph.find_oldest_root_person().unwrap_err(),
            KinError::NoRootFound
        );
    }

    #[test]
    fn test_pure_cycle_has_no_root() {
        let mut graph = KinGraph::new();
        let a = add(&mut graph, "a");
        let b = add(&mut graph, "b");
        graph.create_edge(a, b, EdgeKind::Child).unwrap();
        graph.create_edge(b, a, EdgeKind::Child).unwrap();

        assert_eq!(
            graph.find_oldest_root_person().unwrap_err(),
            KinError::NoRootFound
        );
    }

    #[test]
    fn test_cycle_below_root_is_reported() {
        // root -> a -> b -> a
        let mut graph = KinGraph::new();
        let root = add(&mut graph, "root");
        let a = add(&mut graph, "a");
        let b = add(&mut graph, "b");
        graph.create_edge(root, a, EdgeKind::Child).unwrap();
        graph.create_edge(a, b, EdgeKind::Child).unwrap();
        graph.create_edge(b, a, EdgeKind::Child).unwrap();

        assert!(matches!(
            graph.find_oldest_root_person(),
            Err(KinError::CyclicGraph { .. })
        ));
    }

    fn chain(graph: &mut KinGraph, generations: usize) -> Vec<PersonId> {
        let ids: Vec<PersonId> = (0..generations)
            .map(|i| add(graph, &format!("gen{}", i)))
            .collect();
        for pair in ids.windows(2) {
            graph.create_edge(pair[0], pair[1], EdgeKind::Child).unwrap();
        }
        ids
    }

    #[test]
    fn test_oldest_root_on_ten_thousand_generations() {
        let mut graph = KinGraph::new();
        let line = chain(&mut graph, 10_000);

        // A shallow family beside the long line.
        let other = add(&mut graph, "other");
        let kid = add(&mut graph, "kid");
        graph.create_edge(other, kid, EdgeKind::Child).unwrap();

        let root = graph.find_oldest_root_person().unwrap();
        assert_eq!(root.id, line[0]);
    }

    #[test]
    fn test_cycle_at_bottom_of_long_line_is_reported() {
        let mut graph = KinGraph::new();
        let line = chain(&mut graph, 10_000);
        graph
            .create_edge(line[9_999], line[5_000], EdgeKind::Child)
            .unwrap();

        assert_eq!(
            graph.find_oldest_root_person().unwrap_err(),
            KinError::CyclicGraph { person: line[5_000] }
        );
    }

    #[test]
    fn test_shortest_path_walks_edges_backwards() {
        let mut graph = KinGraph::new();
        let parent = add(&mut graph, "parent");
        let child = add(&mut graph, "child");
        graph.create_edge(parent, child, EdgeKind::Child).unwrap();

        let path = graph.shortest_path(child, parent).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.start().id, child);
        assert_eq!(path.end().id, parent);
        assert_eq!(path.edges()[0].from, parent);
    }

    #[test]
    fn test_shortest_path_picks_fewest_legs() {
        // a -> b -> c -> d, and a spouse of d
        let mut graph = KinGraph::new();
        let a = add(&mut graph, "a");
        let b = add(&mut graph, "b");
        let c = add(&mut graph, "c");
        let d = add(&mut graph, "d");
        graph.create_edge(a, b, EdgeKind::Child).unwrap();
        graph.create_edge(b, c, EdgeKind::Child).unwrap();
        graph.create_edge(c, d, EdgeKind::Child).unwrap();
        graph.create_edge(d, a, EdgeKind::Spouse).unwrap();

        let path = graph.shortest_path(a, d).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.edges()[0].kind, EdgeKind::Spouse);
    }

    #[test]
    fn test_shortest_path_errors() {
        let mut graph = KinGraph::new();
        let a = add(&mut graph, "a");
        let b = add(&mut graph, "b");

        assert_eq!(
            graph.shortest_path(a, a).unwrap_err(),
            KinError::SameIdentity(a)
        );
        assert_eq!(
            graph.shortest_path(a, b).unwrap_err(),
            KinError::Disconnected { from: a, to: b }
        );
        assert_eq!(
            graph.shortest_path(a, PersonId::new(99)).unwrap_err(),
            KinError::NotFound(PersonId::new(99))
        );
    }

    #[test]
    fn test_members_and_spouse_pairs() {
        let mut graph = KinGraph::new();
        let a = add(&mut graph, "a");
        let b = add(&mut graph, "b");
        let c = add(&mut graph, "c");
        graph.create_edge(b, a, EdgeKind::Spouse).unwrap();
        graph.create_edge(a, c, EdgeKind::Child).unwrap();

        let ids: Vec<PersonId> = graph.members().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a, b, c]);

        let pairs = graph.spouse_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].0.id, pairs[0].1.id), (b, a));

        let stats = graph.stats();
        assert_eq!(stats.people, 3);
        assert_eq!(stats.child_edges, 1);
        assert_eq!(stats.spouse_edges, 1);
    }
}
