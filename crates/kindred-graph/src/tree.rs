//! Family tree construction.
//!
//! The tree starts at the oldest root ancestor. Below each person it
//! lists one marriage per spouse, and below each marriage the children
//! both partners share. Children with a single recorded parent do not
//! appear, because they belong to no marriage.

use crate::error::{KinError, Result};
use crate::store::GraphStore;
use kindred_core::{Person, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Default bound on the number of generations below the root.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Reference back to the stored person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: PersonId,
}

/// A person in the family tree together with their marriages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTreeNode {
    #[serde(rename = "name")]
    pub display_name: String,

    #[serde(rename = "extra")]
    pub person_ref: PersonRef,

    pub marriages: Vec<Marriage>,
}

/// The spouse side of a marriage. Spouses are not expanded further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseNode {
    #[serde(rename = "name")]
    pub display_name: String,

    #[serde(rename = "extra")]
    pub person_ref: PersonRef,
}

/// One marriage and the children of that couple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marriage {
    pub spouse: SpouseNode,
    pub children: Vec<FamilyTreeNode>,
}

impl FamilyTreeNode {
    /// Total number of people in this subtree, spouses included.
    pub fn size(&self) -> usize {
        1 + self
            .marriages
            .iter()
            .map(|m| 1 + m.children.iter().map(FamilyTreeNode::size).sum::<usize>())
            .sum::<usize>()
    }

    /// Number of generations in this subtree, counting this node.
    pub fn depth(&self) -> usize {
        1 + self
            .marriages
            .iter()
            .flat_map(|m| m.children.iter())
            .map(FamilyTreeNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Builds nested family trees from a [`GraphStore`].
pub struct TreeBuilder<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    max_depth: usize,
}

impl<'a, S: GraphStore + ?Sized> TreeBuilder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Caps how many generations the builder descends before giving up.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Builds the tree rooted at the oldest root ancestor.
    pub fn build(&self) -> Result<FamilyTreeNode> {
        let root = self.store.find_oldest_root_person()?;
        debug!("Building family tree from {}", root);
        self.build_from(&root)
    }

    /// Builds the tree below an arbitrary person.
    pub fn build_from(&self, person: &Person) -> Result<FamilyTreeNode> {
        let mut line = HashSet::new();
        self.assemble(person, &mut line)
    }

    /// `line` holds everyone on the path from the root to `person`.
    fn assemble(&self, person: &Person, line: &mut HashSet<PersonId>) -> Result<FamilyTreeNode> {
        if !line.insert(person.id) || line.len() > self.max_depth {
            return Err(KinError::CyclicGraph { person: person.id });
        }

        let spouses = self.store.find_spouses(person.id)?;
        let mut marriages = Vec::with_capacity(spouses.len());

        for spouse in spouses {
            let children = self.store.find_common_children(person.id, spouse.id)?;
            let children = children
                .iter()
                .map(|child| self.assemble(child, line))
                .collect::<Result<Vec<_>>>()?;

            marriages.push(Marriage {
                spouse: SpouseNode {
                    display_name: spouse.display_name(),
                    person_ref: PersonRef { id: spouse.id },
                },
                children,
            });
        }

        line.remove(&person.id);

        Ok(FamilyTreeNode {
            display_name: person.display_name(),
            person_ref: PersonRef { id: person.id },
            marriages,
        })
    }
}

/// Builds the full family tree with default limits.
pub fn build_family_tree<S: GraphStore + ?Sized>(store: &S) -> Result<FamilyTreeNode> {
    TreeBuilder::new(store).build()
}
