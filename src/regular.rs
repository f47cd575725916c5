//! Regularity test via a per-variable decision tree.
//!
//! A positive function is *regular* (under the importance order of its
//! variables) if moving a 1 one position to the left in any true point keeps
//! the point true. Threshold functions are regular once their variables are
//! sorted by importance, so a failed neighbour-swap test rejects the input
//! before the LP is ever formulated.
//!
//! The test needs an implicant oracle. The [`DnfTree`] indexes the DNF by
//! variable: splitting a node at depth `d` sends the clauses whose first
//! literal is `d` (stripped) to the left child and everything else to the
//! right child. Walking a point through the tree then decides implicanthood
//! without touching the clause set again.

use rayon::prelude::*;

use crate::clause::{BooleanVector, ClauseSet, Finality};

/// Decision-tree node; children are arena indices into [`DnfTree`].
#[derive(Debug, Clone)]
struct DnfTreeNode {
    phi: ClauseSet,
    /// Followed when the depth variable is 1.
    left_child: Option<usize>,
    /// Followed when the depth variable is 0.
    right_child: Option<usize>,
    is_final: bool,
    depth: usize,
}

/// Arena-allocated decision tree over a DNF; the root is node 0.
#[derive(Debug, Clone, Default)]
pub struct DnfTree {
    nodes: Vec<DnfTreeNode>,
    nbvar: usize,
}

impl DnfTree {
    pub fn new(nbvar: usize) -> Self {
        Self {
            nodes: Vec::new(),
            nbvar,
        }
    }

    fn create_node(&mut self, phi: ClauseSet, depth: usize, is_final: bool) -> usize {
        self.nodes.push(DnfTreeNode {
            phi,
            left_child: None,
            right_child: None,
            is_final,
            depth,
        });
        self.nodes.len() - 1
    }

    /// Create the root; must be the first node.
    pub fn create_root(&mut self, phi: ClauseSet, is_final: bool) -> usize {
        assert!(self.nodes.is_empty(), "root must be the first node");
        self.create_node(phi, 0, is_final)
    }

    fn create_left_child(&mut self, node_id: usize, phi: ClauseSet, is_final: bool) -> usize {
        let depth = self.nodes[node_id].depth;
        let id = self.create_node(phi, depth + 1, is_final);
        self.nodes[node_id].left_child = Some(id);
        id
    }

    fn create_right_child(&mut self, node_id: usize, phi: ClauseSet, is_final: bool) -> usize {
        let depth = self.nodes[node_id].depth;
        let id = self.create_node(phi, depth + 1, is_final);
        self.nodes[node_id].right_child = Some(id);
        id
    }

    fn is_leaf(&self, node_id: usize) -> bool {
        let node = &self.nodes[node_id];
        node.left_child.is_none() && node.right_child.is_none()
    }

    /// Partition the node's DNF on its depth variable: clauses led by the
    /// variable go left (stripped), the rest go right.
    fn split(&self, node_id: usize) -> ((bool, ClauseSet), (bool, ClauseSet)) {
        let node = &self.nodes[node_id];
        let variable = node.depth as u32;
        let mut first = ClauseSet::with_capacity(node.phi.len());
        let mut second = ClauseSet::with_capacity(node.phi.len());
        for clause in &node.phi {
            if !clause.is_empty() && clause[0] == variable {
                first.push(clause[1..].to_vec());
            } else {
                second.push(clause.clone());
            }
        }
        let first_final = first.finality() != Finality::NotFinal;
        let second_final = second.finality() != Finality::NotFinal;
        ((first_final, first), (second_final, second))
    }

    /// Build the whole tree, breadth first. Nodes with a trivially true or
    /// false DNF are terminal; false leaves are not materialized at all, so
    /// falling off a missing branch carries the answer.
    pub fn build(&mut self) {
        assert_eq!(self.nodes.len(), 1, "build expects exactly the root node");
        if self.nodes[0].is_final {
            return;
        }
        let mut waiting = std::collections::VecDeque::from([0]);
        while let Some(next_id) = waiting.pop_front() {
            if self.nodes[next_id].is_final {
                continue;
            }
            let ((first_final, first), (second_final, second)) = self.split(next_id);
            if !(first_final && first.is_empty()) {
                let left_id = self.create_left_child(next_id, first, first_final);
                if !first_final {
                    waiting.push_back(left_id);
                }
            }
            if !(second_final && second.is_empty()) {
                let right_id = self.create_right_child(next_id, second, second_final);
                if !second_final {
                    waiting.push_back(right_id);
                }
            }
        }
    }

    /// Does the point satisfy the DNF? Reaching a leaf accepts; a 0-bit with
    /// no right branch rejects. A 1-bit with no left branch follows the
    /// right branch, since clauses without the variable still apply.
    pub fn is_implicant(&self, point: &BooleanVector) -> bool {
        let mut node_id = 0;
        for &bit in point {
            if self.is_leaf(node_id) {
                return true;
            }
            let node = &self.nodes[node_id];
            if bit {
                node_id = match (node.left_child, node.right_child) {
                    (Some(left), _) => left,
                    (None, Some(right)) => right,
                    (None, None) => unreachable!("non-leaf node without children"),
                };
            } else {
                match node.right_child {
                    Some(right) => node_id = right,
                    None => return false,
                }
            }
        }
        assert!(self.is_leaf(node_id), "walk ended on an inner node");
        true
    }

    /// Neighbour-swap regularity: for every minimal true point and every
    /// adjacent pair `(0, 1)`, swapping the two bits must keep the point an
    /// implicant. Each point is checked in its own parallel task.
    pub fn is_regular(&self, mtps: &[BooleanVector]) -> bool {
        if self.nbvar < 2 {
            return true;
        }
        mtps.par_iter().all(|mtp| {
            let mut point = mtp.clone();
            for i in 0..self.nbvar - 1 {
                if !point[i] && point[i + 1] {
                    point[i] = true;
                    point[i + 1] = false;
                    let ok = self.is_implicant(&point);
                    point[i] = false;
                    point[i + 1] = true;
                    if !ok {
                        return false;
                    }
                }
            }
            true
        })
    }
}

/// Convenience: build the tree for ϕ in one go.
pub fn build_dnf_tree(phi: &ClauseSet, nbvar: usize) -> DnfTree {
    let mut tree = DnfTree::new(nbvar);
    let is_final = phi.finality() != Finality::NotFinal;
    tree.create_root(phi.clone(), is_final);
    tree.build();
    tree
}
