//! The splitting DAG.
//!
//! A node in column `k` carries the residual DNF obtained by assigning the
//! renamed variables `0..k` to concrete values. Splitting on variable `k`
//! produces the two residuals for `k = 0` and `k = 1`; because every clause
//! is sorted and the variables are renamed by importance, both splits are a
//! single scan over the clause heads.
//!
//! Two node kinds exist. A *main* node is a decision point for one variable.
//! When the next `max_l` variables have equal occurrence patterns they are
//! handled as a symmetric block of *auxiliary* nodes parameterised
//! `(L, L′)`; an auxiliary node with an upper parent does not materialise
//! its own upper residual but shares `upper_parent.upper_child.lower_child`.
//! That sharing is what makes the structure a DAG rather than a tree.
//!
//! All nodes live in a [`TreeContext`] arena indexed by `(column, row)`;
//! parent and child links are [`NodeId`] indices, never pointers. Nodes are
//! created by the split of their parent, registered into their column, and
//! mutated exactly once by their own split.

use std::collections::VecDeque;
use std::fmt;

use log::debug;

use crate::clause::{Clause, ClauseSet, Finality};
use crate::error::{Error, Result};
use crate::pattern::{compute_max_l, patterns_from_dnf, patterns_from_dnf_shift, sort_all, sort_patterns, OccurrencePattern};
use crate::rename::Renaming;

/// Arena index of a node: its column and its row within that column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub column: usize,
    pub row: usize,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Node kind with the per-kind payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Decision point for a single variable. `max_l` is filled in when the
    /// node is split; `is_final` marks a trivially true or false residual.
    Main { max_l: usize, is_final: bool },
    /// Member of a symmetric block of `l` variables; `l_prime` counts how
    /// far into the block this node sits (`1..l-1`).
    Aux { l: usize, l_prime: usize },
}

/// One node of the splitting DAG.
#[derive(Debug, Clone)]
pub struct SplitNode {
    pub phi: ClauseSet,
    pub patterns: Option<Vec<OccurrencePattern>>,
    pub column: usize,
    pub row: usize,
    pub lower_parent: Option<NodeId>,
    pub upper_parent: Option<NodeId>,
    pub lower_child: Option<NodeId>,
    pub upper_child: Option<NodeId>,
    pub already_split: bool,
    pub kind: NodeKind,
}

impl SplitNode {
    /// Final nodes are never split. Auxiliary nodes always report false:
    /// their trivial residuals still participate in the block bookkeeping
    /// and are handled by the cut rules of their own split.
    pub fn is_final(&self) -> bool {
        match self.kind {
            NodeKind::Main { is_final, .. } => is_final,
            NodeKind::Aux { .. } => false,
        }
    }
}

/// Result of splitting away one variable from a residual DNF.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub is_final: bool,
    pub phi: ClauseSet,
    pub patterns: Option<Vec<OccurrencePattern>>,
}

/// Column/row-indexed node store.
pub struct TreeContext {
    pub nbvar: usize,
    columns: Vec<Vec<SplitNode>>,
}

impl TreeContext {
    pub fn new(nbvar: usize) -> Self {
        Self {
            nbvar,
            columns: vec![Vec::new(); nbvar + 1],
        }
    }

    pub fn node(&self, id: NodeId) -> &SplitNode {
        &self.columns[id.column][id.row]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SplitNode {
        &mut self.columns[id.column][id.row]
    }

    pub fn column_len(&self, column: usize) -> usize {
        self.columns[column].len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Register a node, assigning its row within its column.
    fn add_node(&mut self, mut node: SplitNode) -> NodeId {
        let column = node.column;
        let row = self.columns[column].len();
        node.row = row;
        debug!(
            "registered {} node ({}, {}) with {} clauses",
            match node.kind {
                NodeKind::Main { .. } => "main",
                NodeKind::Aux { .. } => "aux",
            },
            column,
            row,
            node.phi.len()
        );
        self.columns[column].push(node);
        NodeId { column, row }
    }

    fn child_column(&self, lower_parent: Option<NodeId>, upper_parent: Option<NodeId>) -> usize {
        match (lower_parent, upper_parent) {
            (Some(p), _) | (None, Some(p)) => p.column + 1,
            (None, None) => 0,
        }
    }

    pub fn new_main_node(
        &mut self,
        lower_parent: Option<NodeId>,
        upper_parent: Option<NodeId>,
        phi: ClauseSet,
        patterns: Option<Vec<OccurrencePattern>>,
        is_final: bool,
    ) -> NodeId {
        let column = self.child_column(lower_parent, upper_parent);
        self.add_node(SplitNode {
            phi,
            patterns,
            column,
            row: 0,
            lower_parent,
            upper_parent,
            lower_child: None,
            upper_child: None,
            already_split: false,
            kind: NodeKind::Main { max_l: 0, is_final },
        })
    }

    pub fn new_aux_node(
        &mut self,
        lower_parent: Option<NodeId>,
        upper_parent: Option<NodeId>,
        phi: ClauseSet,
        l: usize,
        l_prime: usize,
    ) -> NodeId {
        let column = self.child_column(lower_parent, upper_parent);
        self.add_node(SplitNode {
            phi,
            patterns: None,
            column,
            row: 0,
            lower_parent,
            upper_parent,
            lower_child: None,
            upper_child: None,
            already_split: false,
            kind: NodeKind::Aux { l, l_prime },
        })
    }

    /// Split away the variable of the node's column.
    ///
    /// With `assign_one = false` the residual keeps exactly the clauses that
    /// do not begin with the variable; with `assign_one = true` it keeps the
    /// clauses that do, with the leading literal dropped. An empty clause
    /// encountered in the one-branch degenerates to the zero-branch (the
    /// residual is already true either way).
    pub fn split(&self, id: NodeId, assign_one: bool, create_patterns: bool) -> SplitResult {
        let node = self.node(id);
        let column = node.column;
        let variable = column as u32;
        let mut new_dnf = ClauseSet::with_capacity(node.phi.len());
        let mut is_final = false;

        if assign_one {
            for clause in &node.phi {
                if clause.is_empty() {
                    return self.split(id, false, create_patterns);
                }
                if clause[0] == variable {
                    let new_clause: Clause = clause[1..].to_vec();
                    if new_clause.is_empty() {
                        is_final = true;
                    }
                    new_dnf.push(new_clause);
                }
            }
        } else {
            for clause in &node.phi {
                if clause.is_empty() || clause[0] != variable {
                    if clause.is_empty() {
                        is_final = true;
                    }
                    new_dnf.push(clause.clone());
                }
            }
        }
        if new_dnf.is_empty() {
            is_final = true;
        }

        let patterns = create_patterns.then(|| {
            let mut patterns = patterns_from_dnf_shift(&new_dnf, self.nbvar, column + 1);
            sort_all(&mut patterns);
            patterns
        });
        SplitResult { is_final, phi: new_dnf, patterns }
    }

    /// Both splits in one scan. If ϕ contains the empty clause both results
    /// collapse to the zero-branch. Pattern rebuilding for the two residuals
    /// runs as a parallel pair.
    pub fn split_both(&self, id: NodeId, create_patterns: bool) -> (SplitResult, SplitResult) {
        let node = self.node(id);
        let column = node.column;
        let variable = column as u32;
        let mut first = ClauseSet::with_capacity(node.phi.len());
        let mut second = ClauseSet::with_capacity(node.phi.len());
        let mut first_final = false;
        let mut second_final = false;
        let mut contains_empty_clause = false;

        for clause in &node.phi {
            if clause.is_empty() {
                contains_empty_clause = true;
            }
            if clause.is_empty() || clause[0] != variable {
                if clause.is_empty() {
                    first_final = true;
                }
                first.push(clause.clone());
            } else {
                let new_clause: Clause = clause[1..].to_vec();
                if new_clause.is_empty() {
                    second_final = true;
                }
                second.push(new_clause);
            }
        }
        if first.is_empty() {
            first_final = true;
        }
        if second.is_empty() {
            second_final = true;
        }

        let build = |phi: &ClauseSet| {
            let mut patterns = patterns_from_dnf_shift(phi, self.nbvar, column + 1);
            sort_all(&mut patterns);
            patterns
        };

        if contains_empty_clause {
            let patterns = create_patterns.then(|| build(&first));
            let res = SplitResult {
                is_final: first_final,
                phi: first,
                patterns,
            };
            return (res.clone(), res);
        }

        let (patterns_one, patterns_two) = if create_patterns {
            let (a, b) = rayon::join(|| build(&first), || build(&second));
            (Some(a), Some(b))
        } else {
            (None, None)
        };
        (
            SplitResult {
                is_final: first_final,
                phi: first,
                patterns: patterns_one,
            },
            SplitResult {
                is_final: second_final,
                phi: second,
                patterns: patterns_two,
            },
        )
    }

    pub(crate) fn split_node(&mut self, id: NodeId, cut: bool, sym_test: bool) -> Result<()> {
        self.node_mut(id).already_split = true;
        match self.node(id).kind {
            NodeKind::Main { .. } => self.split_main(id, cut),
            NodeKind::Aux { l, l_prime } => self.split_aux(id, l, l_prime, cut, sym_test),
        }
    }

    fn split_main(&mut self, id: NodeId, cut: bool) -> Result<()> {
        let max_l = {
            let node = self.node(id);
            let patterns = node.patterns.as_ref().ok_or_else(|| {
                Error::Internal(format!("main node {} split without patterns", id))
            })?;
            compute_max_l(patterns)
        };
        if let NodeKind::Main { max_l: slot, .. } = &mut self.node_mut(id).kind {
            *slot = max_l;
        }
        let finality = self.node(id).phi.finality();

        if max_l == 1 {
            if cut && finality == Finality::IsFalse {
                let res = self.split(id, true, true);
                let child = self.new_main_node(None, Some(id), res.phi, res.patterns, res.is_final);
                self.node_mut(id).lower_child = Some(child);
                return Ok(());
            }
            if cut && finality == Finality::IsTrue {
                let res = self.split(id, false, true);
                let child = self.new_main_node(Some(id), None, res.phi, res.patterns, res.is_final);
                self.node_mut(id).upper_child = Some(child);
                return Ok(());
            }
            let (first, second) = self.split_both(id, true);
            let upper = self.new_main_node(Some(id), None, first.phi, first.patterns, first.is_final);
            self.node_mut(id).upper_child = Some(upper);
            let lower = self.new_main_node(None, Some(id), second.phi, second.patterns, second.is_final);
            self.node_mut(id).lower_child = Some(lower);
        } else {
            // The next max_l variables are symmetric; open an auxiliary block.
            if cut && finality == Finality::IsFalse {
                let res = self.split(id, true, false);
                let child = self.new_aux_node(None, Some(id), res.phi, max_l, 1);
                self.node_mut(id).lower_child = Some(child);
                return Ok(());
            }
            if cut && finality == Finality::IsTrue {
                let res = self.split(id, false, false);
                let child = self.new_aux_node(Some(id), None, res.phi, max_l, 1);
                self.node_mut(id).upper_child = Some(child);
                return Ok(());
            }
            let (first, second) = self.split_both(id, false);
            let upper = self.new_aux_node(Some(id), None, first.phi, max_l, 1);
            self.node_mut(id).upper_child = Some(upper);
            let lower = self.new_aux_node(None, Some(id), second.phi, max_l, 1);
            self.node_mut(id).lower_child = Some(lower);
        }
        Ok(())
    }

    fn split_aux(&mut self, id: NodeId, l: usize, l_prime: usize, cut: bool, sym_test: bool) -> Result<()> {
        let creates_main = l_prime == l - 1;
        let finality = self.node(id).phi.finality();

        if cut {
            match finality {
                Finality::IsFalse => {
                    let child = if creates_main {
                        let res = self.split(id, true, true);
                        self.new_main_node(None, Some(id), res.phi, res.patterns, res.is_final)
                    } else {
                        let res = self.split(id, true, false);
                        self.new_aux_node(None, Some(id), res.phi, l, l_prime + 1)
                    };
                    self.node_mut(id).lower_child = Some(child);
                    return Ok(());
                }
                Finality::IsTrue => {
                    // Share the upper residual instead of rebuilding it.
                    let shared = self.shared_upper_child(id)?;
                    self.node_mut(id).upper_child = shared;
                    return Ok(());
                }
                Finality::NotFinal => {}
            }
        }

        if self.node(id).upper_parent.is_some() {
            let shared = self.shared_upper_child(id)?.ok_or_else(|| {
                Error::Internal(format!("aux node {}: shared upper child is missing", id))
            })?;
            self.node_mut(id).upper_child = Some(shared);
            self.node_mut(shared).lower_parent = Some(id);
            let child = if creates_main {
                let res = self.split(id, true, true);
                self.new_main_node(None, Some(id), res.phi, res.patterns, res.is_final)
            } else {
                let res = self.split(id, true, false);
                self.new_aux_node(None, Some(id), res.phi, l, l_prime + 1)
            };
            self.node_mut(id).lower_child = Some(child);
            if sym_test {
                // The symmetry check (compare the zero-branch residual of
                // this node with the shared one as DNFs) was designed but
                // never finalized; short-circuit.
            }
        } else if creates_main {
            let (first, second) = self.split_both(id, true);
            let upper = self.new_main_node(Some(id), None, first.phi, first.patterns, first.is_final);
            self.node_mut(id).upper_child = Some(upper);
            let lower = self.new_main_node(None, Some(id), second.phi, second.patterns, second.is_final);
            self.node_mut(id).lower_child = Some(lower);
        } else {
            let (first, second) = self.split_both(id, false);
            let upper = self.new_aux_node(Some(id), None, first.phi, l, l_prime + 1);
            self.node_mut(id).upper_child = Some(upper);
            let lower = self.new_aux_node(None, Some(id), second.phi, l, l_prime + 1);
            self.node_mut(id).lower_child = Some(lower);
        }
        Ok(())
    }

    /// `upper_parent.upper_child.lower_child`: the node an auxiliary node
    /// shares as its upper child.
    fn shared_upper_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        let up = self.node(id).upper_parent.ok_or_else(|| {
            Error::Internal(format!("aux node {} has no upper parent to share from", id))
        })?;
        let up_upper = self.node(up).upper_child.ok_or_else(|| {
            Error::Internal(format!("aux node {}: upper parent {} has no upper child", id, up))
        })?;
        Ok(self.node(up_upper).lower_child)
    }
}

/// The splitting DAG for a DNF, together with the variable renaming that
/// ordered the DNF by importance.
pub struct SplittingTree {
    pub context: TreeContext,
    pub root: NodeId,
    pub renaming: Renaming,
    /// Check that block variables are really interchangeable. Kept as a
    /// switch; the check itself short-circuits (see `split_aux`).
    pub sym_test: bool,
    /// Skip materialising the child on the non-propagating side when the
    /// residual DNF is already final.
    pub cut: bool,
}

impl SplittingTree {
    /// Set up the DAG for ϕ: build the occurrence patterns, rename the
    /// variables by importance (unless `sort_patterns` is false, for inputs
    /// already in importance order) and register the root node.
    ///
    /// Every variable id in ϕ must be `< nbvar`. With `sort_patterns` off,
    /// `sort_clauses` still sorts each clause in increasing order.
    pub fn new(phi: &ClauseSet, nbvar: usize, sort_patterns_flag: bool, sort_clauses: bool) -> Self {
        let mut context = TreeContext::new(nbvar);
        let mut patterns = patterns_from_dnf(phi, nbvar);
        sort_all(&mut patterns);

        let (new_dnf, renaming) = if sort_patterns_flag {
            sort_patterns(&mut patterns);
            let renaming = Renaming::from_sorted_patterns(&patterns);
            // apply() also resorts every rewritten clause.
            (renaming.apply(phi), renaming)
        } else {
            let mut new_dnf = phi.clone();
            if sort_clauses {
                new_dnf.sort_all();
            }
            (new_dnf, Renaming::identity(nbvar))
        };

        let is_final = new_dnf.finality() != Finality::NotFinal;
        let root = context.new_main_node(None, None, new_dnf, Some(patterns), is_final);
        Self {
            context,
            root,
            renaming,
            sym_test: true,
            cut: true,
        }
    }

    /// Build the whole DAG, breadth first. A node reached through several
    /// parents is split only once; the `already_split` flag guards re-entry.
    pub fn create(&mut self) -> Result<()> {
        let mut waiting = VecDeque::with_capacity(self.context.nbvar + 1);
        waiting.push_back(self.root);
        while let Some(next) = waiting.pop_front() {
            {
                let node = self.context.node(next);
                if node.is_final() || node.already_split {
                    continue;
                }
            }
            self.context.split_node(next, self.cut, self.sym_test)?;
            let node = self.context.node(next);
            let children = [node.upper_child, node.lower_child];
            for child in children.into_iter().flatten() {
                if !self.context.node(child).already_split {
                    waiting.push_back(child);
                }
            }
        }
        Ok(())
    }
}
