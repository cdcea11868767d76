use std::collections::{HashMap, HashSet};

use super::store::{Hierarchy, HierarchyError};
use crate::models::HierarchyKind;

/// Computes and memoizes maximum hierarchy depths.
///
/// The memo is keyed by hierarchy name, not by starting node: whichever node
/// the first call for a hierarchy passes determines the value every later call
/// for that hierarchy returns.
#[derive(Debug, Clone, Default)]
pub struct DepthCalculator {
    memo: HashMap<HierarchyKind, usize>,
    walks: usize,
}

impl DepthCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized depth for `hierarchy`, computing it from `start`
    /// on the first call.
    ///
    /// # Errors
    ///
    /// Returns `HierarchyError::Cycle` if the subtree under `start` loops back
    /// on itself. Nothing is memoized in that case.
    pub fn max_depth(&mut self, hierarchy: &Hierarchy, start: &str) -> Result<usize, HierarchyError> {
        if let Some(depth) = self.memo.get(&hierarchy.kind()) {
            return Ok(*depth);
        }
        self.walks += 1;
        let depth = subtree_depth(hierarchy, start)?;
        self.memo.insert(hierarchy.kind(), depth);
        Ok(depth)
    }

    /// Memoized depth, if one has been computed.
    pub fn cached(&self, kind: HierarchyKind) -> Option<usize> {
        self.memo.get(&kind).copied()
    }

    /// Number of uncached depth computations performed so far.
    pub fn walks(&self) -> usize {
        self.walks
    }
}

/// `1 + max(depth of each child subtree)`, `0` when `start` is not in the map.
///
/// Iterative post-order walk; `on_path` holds the nodes whose subtree is
/// still open, so revisiting one of them means a cycle.
fn subtree_depth(hierarchy: &Hierarchy, start: &str) -> Result<usize, HierarchyError> {
    if !hierarchy.contains(start) {
        return Ok(0);
    }

    let mut depths: HashMap<&str, usize> = HashMap::new();
    let mut on_path: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&str, bool)> = vec![(start, false)];

    while let Some((uri, children_done)) = stack.pop() {
        let Some(node) = hierarchy.get(uri) else {
            continue;
        };

        if children_done {
            on_path.remove(uri);
            let deepest = node
                .children()
                .iter()
                .map(|child| depths.get(child.as_str()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            depths.insert(uri, deepest + 1);
            continue;
        }

        if depths.contains_key(uri) {
            continue;
        }
        if !on_path.insert(uri) {
            return Err(HierarchyError::Cycle {
                kind: hierarchy.kind(),
                uri: uri.to_string(),
            });
        }

        stack.push((uri, true));
        for child in node.children().iter().rev() {
            stack.push((child.as_str(), false));
        }
    }

    Ok(depths.get(start).copied().unwrap_or(0))
}
