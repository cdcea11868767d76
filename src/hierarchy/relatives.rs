use super::store::Hierarchy;
use crate::models::HierarchyNode;

/// Finds the tree neighbourhood searched for substitutes of a node.
///
/// `family_position` picks the reference root: `0` or more searches the
/// origin's own subtree, `-1` its parent's (siblings), `-2` its grandparent's
/// (cousins) and so on. `depth` bounds how many levels below the reference
/// root are collected, the reference root itself being level one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeFinder {
    depth: usize,
    family_position: i32,
}

impl RelativeFinder {
    pub fn new(depth: usize, family_position: i32) -> Self {
        Self {
            depth,
            family_position,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn family_position(&self) -> i32 {
        self.family_position
    }

    /// Walks `|family_position|` parent links up from `origin`, stopping early
    /// at `ceiling` or at a node whose parent is not in the hierarchy.
    pub fn reference_root<'h>(
        &self,
        hierarchy: &'h Hierarchy,
        origin: &'h HierarchyNode,
        ceiling: &str,
    ) -> &'h HierarchyNode {
        let mut current = origin;
        if self.family_position >= 0 {
            return current;
        }
        for _ in 0..self.family_position.unsigned_abs() {
            if current.id() == ceiling {
                break;
            }
            match current.parent().and_then(|parent| hierarchy.get(parent)) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Collects every node `0..depth-1` hops below `reference`, level by level,
    /// leaving out the node identical to `exclude`.
    ///
    /// A reference root missing from the hierarchy is returned on its own.
    pub fn relatives<'h>(
        &self,
        hierarchy: &'h Hierarchy,
        reference: &'h HierarchyNode,
        exclude: &HierarchyNode,
    ) -> Vec<&'h HierarchyNode> {
        if !hierarchy.contains(reference.id()) {
            return vec![reference];
        }

        let mut found = Vec::new();
        let mut level = vec![reference];
        for hop in 0..self.depth {
            found.extend(
                level
                    .iter()
                    .copied()
                    .filter(|node| !std::ptr::eq(*node, exclude)),
            );
            if hop + 1 == self.depth {
                break;
            }
            level = level
                .iter()
                .flat_map(|node| node.children())
                .filter_map(|child| hierarchy.get(child))
                .collect();
            if level.is_empty() {
                break;
            }
        }
        found
    }

    /// Relatives of `origin` around its reference root, excluding `origin`.
    pub fn search<'h>(
        &self,
        hierarchy: &'h Hierarchy,
        origin: &'h HierarchyNode,
        ceiling: &str,
    ) -> Vec<&'h HierarchyNode> {
        let reference = self.reference_root(hierarchy, origin, ceiling);
        self.relatives(hierarchy, reference, origin)
    }
}
