//! Domain/range compatibility between a statement entity and a candidate.

use std::collections::HashSet;
use std::sync::Arc;

use crate::graph::SubclassIndex;

/// Tests whether a candidate's domain or range set admits a target class,
/// either directly or through one of the target's ancestors.
#[derive(Clone)]
pub struct CompatibilityFilter {
    index: Arc<dyn SubclassIndex>,
}

impl CompatibilityFilter {
    pub fn new(index: Arc<dyn SubclassIndex>) -> Self {
        Self { index }
    }

    /// Returns `true` if `class` lies anywhere below `ancestor` in the
    /// subclass relation. A class is not its own descendant.
    ///
    /// The walk is iterative with a visited set, so cyclic subclass data
    /// terminates.
    pub fn is_descendant_of(&self, class: &str, ancestor: &str) -> bool {
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack = vec![ancestor.to_string()];

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for sub in self.index.direct_subclasses(&current) {
                if sub == class {
                    return true;
                }
                if !visited.contains(&sub) {
                    stack.push(sub);
                }
            }
        }
        false
    }

    /// First member of `candidates`, in set order, that is an ancestor of
    /// `target`.
    pub fn ancestor_in<'a>(&self, target: &str, candidates: &'a [String]) -> Option<&'a str> {
        candidates
            .iter()
            .find(|candidate| self.is_descendant_of(target, candidate))
            .map(String::as_str)
    }

    /// `true` if `target` is in `candidates` or has an ancestor there.
    ///
    /// Without a target every candidate set is accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use ontorec::compatibility::CompatibilityFilter;
    /// use ontorec::graph::{OntologyGraph, RDFS_SUBCLASS_OF};
    ///
    /// let (dog, animal) = ("http://ex.org#Dog", "http://ex.org#Animal");
    /// let graph = OntologyGraph::new().unwrap();
    /// graph.insert_iri(dog, RDFS_SUBCLASS_OF, animal).unwrap();
    /// let filter = CompatibilityFilter::new(Arc::new(graph));
    ///
    /// assert!(filter.is_related(Some(dog), &[animal.to_string()]));
    /// assert!(!filter.is_related(Some(animal), &[dog.to_string()]));
    /// assert!(filter.is_related(None, &[]));
    /// ```
    pub fn is_related(&self, target: Option<&str>, candidates: &[String]) -> bool {
        match target {
            Some(target) => {
                candidates.iter().any(|c| c == target)
                    || self.ancestor_in(target, candidates).is_some()
            }
            None => true,
        }
    }
}

impl std::fmt::Debug for CompatibilityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompatibilityFilter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Subclass edges held as parent -> children, counting lookups.
    #[derive(Default)]
    struct MockIndex {
        children: HashMap<String, Vec<String>>,
        lookups: Mutex<usize>,
    }

    impl MockIndex {
        fn with_edges(edges: &[(&str, &str)]) -> Self {
            let mut index = Self::default();
            for (sub, sup) in edges {
                index
                    .children
                    .entry(sup.to_string())
                    .or_default()
                    .push(sub.to_string());
            }
            index
        }
    }

    impl SubclassIndex for MockIndex {
        fn direct_subclasses(&self, class: &str) -> Vec<String> {
            *self.lookups.lock().unwrap() += 1;
            self.children.get(class).cloned().unwrap_or_default()
        }
    }

    fn chain() -> CompatibilityFilter {
        CompatibilityFilter::new(Arc::new(MockIndex::with_edges(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "Thing"),
            ("D", "Thing"),
        ])))
    }

    fn set(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn direct_member_is_related() {
        assert!(chain().is_related(Some("A"), &set(&["A"])));
    }

    #[test]
    fn ancestor_through_closure_is_related() {
        let filter = chain();
        assert!(filter.is_related(Some("A"), &set(&["C"])));
        assert!(filter.is_related(Some("A"), &set(&["Thing"])));
    }

    #[test]
    fn unrelated_class_is_not_related() {
        let filter = chain();
        assert!(!filter.is_related(Some("A"), &set(&["D"])));
        assert!(!filter.is_related(Some("C"), &set(&["A"])));
    }

    #[test]
    fn absent_target_accepts_anything() {
        assert!(chain().is_related(None, &set(&["D"])));
        assert!(chain().is_related(None, &[]));
    }

    #[test]
    fn ancestor_in_returns_first_match_in_set_order() {
        let filter = chain();
        let candidates = set(&["D", "C", "B"]);
        assert_eq!(filter.ancestor_in("A", &candidates), Some("C"));
        assert_eq!(filter.ancestor_in("D", &set(&["A", "B"])), None);
    }

    #[test]
    fn class_is_not_its_own_descendant() {
        assert!(!chain().is_descendant_of("B", "B"));
    }

    #[test]
    fn cyclic_subclass_data_terminates() {
        let index = Arc::new(MockIndex::with_edges(&[("X", "Y"), ("Y", "X")]));
        let filter = CompatibilityFilter::new(index.clone());

        assert!(!filter.is_descendant_of("Z", "X"));
        assert_eq!(*index.lookups.lock().unwrap(), 2);
        // X is reachable from itself through Y.
        assert!(filter.is_descendant_of("X", "X"));
    }

    #[test]
    fn shared_subtrees_are_walked_once() {
        let index = Arc::new(MockIndex::with_edges(&[
            ("B", "Top"),
            ("C", "Top"),
            ("Leaf", "B"),
            ("Leaf", "C"),
        ]));
        let filter = CompatibilityFilter::new(index.clone());

        assert!(!filter.is_descendant_of("Nowhere", "Top"));
        // Top, B, C and Leaf each looked up once.
        assert_eq!(*index.lookups.lock().unwrap(), 4);
    }
}
