//! Recommendation engine: suggests ontology entities that can replace terms
//! of a statement.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use ontorec::config::{FilterBy, RecommendationConfig};
//! use ontorec::graph::{OntologyFormat, OntologyGraph};
//! use ontorec::hierarchy::{load_hierarchies, LanguageFilter, PropertyLabels};
//! use ontorec::recommender::RecommendationEngineBuilder;
//! use ontorec::Triple;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ontology = r#"
//!     @prefix owl: <http://www.w3.org/2002/07/owl#> .
//!     @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
//!     @prefix : <http://ex.org#> .
//!     :Animal a owl:Class .
//!     :Person a owl:Class .
//!     :Dog a owl:Class ; rdfs:subClassOf :Animal .
//!     :Cat a owl:Class ; rdfs:subClassOf :Animal .
//!     :owns a owl:ObjectProperty ; rdfs:range :Animal .
//! "#;
//! let graph = OntologyGraph::from_reader(ontology.as_bytes(), OntologyFormat::Turtle)?;
//!
//! let store = load_hierarchies(&graph, &PropertyLabels::default(), LanguageFilter::Any)?;
//! let engine = RecommendationEngineBuilder::new()
//!     .store(store)
//!     .subclass_index(Arc::new(graph))
//!     .config(RecommendationConfig {
//!         filter_by: FilterBy::Range,
//!         text_template: "owns a {}".to_string(),
//!         ..Default::default()
//!     })
//!     .build()?;
//!
//! let triples = [
//!     Triple::new("p1", "http://ex.org#owns", "http://ex.org#Person"),
//!     Triple::new("http://ex.org#Person", "has_value", "http://ex.org#Dog"),
//! ];
//! let recommendations = engine.get_recommendations(&triples)?;
//! assert_eq!(recommendations.suggestions, vec!["owns a Cat"]);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compatibility::CompatibilityFilter;
use crate::config::{ConfigError, Order, RecommendationConfig};
use crate::embedding::{EmbeddingError, EmbeddingService};
use crate::exchange::classify;
use crate::graph::SubclassIndex;
use crate::hierarchy::{Hierarchy, HierarchyError, HierarchyStore, RelativeFinder};
use crate::models::{HierarchyKind, HierarchyNode, Triple};
use crate::ranking::SimilarityRanker;

/// Errors raised while building the engine or serving a request.
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error("similarity ranking failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// A required collaborator was not given to the builder.
    #[error("recommendation engine needs {0}")]
    Incomplete(&'static str),
}

/// Suggestions for one statement, headed by the configured prefix text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub prefix: String,
    pub suggestions: Vec<String>,
}

/// Builder for [`RecommendationEngine`].
#[derive(Default)]
pub struct RecommendationEngineBuilder {
    store: Option<HierarchyStore>,
    index: Option<Arc<dyn SubclassIndex>>,
    embeddings: Option<Arc<dyn EmbeddingService>>,
    config: Option<RecommendationConfig>,
}

impl RecommendationEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hierarchies to search; all three kinds must be present.
    pub fn store(mut self, store: HierarchyStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the subclass relation used for ancestor checks.
    pub fn subclass_index(mut self, index: Arc<dyn SubclassIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets the embedding service; required for semantic ordering.
    pub fn embeddings(mut self, service: Arc<dyn EmbeddingService>) -> Self {
        self.embeddings = Some(service);
        self
    }

    /// Sets the configuration. Defaults apply when not called.
    pub fn config(mut self, config: RecommendationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validates the configuration and assembles the engine.
    ///
    /// # Errors
    ///
    /// - `RecommendationError::Config` if the configuration is invalid
    /// - `RecommendationError::Incomplete` if the store, the subclass index,
    ///   or (for semantic ordering) the embedding service is missing
    /// - `RecommendationError::Hierarchy` if the store lacks a hierarchy
    pub fn build(self) -> Result<RecommendationEngine, RecommendationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let store = self.store.ok_or(RecommendationError::Incomplete("a hierarchy store"))?;
        for kind in HierarchyKind::ALL {
            store.hierarchy(kind)?;
        }
        let index = self
            .index
            .ok_or(RecommendationError::Incomplete("a subclass index"))?;

        let ranker = match (config.order, config.similarity_threshold) {
            (Order::Semantic, Some(threshold)) => {
                let service = self
                    .embeddings
                    .ok_or(RecommendationError::Incomplete("an embedding service"))?;
                Some(SimilarityRanker::new(service, threshold))
            }
            _ => None,
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(RecommendationEngine {
            finder: RelativeFinder::new(config.depth, config.family_position),
            filter: CompatibilityFilter::new(index),
            store,
            ranker,
            config,
            rng: Mutex::new(rng),
        })
    }
}

/// Turns statements into rendered substitution suggestions.
///
/// Read-only while serving; [`replace_hierarchy`](Self::replace_hierarchy)
/// takes `&mut self`, so a swap cannot overlap a request.
pub struct RecommendationEngine {
    store: HierarchyStore,
    filter: CompatibilityFilter,
    finder: RelativeFinder,
    ranker: Option<SimilarityRanker>,
    config: RecommendationConfig,
    rng: Mutex<StdRng>,
}

impl RecommendationEngine {
    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    pub fn store(&self) -> &HierarchyStore {
        &self.store
    }

    /// Suggests replacements for the exchangeable entities of `triples`.
    ///
    /// Each entity is handled once even if it occurs in several triples.
    /// The suggestion list is cut to the configured size.
    pub fn get_recommendations(
        &self,
        triples: &[Triple],
    ) -> Result<Recommendations, RecommendationError> {
        let classes = self.hierarchy(HierarchyKind::Classes)?;
        let object_properties = self.hierarchy(HierarchyKind::ObjectProperties)?;
        let data_properties = self.hierarchy(HierarchyKind::DataProperties)?;

        let exchange = classify(triples, |uri| classes.contains(uri));
        let mut handled: HashSet<&str> = HashSet::new();
        let mut related: Vec<&HierarchyNode> = Vec::new();

        for triple in triples {
            let (subject, predicate, object) = (
                triple.subject.as_str(),
                triple.predicate.as_str(),
                triple.object.as_str(),
            );

            if triple.is_has_value() {
                if !exchange.can_exchange(object) || !handled.insert(object) {
                    continue;
                }
                let Some(property) = exchange.prop_ref(object) else {
                    tracing::debug!(class = %object, "value class has no originating predicate");
                    continue;
                };
                if classes.contains(subject) {
                    related.extend(self.related_classes(property, None, Some(object))?);
                }
                continue;
            }

            if exchange.can_exchange(object)
                && exchange.can_exchange(predicate)
                && handled.insert(object)
            {
                if object_properties.contains(predicate) {
                    related.extend(self.related_properties(
                        HierarchyKind::ObjectProperties,
                        predicate,
                        Some(subject),
                        Some(object),
                    )?);
                } else if data_properties.contains(predicate) {
                    related.extend(self.related_properties(
                        HierarchyKind::DataProperties,
                        predicate,
                        Some(subject),
                        None,
                    )?);
                }
            }

            if exchange.can_exchange(subject)
                && handled.insert(subject)
                && classes.contains(subject)
            {
                related.extend(self.related_classes(predicate, Some(subject), None)?);
            }
        }

        let total = related.len();
        let suggestions: Vec<String> = related
            .into_iter()
            .take(self.config.size)
            .map(|node| self.config.render(node.display_name()))
            .collect();
        tracing::debug!(
            triples = triples.len(),
            candidates = total,
            returned = suggestions.len(),
            "built recommendations"
        );

        Ok(Recommendations {
            prefix: self.config.suggestion_prefix_text.clone(),
            suggestions,
        })
    }

    /// Properties near `property` in its hierarchy whose domain admits
    /// `domain` or whose range admits `range`.
    ///
    /// Data properties are always checked by domain and never by range.
    pub fn related_properties(
        &self,
        kind: HierarchyKind,
        property: &str,
        domain: Option<&str>,
        range: Option<&str>,
    ) -> Result<Vec<&HierarchyNode>, RecommendationError> {
        let hierarchy = self.hierarchy(kind)?;
        let Some(origin) = hierarchy.get(property) else {
            return Ok(Vec::new());
        };
        let is_data = kind == HierarchyKind::DataProperties;
        let filter_by = self.config.filter_by;

        let mut related: Vec<&HierarchyNode> = Vec::new();
        for node in self.finder.search(hierarchy, origin, hierarchy.root()) {
            if related.iter().any(|seen| std::ptr::eq(*seen, node)) {
                continue;
            }
            let by_domain = (filter_by.checks_domain() || is_data)
                && !node.domains().is_empty()
                && self.filter.is_related(domain, node.domains());
            let by_range = !is_data
                && filter_by.checks_range()
                && !node.ranges().is_empty()
                && self.filter.is_related(range, node.ranges());
            if by_domain || by_range {
                related.push(node);
            }
        }

        if self.config.order_set.orders_properties() {
            related = self.order(Some(origin), related)?;
        }
        Ok(related)
    }

    /// Classes that could stand in for `domain` or `range` as used with
    /// `property`.
    pub fn related_classes(
        &self,
        property: &str,
        domain: Option<&str>,
        range: Option<&str>,
    ) -> Result<Vec<&HierarchyNode>, RecommendationError> {
        let object_properties = self.hierarchy(HierarchyKind::ObjectProperties)?;
        let data_properties = self.hierarchy(HierarchyKind::DataProperties)?;
        let (node, is_data) = match object_properties.get(property) {
            Some(node) => (node, false),
            None => match data_properties.get(property) {
                Some(node) => (node, true),
                None => return Ok(Vec::new()),
            },
        };
        let filter_by = self.config.filter_by;

        let mut related = Vec::new();
        if filter_by.checks_domain() && !node.domains().is_empty() {
            related.extend(self.classes_related_to(domain, node.domains())?);
        }
        if !is_data && filter_by.checks_range() && !node.ranges().is_empty() {
            related.extend(self.classes_related_to(range, node.ranges())?);
        }

        if self.config.order_set.orders_classes() {
            let classes = self.hierarchy(HierarchyKind::Classes)?;
            let source = range.or(domain).and_then(|uri| classes.get(uri));
            related = self.order(source, related)?;
        }
        Ok(related)
    }

    /// Relatives of `target` in the class hierarchy that a property with
    /// `admitted` as its domain or range set would also accept.
    ///
    /// When `target` is admitted directly the relatives are searched up to
    /// the class root and kept if admitted themselves. When it is admitted
    /// through an ancestor, the search stops at that ancestor, which is left
    /// out.
    pub fn classes_related_to(
        &self,
        target: Option<&str>,
        admitted: &[String],
    ) -> Result<Vec<&HierarchyNode>, RecommendationError> {
        let Some(target) = target else {
            return Ok(Vec::new());
        };
        let classes = self.hierarchy(HierarchyKind::Classes)?;
        let Some(origin) = classes.get(target) else {
            tracing::debug!(class = %target, "class not in hierarchy");
            return Ok(Vec::new());
        };

        if admitted.iter().any(|uri| uri == target) {
            return Ok(self
                .finder
                .search(classes, origin, classes.root())
                .into_iter()
                .filter(|node| admitted.iter().any(|uri| uri == node.id()))
                .collect());
        }

        match self.filter.ancestor_in(target, admitted) {
            Some(ancestor) => Ok(self
                .finder
                .search(classes, origin, ancestor)
                .into_iter()
                .filter(|node| node.id() != ancestor)
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    /// Swaps in a rebuilt hierarchy, returning the previous one.
    pub fn replace_hierarchy(
        &mut self,
        kind: HierarchyKind,
        hierarchy: Hierarchy,
    ) -> Result<Hierarchy, RecommendationError> {
        let previous = self.store.replace(kind, hierarchy)?;
        tracing::info!(hierarchy = %kind, "replaced hierarchy");
        Ok(previous)
    }

    fn hierarchy(&self, kind: HierarchyKind) -> Result<&Hierarchy, RecommendationError> {
        Ok(self.store.hierarchy(kind)?)
    }

    fn order<'a>(
        &self,
        source: Option<&HierarchyNode>,
        mut candidates: Vec<&'a HierarchyNode>,
    ) -> Result<Vec<&'a HierarchyNode>, RecommendationError> {
        match self.config.order {
            Order::None => Ok(candidates),
            Order::Random => {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                candidates.shuffle(&mut *rng);
                Ok(candidates)
            }
            Order::Semantic => match (&self.ranker, source) {
                (Some(ranker), Some(source)) => Ok(ranker.rank_and_filter(source, &candidates)?),
                _ => {
                    tracing::debug!("no source node to rank against, keeping traversal order");
                    Ok(candidates)
                }
            },
        }
    }
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("store", &self.store)
            .field("finder", &self.finder)
            .field("ranker", &self.ranker)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
