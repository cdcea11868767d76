//! Similarity-based re-ranking of candidate nodes.

use std::sync::Arc;

use crate::embedding::{EmbeddingError, EmbeddingService, UNKNOWN_TOKEN, tokenize};
use crate::models::HierarchyNode;

/// Scores candidates against a source node's label and keeps those at or
/// above a threshold, best first.
#[derive(Clone)]
pub struct SimilarityRanker {
    service: Arc<dyn EmbeddingService>,
    threshold: f64,
}

impl SimilarityRanker {
    pub fn new(service: Arc<dyn EmbeddingService>, threshold: f64) -> Self {
        Self { service, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Tokenizes `text`, replacing tokens the service does not know with
    /// [`UNKNOWN_TOKEN`].
    pub fn tokens(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .map(|token| {
                if self.service.contains(&token) {
                    token
                } else {
                    UNKNOWN_TOKEN.to_string()
                }
            })
            .collect()
    }

    /// Scores every candidate, drops those below the threshold and sorts the
    /// rest by descending score. Ties keep their input order.
    pub fn score_candidates<'a>(
        &self,
        source: &HierarchyNode,
        candidates: &[&'a HierarchyNode],
    ) -> Result<Vec<(&'a HierarchyNode, f64)>, EmbeddingError> {
        let source_tokens = self.tokens(source.display_name());

        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let score = self
                .service
                .n_similarity(&source_tokens, &self.tokens(candidate.display_name()))?;
            if score >= self.threshold {
                scored.push((*candidate, score));
            }
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        tracing::debug!(
            source = source.id(),
            candidates = candidates.len(),
            kept = scored.len(),
            threshold = self.threshold,
            "ranked candidates by similarity"
        );
        Ok(scored)
    }

    /// [`score_candidates`](Self::score_candidates) without the scores.
    pub fn rank_and_filter<'a>(
        &self,
        source: &HierarchyNode,
        candidates: &[&'a HierarchyNode],
    ) -> Result<Vec<&'a HierarchyNode>, EmbeddingError> {
        Ok(self
            .score_candidates(source, candidates)?
            .into_iter()
            .map(|(node, _)| node)
            .collect())
    }
}

impl std::fmt::Debug for SimilarityRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityRanker")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
