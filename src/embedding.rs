//! Embedding lookup service used to re-rank candidates by label similarity.
//!
//! Two implementations ship with the crate: [`WordVectors`], a word2vec
//! text-format model held in memory, and [`OllamaEmbeddingClient`], which asks
//! a running Ollama server for embeddings.
//!
//! # Examples
//!
//! ```
//! use ontorec::embedding::{EmbeddingService, WordVectors, tokenize};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = "3 2\nbig 1.0 0.0\nlarge 0.9 0.1\nsmall -1.0 0.0\n";
//! let vectors = WordVectors::from_reader(model.as_bytes())?;
//!
//! let score = vectors.n_similarity(&tokenize("Big"), &tokenize("LARGE"))?;
//! assert!(score > 0.9);
//! # Ok(())
//! # }
//! ```

mod client;
mod tokenizer;
mod vectors;

use std::path::PathBuf;

use thiserror::Error;

pub use client::{OllamaEmbeddingClient, OllamaEmbeddingClientBuilder, retry_with_backoff};
pub use tokenizer::{UNKNOWN_TOKEN, tokenize};
pub use vectors::WordVectors;

/// Errors raised while loading a model or computing a similarity.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The model file could not be read.
    #[error("failed to read embedding model `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The model file is not in word2vec text format.
    #[error("invalid embedding model at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Connection failures, DNS resolution and the like.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The embedding server did not answer within the configured timeout.
    #[error("Embedding request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The server answered but the payload was unusable.
    #[error("Embedding API error: {message}")]
    Api { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Similarity between token sequences.
///
/// Implementations must be shareable across threads so an engine holding one
/// behind an `Arc` stays `Send + Sync`.
pub trait EmbeddingService: Send + Sync {
    /// Returns `true` if the service has a vector for `token`.
    fn contains(&self, token: &str) -> bool;

    /// Cosine similarity between the mean vectors of `a` and `b`.
    fn n_similarity(&self, a: &[String], b: &[String]) -> Result<f64, EmbeddingError>;
}

/// Cosine similarity of two vectors; `0.0` for mismatched lengths or a zero
/// vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    f64::from(dot_product / (magnitude_a * magnitude_b))
}

/// Element-wise mean, or `None` when there is nothing to average.
pub(crate) fn mean_vector<'a>(vectors: impl IntoIterator<Item = &'a [f32]>) -> Option<Vec<f32>> {
    let mut sum: Option<Vec<f32>> = None;
    let mut count = 0usize;
    for vector in vectors {
        match sum.as_mut() {
            Some(acc) => acc.iter_mut().zip(vector).for_each(|(a, v)| *a += v),
            None => sum = Some(vector.to_vec()),
        }
        count += 1;
    }
    sum.map(|mut acc| {
        acc.iter_mut().for_each(|a| *a /= count as f32);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = [0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_have_similarity_minus_one() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn mean_vector_averages_element_wise() {
        let a = [1.0, 3.0];
        let b = [3.0, 5.0];
        assert_eq!(mean_vector([&a[..], &b[..]]), Some(vec![2.0, 4.0]));
        assert_eq!(mean_vector(std::iter::empty::<&[f32]>()), None);
    }

    #[test]
    fn error_messages_are_readable() {
        let err = EmbeddingError::Http { status: 503 };
        assert!(err.to_string().contains("503"));

        let err = EmbeddingError::Parse {
            line: 4,
            reason: "expected 300 values".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid embedding model at line 4: expected 300 values"
        );
    }
}
