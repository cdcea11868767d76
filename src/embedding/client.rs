use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{EmbeddingError, EmbeddingService, cosine_similarity, mean_vector};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "nomic-embed-text";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for [`OllamaEmbeddingClient`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ontorec::embedding::OllamaEmbeddingClientBuilder;
///
/// let client = OllamaEmbeddingClientBuilder::new()
///     .base_url("http://localhost:11434")
///     .model("nomic-embed-text")
///     .timeout(Duration::from_secs(10))
///     .build()
///     .expect("valid client configuration");
/// assert_eq!(client.model(), "nomic-embed-text");
/// ```
#[derive(Debug, Default)]
pub struct OllamaEmbeddingClientBuilder {
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
}

impl OllamaEmbeddingClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server URL (e.g. `http://localhost:11434`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the embedding model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// Unset values fall back to the `OLLAMA_HOST` and `OLLAMA_EMBED_MODEL`
    /// environment variables, then to built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::InvalidUrl` if the base URL does not parse.
    pub fn build(self) -> Result<OllamaEmbeddingClient, EmbeddingError> {
        let base_url = self.base_url.unwrap_or_else(|| {
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
        });
        let model = self.model.unwrap_or_else(|| {
            std::env::var("OLLAMA_EMBED_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
        });
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        reqwest::Url::parse(&base_url)
            .map_err(|e| EmbeddingError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(EmbeddingError::Network)?;

        Ok(OllamaEmbeddingClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout,
            cache: Mutex::new(HashMap::new()),
        })
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

/// Embedding service backed by an Ollama server's `/api/embed` endpoint.
///
/// Each token is embedded once and cached for the lifetime of the client.
/// Requests are bounded by the configured timeout and retried with
/// exponential backoff on transient failures.
pub struct OllamaEmbeddingClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    timeout: Duration,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl OllamaEmbeddingClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of distinct tokens embedded so far.
    pub fn cached_tokens(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Returns one vector per token, fetching only the ones not cached yet.
    pub fn embed(&self, tokens: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let missing: Vec<&str> = {
            let cache = self.lock_cache()?;
            let mut seen = HashSet::new();
            tokens
                .iter()
                .map(String::as_str)
                .filter(|token| !cache.contains_key(*token) && seen.insert(*token))
                .collect()
        };

        if !missing.is_empty() {
            let fetched = self.fetch(&missing)?;
            let mut cache = self.lock_cache()?;
            for (token, vector) in missing.iter().zip(fetched) {
                cache.insert((*token).to_string(), vector);
            }
        }

        let cache = self.lock_cache()?;
        tokens
            .iter()
            .map(|token| {
                cache.get(token).cloned().ok_or_else(|| EmbeddingError::Api {
                    message: format!("no embedding returned for `{token}`"),
                })
            })
            .collect()
    }

    fn fetch(&self, input: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = format!("{}/api/embed", self.base_url);
        let body = EmbedRequest {
            model: &self.model,
            input,
        };
        tracing::debug!(model = %self.model, tokens = input.len(), "requesting embeddings");

        retry_with_backoff(|| {
            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .map_err(request_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(EmbeddingError::Http {
                    status: status.as_u16(),
                });
            }

            let text = response.text().map_err(request_error)?;
            let parsed: EmbedResponse =
                serde_json::from_str(&text).map_err(EmbeddingError::Serialization)?;
            if parsed.embeddings.len() != input.len() {
                return Err(EmbeddingError::Api {
                    message: format!(
                        "expected {} embeddings, received {}",
                        input.len(),
                        parsed.embeddings.len()
                    ),
                });
            }
            Ok(parsed.embeddings)
        })
    }

    fn lock_cache(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<f32>>>, EmbeddingError> {
        self.cache.lock().map_err(|_| EmbeddingError::Api {
            message: "embedding cache poisoned".to_string(),
        })
    }
}

impl EmbeddingService for OllamaEmbeddingClient {
    /// A remote model embeds any token.
    fn contains(&self, _token: &str) -> bool {
        true
    }

    fn n_similarity(&self, a: &[String], b: &[String]) -> Result<f64, EmbeddingError> {
        if a.is_empty() || b.is_empty() {
            return Ok(0.0);
        }
        let a = self.embed(a)?;
        let b = self.embed(b)?;
        match (
            mean_vector(a.iter().map(Vec::as_slice)),
            mean_vector(b.iter().map(Vec::as_slice)),
        ) {
            (Some(a), Some(b)) => Ok(cosine_similarity(&a, &b)),
            _ => Ok(0.0),
        }
    }
}

fn request_error(error: reqwest::Error) -> EmbeddingError {
    if error.is_timeout() {
        EmbeddingError::Timeout(error)
    } else {
        EmbeddingError::Network(error)
    }
}

/// Retries `f` up to three times, sleeping 1s, 2s and 4s between attempts.
///
/// Only transient failures are retried: network errors, timeouts and HTTP 5xx.
pub fn retry_with_backoff<F, T>(f: F) -> Result<T, EmbeddingError>
where
    F: FnMut() -> Result<T, EmbeddingError>,
{
    retry_with_delays(f, &[1, 2, 4])
}

fn retry_with_delays<F, T>(mut f: F, delays: &[u64]) -> Result<T, EmbeddingError>
where
    F: FnMut() -> Result<T, EmbeddingError>,
{
    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) if !should_retry(&e) => return Err(e),
        Err(e) => e,
    };

    for &delay_secs in delays {
        tracing::debug!(error = %last_error, delay_secs, "retrying embedding request");
        thread::sleep(Duration::from_secs(delay_secs));

        match f() {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}

fn should_retry(error: &EmbeddingError) -> bool {
    match error {
        EmbeddingError::Network(_) | EmbeddingError::Timeout(_) => true,
        EmbeddingError::Http { status } => (500..600).contains(status),
        EmbeddingError::Io { .. }
        | EmbeddingError::Parse { .. }
        | EmbeddingError::Serialization(_)
        | EmbeddingError::Api { .. }
        | EmbeddingError::InvalidUrl(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::cell::Cell;

    #[test]
    fn builder_rejects_invalid_url() {
        let result = OllamaEmbeddingClientBuilder::new()
            .base_url("not-a-valid-url")
            .build();
        assert!(matches!(result, Err(EmbeddingError::InvalidUrl(_))));
    }

    #[test]
    fn builder_keeps_explicit_settings() {
        let client = OllamaEmbeddingClientBuilder::new()
            .base_url("http://example.com:11434/")
            .model("mxbai-embed-large")
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://example.com:11434");
        assert_eq!(client.model(), "mxbai-embed-large");
        assert_eq!(client.timeout(), Duration::from_secs(3));
        assert_eq!(client.cached_tokens(), 0);
    }

    #[test]
    #[serial]
    fn builder_falls_back_to_environment() {
        unsafe {
            std::env::set_var("OLLAMA_HOST", "http://custom-host:11434");
            std::env::set_var("OLLAMA_EMBED_MODEL", "all-minilm");
        }

        let client = OllamaEmbeddingClientBuilder::new().build().unwrap();
        assert_eq!(client.base_url(), "http://custom-host:11434");
        assert_eq!(client.model(), "all-minilm");
        assert_eq!(client.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        unsafe {
            std::env::remove_var("OLLAMA_HOST");
            std::env::remove_var("OLLAMA_EMBED_MODEL");
        }
    }

    #[test]
    fn retry_gives_up_immediately_on_client_errors() {
        let attempts = Cell::new(0);
        let result: Result<(), _> = retry_with_delays(
            || {
                attempts.set(attempts.get() + 1);
                Err(EmbeddingError::Http { status: 404 })
            },
            &[0, 0, 0],
        );
        assert!(matches!(result, Err(EmbeddingError::Http { status: 404 })));
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn retry_recovers_after_server_error() {
        let attempts = Cell::new(0);
        let result = retry_with_delays(
            || {
                attempts.set(attempts.get() + 1);
                if attempts.get() < 3 {
                    Err(EmbeddingError::Http { status: 503 })
                } else {
                    Ok("embedded")
                }
            },
            &[0, 0, 0],
        );
        assert_eq!(result.unwrap(), "embedded");
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn retry_returns_last_error_when_exhausted() {
        let attempts = Cell::new(0);
        let result: Result<(), _> = retry_with_delays(
            || {
                attempts.set(attempts.get() + 1);
                Err(EmbeddingError::Http { status: 500 })
            },
            &[0, 0],
        );
        assert!(result.is_err());
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn retry_policy_matches_transient_failures() {
        assert!(should_retry(&EmbeddingError::Http { status: 502 }));
        assert!(!should_retry(&EmbeddingError::Http { status: 400 }));
        assert!(!should_retry(&EmbeddingError::Api {
            message: "bad".to_string()
        }));
    }

    #[test]
    fn empty_sequences_score_zero_without_a_request() {
        let client = OllamaEmbeddingClientBuilder::new()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        assert_eq!(client.n_similarity(&[], &["dog".to_string()]).unwrap(), 0.0);
        assert_eq!(client.cached_tokens(), 0);
    }
}
