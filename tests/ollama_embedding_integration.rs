/// Integration tests for the Ollama embedding client.
///
/// These need a running Ollama instance with an embedding model pulled. They
/// are skipped in GitHub Actions and whenever the server cannot be reached.
///
/// To run locally (with Ollama running):
/// ```bash
/// cargo test --test ollama_embedding_integration
/// ```
use std::time::Duration;

use ontorec::embedding::{EmbeddingService, OllamaEmbeddingClientBuilder};

/// Load environment from .env file (same as main app)
fn load_env() {
    let _ = dotenvy::dotenv();
}

/// Skip test if running in GitHub Actions
fn skip_in_ci() -> bool {
    if std::env::var("GITHUB_ACTIONS").as_deref() == Ok("true") {
        println!("Skipping test in GitHub Actions (no Ollama available)");
        return true;
    }
    false
}

fn base_url() -> String {
    std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn model() -> String {
    std::env::var("OLLAMA_EMBED_MODEL").unwrap_or_else(|_| "nomic-embed-text".to_string())
}

/// Skip test unless the server answers and has the embedding model pulled
fn skip_without_model(base_url: &str, model: &str) -> bool {
    let tags: Option<serde_json::Value> = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .ok()
        .and_then(|client| client.get(format!("{base_url}/api/tags")).send().ok())
        .filter(|response| response.status().is_success())
        .and_then(|response| response.json().ok());

    let available = tags
        .as_ref()
        .and_then(|json| json.get("models"))
        .and_then(|models| models.as_array())
        .is_some_and(|models| {
            models
                .iter()
                .filter_map(|m| m.get("name").and_then(|n| n.as_str()))
                .any(|name| name == model || name.split(':').next() == Some(model))
        });
    if !available {
        println!("Skipping test: model `{model}` not available at {base_url}");
    }
    !available
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[test]
fn embeds_tokens_and_caches_them() {
    load_env();
    if skip_in_ci() || skip_without_model(&base_url(), &model()) {
        return;
    }

    let client = OllamaEmbeddingClientBuilder::new()
        .base_url(base_url())
        .model(model())
        .build()
        .expect("client builds");

    let vectors = client
        .embed(&words("dog cat dog"))
        .expect("embedding request succeeds");
    assert_eq!(vectors.len(), 3);
    assert!(!vectors[0].is_empty());
    assert_eq!(vectors[0], vectors[2]);
    assert_eq!(client.cached_tokens(), 2);
}

#[test]
fn related_words_score_higher_than_unrelated_ones() {
    load_env();
    if skip_in_ci() || skip_without_model(&base_url(), &model()) {
        return;
    }

    let client = OllamaEmbeddingClientBuilder::new()
        .base_url(base_url())
        .model(model())
        .build()
        .expect("client builds");

    let close = client
        .n_similarity(&words("puppy"), &words("dog"))
        .expect("similarity succeeds");
    let far = client
        .n_similarity(&words("puppy"), &words("spreadsheet"))
        .expect("similarity succeeds");

    println!("puppy/dog = {close:.3}, puppy/spreadsheet = {far:.3}");
    assert!((-1.0..=1.0).contains(&close));
    assert!(close > far);
}
