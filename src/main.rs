use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ontorec::config::ConfigError;
use ontorec::embedding::{EmbeddingService, OllamaEmbeddingClientBuilder, WordVectors};
use ontorec::graph::{GraphError, OntologyFormat, OntologyGraph};
use ontorec::hierarchy::{LanguageFilter, PropertyLabels, PropertyLabelsError, load_hierarchies};
use ontorec::models::UnknownHierarchy;
use ontorec::{Hierarchy, HierarchyKind, RecommendationConfig, RecommendationEngineBuilder, Triple};
use tracing_subscriber::EnvFilter;

/// ontorec - ontology-driven paraphrase suggestions
#[derive(Parser)]
#[command(name = "ontorec")]
#[command(about = "Suggests ontology entities that can replace terms of a statement")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest replacements for the entities of a statement
    Recommend(RecommendCommand),
    /// Print one of the hierarchies built from an ontology
    Hierarchy(HierarchyCommand),
}

/// Ontology inputs shared by every command
#[derive(Args)]
struct OntologyArgs {
    /// Ontology document (Turtle, N-Triples or RDF/XML)
    #[arg(long, value_name = "FILE")]
    ontology: PathBuf,

    /// turtle, ntriples or rdfxml; inferred from the file extension when omitted
    #[arg(long, value_name = "FORMAT")]
    format: Option<OntologyFormat>,

    /// TOML table of property display labels
    #[arg(long, value_name = "FILE")]
    labels: Option<PathBuf>,
}

#[derive(Args)]
struct RecommendCommand {
    #[command(flatten)]
    ontology: OntologyArgs,

    /// Recommendation settings (defaults to $ONTOREC_CONFIG or the user config file)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON array of [subject, predicate, object] triples; read from stdin when omitted
    #[arg(long, value_name = "FILE")]
    statement: Option<PathBuf>,
}

#[derive(Args)]
struct HierarchyCommand {
    #[command(flatten)]
    ontology: OntologyArgs,

    /// Class label language; pass an empty string for untagged labels only
    #[arg(long, value_name = "TAG")]
    lang: Option<String>,

    /// classes, object_properties or data_properties
    #[arg(value_name = "NAME")]
    name: String,
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ontorec=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Recommend(cmd) => handle_recommend(cmd),
        Commands::Hierarchy(cmd) => handle_hierarchy(cmd),
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// User errors are bad inputs: missing or malformed files, invalid settings,
/// unknown hierarchy names. Everything else is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.is::<ConfigError>()
            || cause.is::<GraphError>()
            || cause.is::<PropertyLabelsError>()
            || cause.is::<UnknownHierarchy>()
            || cause.is::<serde_json::Error>()
            || cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
    })
}

fn handle_recommend(cmd: &RecommendCommand) -> Result<()> {
    let config = RecommendationConfig::discover(cmd.config.as_deref())
        .context("Failed to load recommendation config")?;
    let graph = load_ontology(&cmd.ontology)?;
    let labels = load_property_labels(cmd.ontology.labels.as_deref())?;
    let store = load_hierarchies(&graph, &labels, config.language_filter())
        .context("Failed to build hierarchies")?;

    let mut builder = RecommendationEngineBuilder::new()
        .store(store)
        .subclass_index(Arc::new(graph));
    if let Some(service) = embedding_service(&config)? {
        builder = builder.embeddings(service);
    }
    let engine = builder
        .config(config)
        .build()
        .context("Failed to build recommendation engine")?;

    let statement = read_statement(cmd.statement.as_deref())?;
    let recommendations = engine
        .get_recommendations(&statement)
        .context("Failed to compute recommendations")?;

    println!("{}", serde_json::to_string_pretty(&recommendations)?);
    Ok(())
}

fn handle_hierarchy(cmd: &HierarchyCommand) -> Result<()> {
    let kind: HierarchyKind = cmd.name.parse()?;
    let graph = load_ontology(&cmd.ontology)?;
    let labels = load_property_labels(cmd.ontology.labels.as_deref())?;
    let mut store = load_hierarchies(
        &graph,
        &labels,
        LanguageFilter::from_setting(cmd.lang.as_deref()),
    )
    .context("Failed to build hierarchies")?;

    let root = store.root(kind)?.to_string();
    let depth = store
        .max_depth(kind, &root)
        .with_context(|| format!("Failed to compute depth of {kind}"))?;
    let hierarchy = store.hierarchy(kind)?;

    print!("{}", render_tree(hierarchy));
    println!("{} nodes, max depth {depth}", hierarchy.len());
    Ok(())
}

fn load_ontology(args: &OntologyArgs) -> Result<OntologyGraph> {
    OntologyGraph::load(&args.ontology, args.format).context("Failed to load ontology")
}

/// Picks the embedding backend for semantic ordering: a local model file
/// first, then a remote Ollama server.
fn embedding_service(config: &RecommendationConfig) -> Result<Option<Arc<dyn EmbeddingService>>> {
    if config.order != ontorec::config::Order::Semantic {
        return Ok(None);
    }
    if let Some(path) = &config.embedding_model_path {
        let vectors = WordVectors::load(path).context("Failed to load embedding model")?;
        return Ok(Some(Arc::new(vectors)));
    }
    if let Some(endpoint) = &config.embedding_endpoint {
        let mut builder = OllamaEmbeddingClientBuilder::new()
            .base_url(endpoint)
            .timeout(config.embedding_timeout());
        if let Some(model) = &config.embedding_model {
            builder = builder.model(model);
        }
        let client = builder.build().context("Failed to create embedding client")?;
        return Ok(Some(Arc::new(client)));
    }
    Err(ConfigError::Invalid {
        key: "embedding_model_path",
        reason: "semantic order needs `embedding_model_path` or `embedding_endpoint`".to_string(),
    }
    .into())
}

fn load_property_labels(path: Option<&Path>) -> Result<PropertyLabels> {
    match path {
        Some(path) => PropertyLabels::load(path).context("Failed to load property labels"),
        None => Ok(PropertyLabels::default()),
    }
}

/// Reads the statement JSON from `path`, or from stdin when absent.
fn read_statement(path: Option<&Path>) -> Result<Vec<Triple>> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read statement: {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read statement from stdin")?;
            text
        }
    };
    parse_statement(&text)
}

fn parse_statement(text: &str) -> Result<Vec<Triple>> {
    serde_json::from_str(text)
        .context("Statement must be a JSON array of [subject, predicate, object] triples")
}

/// Renders the tree under the hierarchy root, two spaces per level.
///
/// A node reached twice (possible after a parent was overwritten) is printed
/// again but not expanded a second time.
fn render_tree(hierarchy: &Hierarchy) -> String {
    let mut out = String::new();
    let mut expanded: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&str, usize)> = vec![(hierarchy.root(), 0)];

    while let Some((uri, level)) = stack.pop() {
        let indent = "  ".repeat(level);
        let Some(node) = hierarchy.get(uri) else {
            let _ = writeln!(out, "{indent}{uri}");
            continue;
        };
        let _ = writeln!(out, "{indent}{} <{}>", node.display_name(), node.id());
        if !expanded.insert(uri) {
            continue;
        }
        for child in node.children().iter().rev() {
            stack.push((child.as_str(), level + 1));
        }
    }
    out
}
