use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use oxigraph::model::vocab::rdfs;
use oxigraph::model::{
    GraphNameRef, Literal, NamedNode, NamedNodeRef, Quad, QuadRef, Subject, Term,
};
use oxigraph::sparql::{Query, QueryResults};
use oxigraph::store::{StorageError, Store};

use super::format::OntologyFormat;
use super::queries::RowQueries;
use super::service::{GraphError, GraphQueryService, LabelLiteral, SubclassIndex};
use crate::models::HierarchyRow;

/// Ontology held in an in-memory oxigraph store.
///
/// Row queries are SPARQL and come back ordered by IRI, so hierarchies
/// built from the same document are identical.
pub struct OntologyGraph {
    store: Store,
    queries: RowQueries,
}

impl OntologyGraph {
    /// Creates an empty graph answering the standard row queries.
    pub fn new() -> Result<Self, GraphError> {
        Self::with_queries(RowQueries::standard()?)
    }

    /// Creates an empty graph answering `queries`.
    pub fn with_queries(queries: RowQueries) -> Result<Self, GraphError> {
        let store = Store::new().map_err(store_error)?;
        Ok(Self { store, queries })
    }

    /// Loads an ontology document from disk.
    ///
    /// Without an explicit `format` the file extension decides: `.ttl`,
    /// `.nt`, or `.owl`/`.rdf`/`.xml` for RDF/XML.
    ///
    /// # Errors
    ///
    /// - `GraphError::UndeterminedFormat` if no format is given and the
    ///   extension is not recognized
    /// - `GraphError::Io` if the file cannot be opened
    /// - `GraphError::Parse` if the document is malformed
    pub fn load(path: &Path, format: Option<OntologyFormat>) -> Result<Self, GraphError> {
        let format = match format {
            Some(format) => format,
            None => OntologyFormat::from_path(path)
                .ok_or_else(|| GraphError::UndeterminedFormat(path.to_path_buf()))?,
        };
        let file = File::open(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let graph = Self::from_reader(BufReader::new(file), format)?;
        tracing::info!(
            path = %path.display(),
            %format,
            triples = graph.len()?,
            "loaded ontology graph"
        );
        Ok(graph)
    }

    /// Reads a whole document into a new graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontorec::graph::{GraphQueryService, OntologyFormat, OntologyGraph};
    ///
    /// let doc = r#"
    ///     @prefix owl: <http://www.w3.org/2002/07/owl#> .
    ///     @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
    ///     <http://ex.org#Dog> a owl:Class ; rdfs:label "Dog"@en .
    /// "#;
    /// let graph = OntologyGraph::from_reader(doc.as_bytes(), OntologyFormat::Turtle).unwrap();
    /// assert_eq!(graph.class_rows().unwrap().len(), 1);
    /// assert_eq!(graph.labels("http://ex.org#Dog")[0].value, "Dog");
    /// ```
    pub fn from_reader(reader: impl Read, format: OntologyFormat) -> Result<Self, GraphError> {
        let graph = Self::new()?;
        graph.read(reader, format)?;
        Ok(graph)
    }

    /// Adds the triples of a document to this graph.
    pub fn read(&self, reader: impl Read, format: OntologyFormat) -> Result<(), GraphError> {
        self.store
            .load_from_reader(format.rdf_format(), reader)
            .map_err(|e| GraphError::Parse {
                format,
                reason: e.to_string(),
            })
    }

    /// Number of distinct triples.
    pub fn len(&self) -> Result<usize, GraphError> {
        self.store.len().map_err(store_error)
    }

    pub fn is_empty(&self) -> Result<bool, GraphError> {
        self.store.is_empty().map_err(store_error)
    }

    /// Inserts a triple whose object is an IRI.
    pub fn insert_iri(&self, subject: &str, predicate: &str, object: &str) -> Result<(), GraphError> {
        let (subject, predicate, object) = (iri(subject)?, iri(predicate)?, iri(object)?);
        self.insert(QuadRef::new(
            subject.as_ref(),
            predicate.as_ref(),
            object.as_ref(),
            GraphNameRef::DefaultGraph,
        ))
    }

    /// Inserts a triple whose object is a literal, optionally language-tagged.
    pub fn insert_literal(
        &self,
        subject: &str,
        predicate: &str,
        value: &str,
        language: Option<&str>,
    ) -> Result<(), GraphError> {
        let (subject, predicate) = (iri(subject)?, iri(predicate)?);
        let literal = match language {
            Some(language) => Literal::new_language_tagged_literal(value, language).map_err(|e| {
                GraphError::InvalidTerm {
                    term: language.to_string(),
                    reason: e.to_string(),
                }
            })?,
            None => Literal::new_simple_literal(value),
        };
        self.insert(QuadRef::new(
            subject.as_ref(),
            predicate.as_ref(),
            literal.as_ref(),
            GraphNameRef::DefaultGraph,
        ))
    }

    fn insert(&self, quad: QuadRef<'_>) -> Result<(), GraphError> {
        self.store.insert(quad).map(|_| ()).map_err(store_error)
    }

    fn rows(&self, query: &Query) -> Result<Vec<HierarchyRow>, GraphError> {
        let QueryResults::Solutions(solutions) = self.store.query(query.clone()).map_err(store_error)?
        else {
            return Err(GraphError::Store("row queries must be SELECT queries".to_string()));
        };

        let mut rows = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(store_error)?;
            let Some(entity) = bound_iri(solution.get("entity")) else {
                continue;
            };
            rows.push(HierarchyRow {
                entity,
                super_entity: bound_iri(solution.get("super")),
                domain: bound_iri(solution.get("domain")),
                range: bound_iri(solution.get("range")),
            });
        }
        Ok(rows)
    }
}

impl std::fmt::Debug for OntologyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntologyGraph").finish_non_exhaustive()
    }
}

impl SubclassIndex for OntologyGraph {
    fn direct_subclasses(&self, class: &str) -> Vec<String> {
        let Ok(class) = NamedNodeRef::new(class) else {
            return Vec::new();
        };
        let mut subclasses: Vec<String> = self
            .store
            .quads_for_pattern(None, Some(rdfs::SUB_CLASS_OF), Some(class.into()), None)
            .filter_map(readable)
            .filter_map(|quad| match quad.subject {
                Subject::NamedNode(node) => Some(node.into_string()),
                _ => None,
            })
            .collect();
        subclasses.sort();
        subclasses.dedup();
        subclasses
    }
}

impl GraphQueryService for OntologyGraph {
    /// Untagged literals first, then by language tag and value.
    fn labels(&self, subject: &str) -> Vec<LabelLiteral> {
        let Ok(subject) = NamedNodeRef::new(subject) else {
            return Vec::new();
        };
        let mut labels: Vec<LabelLiteral> = self
            .store
            .quads_for_pattern(Some(subject.into()), Some(rdfs::LABEL), None, None)
            .filter_map(readable)
            .filter_map(|quad| match quad.object {
                Term::Literal(literal) => Some(LabelLiteral::new(literal.value(), literal.language())),
                _ => None,
            })
            .collect();
        labels.sort_by(|a, b| (&a.language, &a.value).cmp(&(&b.language, &b.value)));
        labels.dedup();
        labels
    }

    fn class_rows(&self) -> Result<Vec<HierarchyRow>, GraphError> {
        self.rows(&self.queries.classes)
    }

    fn object_property_rows(&self) -> Result<Vec<HierarchyRow>, GraphError> {
        self.rows(&self.queries.object_properties)
    }

    fn data_property_rows(&self) -> Result<Vec<HierarchyRow>, GraphError> {
        self.rows(&self.queries.data_properties)
    }
}

fn iri(value: &str) -> Result<NamedNode, GraphError> {
    NamedNode::new(value).map_err(|e| GraphError::InvalidTerm {
        term: value.to_string(),
        reason: e.to_string(),
    })
}

fn bound_iri(term: Option<&Term>) -> Option<String> {
    match term {
        Some(Term::NamedNode(node)) => Some(node.as_str().to_string()),
        _ => None,
    }
}

fn readable(quad: Result<Quad, StorageError>) -> Option<Quad> {
    quad.map_err(|e| tracing::warn!(error = %e, "skipping unreadable triple"))
        .ok()
}

fn store_error(error: impl Display) -> GraphError {
    GraphError::Store(error.to_string())
}
