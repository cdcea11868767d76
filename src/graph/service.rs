use std::path::PathBuf;

use thiserror::Error;

use super::format::OntologyFormat;
use crate::models::HierarchyRow;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_SUBPROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";

/// Errors raised while loading or querying a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Reading the ontology document failed.
    #[error("failed to read ontology `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid in the given format.
    #[error("failed to parse {format} ontology: {reason}")]
    Parse {
        format: OntologyFormat,
        reason: String,
    },

    /// The file extension does not name a supported format.
    #[error("cannot tell the ontology format of `{0}`; pass it explicitly")]
    UndeterminedFormat(PathBuf),

    #[error("unknown ontology format `{0}` (expected turtle, ntriples or rdfxml)")]
    UnknownFormat(String),

    /// An IRI or language tag given for insertion is malformed.
    #[error("invalid RDF term `{term}`: {reason}")]
    InvalidTerm { term: String, reason: String },

    #[error("invalid {name} query: {reason}")]
    InvalidQuery { name: &'static str, reason: String },

    /// Evaluating a query or touching the store failed.
    #[error("graph store error: {0}")]
    Store(String),
}

/// An `rdfs:label` literal with its optional language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelLiteral {
    pub value: String,
    pub language: Option<String>,
}

impl LabelLiteral {
    pub fn new(value: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            value: value.into(),
            language: language.map(str::to_string),
        }
    }
}

/// Access to the ontology's direct `rdfs:subClassOf` edges.
///
/// Closure over these edges is computed by the caller.
pub trait SubclassIndex: Send + Sync {
    /// Returns every class `s` such that `s rdfs:subClassOf class` is asserted.
    fn direct_subclasses(&self, class: &str) -> Vec<String>;
}

/// Ontology queries needed to build the class and property hierarchies.
///
/// Row queries follow SPARQL `OPTIONAL` semantics: an absent super entity,
/// domain or range leaves that column empty, and multiple values produce the
/// cross product of rows.
pub trait GraphQueryService: SubclassIndex {
    /// Returns the `rdfs:label` literals attached to `subject`.
    fn labels(&self, subject: &str) -> Vec<LabelLiteral>;

    /// `(class, superclass?)` for every `owl:Class` other than `owl:Thing`.
    fn class_rows(&self) -> Result<Vec<HierarchyRow>, GraphError>;

    /// `(property, superProperty?, domain?, range?)` for every `owl:ObjectProperty`
    /// other than `owl:topObjectProperty`.
    fn object_property_rows(&self) -> Result<Vec<HierarchyRow>, GraphError>;

    /// `(property, superProperty?, domain?, range?)` for every `owl:DatatypeProperty`
    /// other than `owl:topDataProperty`.
    fn data_property_rows(&self) -> Result<Vec<HierarchyRow>, GraphError>;
}
