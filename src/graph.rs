//! Graph query service: the ontology queries the hierarchy builder and the
//! compatibility filter depend on.
//!
//! The traits are the seam; [`OntologyGraph`] is the bundled implementation,
//! an in-memory oxigraph store loaded from Turtle, N-Triples or RDF/XML and
//! queried with the SPARQL in [`RowQueries`].
//!
//! # Examples
//!
//! ```
//! use ontorec::graph::{OntologyGraph, SubclassIndex, RDFS_SUBCLASS_OF};
//!
//! let graph = OntologyGraph::new().unwrap();
//! graph.insert_iri("http://ex.org#Dog", RDFS_SUBCLASS_OF, "http://ex.org#Animal").unwrap();
//!
//! assert_eq!(graph.direct_subclasses("http://ex.org#Animal"), vec!["http://ex.org#Dog"]);
//! ```

mod format;
mod ontology;
mod queries;
mod service;

pub use format::OntologyFormat;
pub use ontology::OntologyGraph;
pub use queries::{
    CLASS_ROWS_QUERY, DATA_PROPERTY_ROWS_QUERY, OBJECT_PROPERTY_ROWS_QUERY, RowQueries,
};
pub use service::{
    GraphError, GraphQueryService, LabelLiteral, OWL_CLASS, OWL_DATATYPE_PROPERTY,
    OWL_OBJECT_PROPERTY, RDF_TYPE, RDFS_DOMAIN, RDFS_LABEL, RDFS_RANGE, RDFS_SUBCLASS_OF,
    RDFS_SUBPROPERTY_OF, SubclassIndex,
};
