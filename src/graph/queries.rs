use oxigraph::sparql::Query;

use super::service::GraphError;

/// `(?entity, ?super)` for every named `owl:Class` except `owl:Thing`.
pub const CLASS_ROWS_QUERY: &str = r#"
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT ?entity ?super WHERE {
    ?entity a owl:Class .
    OPTIONAL { ?entity rdfs:subClassOf ?super . FILTER(isIRI(?super)) }
    FILTER(isIRI(?entity) && ?entity != owl:Thing)
}
ORDER BY ?entity ?super
"#;

/// `(?entity, ?super, ?domain, ?range)` for every named `owl:ObjectProperty`
/// except `owl:topObjectProperty`.
pub const OBJECT_PROPERTY_ROWS_QUERY: &str = r#"
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT ?entity ?super ?domain ?range WHERE {
    ?entity a owl:ObjectProperty .
    OPTIONAL { ?entity rdfs:subPropertyOf ?super . FILTER(isIRI(?super)) }
    OPTIONAL { ?entity rdfs:domain ?domain . FILTER(isIRI(?domain)) }
    OPTIONAL { ?entity rdfs:range ?range . FILTER(isIRI(?range)) }
    FILTER(isIRI(?entity) && ?entity != owl:topObjectProperty)
}
ORDER BY ?entity ?super ?domain ?range
"#;

/// `(?entity, ?super, ?domain, ?range)` for every named `owl:DatatypeProperty`
/// except `owl:topDataProperty`.
pub const DATA_PROPERTY_ROWS_QUERY: &str = r#"
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT ?entity ?super ?domain ?range WHERE {
    ?entity a owl:DatatypeProperty .
    OPTIONAL { ?entity rdfs:subPropertyOf ?super . FILTER(isIRI(?super)) }
    OPTIONAL { ?entity rdfs:domain ?domain . FILTER(isIRI(?domain)) }
    OPTIONAL { ?entity rdfs:range ?range . FILTER(isIRI(?range)) }
    FILTER(isIRI(?entity) && ?entity != owl:topDataProperty)
}
ORDER BY ?entity ?super ?domain ?range
"#;

/// The three SELECT queries that produce hierarchy rows.
///
/// Each must bind `?entity`; `?super`, `?domain` and `?range` are optional.
/// Non-IRI bindings are ignored.
#[derive(Debug, Clone)]
pub struct RowQueries {
    pub(crate) classes: Query,
    pub(crate) object_properties: Query,
    pub(crate) data_properties: Query,
}

impl RowQueries {
    /// Parses custom query text.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::InvalidQuery` naming the first query that does
    /// not parse.
    pub fn new(
        classes: &str,
        object_properties: &str,
        data_properties: &str,
    ) -> Result<Self, GraphError> {
        Ok(Self {
            classes: parse("classes", classes)?,
            object_properties: parse("object property", object_properties)?,
            data_properties: parse("data property", data_properties)?,
        })
    }

    /// The bundled OWL queries.
    pub fn standard() -> Result<Self, GraphError> {
        Self::new(
            CLASS_ROWS_QUERY,
            OBJECT_PROPERTY_ROWS_QUERY,
            DATA_PROPERTY_ROWS_QUERY,
        )
    }
}

fn parse(name: &'static str, text: &str) -> Result<Query, GraphError> {
    Query::parse(text, None).map_err(|e| GraphError::InvalidQuery {
        name,
        reason: e.to_string(),
    })
}
