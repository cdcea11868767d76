use super::labels::{ClassLabels, LanguageFilter, PropertyLabels};
use super::store::{HierarchyError, HierarchyStore};
use crate::graph::{GraphError, GraphQueryService};
use crate::models::{HierarchyKind, HierarchyRow};

/// Builds the class, object-property and data-property hierarchies.
///
/// Class labels come from the graph's `rdfs:label` literals filtered by
/// `language`; property labels come from `property_labels`.
///
/// # Errors
///
/// Returns `HierarchyError::Query` when the graph fails to answer one of
/// the row queries.
///
/// # Examples
///
/// ```
/// use ontorec::graph::{OntologyGraph, OWL_CLASS, RDF_TYPE};
/// use ontorec::hierarchy::{load_hierarchies, LanguageFilter, PropertyLabels};
/// use ontorec::HierarchyKind;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let graph = OntologyGraph::new()?;
/// graph.insert_iri("http://ex.org#Dog", RDF_TYPE, OWL_CLASS)?;
///
/// let store = load_hierarchies(&graph, &PropertyLabels::default(), LanguageFilter::Any)?;
/// assert_eq!(store.names().len(), 3);
/// assert!(store.hierarchy(HierarchyKind::Classes)?.contains("http://ex.org#Dog"));
/// # Ok(())
/// # }
/// ```
pub fn load_hierarchies(
    graph: &dyn GraphQueryService,
    property_labels: &PropertyLabels,
    language: LanguageFilter,
) -> Result<HierarchyStore, HierarchyError> {
    let class_labels = ClassLabels::new(graph, language);
    let class_rows = rows(HierarchyKind::Classes, graph.class_rows())?;
    let object_rows = rows(HierarchyKind::ObjectProperties, graph.object_property_rows())?;
    let data_rows = rows(HierarchyKind::DataProperties, graph.data_property_rows())?;
    let mut store = HierarchyStore::new();

    store.build(
        HierarchyKind::Classes,
        HierarchyKind::Classes.default_root(),
        class_rows,
        &class_labels,
    )?;
    store.build(
        HierarchyKind::ObjectProperties,
        HierarchyKind::ObjectProperties.default_root(),
        object_rows,
        property_labels,
    )?;
    store.build(
        HierarchyKind::DataProperties,
        HierarchyKind::DataProperties.default_root(),
        data_rows,
        property_labels,
    )?;

    Ok(store)
}

fn rows(
    kind: HierarchyKind,
    result: Result<Vec<HierarchyRow>, GraphError>,
) -> Result<Vec<HierarchyRow>, HierarchyError> {
    result.map_err(|error| {
        tracing::warn!(hierarchy = %kind, %error, "hierarchy rows query failed");
        HierarchyError::Query {
            kind,
            reason: error.to_string(),
        }
    })
}
