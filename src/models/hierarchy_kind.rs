use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// IRI of the universal top class.
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
/// IRI of the universal top object property.
pub const OWL_TOP_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#topObjectProperty";
/// IRI of the universal top datatype property.
pub const OWL_TOP_DATA_PROPERTY: &str = "http://www.w3.org/2002/07/owl#topDataProperty";

/// The three hierarchies built out of an ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyKind {
    /// `owl:Class` entities linked by `rdfs:subClassOf`.
    Classes,
    /// `owl:ObjectProperty` entities linked by `rdfs:subPropertyOf`.
    ObjectProperties,
    /// `owl:DatatypeProperty` entities linked by `rdfs:subPropertyOf`.
    DataProperties,
}

impl HierarchyKind {
    /// All kinds, in construction order.
    pub const ALL: [HierarchyKind; 3] = [
        HierarchyKind::Classes,
        HierarchyKind::ObjectProperties,
        HierarchyKind::DataProperties,
    ];

    /// Returns the hierarchy name used in configuration and on the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classes => "classes",
            Self::ObjectProperties => "object_properties",
            Self::DataProperties => "data_properties",
        }
    }

    /// Returns `true` for the two property hierarchies.
    pub fn is_property(self) -> bool {
        !matches!(self, Self::Classes)
    }

    /// Returns the OWL top entity that roots this hierarchy.
    pub fn default_root(self) -> &'static str {
        match self {
            Self::Classes => OWL_THING,
            Self::ObjectProperties => OWL_TOP_OBJECT_PROPERTY,
            Self::DataProperties => OWL_TOP_DATA_PROPERTY,
        }
    }
}

impl fmt::Display for HierarchyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a hierarchy name that is not one of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no hierarchy named `{0}`")]
pub struct UnknownHierarchy(pub String);

impl FromStr for HierarchyKind {
    type Err = UnknownHierarchy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classes" => Ok(Self::Classes),
            "object_properties" => Ok(Self::ObjectProperties),
            "data_properties" => Ok(Self::DataProperties),
            other => Err(UnknownHierarchy(other.to_string())),
        }
    }
}
