use std::fmt;
use std::path::Path;
use std::str::FromStr;

use oxigraph::io::RdfFormat;

use super::service::GraphError;

/// Serialization of an ontology document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OntologyFormat {
    Turtle,
    NTriples,
    RdfXml,
}

impl OntologyFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Turtle => "turtle",
            Self::NTriples => "ntriples",
            Self::RdfXml => "rdfxml",
        }
    }

    /// Guesses the format from a file extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use ontorec::graph::OntologyFormat;
    ///
    /// assert_eq!(OntologyFormat::from_path(Path::new("zoo.ttl")), Some(OntologyFormat::Turtle));
    /// assert_eq!(OntologyFormat::from_path(Path::new("zoo.owl")), Some(OntologyFormat::RdfXml));
    /// assert_eq!(OntologyFormat::from_path(Path::new("zoo")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "ttl" | "turtle" => Some(Self::Turtle),
            "nt" | "ntriples" => Some(Self::NTriples),
            "owl" | "rdf" | "xml" => Some(Self::RdfXml),
            _ => None,
        }
    }

    pub(crate) fn rdf_format(self) -> RdfFormat {
        match self {
            Self::Turtle => RdfFormat::Turtle,
            Self::NTriples => RdfFormat::NTriples,
            Self::RdfXml => RdfFormat::RdfXml,
        }
    }
}

impl fmt::Display for OntologyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OntologyFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "turtle" | "ttl" => Ok(Self::Turtle),
            "ntriples" | "n-triples" | "nt" => Ok(Self::NTriples),
            "rdfxml" | "rdf/xml" | "xml" | "owl" => Ok(Self::RdfXml),
            other => Err(GraphError::UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_format_names_case_insensitively() {
        assert_eq!("Turtle".parse::<OntologyFormat>().unwrap(), OntologyFormat::Turtle);
        assert_eq!("n-triples".parse::<OntologyFormat>().unwrap(), OntologyFormat::NTriples);
        assert_eq!("RDF/XML".parse::<OntologyFormat>().unwrap(), OntologyFormat::RdfXml);
    }

    #[test]
    fn rejects_unknown_format_names() {
        let err = "json-ld".parse::<OntologyFormat>().unwrap_err();
        assert!(matches!(err, GraphError::UnknownFormat(name) if name == "json-ld"));
    }

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(
            OntologyFormat::from_path(Path::new("/tmp/Zoo.NT")),
            Some(OntologyFormat::NTriples)
        );
        assert_eq!(OntologyFormat::from_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for format in [OntologyFormat::Turtle, OntologyFormat::NTriples, OntologyFormat::RdfXml] {
            assert_eq!(format.to_string().parse::<OntologyFormat>().unwrap(), format);
        }
    }
}
