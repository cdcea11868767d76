use serde::{Deserialize, Serialize};

/// Sentinel predicate for "subject has class/literal value = object".
pub const HAS_VALUE: &str = "has_value";

/// One `(subject, predicate, object)` statement triple.
///
/// Serialized as a three element JSON array.
///
/// # Examples
///
/// ```
/// use ontorec::Triple;
///
/// let triple: Triple = serde_json::from_str(r#"["x1", "has_value", "ClassA"]"#).unwrap();
/// assert!(triple.is_has_value());
/// assert_eq!(triple.object, "ClassA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Returns `true` when the predicate is the `has_value` sentinel.
    pub fn is_has_value(&self) -> bool {
        self.predicate == HAS_VALUE
    }
}

impl From<(String, String, String)> for Triple {
    fn from((subject, predicate, object): (String, String, String)) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl From<Triple> for (String, String, String) {
    fn from(triple: Triple) -> Self {
        (triple.subject, triple.predicate, triple.object)
    }
}

impl From<(&str, &str, &str)> for Triple {
    fn from((subject, predicate, object): (&str, &str, &str)) -> Self {
        Self::new(subject, predicate, object)
    }
}
