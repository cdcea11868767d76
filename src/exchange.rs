//! Decides which entities of a statement may be substituted.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::Triple;

/// Result of classifying a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Exchangeability {
    entities: HashMap<String, bool>,
    prop_ref: HashMap<String, String>,
}

impl Exchangeability {
    /// Whether `entity` may be replaced. Entities absent from the statement
    /// cannot.
    pub fn can_exchange(&self, entity: &str) -> bool {
        self.entities.get(entity).copied().unwrap_or(false)
    }

    /// Predicate that introduced the value class `class`, if any.
    pub fn prop_ref(&self, class: &str) -> Option<&str> {
        self.prop_ref.get(class).map(String::as_str)
    }

    /// Every subject, predicate and object seen, with its verdict.
    pub fn entities(&self) -> &HashMap<String, bool> {
        &self.entities
    }
}

/// Classifies the entities of `triples`.
///
/// Three passes run in a fixed order, later ones overwriting earlier
/// verdicts for the keys they touch:
///
/// 1. In every `has_value` triple the subject is fixed; the object is
///    exchangeable only when `is_known_class` accepts it, in which case it
///    is remembered as a value class of that subject.
/// 2. If every triple is a `has_value` triple, subjects become exchangeable
///    and objects fixed.
/// 3. Every other triple links the value classes of its object to its
///    predicate, defaults unseen subjects and objects to exchangeable, and
///    gives the predicate the object's verdict.
///
/// # Examples
///
/// ```
/// use ontorec::Triple;
/// use ontorec::exchange::classify;
///
/// let triples = vec![
///     Triple::new("p1", "owns", "pet"),
///     Triple::new("pet", "has_value", "Dog"),
/// ];
/// let result = classify(&triples, |uri| uri == "Dog");
///
/// assert!(result.can_exchange("Dog"));
/// assert!(!result.can_exchange("pet"));
/// assert!(!result.can_exchange("owns"));
/// assert_eq!(result.prop_ref("Dog"), Some("owns"));
/// ```
pub fn classify<F>(triples: &[Triple], is_known_class: F) -> Exchangeability
where
    F: Fn(&str) -> bool,
{
    let mut entities: HashMap<String, bool> = HashMap::new();
    let mut prop_ref: HashMap<String, String> = HashMap::new();
    let mut value_classes: HashMap<&str, Vec<&str>> = HashMap::new();

    let mut with_values = 0usize;
    for triple in triples.iter().filter(|t| t.is_has_value()) {
        with_values += 1;
        entities.insert(triple.subject.clone(), false);
        if is_known_class(&triple.object) {
            entities.insert(triple.object.clone(), true);
            value_classes
                .entry(triple.subject.as_str())
                .or_default()
                .push(triple.object.as_str());
        } else {
            entities.insert(triple.object.clone(), false);
        }
    }

    if with_values == triples.len() {
        for triple in triples {
            entities.insert(triple.subject.clone(), true);
            entities.insert(triple.object.clone(), false);
        }
    }

    for triple in triples.iter().filter(|t| !t.is_has_value()) {
        if let Some(classes) = value_classes.get(triple.object.as_str()) {
            for class in classes {
                prop_ref.insert((*class).to_string(), triple.predicate.clone());
            }
        }
        entities.entry(triple.subject.clone()).or_insert(true);
        let object = *entities.entry(triple.object.clone()).or_insert(true);
        entities.insert(triple.predicate.clone(), object);
    }

    Exchangeability { entities, prop_ref }
}
