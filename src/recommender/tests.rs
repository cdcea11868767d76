use super::*;
use std::collections::HashMap;

use crate::config::{FilterBy, OrderSet};
use crate::graph::{OntologyFormat, OntologyGraph};
use crate::hierarchy::{LanguageFilter, PropertyLabels, load_hierarchies};
use crate::models::{HierarchyRow, OWL_THING};

const ZOO: &str = "http://zoo.example/";

//  Thing
//  ├── Animal ── Bird, Cat, Cow, Dog ── Puppy, Fish, Horse
//  ├── Person ── Adult, Child
//  └── Plant
//
//  relatesTo ── feeds (Person -> Animal), likes (Person -> Plant),
//               meets (Person | Animal), owns (Person -> Animal)
//  age (Person), height (Person), weight (Animal)
const ZOO_TTL: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix : <http://zoo.example/> .

:Animal a owl:Class .
:Person a owl:Class .
:Plant a owl:Class .
:Dog a owl:Class ; rdfs:subClassOf :Animal .
:Cat a owl:Class ; rdfs:subClassOf :Animal .
:Bird a owl:Class ; rdfs:subClassOf :Animal .
:Fish a owl:Class ; rdfs:subClassOf :Animal .
:Horse a owl:Class ; rdfs:subClassOf :Animal .
:Cow a owl:Class ; rdfs:subClassOf :Animal .
:Puppy a owl:Class ; rdfs:subClassOf :Dog .
:Child a owl:Class ; rdfs:subClassOf :Person .
:Adult a owl:Class ; rdfs:subClassOf :Person .

:relatesTo a owl:ObjectProperty .
:owns a owl:ObjectProperty ; rdfs:subPropertyOf :relatesTo ;
    rdfs:domain :Person ; rdfs:range :Animal .
:feeds a owl:ObjectProperty ; rdfs:subPropertyOf :relatesTo ;
    rdfs:domain :Person ; rdfs:range :Animal .
:likes a owl:ObjectProperty ; rdfs:subPropertyOf :relatesTo ;
    rdfs:domain :Person ; rdfs:range :Plant .
:meets a owl:ObjectProperty ; rdfs:subPropertyOf :relatesTo ;
    rdfs:domain :Person, :Animal .

:age a owl:DatatypeProperty ; rdfs:domain :Person .
:height a owl:DatatypeProperty ; rdfs:domain :Person .
:weight a owl:DatatypeProperty ; rdfs:domain :Animal .
"#;

fn z(name: &str) -> String {
    format!("{ZOO}{name}")
}

fn zoo() -> OntologyGraph {
    OntologyGraph::from_reader(ZOO_TTL.as_bytes(), OntologyFormat::Turtle).expect("zoo parses")
}

fn property_labels() -> PropertyLabels {
    PropertyLabels::new(HashMap::from([(z("feeds"), "gives food to".to_string())]))
}

fn engine_with(config: RecommendationConfig) -> RecommendationEngine {
    let graph = zoo();
    let store = load_hierarchies(&graph, &property_labels(), LanguageFilter::Any)
        .expect("zoo hierarchies");
    RecommendationEngineBuilder::new()
        .store(store)
        .subclass_index(Arc::new(graph))
        .config(config)
        .build()
        .expect("valid engine")
}

fn range_config() -> RecommendationConfig {
    RecommendationConfig {
        depth: 2,
        family_position: -1,
        filter_by: FilterBy::Range,
        ..Default::default()
    }
}

/// Local names of the nodes, in order.
fn ids(nodes: &[&HierarchyNode]) -> Vec<String> {
    nodes
        .iter()
        .map(|node| node.id().trim_start_matches(ZOO).to_string())
        .collect()
}

fn value_statement() -> Vec<Triple> {
    vec![
        Triple::new("p1", z("owns"), z("Person")),
        Triple::new(z("Person"), "has_value", z("Dog")),
    ]
}

/// Scores candidates by label, ignoring the source.
struct LabelScores(HashMap<&'static str, f64>);

impl EmbeddingService for LabelScores {
    fn contains(&self, _token: &str) -> bool {
        true
    }

    fn n_similarity(&self, _a: &[String], b: &[String]) -> Result<f64, EmbeddingError> {
        Ok(self.0.get(b.join(" ").as_str()).copied().unwrap_or(0.0))
    }
}

#[test]
fn value_class_is_replaced_by_its_siblings() {
    let engine = engine_with(range_config());

    let recommendations = engine.get_recommendations(&value_statement()).unwrap();

    assert_eq!(
        recommendations.suggestions,
        vec!["Bird", "Cat", "Cow", "Fish", "Horse"]
    );
    assert!(!recommendations.suggestions.contains(&"Dog".to_string()));
}

#[test]
fn never_returns_more_than_size() {
    let engine = engine_with(RecommendationConfig {
        size: 1,
        ..range_config()
    });

    let recommendations = engine.get_recommendations(&value_statement()).unwrap();
    assert_eq!(recommendations.suggestions, vec!["Bird"]);
}

#[test]
fn prefix_and_template_are_applied() {
    let engine = engine_with(RecommendationConfig {
        text_template: "What about a {}?".to_string(),
        suggestion_prefix_text: "You could also ask:".to_string(),
        size: 2,
        ..range_config()
    });

    let recommendations = engine.get_recommendations(&value_statement()).unwrap();
    assert_eq!(recommendations.prefix, "You could also ask:");
    assert_eq!(
        recommendations.suggestions,
        vec!["What about a Bird?", "What about a Cat?"]
    );
}

#[test]
fn predicate_is_replaced_by_compatible_sibling_properties() {
    let engine = engine_with(range_config());

    let recommendations = engine
        .get_recommendations(&[Triple::new("p1", z("owns"), z("Dog"))])
        .unwrap();

    // likes ranges over plants; relatesTo has no range at all.
    assert_eq!(recommendations.suggestions, vec!["gives food to"]);
}

#[test]
fn own_subtree_search_finds_nothing_below_a_leaf_property() {
    let engine = engine_with(RecommendationConfig {
        family_position: 0,
        ..range_config()
    });

    let recommendations = engine
        .get_recommendations(&[Triple::new("p1", z("owns"), z("Dog"))])
        .unwrap();
    assert!(recommendations.suggestions.is_empty());
}

#[test]
fn each_entity_is_handled_once() {
    let engine = engine_with(range_config());

    let recommendations = engine
        .get_recommendations(&[
            Triple::new("a", z("owns"), z("Dog")),
            Triple::new("b", z("feeds"), z("Dog")),
        ])
        .unwrap();
    assert_eq!(recommendations.suggestions, vec!["gives food to"]);
}

#[test]
fn value_class_without_originating_predicate_yields_nothing() {
    let engine = engine_with(range_config());

    let recommendations = engine
        .get_recommendations(&[
            Triple::new("p1", z("owns"), z("Person")),
            Triple::new("q", "has_value", z("Dog")),
        ])
        .unwrap();
    assert!(recommendations.suggestions.is_empty());
}

#[test]
fn subject_class_is_replaced_by_classes_in_the_same_domain() {
    let engine = engine_with(RecommendationConfig {
        filter_by: FilterBy::Both,
        ..range_config()
    });

    let related = engine
        .related_classes(&z("meets"), Some(z("Person").as_str()), None)
        .unwrap();
    assert_eq!(ids(&related), vec!["Animal"]);
}

#[test]
fn subject_branch_runs_for_known_classes() {
    let engine = engine_with(RecommendationConfig {
        filter_by: FilterBy::Domain,
        ..range_config()
    });

    let recommendations = engine
        .get_recommendations(&[Triple::new(z("Person"), z("meets"), "x")])
        .unwrap();
    // Sibling properties sharing the Person domain come first, then the
    // classes that can replace the subject.
    assert_eq!(
        recommendations.suggestions,
        vec!["gives food to", "likes", "owns", "Animal"]
    );
}

#[test]
fn related_classes_through_ancestor_exclude_the_ancestor() {
    let engine = engine_with(range_config());

    // Animal admits Puppy through Dog; the search climbs to Dog only.
    let related = engine
        .related_classes(&z("owns"), None, Some(z("Puppy").as_str()))
        .unwrap();
    assert_eq!(ids(&related), vec!["Dog"]);

    let related = engine
        .related_classes(&z("owns"), None, Some(z("Cat").as_str()))
        .unwrap();
    assert_eq!(ids(&related), vec!["Bird", "Cow", "Dog", "Fish", "Horse"]);
}

#[test]
fn related_classes_for_unknown_property_is_empty() {
    let engine = engine_with(range_config());
    let related = engine
        .related_classes(&z("hates"), None, Some(z("Dog").as_str()))
        .unwrap();
    assert!(related.is_empty());
}

#[test]
fn absent_class_target_yields_no_classes() {
    let engine = engine_with(RecommendationConfig {
        filter_by: FilterBy::Both,
        ..range_config()
    });
    assert!(engine.related_classes(&z("owns"), None, None).unwrap().is_empty());
}

#[test]
fn data_properties_are_always_matched_by_domain() {
    let engine = engine_with(range_config());

    let related = engine
        .related_properties(
            HierarchyKind::DataProperties,
            &z("age"),
            Some(z("Child").as_str()),
            None,
        )
        .unwrap();
    assert_eq!(ids(&related), vec!["height"]);
}

#[test]
fn absent_property_target_accepts_every_candidate_with_that_side() {
    let engine = engine_with(range_config());

    let related = engine
        .related_properties(HierarchyKind::ObjectProperties, &z("owns"), None, None)
        .unwrap();
    assert_eq!(ids(&related), vec!["feeds", "likes"]);
}

#[test]
fn seeded_random_order_is_a_reproducible_permutation() {
    let config = RecommendationConfig {
        order: Order::Random,
        order_set: OrderSet::All,
        seed: Some(7),
        ..range_config()
    };
    let first = engine_with(config.clone())
        .get_recommendations(&value_statement())
        .unwrap();
    let second = engine_with(config)
        .get_recommendations(&value_statement())
        .unwrap();

    assert_eq!(first, second);
    let mut sorted = first.suggestions.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["Bird", "Cat", "Cow", "Fish", "Horse"]);
}

#[test]
fn order_set_limits_which_lists_are_reordered() {
    let engine = engine_with(RecommendationConfig {
        order: Order::Random,
        order_set: OrderSet::Property,
        seed: Some(1),
        ..range_config()
    });

    let recommendations = engine.get_recommendations(&value_statement()).unwrap();
    assert_eq!(
        recommendations.suggestions,
        vec!["Bird", "Cat", "Cow", "Fish", "Horse"]
    );
}

#[test]
fn semantic_order_ranks_and_filters_classes() {
    let scores = LabelScores(HashMap::from([
        ("cat", 0.9),
        ("bird", 0.3),
        ("fish", 0.6),
        ("horse", 0.95),
        ("cow", 0.5),
    ]));
    let graph = zoo();
    let store = load_hierarchies(&graph, &property_labels(), LanguageFilter::Any).unwrap();
    let engine = RecommendationEngineBuilder::new()
        .store(store)
        .subclass_index(Arc::new(graph))
        .embeddings(Arc::new(scores))
        .config(RecommendationConfig {
            order: Order::Semantic,
            order_set: OrderSet::Class,
            similarity_threshold: Some(0.5),
            ..range_config()
        })
        .build()
        .unwrap();

    let recommendations = engine.get_recommendations(&value_statement()).unwrap();
    assert_eq!(
        recommendations.suggestions,
        vec!["Horse", "Cat", "Fish", "Cow"]
    );
}

#[test]
fn injected_embedding_service_is_enough_for_semantic_order() {
    let store = load_hierarchies(&zoo(), &PropertyLabels::default(), LanguageFilter::Any).unwrap();
    let config = RecommendationConfig {
        order: Order::Semantic,
        similarity_threshold: Some(0.5),
        ..Default::default()
    };
    assert!(config.embedding_model_path.is_none() && config.embedding_endpoint.is_none());

    let engine = RecommendationEngineBuilder::new()
        .store(store)
        .subclass_index(Arc::new(zoo()))
        .embeddings(Arc::new(LabelScores(HashMap::new())))
        .config(config)
        .build();
    assert!(engine.is_ok());
}

#[test]
fn builder_requires_collaborators() {
    let err = RecommendationEngineBuilder::new().build().unwrap_err();
    assert!(matches!(err, RecommendationError::Incomplete(_)));

    let store = load_hierarchies(&zoo(), &PropertyLabels::default(), LanguageFilter::Any).unwrap();
    let err = RecommendationEngineBuilder::new()
        .store(store)
        .subclass_index(Arc::new(zoo()))
        .config(RecommendationConfig {
            order: Order::Semantic,
            similarity_threshold: Some(0.5),
            ..Default::default()
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, RecommendationError::Incomplete("an embedding service")));
}

#[test]
fn builder_rejects_invalid_config() {
    let err = RecommendationEngineBuilder::new()
        .config(RecommendationConfig {
            depth: 0,
            ..Default::default()
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, RecommendationError::Config(_)));
}

#[test]
fn builder_rejects_store_missing_a_hierarchy() {
    let mut store = HierarchyStore::new();
    store.create(HierarchyKind::Classes, OWL_THING).unwrap();

    let err = RecommendationEngineBuilder::new()
        .store(store)
        .subclass_index(Arc::new(zoo()))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        RecommendationError::Hierarchy(HierarchyError::NotFound(HierarchyKind::ObjectProperties))
    ));
}

#[test]
fn replacing_the_class_hierarchy_changes_suggestions() {
    let mut engine = engine_with(range_config());
    let replacement = Hierarchy::from_rows(
        HierarchyKind::Classes,
        OWL_THING,
        vec![
            HierarchyRow::new(z("Animal")),
            HierarchyRow::new(z("Person")),
            HierarchyRow::new(z("Dog")).with_super(z("Animal")),
            HierarchyRow::new(z("Wolf")).with_super(z("Animal")),
        ],
        &PropertyLabels::default(),
    );

    let previous = engine
        .replace_hierarchy(HierarchyKind::Classes, replacement)
        .unwrap();
    assert!(previous.contains(&z("Cat")));

    let recommendations = engine.get_recommendations(&value_statement()).unwrap();
    assert_eq!(recommendations.suggestions, vec!["Wolf"]);
}

#[test]
fn recommendations_serialize_as_prefix_and_suggestions() {
    let recommendations = Recommendations {
        prefix: "Try:".to_string(),
        suggestions: vec!["Cat".to_string()],
    };
    assert_eq!(
        serde_json::to_string(&recommendations).unwrap(),
        r#"{"prefix":"Try:","suggestions":["Cat"]}"#
    );
}
