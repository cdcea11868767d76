//! Class and property hierarchies built from ontology query rows.
//!
//! A [`HierarchyStore`] holds one [`Hierarchy`] per [`HierarchyKind`]. Each
//! hierarchy is a tree: when an entity shows up in several rows, the last row's
//! super entity becomes its parent while domains and ranges accumulate.
//!
//! # Examples
//!
//! ```
//! use ontorec::hierarchy::{HierarchyStore, PropertyLabels};
//! use ontorec::{HierarchyKind, HierarchyRow, OWL_THING};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rows = vec![
//!     HierarchyRow::new("Animal").with_super(OWL_THING),
//!     HierarchyRow::new("Dog").with_super("Animal"),
//!     HierarchyRow::new("Cat").with_super("Animal"),
//! ];
//!
//! let mut store = HierarchyStore::new();
//! store.build(HierarchyKind::Classes, OWL_THING, rows, &PropertyLabels::default())?;
//!
//! let classes = store.hierarchy(HierarchyKind::Classes)?;
//! assert_eq!(classes.get("Animal").unwrap().children(), ["Dog", "Cat"]);
//! assert_eq!(store.max_depth(HierarchyKind::Classes, OWL_THING)?, 3);
//! # Ok(())
//! # }
//! ```

mod depth;
mod labels;
mod loader;
mod relatives;
mod store;

pub use depth::DepthCalculator;
pub use labels::{ClassLabels, LabelSource, LanguageFilter, PropertyLabels, PropertyLabelsError};
pub use loader::load_hierarchies;
pub use relatives::RelativeFinder;
pub use store::{Hierarchy, HierarchyError, HierarchyStore};
