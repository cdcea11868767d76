mod hierarchy_kind;
mod node;
mod row;
mod triple;

pub use hierarchy_kind::{
    HierarchyKind, OWL_THING, OWL_TOP_DATA_PROPERTY, OWL_TOP_OBJECT_PROPERTY, UnknownHierarchy,
};
pub use node::HierarchyNode;
pub use row::HierarchyRow;
pub use triple::{HAS_VALUE, Triple};
