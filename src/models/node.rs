use serde::{Deserialize, Serialize};

/// One ontology entity inside a hierarchy.
///
/// The label is resolved once when the node is first materialized and is never
/// recomputed. `children`, `domains` and `ranges` keep insertion order and reject
/// duplicates. `is_leaf` flips to `false` on the first child and never back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    id: String,
    label: Option<String>,
    parent: Option<String>,
    children: Vec<String>,
    domains: Vec<String>,
    ranges: Vec<String>,
    is_leaf: bool,
}

impl HierarchyNode {
    /// Creates a leaf node with no parent, children, domains or ranges.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontorec::HierarchyNode;
    ///
    /// let node = HierarchyNode::new("http://example.org/zoo#Dog", Some("Dog".to_string()));
    /// assert!(node.is_leaf());
    /// assert_eq!(node.display_name(), "Dog");
    /// ```
    pub fn new(id: impl Into<String>, label: Option<String>) -> Self {
        Self {
            id: id.into(),
            label,
            parent: None,
            children: Vec::new(),
            domains: Vec::new(),
            ranges: Vec::new(),
            is_leaf: true,
        }
    }

    /// Returns the entity URI.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the resolved label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the label, or the URI's local name when no label was resolved.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontorec::HierarchyNode;
    ///
    /// let node = HierarchyNode::new("http://example.org/zoo#GuideDog", None);
    /// assert_eq!(node.display_name(), "GuideDog");
    ///
    /// let node = HierarchyNode::new("http://example.org/zoo/Cat", None);
    /// assert_eq!(node.display_name(), "Cat");
    /// ```
    pub fn display_name(&self) -> &str {
        match &self.label {
            Some(label) => label,
            None => local_name(&self.id),
        }
    }

    /// Returns the URI of the single tree parent, `None` for a root.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Returns child URIs in insertion order.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Returns domain URIs in insertion order.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Returns range URIs in insertion order.
    pub fn ranges(&self) -> &[String] {
        &self.ranges
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Overwrites the parent. The last writer wins.
    pub fn set_parent(&mut self, parent: Option<String>) {
        self.parent = parent;
    }

    /// Appends a child unless it is already present.
    pub fn add_child(&mut self, child: impl Into<String>) {
        let child = child.into();
        if !self.children.contains(&child) {
            self.is_leaf = false;
            self.children.push(child);
        }
    }

    /// Appends a domain unless it is already present.
    pub fn add_domain(&mut self, domain: impl Into<String>) {
        push_unique(&mut self.domains, domain.into());
    }

    /// Appends a range unless it is already present.
    pub fn add_range(&mut self, range: impl Into<String>) {
        push_unique(&mut self.ranges, range.into());
    }
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

fn local_name(uri: &str) -> &str {
    let trimmed = uri.trim_end_matches(['#', '/']);
    trimmed
        .rsplit(['#', '/'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(uri)
}
