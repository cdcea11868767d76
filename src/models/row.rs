/// One result row of the class or property hierarchy queries.
///
/// Class rows never carry a domain or range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HierarchyRow {
    pub entity: String,
    pub super_entity: Option<String>,
    pub domain: Option<String>,
    pub range: Option<String>,
}

impl HierarchyRow {
    /// Creates a row for `entity` with no super entity, domain or range.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    pub fn with_super(mut self, super_entity: impl Into<String>) -> Self {
        self.super_entity = Some(super_entity.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }
}
