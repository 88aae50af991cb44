use serde::{Deserialize, Serialize};

/// A named capability granted through roles. Matched by slug.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    pub slug: String,

    #[serde(default)]
    pub description: String,
}

impl Permission {
    /// A probe value carrying only a slug, used for `can` checks.
    pub fn with_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Default::default()
        }
    }

    pub fn same_slug(&self, other: &Permission) -> bool {
        self.slug == other.slug
    }
}
