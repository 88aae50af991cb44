use serde::{Deserialize, Serialize};

/// A named group of permissions a user can hold.
///
/// Two roles are the same role when their slugs match; `id` is storage
/// identity only.
///
/// Example:
///   slug = "admin"
///   name = "Administrator"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: i64,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    /// Unique matching key.
    pub slug: String,

    #[serde(default)]
    pub description: String,
}

impl Role {
    /// A probe value carrying only a slug, used for membership checks.
    pub fn with_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Default::default()
        }
    }

    pub fn same_slug(&self, other: &Role) -> bool {
        self.slug == other.slug
    }
}

/// Role columns that callers may sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleColumn {
    Id,
    Name,
    Slug,
    Description,
}

impl RoleColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleColumn::Id => "id",
            RoleColumn::Name => "name",
            RoleColumn::Slug => "slug",
            RoleColumn::Description => "description",
        }
    }
}
