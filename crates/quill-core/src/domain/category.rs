use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::slug::slugify;

/// Image assigned to categories created without one.
pub const DEFAULT_CATEGORY_IMAGE: &str = "https://cdn.quill.dev/categories/default.png";

/// Category entity - a named grouping of posts.
///
/// Article counts are derived aggregates over published posts and are never
/// stored on the category itself.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Derived from the name with the same algorithm as post slugs.
    pub slug: String,
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String, description: String, image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            description,
            image: image.unwrap_or_else(|| DEFAULT_CATEGORY_IMAGE.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rename the category; the slug follows the name.
    pub fn set_name(&mut self, name: String) {
        if name != self.name {
            self.slug = slugify(&name);
            self.name = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_follows_name() {
        let mut category = Category::new("Web Development".into(), String::new(), None);
        assert_eq!(category.slug, "web-development");

        category.set_name("Systems Programming".into());
        assert_eq!(category.slug, "systems-programming");
    }

    #[test]
    fn default_image_applied() {
        let category = Category::new("Rust".into(), String::new(), None);
        assert_eq!(category.image, DEFAULT_CATEGORY_IMAGE);
    }
}
