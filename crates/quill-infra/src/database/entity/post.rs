//! Post entity for SeaORM.
//!
//! The document-shaped blocks (category refs, tags, like set, SEO) are
//! JSONB columns; the counters are plain columns so they can be bumped
//! atomically.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::{PostMeta, PostStatus, Seo};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub categories: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub author_id: Uuid,
    pub status: String,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub featured_image: String,
    pub read_time: String,
    pub featured: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub likes: Json,
    pub views: i64,
    pub comments: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub seo: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to the domain Post.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            excerpt: model.excerpt,
            content: model.content,
            categories: serde_json::from_value(model.categories).unwrap_or_default(),
            tags: serde_json::from_value(model.tags).unwrap_or_default(),
            author_id: model.author_id,
            status: model.status.parse::<PostStatus>().unwrap_or_default(),
            published_at: model.published_at.map(Into::into),
            featured_image: model.featured_image,
            read_time: model.read_time,
            featured: model.featured,
            meta: PostMeta {
                likes: serde_json::from_value(model.likes).unwrap_or_default(),
                views: model.views,
                comments: model.comments,
            },
            seo: serde_json::from_value::<Seo>(model.seo).unwrap_or_default(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from the domain Post to a SeaORM ActiveModel.
impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            slug: Set(post.slug),
            excerpt: Set(post.excerpt),
            content: Set(post.content),
            categories: Set(serde_json::to_value(&post.categories).unwrap_or_default()),
            tags: Set(serde_json::to_value(&post.tags).unwrap_or_default()),
            author_id: Set(post.author_id),
            status: Set(post.status.as_str().to_string()),
            published_at: Set(post.published_at.map(Into::into)),
            featured_image: Set(post.featured_image),
            read_time: Set(post.read_time),
            featured: Set(post.featured),
            likes: Set(serde_json::to_value(&post.meta.likes).unwrap_or_default()),
            views: Set(post.meta.views),
            comments: Set(post.meta.comments),
            seo: Set(serde_json::to_value(&post.seo).unwrap_or_default()),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
