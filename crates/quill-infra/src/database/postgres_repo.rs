//! PostgreSQL repository implementations.
//!
//! The like toggle and the bulk tag operations are issued as single
//! parameterized statements so the store, not the handler, arbitrates
//! concurrent read-modify-write on the JSONB arrays.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, QueryOrder, Statement,
};
use serde_json::json;
use uuid::Uuid;

use quill_core::domain::{Category, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    CategoryRepository, CategoryWithCount, LikeOutcome, PostRepository, TagCount, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_published(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Status.eq("published"))
            .order_by_desc(post::Column::PublishedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_published_by_category(&self, category_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT * FROM posts
               WHERE status = 'published' AND categories @> $1
               ORDER BY published_at DESC"#,
            [json!([category_id.to_string()]).into()],
        );

        let result = PostEntity::find()
            .from_raw_sql(stmt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_published_by_tag(&self, tag: &str) -> Result<Vec<Post>, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT * FROM posts
               WHERE status = 'published' AND tags @> $1
               ORDER BY published_at DESC"#,
            [json!([tag]).into()],
        );

        let result = PostEntity::find()
            .from_raw_sql(stmt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome, RepoError> {
        // Single conditional update: remove-if-present / add-if-absent.
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"UPDATE posts
               SET likes = CASE
                       WHEN likes @> $2 THEN likes - ($3::text)
                       ELSE likes || $2
                   END,
                   updated_at = now()
               WHERE id = $1
               RETURNING likes @> $2 AS liked,
                         jsonb_array_length(likes)::bigint AS like_count"#,
            [
                post_id.into(),
                json!([user_id.to_string()]).into(),
                user_id.to_string().into(),
            ],
        );

        let row = self
            .db
            .query_one(stmt)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let liked: bool = row
            .try_get("", "liked")
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let likes: i64 = row
            .try_get("", "like_count")
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(LikeOutcome { liked, likes })
    }

    async fn increment_views(&self, post_id: Uuid) -> Result<(), RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE posts SET views = views + 1 WHERE id = $1",
            [post_id.into()],
        );

        let result = self.db.execute(stmt).await.map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<TagCount>, RepoError> {
        self.tag_counts(None).await
    }

    async fn popular_tags(&self, limit: u64) -> Result<Vec<TagCount>, RepoError> {
        self.tag_counts(Some(limit)).await
    }

    async fn rename_tag(&self, old: &str, new: &str) -> Result<u64, RepoError> {
        if !self.tag_exists(old).await? {
            return Err(RepoError::NotFound);
        }
        if self.tag_exists(new).await? {
            return Err(RepoError::Constraint(format!("tag '{new}' already exists")));
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"UPDATE posts
               SET tags = (
                       SELECT COALESCE(
                           jsonb_agg(CASE WHEN value = $2 THEN $3 ELSE value END),
                           '[]'::jsonb
                       )
                       FROM jsonb_array_elements(tags)
                   ),
                   updated_at = now()
               WHERE tags @> $1"#,
            [
                json!([old]).into(),
                json!(old).into(),
                json!(new).into(),
            ],
        );

        let result = self.db.execute(stmt).await.map_err(map_db_err)?;
        Ok(result.rows_affected())
    }

    async fn remove_tag(&self, tag: &str) -> Result<u64, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"UPDATE posts
               SET tags = tags - ($2::text), updated_at = now()
               WHERE tags @> $1"#,
            [json!([tag]).into(), tag.into()],
        );

        let result = self.db.execute(stmt).await.map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(result.rows_affected())
    }
}

impl PostgresPostRepository {
    async fn tag_exists(&self, tag: &str) -> Result<bool, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM posts WHERE tags @> $1) AS present",
            [json!([tag]).into()],
        );

        let row = self
            .db
            .query_one(stmt)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        row.try_get("", "present")
            .map_err(|e| RepoError::Query(e.to_string()))
    }

    async fn tag_counts(&self, limit: Option<u64>) -> Result<Vec<TagCount>, RepoError> {
        let base = r#"SELECT value AS tag, COUNT(*)::bigint AS count
               FROM posts, jsonb_array_elements_text(tags)
               WHERE status = 'published'
               GROUP BY value
               ORDER BY count DESC, tag ASC"#;

        let stmt = match limit {
            Some(n) => Statement::from_sql_and_values(
                DbBackend::Postgres,
                format!("{base} LIMIT $1"),
                [(n as i64).into()],
            ),
            None => Statement::from_string(DbBackend::Postgres, base),
        };

        let rows = self.db.query_all(stmt).await.map_err(map_db_err)?;

        rows.into_iter()
            .map(|row| {
                Ok(TagCount {
                    tag: row
                        .try_get("", "tag")
                        .map_err(|e| RepoError::Query(e.to_string()))?,
                    count: row
                        .try_get("", "count")
                        .map_err(|e| RepoError::Query(e.to_string()))?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = CategoryEntity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepoError> {
        // Counts are recomputed per request; membership is tested against
        // the posts' JSONB category-reference arrays.
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            r#"SELECT c.id, c.name, c.slug, c.description, c.image,
                      c.created_at, c.updated_at,
                      COUNT(p.id)::bigint AS article_count,
                      MAX(p.published_at) AS latest_post_at
               FROM categories c
               LEFT JOIN posts p
                 ON p.status = 'published'
                AND p.categories @> to_jsonb(c.id::text)
               GROUP BY c.id, c.name, c.slug, c.description, c.image,
                        c.created_at, c.updated_at
               ORDER BY article_count DESC, c.name ASC"#,
        );

        let rows = self.db.query_all(stmt).await.map_err(map_db_err)?;

        rows.into_iter()
            .map(|row| {
                let get_err = |e: sea_orm::DbErr| RepoError::Query(e.to_string());
                Ok(CategoryWithCount {
                    category: Category {
                        id: row.try_get("", "id").map_err(get_err)?,
                        name: row.try_get("", "name").map_err(get_err)?,
                        slug: row.try_get("", "slug").map_err(get_err)?,
                        description: row.try_get("", "description").map_err(get_err)?,
                        image: row.try_get("", "image").map_err(get_err)?,
                        created_at: row.try_get("", "created_at").map_err(get_err)?,
                        updated_at: row.try_get("", "updated_at").map_err(get_err)?,
                    },
                    article_count: row.try_get("", "article_count").map_err(get_err)?,
                    latest_post_at: row.try_get("", "latest_post_at").map_err(get_err)?,
                })
            })
            .collect()
    }
}
