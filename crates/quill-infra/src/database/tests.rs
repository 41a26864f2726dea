#[cfg(test)]
mod tests {
    use crate::database::entity::{post, user};
    use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};
    use quill_core::domain::{Post, User};
    use quill_core::ports::{BaseRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    #[tokio::test]
    async fn find_post_by_id_maps_document_columns() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();
        let liker = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                id: post_id,
                title: "Test Post".to_owned(),
                slug: "test-post".to_owned(),
                excerpt: "An excerpt".to_owned(),
                content: "Content".to_owned(),
                categories: json!([]),
                tags: json!(["rust", "web"]),
                author_id,
                status: "published".to_owned(),
                published_at: Some(now.into()),
                featured_image: String::new(),
                read_time: "1 min read".to_owned(),
                featured: false,
                likes: json!([liker.to_string()]),
                views: 7,
                comments: 0,
                seo: json!({}),
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.tags, vec!["rust", "web"]);
        assert_eq!(post.meta.likes, vec![liker]);
        assert_eq!(post.meta.views, 7);
    }

    #[tokio::test]
    async fn find_user_by_email_normalizes_case() {
        let user_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user::Model {
                id: user_id,
                username: "alice".to_owned(),
                email: "alice@example.com".to_owned(),
                password_hash: "argon2-hash".to_owned(),
                avatar: String::new(),
                bio: String::new(),
                role: "author".to_owned(),
                social: json!({}),
                verified: true,
                locked: false,
                last_login_at: None,
                login_attempts: 0,
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let result: Option<User> = repo.find_by_email("Alice@Example.com").await.unwrap();

        let user = result.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, quill_core::domain::Role::Author);
    }
}
