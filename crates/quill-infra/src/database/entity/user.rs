//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::{Role, SocialLinks};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub bio: String,
    pub role: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub social: Json,
    pub verified: bool,
    pub locked: bool,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub login_attempts: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to the domain User.
impl From<Model> for quill_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            avatar: model.avatar,
            bio: model.bio,
            role: model.role.parse::<Role>().unwrap_or_default(),
            social: serde_json::from_value::<SocialLinks>(model.social).unwrap_or_default(),
            verified: model.verified,
            locked: model.locked,
            last_login_at: model.last_login_at.map(Into::into),
            login_attempts: model.login_attempts,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from the domain User to a SeaORM ActiveModel.
impl From<quill_core::domain::User> for ActiveModel {
    fn from(user: quill_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            avatar: Set(user.avatar),
            bio: Set(user.bio),
            role: Set(user.role.as_str().to_string()),
            social: Set(serde_json::to_value(&user.social).unwrap_or_default()),
            verified: Set(user.verified),
            locked: Set(user.locked),
            last_login_at: Set(user.last_login_at.map(Into::into)),
            login_attempts: Set(user.login_attempts),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
