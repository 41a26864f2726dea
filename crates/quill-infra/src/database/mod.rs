//! Database adapters: in-memory always, PostgreSQL behind the `postgres`
//! feature.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use memory::{
    InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository, PostStore,
};

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, DatabaseConnection};

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
