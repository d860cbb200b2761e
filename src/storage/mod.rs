pub mod memory;
pub mod models;

use async_trait::async_trait;

pub use memory::MemStorage;
pub use models::{
    ExplanationMetadata, GenerationMetadata, NewSchema, NewSharedQuery, NewSqlQuery, NewUser,
    QueryMetadata, QueryType, Schema, SharedQuery, SqlQuery, TransformationMetadata, User,
};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    MissingReference(String),
}

/// Record store behind the HTTP API.
///
/// Listing operations return newest records first. Lookups that find nothing
/// return `Ok(None)` / `Ok(false)`; errors are reserved for constraint
/// violations and backend failures.
#[async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    // SQL queries
    async fn get_sql_query(&self, id: i64) -> Result<Option<SqlQuery>, StorageError>;
    async fn get_sql_queries_by_user(&self, user_id: i64) -> Result<Vec<SqlQuery>, StorageError>;
    async fn get_favorite_queries(&self, user_id: i64) -> Result<Vec<SqlQuery>, StorageError>;
    async fn create_sql_query(&self, query: NewSqlQuery) -> Result<SqlQuery, StorageError>;
    async fn update_favorite(&self, id: i64, is_favorite: bool) -> Result<Option<SqlQuery>, StorageError>;
    /// Also removes every share link pointing at the query.
    async fn delete_sql_query(&self, id: i64) -> Result<bool, StorageError>;

    // Schemas
    async fn get_schema(&self, id: i64) -> Result<Option<Schema>, StorageError>;
    async fn get_schemas_by_user(&self, user_id: i64) -> Result<Vec<Schema>, StorageError>;
    async fn create_schema(&self, schema: NewSchema) -> Result<Schema, StorageError>;
    async fn delete_schema(&self, id: i64) -> Result<bool, StorageError>;

    // Share links
    async fn get_shared_query(&self, share_token: &str) -> Result<Option<SharedQuery>, StorageError>;
    async fn create_shared_query(&self, shared: NewSharedQuery) -> Result<SharedQuery, StorageError>;
    async fn delete_shared_query(&self, share_token: &str) -> Result<bool, StorageError>;
}
