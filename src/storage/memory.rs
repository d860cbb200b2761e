use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::*;
use super::{Storage, StorageError};

/// Volatile store. Everything is lost when the process exits.
#[derive(Default)]
pub struct MemStorage {
    // One lock over all maps so cascading deletes are atomic
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    sql_queries: BTreeMap<i64, SqlQuery>,
    schemas: BTreeMap<i64, Schema>,
    shared_queries: BTreeMap<i64, SharedQuery>,
    last_user_id: i64,
    last_query_id: i64,
    last_schema_id: i64,
    last_shared_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StorageError::Conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StorageError::Conflict(format!(
                "Email '{}' is already registered",
                user.email
            )));
        }

        let user = User {
            id: next_id(&mut tables.last_user_id),
            username: user.username,
            email: user.email,
            password: user.password,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        debug!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn get_sql_query(&self, id: i64) -> Result<Option<SqlQuery>, StorageError> {
        Ok(self.tables.read().await.sql_queries.get(&id).cloned())
    }

    async fn get_sql_queries_by_user(&self, user_id: i64) -> Result<Vec<SqlQuery>, StorageError> {
        let tables = self.tables.read().await;
        let mut queries: Vec<SqlQuery> = tables
            .sql_queries
            .values()
            .filter(|q| q.user_id == user_id)
            .cloned()
            .collect();
        queries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(queries)
    }

    async fn get_favorite_queries(&self, user_id: i64) -> Result<Vec<SqlQuery>, StorageError> {
        let mut queries = self.get_sql_queries_by_user(user_id).await?;
        queries.retain(|q| q.is_favorite);
        Ok(queries)
    }

    async fn create_sql_query(&self, query: NewSqlQuery) -> Result<SqlQuery, StorageError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&query.user_id) {
            return Err(StorageError::MissingReference(format!(
                "User {} not found",
                query.user_id
            )));
        }

        let query = SqlQuery {
            id: next_id(&mut tables.last_query_id),
            user_id: query.user_id,
            natural_language_query: query.natural_language_query,
            generated_sql: query.generated_sql,
            query_type: query.query_type,
            database: query.database,
            complexity: query.complexity,
            execution_time: query.execution_time,
            is_favorite: false,
            metadata: query.metadata,
            created_at: Utc::now(),
        };
        tables.sql_queries.insert(query.id, query.clone());
        debug!("Saved {:?} query {}", query.query_type, query.id);
        Ok(query)
    }

    async fn update_favorite(
        &self,
        id: i64,
        is_favorite: bool,
    ) -> Result<Option<SqlQuery>, StorageError> {
        let mut tables = self.tables.write().await;
        Ok(tables.sql_queries.get_mut(&id).map(|query| {
            query.is_favorite = is_favorite;
            query.clone()
        }))
    }

    async fn delete_sql_query(&self, id: i64) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.sql_queries.remove(&id).is_none() {
            return Ok(false);
        }
        tables.shared_queries.retain(|_, shared| shared.query_id != id);
        Ok(true)
    }

    async fn get_schema(&self, id: i64) -> Result<Option<Schema>, StorageError> {
        Ok(self.tables.read().await.schemas.get(&id).cloned())
    }

    async fn get_schemas_by_user(&self, user_id: i64) -> Result<Vec<Schema>, StorageError> {
        let tables = self.tables.read().await;
        let mut schemas: Vec<Schema> = tables
            .schemas
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        schemas.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(schemas)
    }

    async fn create_schema(&self, schema: NewSchema) -> Result<Schema, StorageError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&schema.user_id) {
            return Err(StorageError::MissingReference(format!(
                "User {} not found",
                schema.user_id
            )));
        }

        let schema = Schema {
            id: next_id(&mut tables.last_schema_id),
            user_id: schema.user_id,
            name: schema.name,
            database: schema.database,
            schema_data: schema.schema_data,
            created_at: Utc::now(),
        };
        tables.schemas.insert(schema.id, schema.clone());
        Ok(schema)
    }

    async fn delete_schema(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.tables.write().await.schemas.remove(&id).is_some())
    }

    async fn get_shared_query(&self, share_token: &str) -> Result<Option<SharedQuery>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .shared_queries
            .values()
            .find(|s| s.share_token == share_token)
            .cloned())
    }

    async fn create_shared_query(&self, shared: NewSharedQuery) -> Result<SharedQuery, StorageError> {
        let mut tables = self.tables.write().await;

        if !tables.sql_queries.contains_key(&shared.query_id) {
            return Err(StorageError::MissingReference(format!(
                "Query {} not found",
                shared.query_id
            )));
        }
        if tables
            .shared_queries
            .values()
            .any(|s| s.share_token == shared.share_token)
        {
            return Err(StorageError::Conflict("Share token already in use".to_string()));
        }

        let shared = SharedQuery {
            id: next_id(&mut tables.last_shared_id),
            query_id: shared.query_id,
            share_token: shared.share_token,
            is_public: shared.is_public,
            expires_at: shared.expires_at,
            created_at: Utc::now(),
        };
        tables.shared_queries.insert(shared.id, shared.clone());
        Ok(shared)
    }

    async fn delete_shared_query(&self, share_token: &str) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;
        let before = tables.shared_queries.len();
        tables.shared_queries.retain(|_, s| s.share_token != share_token);
        Ok(tables.shared_queries.len() != before)
    }
}
