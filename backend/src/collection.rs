//! Schema-less document collections on top of Redis hashes.
//!
//! Each collection is one hash: field = document id, value = the JSON
//! document without its id. The id is put back into the document on read.

use std::collections::HashMap;
use std::sync::Arc;

use redis::{aio::ConnectionLike, AsyncCommands, Client, RedisError, Script};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use taskfin_shared::{decode_records, RecordId};

use crate::error::ApiError;

pub type RedisPool = Arc<Client>;

/// HSET only if the field still exists, so an update racing a delete cannot
/// bring the document back.
const WRITE_IF_PRESENT: &str = r"
if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    name: &'static str,
}

pub const TASKS: Collection = Collection::new("tasks");
pub const FINANCES: Collection = Collection::new("finances");

impl Collection {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn list<T: DeserializeOwned>(&self, pool: &RedisPool) -> Result<Vec<T>, ApiError> {
        let mut conn = pool.get_async_connection().await?;
        let stored: HashMap<String, String> = conn.hgetall(self.name).await?;
        Ok(decode_records(into_documents(stored)))
    }

    pub async fn insert<T: Serialize>(
        &self,
        pool: &RedisPool,
        document: &T,
    ) -> Result<RecordId, ApiError> {
        let id = RecordId::generate();
        let body = serde_json::to_string(document)?;
        let mut conn = pool.get_async_connection().await?;
        let _: usize = conn.hset(self.name, id.as_str(), body).await?;
        Ok(id)
    }

    /// Field-level update. The merged document must still decode as `T`
    /// before it is written back.
    pub async fn update<T, P>(&self, pool: &RedisPool, id: &RecordId, patch: &P) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let mut conn = pool.get_async_connection().await?;
        let stored: Option<String> = conn.hget(self.name, id.as_str()).await?;
        let stored = stored.ok_or_else(|| ApiError::NotFound(id.clone()))?;

        let mut document = parse_object(&stored)?;
        if let Value::Object(fields) = serde_json::to_value(patch)? {
            merge_fields(&mut document, fields);
        }
        let body = serde_json::to_string(&document)?;
        let record = serde_json::from_value(with_id(id.as_str(), document))?;

        if !write_if_present(&mut conn, self.name, id.as_str(), &body).await? {
            return Err(ApiError::NotFound(id.clone()));
        }
        Ok(record)
    }

    pub async fn remove(&self, pool: &RedisPool, id: &RecordId) -> Result<(), ApiError> {
        let mut conn = pool.get_async_connection().await?;
        let removed: usize = conn.hdel(self.name, id.as_str()).await?;
        if removed == 0 {
            return Err(ApiError::NotFound(id.clone()));
        }
        Ok(())
    }
}

async fn write_if_present<C: ConnectionLike>(
    conn: &mut C,
    hash: &str,
    id: &str,
    body: &str,
) -> Result<bool, RedisError> {
    let written: i64 = Script::new(WRITE_IF_PRESENT)
        .key(hash)
        .arg(id)
        .arg(body)
        .invoke_async(conn)
        .await?;
    Ok(written == 1)
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::from_str(raw)? {
        Value::Object(fields) => Ok(fields),
        _ => Ok(Map::new()),
    }
}

fn with_id(id: &str, mut document: Map<String, Value>) -> Value {
    document.insert("id".to_string(), Value::String(id.to_string()));
    Value::Object(document)
}

/// Overwrites top-level fields. The id is never patched.
pub fn merge_fields(document: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (field, value) in patch {
        if field != "id" {
            document.insert(field, value);
        }
    }
}

/// Turns raw hash entries into id-carrying documents, ordered by id.
/// Entries that are not JSON objects are dropped.
fn into_documents(stored: HashMap<String, String>) -> Vec<Value> {
    let mut entries: Vec<(String, String)> = stored.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .into_iter()
        .filter_map(|(id, raw)| match parse_object(&raw) {
            Ok(fields) => Some(with_id(&id, fields)),
            Err(err) => {
                tracing::warn!(%id, %err, "skipping unreadable document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskfin_shared::Task;

    #[test]
    fn documents_get_their_id_back() {
        let mut stored = HashMap::new();
        stored.insert(
            "b".to_string(),
            r#"{"title":"second","dueDate":"2025-02-25"}"#.to_string(),
        );
        stored.insert(
            "a".to_string(),
            r#"{"title":"first","dueDate":"2025-02-24","priority":"high"}"#.to_string(),
        );
        stored.insert("c".to_string(), "not json".to_string());

        let tasks: Vec<Task> = decode_records(into_documents(stored));
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(tasks[0].title, "first");
    }

    #[test]
    fn merge_never_touches_id() {
        let mut document = json!({"title": "x", "completed": false})
            .as_object()
            .cloned()
            .unwrap();
        let patch = json!({"completed": true, "id": "hijack"})
            .as_object()
            .cloned()
            .unwrap();
        merge_fields(&mut document, patch);
        assert_eq!(document["completed"], json!(true));
        assert!(!document.contains_key("id"));
        assert_eq!(document["title"], json!("x"));
    }

    #[test]
    fn stored_id_overrides_embedded_one() {
        let fields = parse_object(r#"{"id":"old","title":"t"}"#).unwrap();
        assert_eq!(with_id("new", fields)["id"], json!("new"));
    }

    #[tokio::test]
    #[ignore = "needs a Redis server at REDIS_URL"]
    async fn guarded_write_does_not_resurrect_deleted_documents() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        let client = Client::open(url).unwrap();
        let mut conn = client.get_async_connection().await.unwrap();
        let hash = format!("taskfin-test-{}", RecordId::generate());

        let _: usize = conn.hset(&hash, "a", r#"{"title":"old"}"#).await.unwrap();
        assert!(write_if_present(&mut conn, &hash, "a", r#"{"title":"new"}"#).await.unwrap());
        let stored: String = conn.hget(&hash, "a").await.unwrap();
        assert_eq!(stored, r#"{"title":"new"}"#);

        let _: usize = conn.hdel(&hash, "a").await.unwrap();
        assert!(!write_if_present(&mut conn, &hash, "a", r#"{"title":"late"}"#).await.unwrap());
        let exists: bool = conn.hexists(&hash, "a").await.unwrap();
        assert!(!exists);
    }

    #[test]
    fn collections_are_named_hashes() {
        assert_eq!(TASKS.name(), "tasks");
        assert_eq!(FINANCES.name(), "finances");
    }
}
