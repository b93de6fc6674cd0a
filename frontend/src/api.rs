//! [`RecordStore`] over the document store's HTTP API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use taskfin_shared::{
    decode_records, CreatedRecord, Finance, NewFinance, NewTask, RecordId, RecordStore,
    StoreError, Task, TaskPatch,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

/// Talks to `{base}/api/...`; `base` is the page origin in the browser.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base: String,
}

impl HttpStore {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
        target: Option<&RecordId>,
    ) -> Result<Response, StoreError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let url = format!("{}{}", self.base, path);
        let request = Request::new_with_str_and_init(&url, &opts)
            .map_err(|_| unavailable("failed to create request"))?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|_| unavailable("failed to set header"))?;
        }

        let window = web_sys::window().ok_or_else(|| unavailable("no window"))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|_| unavailable("failed to send request"))?
            .into();

        match (response.status(), target) {
            (404, Some(id)) => Err(StoreError::NotFound(id.clone())),
            (status, _) if !response.ok() => Err(StoreError::Unavailable(format!(
                "{method} {path} answered {status}"
            ))),
            _ => Ok(response),
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let text_promise = response
            .text()
            .map_err(|_| unavailable("failed to read response"))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|_| unavailable("failed to get text"))?
            .as_string()
            .ok_or_else(|| StoreError::Malformed("response body is not text".into()))?;

        serde_json::from_str(&text).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, StoreError> {
        let response = self.send("GET", path, None, None).await?;
        let documents: Vec<Value> = Self::read_json(response).await?;
        Ok(decode_records(documents))
    }

    async fn create<T: serde::Serialize>(
        &self,
        path: &str,
        record: &T,
    ) -> Result<RecordId, StoreError> {
        let body =
            serde_json::to_string(record).map_err(|e| StoreError::Malformed(e.to_string()))?;
        let response = self.send("POST", path, Some(body), None).await?;
        let created: CreatedRecord = Self::read_json(response).await?;
        Ok(created.id)
    }
}

fn unavailable(reason: &str) -> StoreError {
    StoreError::Unavailable(reason.to_string())
}

fn logged<T>(operation: &str, result: Result<T, StoreError>) -> Result<T, StoreError> {
    if let Err(err) = &result {
        tracing::error!(operation, %err, "store call failed");
    }
    result
}

#[async_trait(?Send)]
impl RecordStore for HttpStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        logged("list_tasks", self.list("/api/tasks").await)
    }

    async fn create_task(&self, task: &NewTask) -> Result<RecordId, StoreError> {
        logged("create_task", self.create("/api/tasks", task).await)
    }

    async fn update_task(&self, id: &RecordId, patch: &TaskPatch) -> Result<(), StoreError> {
        let result = async {
            let body =
                serde_json::to_string(patch).map_err(|e| StoreError::Malformed(e.to_string()))?;
            let path = format!("/api/tasks/{id}");
            self.send("PATCH", &path, Some(body), Some(id)).await?;
            Ok(())
        }
        .await;
        logged("update_task", result)
    }

    async fn delete_task(&self, id: &RecordId) -> Result<(), StoreError> {
        let path = format!("/api/tasks/{id}");
        let result = self.send("DELETE", &path, None, Some(id)).await.map(|_| ());
        logged("delete_task", result)
    }

    async fn list_finances(&self) -> Result<Vec<Finance>, StoreError> {
        logged("list_finances", self.list("/api/finances").await)
    }

    async fn create_finance(&self, finance: &NewFinance) -> Result<RecordId, StoreError> {
        logged("create_finance", self.create("/api/finances", finance).await)
    }

    async fn delete_finance(&self, id: &RecordId) -> Result<(), StoreError> {
        let path = format!("/api/finances/{id}");
        let result = self.send("DELETE", &path, None, Some(id)).await.map(|_| ());
        logged("delete_finance", result)
    }
}
