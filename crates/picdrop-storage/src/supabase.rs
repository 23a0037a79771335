//! Supabase-style HTTP store implementation.
//!
//! Talks to a managed backend exposing an object-storage API at
//! `{base}/storage/v1` and an image-record table API at `{base}/rest/v1`.
//! Uploads stream the body in chunks so transfer progress is observable;
//! record deletes ask for the deleted rows back
//! (`Prefer: return=representation`) and pair them with explicit object
//! deletes.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use picdrop_core::models::{ImageRecord, NewImageRecord};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use crate::progress::ProgressSink;
use crate::store::{RemoteStore, StoreError, StoreResult};
use crate::UPLOAD_CHUNK_BYTES;

/// Characters escaped when a storage key is placed in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response body of a storage upload. Field names vary across backend
/// versions, so both are optional and the storage key is the fallback.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    path: Option<String>,
    #[serde(rename = "Key")]
    key: Option<String>,
}

pub struct SupabaseStore {
    client: Client,
    base_url: String,
    anon_key: String,
    bucket: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        bucket: impl Into<String>,
        table: impl Into<String>,
    ) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(SupabaseStore {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            bucket: bucket.into(),
            table: table.into(),
        })
    }

    fn ensure_configured(&self) -> StoreResult<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(StoreError::NotConfigured(
                "Supabase connection is not configured".to_string(),
            ))
        }
    }

    fn object_url(&self, storage_key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            utf8_percent_encode(storage_key, PATH_SEGMENT)
        )
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Map a non-success response to a store error, including the body the
    /// backend returned (its error payloads are short JSON messages).
    async fn error_body(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        format!("status {}: {}", status, body)
    }

    /// Delete the stored objects for the given keys in one call.
    async fn delete_objects(&self, keys: &[String]) -> StoreResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let response = self
            .authed(self.client.delete(&url))
            .json(&json!({ "prefixes": keys }))
            .send()
            .await
            .map_err(|e| StoreError::DeleteFailed(format!("Object delete failed: {}", e)))?;

        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(StoreError::DeleteFailed(Self::error_body(response).await));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.anon_key.is_empty()
    }

    async fn upload(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        progress: ProgressSink,
    ) -> StoreResult<String> {
        self.ensure_configured()?;

        let total = data.len() as u64;
        let start = std::time::Instant::now();

        if total == 0 {
            progress.report(0, 0);
        }

        // Chunked body so the transport pulls the data piecewise and each
        // consumed chunk surfaces as a progress event.
        let chunks: Vec<Bytes> = (0..data.len())
            .step_by(UPLOAD_CHUNK_BYTES)
            .map(|offset| data.slice(offset..(offset + UPLOAD_CHUNK_BYTES).min(data.len())))
            .collect();

        let sink = progress.clone();
        let mut sent: u64 = 0;
        let body_stream = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            sink.report(sent, total);
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let response = self
            .authed(self.client.post(self.object_url(storage_key)))
            .header(CONTENT_TYPE, content_type)
            .body(reqwest::Body::wrap_stream(body_stream))
            .send()
            .await
            .map_err(|e| StoreError::UploadFailed(format!("Upload transport error: {}", e)))?;

        if !response.status().is_success() {
            return Err(StoreError::UploadFailed(Self::error_body(response).await));
        }

        let parsed: Option<UploadResponse> = response.json().await.ok();
        let path = parsed
            .and_then(|r| {
                r.path.or_else(|| {
                    // Older backends return "Key": "{bucket}/{key}".
                    r.key
                        .map(|k| k.trim_start_matches(&format!("{}/", self.bucket)).to_string())
                })
            })
            .unwrap_or_else(|| storage_key.to_string());

        tracing::info!(
            key = %storage_key,
            size_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Supabase upload successful"
        );

        Ok(path)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            utf8_percent_encode(path, PATH_SEGMENT)
        )
    }

    async fn insert_record(&self, record: NewImageRecord) -> StoreResult<ImageRecord> {
        self.ensure_configured()?;

        let response = self
            .authed(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&json!([{
                "url": record.url,
                "filename": record.filename,
                "storage_key": record.storage_key,
            }]))
            .send()
            .await
            .map_err(|e| StoreError::InsertFailed(format!("Insert transport error: {}", e)))?;

        if !response.status().is_success() {
            return Err(StoreError::InsertFailed(Self::error_body(response).await));
        }

        let rows: Vec<ImageRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::InsertFailed(format!("Invalid insert response: {}", e)))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::InsertFailed("Insert returned no rows".to_string()))
    }

    async fn list_records(&self) -> StoreResult<Vec<ImageRecord>> {
        self.ensure_configured()?;

        let response = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await
            .map_err(|e| StoreError::ListFailed(format!("List transport error: {}", e)))?;

        if !response.status().is_success() {
            return Err(StoreError::ListFailed(Self::error_body(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::ListFailed(format!("Invalid list response: {}", e)))
    }

    async fn delete_record(&self, id: Uuid) -> StoreResult<()> {
        self.ensure_configured()?;

        let response = self
            .authed(self.client.delete(self.table_url()))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| StoreError::DeleteFailed(format!("Delete transport error: {}", e)))?;

        if !response.status().is_success() {
            return Err(StoreError::DeleteFailed(Self::error_body(response).await));
        }

        let rows: Vec<ImageRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::DeleteFailed(format!("Invalid delete response: {}", e)))?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(format!("Image record {}", id)));
        }

        let keys: Vec<String> = rows.into_iter().map(|r| r.storage_key).collect();
        self.delete_objects(&keys).await?;

        tracing::info!(id = %id, "Image record and object deleted");

        Ok(())
    }

    async fn delete_all_records(&self) -> StoreResult<()> {
        self.ensure_configured()?;

        let response = self
            .authed(self.client.delete(self.table_url()))
            .query(&[("id", "not.is.null")])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| StoreError::DeleteFailed(format!("Delete transport error: {}", e)))?;

        if !response.status().is_success() {
            return Err(StoreError::DeleteFailed(Self::error_body(response).await));
        }

        let rows: Vec<ImageRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::DeleteFailed(format!("Invalid delete response: {}", e)))?;

        let keys: Vec<String> = rows.iter().map(|r| r.storage_key.clone()).collect();
        self.delete_objects(&keys).await?;

        tracing::info!(count = keys.len(), "All image records and objects deleted");

        Ok(())
    }
}
