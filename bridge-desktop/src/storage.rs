//! Object storage over the Supabase Storage REST API

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
    storage::{BucketOptions, ObjectStorage, UploadOptions},
};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Longest response excerpt carried in an error message
const ERROR_BODY_LIMIT: usize = 256;

/// `ObjectStorage` backed by `{endpoint}/storage/v1`
///
/// Authenticates every call with the service-role key, sent both as the
/// `apikey` header and as a bearer token.
pub struct SupabaseStorage {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    service_key: String,
}

#[derive(Serialize)]
struct CreateBucketBody<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_size_limit: Option<u64>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    allowed_mime_types: &'a [String],
}

impl SupabaseStorage {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        endpoint: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            endpoint,
            service_key: service_key.into(),
        }
    }

    fn authorized(&self, request: HttpRequest) -> HttpRequest {
        request
            .header("apikey", self.service_key.clone())
            .bearer_token(self.service_key.clone())
    }

    fn object_path(bucket: &str, key: &str) -> String {
        format!(
            "{}/{}",
            urlencoding::encode(bucket),
            urlencoding::encode(key)
        )
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.http_client.execute(self.authorized(request)).await
    }
}

/// Convert a non-success response into a `BridgeError::Status`
pub(crate) fn status_error(response: &HttpResponse) -> BridgeError {
    let mut message = String::from_utf8_lossy(&response.body).into_owned();
    if message.len() > ERROR_BODY_LIMIT {
        let mut cut = ERROR_BODY_LIMIT;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    BridgeError::Status {
        status: response.status,
        message,
    }
}

/// The storage API reports a missing bucket either as a 404 or as a 400 whose
/// body says "not found".
fn is_missing_bucket(response: &HttpResponse) -> bool {
    response.status == 404
        || (response.status == 400
            && String::from_utf8_lossy(&response.body)
                .to_ascii_lowercase()
                .contains("not found"))
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let url = format!(
            "{}/storage/v1/bucket/{}",
            self.endpoint,
            urlencoding::encode(bucket)
        );
        let response = self.send(HttpRequest::new(HttpMethod::Get, url)).await?;

        if response.is_success() {
            Ok(true)
        } else if is_missing_bucket(&response) {
            Ok(false)
        } else {
            Err(status_error(&response))
        }
    }

    async fn create_bucket(&self, bucket: &str, options: &BucketOptions) -> Result<()> {
        let url = format!("{}/storage/v1/bucket", self.endpoint);
        let body = CreateBucketBody {
            id: bucket,
            name: bucket,
            public: options.public,
            file_size_limit: options.file_size_limit,
            allowed_mime_types: &options.allowed_mime_types,
        };
        let request = HttpRequest::new(HttpMethod::Post, url).json(&body)?;
        let response = self.send(request).await?;

        if !response.is_success() {
            return Err(status_error(&response));
        }

        debug!(bucket, "Bucket created");
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> Result<()> {
        let url = format!(
            "{}/storage/v1/object/{}",
            self.endpoint,
            Self::object_path(bucket, key)
        );
        let size = data.len();
        let request = HttpRequest::new(HttpMethod::Post, url)
            .header("Content-Type", options.content_type.clone())
            .header("x-upsert", options.upsert.to_string())
            .header("cache-control", "max-age=3600")
            .body(data);

        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(status_error(&response));
        }

        debug!(bucket, key, size, "Object uploaded");
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}",
            self.endpoint,
            Self::object_path(bucket, key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::*;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_public_url_is_deterministic() {
        let storage = SupabaseStorage::new(
            Arc::new(MockHttpClient::new()),
            "https://project.supabase.co/",
            "key",
        );

        let first = storage.public_url("creator-avatars", "alice.jpg");
        let second = storage.public_url("creator-avatars", "alice.jpg");

        assert_eq!(
            first,
            "https://project.supabase.co/storage/v1/object/public/creator-avatars/alice.jpg"
        );
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_bucket_exists_variants() {
        let mut mock_http = MockHttpClient::new();
        let mut statuses = vec![
            response(200, r#"{"id":"creator-avatars"}"#),
            response(400, r#"{"statusCode":"404","error":"Bucket not found"}"#),
            response(404, ""),
            response(403, "forbidden"),
        ]
        .into_iter();
        mock_http
            .expect_execute()
            .times(4)
            .returning(move |_| Ok(statuses.next().unwrap()));

        let storage = SupabaseStorage::new(Arc::new(mock_http), "https://p.supabase.co", "key");

        assert!(storage.bucket_exists("creator-avatars").await.unwrap());
        assert!(!storage.bucket_exists("creator-avatars").await.unwrap());
        assert!(!storage.bucket_exists("creator-avatars").await.unwrap());
        assert!(matches!(
            storage.bucket_exists("creator-avatars").await,
            Err(BridgeError::Status { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_upload_sends_upsert_and_auth_headers() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|request: &HttpRequest| {
                request.method == HttpMethod::Post
                    && request.url
                        == "https://p.supabase.co/storage/v1/object/creator-avatars/alice.jpg"
                    && request.headers.get("x-upsert") == Some(&"true".to_string())
                    && request.headers.get("cache-control") == Some(&"max-age=3600".to_string())
                    && request.headers.get("Content-Type") == Some(&"image/jpeg".to_string())
                    && request.headers.get("apikey") == Some(&"service-key".to_string())
                    && request.headers.get("Authorization")
                        == Some(&"Bearer service-key".to_string())
                    && request.body.as_deref() == Some(&b"jpeg-bytes"[..])
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"Key":"creator-avatars/alice.jpg"}"#)));

        let storage =
            SupabaseStorage::new(Arc::new(mock_http), "https://p.supabase.co", "service-key");
        let options = UploadOptions::new("image/jpeg").with_upsert(true);

        storage
            .upload(
                "creator-avatars",
                "alice.jpg",
                Bytes::from_static(b"jpeg-bytes"),
                &options,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_failure_carries_status() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Ok(response(413, "Payload too large")));

        let storage = SupabaseStorage::new(Arc::new(mock_http), "https://p.supabase.co", "key");
        let result = storage
            .upload(
                "creator-avatars",
                "alice.jpg",
                Bytes::from_static(b"x"),
                &UploadOptions::new("image/jpeg"),
            )
            .await;

        match result {
            Err(BridgeError::Status { status, message }) => {
                assert_eq!(status, 413);
                assert_eq!(message, "Payload too large");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_bucket_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|request: &HttpRequest| {
                let body: serde_json::Value =
                    serde_json::from_slice(request.body.as_deref().unwrap_or_default())
                        .unwrap_or_default();
                request.url == "https://p.supabase.co/storage/v1/bucket"
                    && body["id"] == "creator-avatars"
                    && body["public"] == true
                    && body["file_size_limit"] == 5_242_880
                    && body["allowed_mime_types"][0] == "image/jpeg"
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"name":"creator-avatars"}"#)));

        let storage = SupabaseStorage::new(Arc::new(mock_http), "https://p.supabase.co", "key");
        let options = BucketOptions {
            public: true,
            file_size_limit: Some(5_242_880),
            allowed_mime_types: vec!["image/jpeg".to_string()],
        };

        storage.create_bucket("creator-avatars", &options).await.unwrap();
    }

    #[test]
    fn test_status_error_truncates_long_bodies() {
        let long = "x".repeat(1000);
        match status_error(&response(500, &long)) {
            BridgeError::Status { message, .. } => assert_eq!(message.len(), ERROR_BODY_LIMIT),
            other => panic!("unexpected {:?}", other),
        }
    }
}
