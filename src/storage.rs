use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};

/// Client for the remote object-storage HTTP endpoint. Uploads are a single
/// PUT of the whole byte buffer; no retry, no resumable transfer.
#[derive(Clone)]
pub struct StorageClient {
    http_client: Client,
    endpoint: String,
    zone: String,
    api_key: String,
    public_base_url: String,
}

impl StorageClient {
    pub fn new(config: &StorageConfig, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client with static configuration");

        Self {
            http_client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            zone: config.zone.clone(),
            api_key: config.api_key.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Store `bytes` under `path` inside the configured zone and return the
    /// public URL the file will be served from.
    pub async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<String> {
        let url = format!("{}/{}/{}", self.endpoint, self.zone, path);
        self.http_client
            .put(&url)
            .header("AccessKey", &self.api_key)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?
            .error_for_status()
            .map_err(AppError::Upload)?;

        Ok(format!("{}/{}", self.public_base_url, path))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::StorageClient;
    use crate::config::StorageConfig;

    fn storage_client(endpoint: String) -> StorageClient {
        let config = StorageConfig {
            api_key: "test-key".into(),
            zone: "menus-zone".into(),
            endpoint,
            public_base_url: "https://cdn.example.test".into(),
        };
        StorageClient::new(&config, Duration::from_secs(3))
    }

    #[tokio::test]
    async fn upload_puts_bytes_to_the_zone_path_with_access_key() {
        let mock_server = MockServer::start().await;
        let client = storage_client(mock_server.uri());

        Mock::given(method("PUT"))
            .and(path("/menus-zone/products/logo.webp"))
            .and(header_exists("AccessKey"))
            .and(header("Content-Type", "image/webp"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = client
            .upload("products/logo.webp", "image/webp", vec![1, 2, 3])
            .await
            .expect("upload should succeed");

        assert_eq!(url, "https://cdn.example.test/products/logo.webp");
    }

    #[tokio::test]
    async fn upload_fails_when_the_server_returns_500() {
        let mock_server = MockServer::start().await;
        let client = storage_client(mock_server.uri());

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client
            .upload("products/logo.webp", "image/webp", vec![1, 2, 3])
            .await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn upload_times_out_when_the_server_hangs() {
        let mock_server = MockServer::start().await;
        let client = storage_client(mock_server.uri());

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(30)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client
            .upload("products/logo.webp", "image/webp", vec![1, 2, 3])
            .await;
        assert!(outcome.is_err());
    }
}
