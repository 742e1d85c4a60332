//! Dataset source abstraction
//!
//! [`DatasetSource`] is the seam between the download stage and the
//! transport. The production implementation streams the fixed remote
//! endpoint over HTTP; tests inject deterministic chunk sequences to pin
//! down progress and failure behavior.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use tracing::debug;

use crate::config::LoaderConfig;
use crate::constants::http;
use crate::errors::{DownloadError, DownloadResult};

/// An open dataset stream: the declared total size (if the transport
/// announced one) and the incremental chunk stream.
pub struct DatasetStream {
    /// Total expected size in bytes, when declared upfront
    pub total_size: Option<u64>,
    /// Incremental chunk delivery; a stream error surfaces as a transport
    /// failure mid-download
    pub chunks: BoxStream<'static, DownloadResult<Bytes>>,
}

/// A fetchable remote dataset
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Open the dataset as a byte stream
    ///
    /// # Errors
    ///
    /// Fails with [`DownloadError::Status`] if the transport reports a
    /// non-success response, or [`DownloadError::Http`] on connection
    /// failure.
    async fn fetch(&self) -> DownloadResult<DatasetStream>;
}

/// HTTP(S) dataset source over a fixed GET endpoint
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Build an HTTP source for the configured endpoint
    ///
    /// The client applies the configured request timeout to the whole
    /// streamed response, so a stalled stream cannot hang the lifecycle.
    pub fn new(config: &LoaderConfig) -> DownloadResult<Self> {
        let client = Client::builder()
            .user_agent(http::USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: config.dataset_url.clone(),
        })
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    async fn fetch(&self) -> DownloadResult<DatasetStream> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(DownloadError::Status {
                status: response.status().as_u16(),
            });
        }

        let total_size = response.content_length();
        debug!(
            url = %self.url,
            total_size = ?total_size,
            "dataset stream opened"
        );

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(DownloadError::Http))
            .boxed();

        Ok(DatasetStream { total_size, chunks })
    }
}
