//! Streaming download with per-chunk progress
//!
//! Reads the dataset stream incrementally so progress can be reported before
//! the whole response has arrived. Each chunk is appended to an accumulator;
//! when the transport declared a total size, the percentage is recomputed
//! after every chunk and reported once per distinct value.

use futures::StreamExt;
use tracing::{debug, info};

use super::source::DatasetSource;
use crate::errors::DownloadResult;

/// Download the whole dataset, reporting coarse progress as it streams
///
/// `on_progress` receives monotonically non-decreasing percentages in
/// `0..=100`, each distinct value at most once. When the source does not
/// declare a total size, no progress is reported during the stream and the
/// value resolves only when the stage ends.
///
/// # Errors
///
/// Fails with a transport error if the response is non-success or the stream
/// is interrupted mid-read. No retry is attempted; the caller decides whether
/// to re-run the lifecycle.
pub async fn download_dataset<F>(
    source: &dyn DatasetSource,
    mut on_progress: F,
) -> DownloadResult<Vec<u8>>
where
    F: FnMut(u8),
{
    let mut stream = source.fetch().await?;

    let mut buffer = match stream.total_size {
        Some(total) => Vec::with_capacity(total as usize),
        None => Vec::new(),
    };
    let mut received: u64 = 0;
    let mut last_reported: Option<u8> = None;

    while let Some(chunk) = stream.chunks.next().await {
        let chunk = chunk?;
        received += chunk.len() as u64;
        buffer.extend_from_slice(&chunk);

        if let Some(total) = stream.total_size {
            if total > 0 {
                let percent = percentage(received, total);
                if last_reported != Some(percent) {
                    debug!(received, total, percent, "download progress");
                    last_reported = Some(percent);
                    on_progress(percent);
                }
            }
        }
    }

    info!(bytes = buffer.len(), "download complete");
    Ok(buffer)
}

/// Rounded completion percentage, clamped to 100 in case the server delivers
/// more bytes than it declared
fn percentage(received: u64, total: u64) -> u8 {
    let percent = (received as f64 / total as f64 * 100.0).round() as u64;
    percent.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::source::DatasetStream;
    use crate::errors::DownloadError;

    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;

    /// Source that yields a fixed chunk sequence with an optional declared size
    struct ChunkSource {
        total_size: Option<u64>,
        chunks: Vec<DownloadResult<Bytes>>,
    }

    impl ChunkSource {
        fn sized(chunk_sizes: &[usize]) -> Self {
            let total: usize = chunk_sizes.iter().sum();
            Self {
                total_size: Some(total as u64),
                chunks: chunk_sizes
                    .iter()
                    .map(|&n| Ok(Bytes::from(vec![0u8; n])))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl DatasetSource for ChunkSource {
        async fn fetch(&self) -> DownloadResult<DatasetStream> {
            let chunks: Vec<_> = self
                .chunks
                .iter()
                .map(|c| match c {
                    Ok(bytes) => Ok(bytes.clone()),
                    Err(_) => Err(DownloadError::Status { status: 500 }),
                })
                .collect();
            Ok(DatasetStream {
                total_size: self.total_size,
                chunks: stream::iter(chunks).boxed(),
            })
        }
    }

    #[tokio::test]
    async fn test_four_equal_chunks_report_quarter_steps() {
        // content-length 1000 delivered as 4 chunks of 250 bytes:
        // progress must be exactly 25, 50, 75, 100, once per chunk
        let source = ChunkSource::sized(&[250, 250, 250, 250]);
        let mut observed = Vec::new();

        let bytes = download_dataset(&source, |p| observed.push(p))
            .await
            .unwrap();

        assert_eq!(bytes.len(), 1000);
        assert_eq!(observed, vec![25, 50, 75, 100]);
    }

    #[tokio::test]
    async fn test_duplicate_percentages_are_not_repeated() {
        // 1000 tiny chunks of 1 byte over a 1000-byte total: each of the
        // 100 percentage values appears exactly once
        let sizes = vec![1usize; 1000];
        let source = ChunkSource::sized(&sizes);
        let mut observed = Vec::new();

        download_dataset(&source, |p| observed.push(p))
            .await
            .unwrap();

        let mut deduped = observed.clone();
        deduped.dedup();
        assert_eq!(observed, deduped);
        assert_eq!(*observed.last().unwrap(), 100);

        // Monotonically non-decreasing
        assert!(observed.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_unknown_total_size_reports_nothing() {
        let source = ChunkSource {
            total_size: None,
            chunks: vec![
                Ok(Bytes::from_static(b"abc")),
                Ok(Bytes::from_static(b"def")),
            ],
        };
        let mut observed = Vec::new();

        let bytes = download_dataset(&source, |p| observed.push(p))
            .await
            .unwrap();

        assert_eq!(bytes, b"abcdef");
        assert!(observed.is_empty());
    }

    #[tokio::test]
    async fn test_mid_stream_error_propagates() {
        let source = ChunkSource {
            total_size: Some(500),
            chunks: vec![
                Ok(Bytes::from(vec![0u8; 250])),
                Err(DownloadError::Status { status: 500 }),
            ],
        };

        let result = download_dataset(&source, |_| {}).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_percentage_rounding_and_clamping() {
        assert_eq!(percentage(250, 1000), 25);
        assert_eq!(percentage(333, 1000), 33);
        assert_eq!(percentage(335, 1000), 34);
        assert_eq!(percentage(1200, 1000), 100);
    }
}
