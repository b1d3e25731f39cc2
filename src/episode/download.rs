use std::path::Path;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::DownloadError;
use crate::http::{ByteStream, HttpClient};
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// Download an enclosure to the specified output path
///
/// The output file is created before the request is sent. Byte counts of
/// written chunks go through a channel to a separate task that reports
/// progress, so rendering never holds up the copy loop. A failure halfway
/// through leaves the partial file on disk.
///
/// Returns the number of bytes downloaded on success.
pub async fn download_episode<C: HttpClient>(
    client: &C,
    url: &str,
    output_path: &Path,
    reporter: &SharedProgressReporter,
) -> Result<u64, DownloadError> {
    let filename = output_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| output_path.display().to_string());

    let mut file =
        File::create(output_path)
            .await
            .map_err(|e| DownloadError::FileCreateFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;

    let response = client
        .get_stream(url)
        .await
        .map_err(|e| DownloadError::HttpFailed {
            url: url.to_string(),
            source: e,
        })?;

    if response.status >= 400 {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    let content_length = response.content_length;
    reporter.report(ProgressEvent::DownloadStarting {
        filename: filename.clone(),
        content_length,
    });

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<u64>();
    let progress_task = tokio::spawn({
        let reporter = reporter.clone();
        let filename = filename.clone();
        async move {
            let mut bytes_downloaded: u64 = 0;
            while let Some(chunk_len) = progress_rx.recv().await {
                bytes_downloaded += chunk_len;
                reporter.report(ProgressEvent::DownloadProgress {
                    filename: filename.clone(),
                    bytes_downloaded,
                    total_bytes: content_length,
                });
            }
        }
    });

    let result = copy_body(response.body, &mut file, url, output_path, progress_tx).await;

    // The sender is gone once copy_body returns, so this ends after the last update
    if let Err(e) = progress_task.await {
        warn!(error = %e, "Progress task ended abnormally");
    }

    let bytes_downloaded = result?;
    debug!(%filename, bytes_downloaded, "Download finished");

    reporter.report(ProgressEvent::DownloadCompleted {
        filename,
        bytes_downloaded,
    });

    Ok(bytes_downloaded)
}

async fn copy_body(
    mut stream: ByteStream,
    file: &mut File,
    url: &str,
    output_path: &Path,
    progress_tx: mpsc::UnboundedSender<u64>,
) -> Result<u64, DownloadError> {
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::StreamFailed {
            url: url.to_string(),
            source: e,
        })?;

        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::FileWriteFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        bytes_written += chunk.len() as u64;
        // Receiver only goes away if the progress task died
        let _ = progress_tx.send(chunk.len() as u64);
    }

    file.flush()
        .await
        .map_err(|e| DownloadError::FileWriteFailed {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(bytes_written)
}
