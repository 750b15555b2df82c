use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use super::{join_url, Obtained, SourceCapability};
use crate::network::{HttpResponse, Throttle, Transport};
use crate::result::{DownloadReceipt, ScrapeResult};

/// Largest PDF body that will be written to disk.
pub const MAX_PDF_BYTES: usize = 20 * 1024 * 1024;

/// Saves the PDF behind each DOI into the export directory. Only saved
/// files produce a receipt.
pub struct Downloader {
    transport: Arc<dyn Transport>,
    url: String,
    export_dir: PathBuf,
    throttle: Throttle,
}

impl Downloader {
    pub fn new(
        transport: Arc<dyn Transport>,
        url: impl Into<String>,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport,
            url: url.into(),
            export_dir: export_dir.into(),
            throttle: Throttle::none(),
        }
    }

    #[must_use]
    pub const fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    async fn save(&self, doi: &str, response: &HttpResponse) -> Option<PathBuf> {
        if let Err(reason) = validate_pdf(&response.body) {
            tracing::warn!(doi, reason = %reason, "Downloaded body rejected");
            return None;
        }

        let path = self.export_dir.join(format!("{}.pdf", file_stem(doi)));
        if let Err(e) = tokio::fs::create_dir_all(&self.export_dir).await {
            tracing::warn!(dir = %self.export_dir.display(), error = %e, "Could not create export directory");
            return None;
        }
        match tokio::fs::write(&path, &response.body).await {
            Ok(()) => {
                tracing::info!(doi, path = %path.display(), bytes = response.body.len(), "Saved PDF");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(doi, path = %path.display(), error = %e, "Could not write PDF");
                None
            }
        }
    }
}

#[async_trait]
impl SourceCapability for Downloader {
    fn name(&self) -> &str {
        "downloader"
    }

    async fn obtain(&self, query: &str) -> Obtained {
        let doi = query.trim();
        let response = self.transport.get(&join_url(&self.url, doi), &[]).await;
        self.throttle.pause().await;

        let saved = match response {
            Ok(response) if response.is_success() => self.save(doi, &response).await,
            Ok(response) => {
                tracing::warn!(doi, status = response.status, "Download returned an error status");
                None
            }
            Err(e) => {
                tracing::warn!(doi, error = %e, "Download request failed");
                None
            }
        };

        saved
            .map(|path| {
                ScrapeResult::from(DownloadReceipt {
                    downloader: self.url.clone(),
                    query: doi.to_string(),
                    filepath: Some(path.display().to_string()),
                })
            })
            .into()
    }
}

fn validate_pdf(body: &[u8]) -> Result<(), String> {
    if !body.starts_with(b"%PDF") {
        return Err("not a PDF".to_string());
    }
    if body.len() > MAX_PDF_BYTES {
        return Err(format!("PDF too large: {} MB", body.len() / 1024 / 1024));
    }
    Ok(())
}

/// File-system safe name for a DOI.
fn file_stem(doi: &str) -> String {
    doi.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
