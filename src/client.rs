//! Terminal client: capture images from disk, submit them to a running
//! gateway, and fold the outcome into the capture state.

use std::path::PathBuf;

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::capture::{encode_all, Action, CaptureState, CapturedImage, ImageFile};
use crate::gateway::AnalyzeRequest;
use crate::verdict::AnalysisVerdict;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway responded with {status}: {body}")]
    Status { status: u16, body: String },
}

/// HTTP client for `POST /api/analyze`.
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn analyze(&self, images: &[CapturedImage]) -> Result<AnalysisVerdict, ClientError> {
        let request = AnalyzeRequest {
            images: images.iter().map(|image| image.as_str().to_string()).collect(),
        };

        let response = self
            .client
            .post(format!("{}/api/analyze", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

/// Load `paths`, encode the images among them, and run one analysis.
///
/// Unreadable files are skipped like non-images. The returned state is
/// `Idle` when nothing usable was found.
pub async fn run_analyze(gateway: &GatewayClient, paths: &[PathBuf]) -> CaptureState {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match ImageFile::read(path).await {
            Ok(file) => files.push(file),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable file"),
        }
    }

    let mut state = CaptureState::new();
    encode_all(files, |image| state.apply(Action::ImageAdded(image))).await;
    analyze_selected(gateway, state).await
}

/// Submit the images already in `state`, if the analyze action is enabled.
pub async fn analyze_selected(gateway: &GatewayClient, mut state: CaptureState) -> CaptureState {
    if !state.can_analyze() {
        return state;
    }

    state.apply(Action::AnalysisStarted);
    info!(images = state.images().len(), "Submitting images for analysis");

    match gateway.analyze(state.images()).await {
        Ok(verdict) => state.apply(Action::AnalysisSucceeded(verdict)),
        Err(e) => {
            error!(error = %e, "Analysis failed");
            state.apply(Action::AnalysisFailed);
        }
    }
    state
}
