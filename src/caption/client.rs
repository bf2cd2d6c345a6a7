use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assets::source::ImageSource;
use crate::foundation::error::{SnapError, SnapResult};

/// Base URL used when `SNAPFRAME_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const MULTIPART_BOUNDARY: &str = "----snapframe-form-boundary-7c1f";

/// Caption text and decoration suggestions for one image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionResponse {
    /// Short caption.
    #[serde(default)]
    pub caption: String,
    /// Longer description of the image content.
    #[serde(default)]
    pub image_description: String,
    /// Suggested decorations.
    #[serde(default)]
    pub suggested_emojis: Vec<String>,
    /// Service-level success flag.
    #[serde(default)]
    pub success: bool,
    /// Service-level error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Readiness probe payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status string (`"healthy"`).
    pub status: String,
    /// Captioning model loaded.
    #[serde(default)]
    pub blip_loaded: bool,
    /// Language model reachable.
    #[serde(default)]
    pub ollama_available: bool,
    /// GPU present.
    #[serde(default)]
    pub gpu_available: bool,
}

/// External caption collaborator.
pub trait CaptionService {
    /// Caption `source`, optionally steering the result with `context` text.
    fn generate_caption(
        &self,
        source: &ImageSource,
        context: Option<&str>,
    ) -> SnapResult<CaptionResponse>;

    /// Readiness probe.
    fn health(&self) -> SnapResult<HealthResponse>;
}

/// Options for [`HttpCaptionClient`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionClientOpts {
    /// Service base URL, without trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CaptionClientOpts {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl CaptionClientOpts {
    /// Defaults overridden by `SNAPFRAME_API_URL` and `SNAPFRAME_API_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut opts = Self::default();
        if let Some(url) = lookup("SNAPFRAME_API_URL").filter(|u| !u.trim().is_empty()) {
            opts.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("SNAPFRAME_API_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(v) if v > 0 => opts.timeout_secs = v,
                _ => tracing::warn!(value = %secs, "ignoring invalid SNAPFRAME_API_TIMEOUT_SECS"),
            }
        }
        opts
    }
}

/// Blocking HTTP client for the caption service.
pub struct HttpCaptionClient {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpCaptionClient {
    /// Build a client; no request is made.
    pub fn new(opts: &CaptionClientOpts) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(opts.timeout_secs.max(1)))
            .build();
        Self {
            agent,
            base_url: opts.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl CaptionService for HttpCaptionClient {
    #[tracing::instrument(skip(self, source), fields(id = %source.id()))]
    fn generate_caption(
        &self,
        source: &ImageSource,
        context: Option<&str>,
    ) -> SnapResult<CaptionResponse> {
        let body = multipart_body(source, context);
        let response = self
            .agent
            .post(&self.url("generate-caption"))
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .send_bytes(&body)
            .map_err(request_error)?;
        let data: CaptionResponse = response
            .into_json()
            .map_err(|e| SnapError::collaborator(format!("invalid caption response: {e}")))?;
        if !data.success {
            return Err(SnapError::collaborator(
                data.error
                    .unwrap_or_else(|| "Caption generation failed".to_string()),
            ));
        }
        tracing::info!(caption = %data.caption, suggestions = data.suggested_emojis.len(), "caption generated");
        Ok(data)
    }

    fn health(&self) -> SnapResult<HealthResponse> {
        let response = self
            .agent
            .get(&self.url("health"))
            .call()
            .map_err(request_error)?;
        response
            .into_json()
            .map_err(|e| SnapError::collaborator(format!("invalid health response: {e}")))
    }
}

fn request_error(err: ureq::Error) -> SnapError {
    match err {
        ureq::Error::Status(code, response) => SnapError::collaborator(format!(
            "caption service returned HTTP {code} {}",
            response.status_text()
        )),
        ureq::Error::Transport(t) => SnapError::collaborator(format!("caption service unreachable: {t}")),
    }
}

fn file_name_for(mime: &str) -> String {
    let ext = mime
        .strip_prefix("image/")
        .or_else(|| mime.strip_prefix("video/"))
        .unwrap_or("bin");
    format!("upload.{ext}")
}

fn multipart_body(source: &ImageSource, context: Option<&str>) -> Vec<u8> {
    let mut body = Vec::with_capacity(source.bytes().len() + 512);
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            file_name_for(source.mime()),
            source.mime()
        )
        .as_bytes(),
    );
    body.extend_from_slice(source.bytes());
    body.extend_from_slice(b"\r\n");
    if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"context\"\r\n\r\n{ctx}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

#[cfg(test)]
#[path = "../../tests/unit/caption/client.rs"]
mod tests;
