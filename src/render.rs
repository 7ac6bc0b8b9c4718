//! Client side of the wheel renderer.
//!
//! Drawing the wheel and assembling the spin animation is done by a separate
//! rendering service; the bot only sends the options and the rotation to reach.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::SelectionResult;

/// Produces wheel images from the current options.
pub trait WheelRenderer: Send + Sync + 'static {
    /// Still image (PNG) of the wheel at rest.
    fn preview(&self, options: &[String]) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Spin animation (GIF) that stops with the pointer on `selection.selected_index`.
    fn animate(
        &self,
        options: &[String],
        selection: &SelectionResult,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    options: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spin_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_dir: Option<&'a str>,
}

/// Renderer reached over HTTP: `POST {base}/preview` and `POST {base}/animate`.
pub struct HttpRenderer {
    client: reqwest::Client,
    base_url: String,
    font_dir: Option<String>,
}

impl HttpRenderer {
    pub fn new(base_url: String, timeout: Duration, font_dir: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url, font_dir })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.renderer_url.clone(), cfg.renderer_timeout, cfg.font_dir.clone())
    }

    async fn render(&self, path: &str, request: &RenderRequest<'_>) -> Result<Vec<u8>> {
        let url = format!("{}/{path}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Renderer(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body_short: String = body.chars().take(200).collect();
            return Err(AppError::Renderer(format!("{url} returned {status}: {body_short}")));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AppError::Renderer(format!("{url}: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Renderer(format!("{url} returned an empty image")));
        }
        debug!(url = %url, size = bytes.len(), "render complete");
        Ok(bytes.to_vec())
    }
}

impl WheelRenderer for HttpRenderer {
    async fn preview(&self, options: &[String]) -> Result<Vec<u8>> {
        let request = RenderRequest {
            options,
            selected_index: None,
            spin_degrees: None,
            font_dir: self.font_dir.as_deref(),
        };
        self.render("preview", &request).await
    }

    async fn animate(&self, options: &[String], selection: &SelectionResult) -> Result<Vec<u8>> {
        let request = RenderRequest {
            options,
            selected_index: Some(selection.selected_index),
            spin_degrees: Some(selection.spin_degrees),
            font_dir: self.font_dir.as_deref(),
        };
        self.render("animate", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_request_omits_spin_fields() {
        let options = vec!["a".to_string(), "b".to_string()];
        let request = RenderRequest {
            options: &options,
            selected_index: None,
            spin_degrees: None,
            font_dir: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "options": ["a", "b"] }));
    }

    #[test]
    fn animate_request_carries_rotation_and_fonts() {
        let options = vec!["a".to_string()];
        let request = RenderRequest {
            options: &options,
            selected_index: Some(0),
            spin_degrees: Some(905.0),
            font_dir: Some("/usr/share/fonts"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["selected_index"], 0);
        assert_eq!(json["spin_degrees"], 905.0);
        assert_eq!(json["font_dir"], "/usr/share/fonts");
    }

    #[tokio::test]
    async fn unreachable_renderer_is_a_renderer_failure() {
        // port 9 (discard) on localhost is not expected to speak HTTP
        let renderer =
            HttpRenderer::new("http://127.0.0.1:9".to_string(), Duration::from_secs(2), None).unwrap();
        let err = renderer.preview(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, AppError::Renderer(_)));
    }
}
