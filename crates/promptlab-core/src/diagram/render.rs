use super::to_document;
use crate::model::RenderSettings;
use anyhow::Context;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A PlantUML rendering service.
///
/// Given a `.puml` file, an endpoint must leave the rendered image next to it
/// as `<stem>.png` (see [`image_path_for`]).
#[async_trait]
pub trait RenderEndpoint: Send + Sync {
    async fn render_file(&self, source: &Path) -> anyhow::Result<()>;
    fn name(&self) -> &str;
}

pub fn image_path_for(source: &Path) -> PathBuf {
    source.with_extension("png")
}

/// PlantUML server reached over HTTP.
///
/// Uses the server's hex text encoding (`GET {base}/png/~h<hex>`), which
/// needs no deflate step.
pub struct HttpEndpoint {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl HttpEndpoint {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for PlantUML")?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn image_url(&self, source: &str) -> String {
        format!(
            "{}/png/~h{}",
            self.base_url.trim_end_matches('/'),
            hex::encode(source.as_bytes())
        )
    }
}

#[async_trait]
impl RenderEndpoint for HttpEndpoint {
    async fn render_file(&self, source: &Path) -> anyhow::Result<()> {
        let text = std::fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))?;

        let resp = self.client.get(self.image_url(&text)).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("PlantUML server returned {}: {}", status, body);
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            anyhow::bail!("PlantUML server returned an empty image");
        }
        let out = image_path_for(source);
        std::fs::write(&out, &bytes).with_context(|| format!("failed to write {}", out.display()))?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}

/// Result of a best-effort render. `Skipped` carries the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(PathBuf),
    Skipped(String),
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered(_))
    }
}

#[derive(Clone)]
pub struct DiagramRenderer {
    pub primary: Arc<dyn RenderEndpoint>,
    pub fallback: Option<Arc<dyn RenderEndpoint>>,
}

impl DiagramRenderer {
    pub fn new(primary: Arc<dyn RenderEndpoint>, fallback: Option<Arc<dyn RenderEndpoint>>) -> Self {
        Self { primary, fallback }
    }

    /// `None` when rendering is disabled.
    pub fn from_settings(settings: &RenderSettings, timeout: Duration) -> anyhow::Result<Option<Self>> {
        if !settings.enabled {
            return Ok(None);
        }
        let primary = Arc::new(HttpEndpoint::new(&settings.primary_url, timeout)?);
        let fallback: Option<Arc<dyn RenderEndpoint>> =
            if settings.fallback_url.trim().is_empty() || settings.fallback_url == settings.primary_url {
                None
            } else {
                Some(Arc::new(HttpEndpoint::new(&settings.fallback_url, timeout)?))
            };
        Ok(Some(Self::new(primary, fallback)))
    }

    /// Renders `code` to `output_path`. Never fails: problems are logged and
    /// reported as [`RenderOutcome::Skipped`].
    pub async fn render(&self, code: &str, output_path: &Path) -> RenderOutcome {
        let source = match write_temp_source(code) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(error = %e, "could not stage diagram source");
                return RenderOutcome::Skipped(format!("temp file: {e}"));
            }
        };
        let produced = image_path_for(source.path());

        let outcome = match self.try_endpoints(source.path()).await {
            Err(reason) => RenderOutcome::Skipped(reason),
            Ok(()) if !produced.exists() => {
                tracing::warn!(source = %source.path().display(), "renderer reported success but produced no image");
                RenderOutcome::Skipped("no image produced".into())
            }
            Ok(()) => match move_file(&produced, output_path) {
                Ok(()) => RenderOutcome::Rendered(output_path.to_path_buf()),
                Err(e) => {
                    tracing::warn!(error = %e, "could not store rendered diagram");
                    RenderOutcome::Skipped(format!("move failed: {e}"))
                }
            },
        };

        // The NamedTempFile removes the source on drop; the image may linger.
        let _ = std::fs::remove_file(&produced);
        outcome
    }

    async fn try_endpoints(&self, source: &Path) -> Result<(), String> {
        let primary_err = match self.primary.render_file(source).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        tracing::warn!(
            endpoint = self.primary.name(),
            error = %primary_err,
            "diagram rendering failed on primary endpoint"
        );

        let Some(fallback) = &self.fallback else {
            return Err(format!("{}: {}", self.primary.name(), primary_err));
        };

        match fallback.render_file(source).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(
                    endpoint = fallback.name(),
                    error = %e,
                    "diagram rendering failed on fallback endpoint, skipping image"
                );
                Err(format!(
                    "{}: {}; {}: {}",
                    self.primary.name(),
                    primary_err,
                    fallback.name(),
                    e
                ))
            }
        }
    }
}

fn write_temp_source(code: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("promptlab-")
        .suffix(".puml")
        .tempfile()?;
    file.write_all(to_document(code).as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Rename, or copy + delete when crossing filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)
}
