//! Headless driver: diagnose one crop photo from the command line.
//!
//! `agrointel <image>` runs the detection flow against the configured
//! inference service and prints the diagnosis as JSON.

use std::path::Path;
use std::sync::Arc;

use agrointel_ai::{GeminiClient, ImagePayload};
use agrointel_app::{AppConfig, AppShell, Delivery, ViewState};
use anyhow::{bail, Context};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agrointel_observability::init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: agrointel <image-file>");
    };

    let config = AppConfig::from_env().context("invalid configuration")?;
    let service = Arc::new(GeminiClient::new(config.inference.clone()));
    let mut shell = AppShell::new(&config, service);

    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {path}"))?;
    let image = ImagePayload::new(bytes, mime_type_for(Path::new(&path)));

    shell.navigate(ViewState::Detect);
    shell.capture_image(image)?;
    let token = shell.analyze_image()?;
    tracing::info!(%token, %path, "analyzing image");

    match shell.settle().await {
        Some(Delivery::Applied) => {}
        Some(Delivery::Stale) | None => bail!("analysis did not complete"),
    }

    let Some(workflow) = shell.detection() else {
        bail!("detection session was closed");
    };
    if let Some(diagnosis) = workflow.result() {
        println!("{}", serde_json::to_string_pretty(diagnosis)?);
        return Ok(());
    }
    match workflow.last_error() {
        Some(kind) => bail!("{}", kind.user_message()),
        None => bail!("analysis did not complete"),
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}
