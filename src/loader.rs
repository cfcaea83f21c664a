use std::path::Path;

use anyhow::Context;

/// Reads and validates a glTF/GLB file without blocking the event loop.
/// Buffers and images are not fetched; only the node hierarchy is used.
pub async fn load_document(path: &Path) -> anyhow::Result<gltf::Document> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read model {}", path.display()))?;

    let gltf = tokio::task::spawn_blocking(move || gltf::Gltf::from_slice(&bytes))
        .await
        .context("glTF parse task panicked")?
        .with_context(|| format!("Failed to parse model {}", path.display()))?;

    Ok(gltf.document)
}
