//! The `pictag models` command for fetching and inspecting models.

use std::path::Path;

use clap::{Args, Subcommand};
use pictag_core::models::onnx::{repo_id, required_files, OnnxModelLoader, RemoteFile};
use pictag_core::{Config, ModelKind};

#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download the classifier, detector and zero-shot models
    Download {
        /// Skip the zero-shot model (only needed for keywords)
        #[arg(long)]
        no_zero_shot: bool,
    },

    /// List models and whether they are installed
    List,

    /// Show model directory path
    Path,
}

const ALL_SLOTS: [ModelKind; 3] = [ModelKind::Classifier, ModelKind::Detector, ModelKind::ZeroShot];

const HUB_BASE_URL: &str = "https://huggingface.co";

pub async fn execute(args: ModelsArgs, config: Config) -> anyhow::Result<()> {
    let loader = OnnxModelLoader::new(config.model_dir(), config.models.clone());

    match args.command {
        ModelsCommand::Download { no_zero_shot } => {
            let client = reqwest::Client::new();
            for kind in ALL_SLOTS {
                if no_zero_shot && kind == ModelKind::ZeroShot {
                    continue;
                }
                download_model(&client, &loader, kind).await?;
            }
            tracing::info!("All downloads complete.");
        }

        ModelsCommand::List => {
            println!("Models directory: {}\n", loader.model_dir().display());
            for kind in ALL_SLOTS {
                let status = if loader.is_installed(kind) {
                    "ready"
                } else {
                    "not installed"
                };
                println!(
                    "  {:12} {:30} {}",
                    kind.to_string(),
                    loader.model_name(kind),
                    status
                );
            }
            if !ALL_SLOTS.iter().all(|kind| loader.is_installed(*kind)) {
                println!("\nRun `pictag models download` to fetch missing models.");
            }
        }

        ModelsCommand::Path => {
            println!("{}", loader.model_dir().display());
        }
    }

    Ok(())
}

/// Fetch every missing file for one slot. Files already on disk are kept.
async fn download_model(
    client: &reqwest::Client,
    loader: &OnnxModelLoader,
    kind: ModelKind,
) -> anyhow::Result<()> {
    let repo = repo_id(loader.model_name(kind));
    let dir = loader.model_path(kind);
    std::fs::create_dir_all(&dir)?;

    for file in required_files(kind) {
        let dest = dir.join(file.local);
        if dest.exists() {
            tracing::info!("{kind}: {} already exists", file.local);
            continue;
        }

        let url = file_url(&repo, file);
        tracing::info!("Downloading {kind} {}...", file.local);
        tracing::info!("  Source: {}", url);
        tracing::info!("  Destination: {:?}", dest);

        download_file(client, &url, &dest).await?;

        let file_size = std::fs::metadata(&dest)?.len();
        tracing::info!(
            "  {} complete ({:.1} MB)",
            file.local,
            file_size as f64 / (1024.0 * 1024.0)
        );
    }

    Ok(())
}

fn file_url(repo: &str, file: &RemoteFile) -> String {
    format!("{HUB_BASE_URL}/{repo}/resolve/main/{}", file.remote)
}

/// Stream a file to disk, reporting its BLAKE3 digest.
///
/// Writes to a `.part` file first so an interrupted download is never
/// mistaken for an installed model.
async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    let total_size = response.content_length();
    if let Some(size) = total_size {
        tracing::info!("  Size: {:.1} MB", size as f64 / (1024.0 * 1024.0));
    }

    let partial = dest.with_extension("part");
    let mut file = tokio::fs::File::create(&partial).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = blake3::Hasher::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;

        if let Some(total) = total_size {
            if downloaded % (50 * 1024 * 1024) < chunk.len() as u64 {
                tracing::info!(
                    "  Progress: {:.0}%",
                    downloaded as f64 / total as f64 * 100.0
                );
            }
        }
    }

    file.flush().await?;
    drop(file);

    if let Some(total) = total_size {
        if downloaded != total {
            let _ = std::fs::remove_file(&partial);
            anyhow::bail!(
                "Truncated download from {url}: got {downloaded} of {total} bytes"
            );
        }
    }

    tokio::fs::rename(&partial, dest).await?;
    tracing::info!("  BLAKE3: {}", hasher.finalize().to_hex());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url() {
        let file = required_files(ModelKind::Detector)[0];
        assert_eq!(
            file_url("Xenova/detr-resnet-50", &file),
            "https://huggingface.co/Xenova/detr-resnet-50/resolve/main/onnx/model.onnx"
        );
    }

    #[test]
    fn test_zero_shot_needs_tokenizer() {
        assert!(required_files(ModelKind::ZeroShot)
            .iter()
            .any(|f| f.local == "tokenizer.json"));
    }
}
