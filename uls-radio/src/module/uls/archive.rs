///! Archive fetcher - download, extract and clean up ULS archives
///!
///! Downloads `<base_url><archive>` into the data directory with a progress
///! bar, unpacks it next to the download and removes both once loaded.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use uls_common::SourceArchive;
use walkdir::WalkDir;

use crate::error::UlsError;

/// FCC bulk download location for complete ULS archives
pub const DEFAULT_BASE_URL: &str = "https://data.fcc.gov/download/pub/uls/complete/";

/// Owns the HTTP client and the data directory layout
pub struct ArchiveFetcher {
    client: Client,
    base_url: String,
    data_dir: PathBuf,
}

impl ArchiveFetcher {
    pub fn new(base_url: impl Into<String>, data_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("uls-radio/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            data_dir: data_dir.into(),
        })
    }

    pub fn url(&self, archive: SourceArchive) -> String {
        format!("{}{}", self.base_url, archive.file_name())
    }

    pub fn archive_path(&self, archive: SourceArchive) -> PathBuf {
        self.data_dir.join(archive.file_name())
    }

    pub fn extract_dir(&self, archive: SourceArchive) -> PathBuf {
        self.data_dir.join(archive.stem())
    }

    /// Download an archive, replacing any previous copy.
    pub async fn download(&self, archive: SourceArchive) -> Result<PathBuf> {
        let url = self.url(archive);
        let dest = self.archive_path(archive);
        tracing::info!("Downloading: {}", url);

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {:?}", self.data_dir))?;

        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Download failed: GET {}", url))?;

        if !response.status().is_success() {
            return Err(UlsError::Download(format!("HTTP {} for {}", response.status(), url)).into());
        }

        let progress = ProgressBar::new(response.content_length().unwrap_or(0));
        progress.set_style(
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.set_message(archive.file_name());

        let mut file = tokio::fs::File::create(&dest)
            .await
            .with_context(|| format!("Failed to create {:?}", dest))?;

        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed while reading HTTP body from {}", url))?
        {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {:?}", dest))?;
            progress.inc(chunk.len() as u64);
        }
        file.flush().await.with_context(|| format!("Failed to flush {:?}", dest))?;
        progress.finish();

        tracing::info!("Downloaded {} to {:?}", archive, dest);
        Ok(dest)
    }

    /// Unpack a downloaded archive into its extraction directory.
    pub fn extract(&self, archive: SourceArchive) -> crate::error::Result<PathBuf> {
        let zip_path = self.archive_path(archive);
        let target = self.extract_dir(archive);
        tracing::info!("Extracting {:?}", zip_path);

        extract_zip(&zip_path, &target)?;
        Ok(target)
    }

    /// Remove the downloaded archive and its extracted contents.
    pub fn cleanup(&self, archive: SourceArchive) {
        let zip_path = self.archive_path(archive);
        if zip_path.exists() {
            tracing::info!("Removing {:?}", zip_path);
            if let Err(e) = std::fs::remove_file(&zip_path) {
                tracing::warn!("Failed to remove {:?}: {}", zip_path, e);
            }
        }

        let extract_dir = self.extract_dir(archive);
        if extract_dir.exists() {
            tracing::info!("Removing {:?} and contents", extract_dir);
            if let Err(e) = std::fs::remove_dir_all(&extract_dir) {
                tracing::warn!("Failed to remove {:?}: {}", extract_dir, e);
            }
        }
    }
}

/// Extract every entry of a zip file below `target`.
pub fn extract_zip(zip_path: &Path, target: &Path) -> crate::error::Result<()> {
    std::fs::create_dir_all(target)?;
    let file = std::fs::File::open(zip_path)?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| UlsError::Archive(format!("{:?}: {}", zip_path, e)))?;
    zip.extract(target)
        .map_err(|e| UlsError::Archive(format!("{:?}: {}", zip_path, e)))?;
    Ok(())
}

/// First file named `file_name` anywhere below `dir`.
pub fn find_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(|entry| entry.into_path())
}
