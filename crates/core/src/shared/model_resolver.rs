use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("model {0} not found locally and has no download source")]
    NotFound(String),
}

/// An ONNX model identified by its file name and optional download location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelSpec {
    pub file_name: &'static str,
    pub url: Option<&'static str>,
}

/// Resolve a model file, checking local locations before downloading.
///
/// Resolution order:
/// 1. `model_dir`, when the caller configured one
/// 2. User cache directory (platform-specific)
/// 3. Download from the model URL into the cache, if it has one
pub fn resolve(spec: &ModelSpec, model_dir: Option<&Path>) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = model_dir
        .map(|dir| dir.join(spec.file_name))
        .filter(|p| p.exists())
    {
        log::debug!("Using local model {}", path.display());
        return Ok(path);
    }

    let cache_dir = model_cache_dir()?;
    let cached_path = cache_dir.join(spec.file_name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    let url = spec
        .url
        .ok_or_else(|| ModelResolveError::NotFound(spec.file_name.to_string()))?;
    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {} from {url}", spec.file_name);
    download(url, &cached_path)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/IoT Triage/models/`
/// - Linux: `$XDG_CACHE_HOME/IoT Triage/models/` or `~/.cache/IoT Triage/models/`
/// - Windows: `%LOCALAPPDATA%/IoT Triage/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("IoT Triage").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("IoT Triage").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let bytes = response.bytes().map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    // Write to a temp file first, then rename so a failed download never
    // leaves a truncated model behind.
    let temp_path = dest.with_extension("part");
    let write_err = |e: std::io::Error| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;
    file.write_all(&bytes).map_err(write_err)?;
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
