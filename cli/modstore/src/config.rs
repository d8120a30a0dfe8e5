//! `modstore-config.toml` loading and flag/file merging.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use modstore_registry::registry::{GcsConfig, LocalConfig, S3Config};
use modstore_registry::{BackendConfig, RegistryKind};

/// File searched for upward from the working directory.
pub const CONFIG_FILE_NAME: &str = "modstore-config.toml";

/// Contents of a config file. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Backend selection, same shape as the `--type` flags.
    #[serde(default)]
    pub registry: Option<BackendConfig>,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// `[upload]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UploadConfig {
    #[serde(default)]
    pub version_constraints_semver: Option<String>,
    #[serde(default)]
    pub version_constraints_regex: Option<String>,
    #[serde(default)]
    pub recursive: Option<bool>,
    #[serde(default)]
    pub ignore_existing: Option<bool>,
}

impl CliConfig {
    /// Load `path`, or search upward from `start_dir` when no path is given.
    ///
    /// A missing file is only an error when it was asked for explicitly.
    pub fn load(path: Option<&Path>, start_dir: &Path) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match find_upward(start_dir) {
                Some(p) => p,
                None => return Ok(CliConfig::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: CliConfig =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}

fn find_upward(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Backend kinds accepted by `--type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendType {
    S3,
    Gcs,
    Local,
}

impl From<RegistryKind> for BackendType {
    fn from(kind: RegistryKind) -> Self {
        match kind {
            RegistryKind::S3 => BackendType::S3,
            RegistryKind::Gcs => BackendType::Gcs,
            RegistryKind::Local => BackendType::Local,
        }
    }
}

/// Backend flags shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct BackendArgs {
    /// Registry type to use
    #[arg(long = "type", value_enum, env = "MODSTORE_TYPE")]
    pub kind: Option<BackendType>,
    /// Bucket to use with the s3 registry type
    #[arg(long, env = "MODSTORE_S3_BUCKET")]
    pub s3_bucket: Option<String>,
    /// Key prefix to use with the s3 registry type
    #[arg(long, env = "MODSTORE_S3_PREFIX")]
    pub s3_prefix: Option<String>,
    /// Region of the s3 bucket
    #[arg(long, env = "MODSTORE_S3_REGION")]
    pub s3_region: Option<String>,
    /// Endpoint of an S3-compatible service
    #[arg(long, env = "MODSTORE_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,
    /// Bucket to use with the gcs registry type
    #[arg(long, env = "MODSTORE_GCS_BUCKET")]
    pub gcs_bucket: Option<String>,
    /// Key prefix to use with the gcs registry type
    #[arg(long, env = "MODSTORE_GCS_PREFIX")]
    pub gcs_prefix: Option<String>,
    /// Project owning the gcs bucket
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub gcs_project: Option<String>,
    /// Service account key file for gcs
    #[arg(long, env = "MODSTORE_GCS_CREDENTIALS")]
    pub gcs_credentials: Option<PathBuf>,
    /// Directory of the local registry type
    #[arg(long, env = "MODSTORE_LOCAL_ROOT")]
    pub local_root: Option<PathBuf>,
    /// Key prefix to use with the local registry type
    #[arg(long, env = "MODSTORE_LOCAL_PREFIX")]
    pub local_prefix: Option<String>,
}

impl BackendArgs {
    /// Merge flags over the file's `[registry]` table.
    ///
    /// File values are only used when the file selects the same backend
    /// as the flags.
    pub fn resolve(&self, file: Option<&BackendConfig>) -> Result<BackendConfig> {
        let kind = match (self.kind, file) {
            (Some(kind), _) => kind,
            (None, Some(config)) => BackendType::from(config.kind()),
            (None, None) => bail!("no registry type given (use --type or a [registry] table)"),
        };

        let config = match kind {
            BackendType::S3 => {
                let base = match file {
                    Some(BackendConfig::S3(c)) => c.clone(),
                    _ => S3Config::default(),
                };
                BackendConfig::S3(S3Config {
                    bucket: self.s3_bucket.clone().unwrap_or(base.bucket),
                    prefix: self.s3_prefix.clone().unwrap_or(base.prefix),
                    region: self.s3_region.clone().or(base.region),
                    endpoint: self.s3_endpoint.clone().or(base.endpoint),
                })
            }
            BackendType::Gcs => {
                let base = match file {
                    Some(BackendConfig::Gcs(c)) => c.clone(),
                    _ => GcsConfig::default(),
                };
                BackendConfig::Gcs(GcsConfig {
                    bucket: self.gcs_bucket.clone().unwrap_or(base.bucket),
                    prefix: self.gcs_prefix.clone().unwrap_or(base.prefix),
                    project: self.gcs_project.clone().or(base.project),
                    credentials: self.gcs_credentials.clone().or(base.credentials),
                })
            }
            BackendType::Local => {
                let base = match file {
                    Some(BackendConfig::Local(c)) => c.clone(),
                    _ => LocalConfig::default(),
                };
                BackendConfig::Local(LocalConfig {
                    root: self.local_root.clone().unwrap_or(base.root),
                    prefix: self.local_prefix.clone().unwrap_or(base.prefix),
                })
            }
        };
        Ok(config)
    }
}
