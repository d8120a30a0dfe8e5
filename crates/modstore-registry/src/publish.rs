//! Module publishing workflow.
//!
//! Walks a directory for module descriptors and, for each one in walk
//! order: parse, check the version policy, probe the registry, archive the
//! descriptor's directory and upload it. Filtered-out modules and tolerated
//! duplicates are reported and skipped; every other failure stops the run.
//! Uploads that already succeeded are not rolled back.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::archive;
use crate::error::{RegistryError, Result};
use crate::integrity::ContentHash;
use crate::module::{Module, ModuleId};
use crate::registry::Registry;
use crate::spec::{ModuleSpec, SPEC_FILE_NAME};
use crate::version::{Rejection, Verdict, VersionPolicy};

/// Options for a publish run.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Search the whole tree for descriptors instead of only the root.
    pub recursive: bool,
    /// Skip modules that are already stored instead of failing the run.
    pub ignore_existing: bool,
    /// Archive and report, but write nothing.
    pub dry_run: bool,
    /// Which versions are eligible.
    pub policy: VersionPolicy,
}

impl Default for PublishOptions {
    fn default() -> Self {
        PublishOptions {
            recursive: true,
            ignore_existing: true,
            dry_run: false,
            policy: VersionPolicy::default(),
        }
    }
}

/// What happened to one discovered module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Uploaded { module: Module, digest: ContentHash },
    SkippedFilteredOut(Rejection),
    SkippedAlreadyExists(Module),
    /// Dry run: the archive was built but not written.
    DryRun { key: String, digest: ContentHash },
}

/// A descriptor and what became of it.
#[derive(Debug, Clone)]
pub struct PublishEntry {
    pub descriptor: PathBuf,
    pub id: ModuleId,
    pub outcome: Outcome,
}

/// Per-module outcomes of a run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    pub entries: Vec<PublishEntry>,
}

impl PublishReport {
    /// Number of modules written to the registry.
    pub fn uploaded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Uploaded { .. }))
    }

    /// Number of modules filtered out or already present.
    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                Outcome::SkippedFilteredOut(_) | Outcome::SkippedAlreadyExists(_)
            )
        })
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// Find the descriptors to process under `root`.
///
/// Recursive discovery returns every `modstore.toml` in sorted walk order.
/// Otherwise `root` is taken as the descriptor itself when it is a file, or
/// as the directory holding one.
pub fn discover(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(RegistryError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", root.display()),
        )));
    }

    if !recursive {
        return Ok(vec![if root.is_file() {
            root.to_path_buf()
        } else {
            root.join(SPEC_FILE_NAME)
        }]);
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && entry.file_name() == SPEC_FILE_NAME {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Publish every module found under `root`.
pub async fn publish(
    root: &Path,
    registry: &dyn Registry,
    options: &PublishOptions,
) -> Result<PublishReport> {
    let descriptors = discover(root, options.recursive)?;
    tracing::debug!(root = %root.display(), count = descriptors.len(), "discovered module specs");
    if options.policy.is_unconstrained() {
        tracing::debug!("no version constraints, every module is eligible");
    }

    let mut report = PublishReport::default();
    for descriptor in descriptors {
        let (id, outcome) = publish_one(&descriptor, registry, options).await?;
        report.entries.push(PublishEntry {
            descriptor,
            id,
            outcome,
        });
    }
    Ok(report)
}

async fn publish_one(
    descriptor: &Path,
    registry: &dyn Registry,
    options: &PublishOptions,
) -> Result<(ModuleId, Outcome)> {
    let spec = ModuleSpec::load(descriptor)?;
    let id = spec.id();
    tracing::debug!(path = %descriptor.display(), module = %id, "parsed module spec");

    if let Verdict::Rejected(rejection) = options.policy.evaluate(&id.version)? {
        tracing::info!(
            module = %id,
            constraint = rejection.as_str(),
            "module doesn't meet version constraints, skipped"
        );
        return Ok((id, Outcome::SkippedFilteredOut(rejection)));
    }

    id.validate()?;

    match registry.get_module(&id).await {
        Ok(existing) if options.ignore_existing => {
            tracing::warn!(
                module = %id,
                download_url = %existing.download_url,
                "module already exists, skipped"
            );
            return Ok((id, Outcome::SkippedAlreadyExists(existing)));
        }
        Ok(existing) => {
            tracing::error!(
                module = %id,
                download_url = %existing.download_url,
                "module already exists"
            );
            return Err(RegistryError::AlreadyExists {
                key: registry.object_key(&id),
            });
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
    }

    let module_root = descriptor.parent().unwrap_or_else(|| Path::new("."));
    let content = archive::archive_module(module_root)?;
    let digest = ContentHash::compute(&content);

    if options.dry_run {
        tracing::info!(module = %id, sha256 = %digest, bytes = content.len(), "dry run, not uploading");
        return Ok((
            id.clone(),
            Outcome::DryRun {
                key: registry.object_key(&id),
                digest,
            },
        ));
    }

    let module = match registry.upload_module(&id, content).await {
        Ok(module) => module,
        // Stored by another publisher between the probe and the write.
        Err(RegistryError::AlreadyExists { key }) if options.ignore_existing => {
            let existing = registry.get_module(&id).await?;
            tracing::warn!(module = %id, key = %key, "module appeared during upload, skipped");
            return Ok((id, Outcome::SkippedAlreadyExists(existing)));
        }
        Err(e) => return Err(e),
    };
    tracing::info!(
        module = %id,
        download_url = %module.download_url,
        sha256 = %digest,
        "module successfully uploaded"
    );
    Ok((id, Outcome::Uploaded { module, digest }))
}
