//! `modstore upload <dir>`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};

use modstore_registry::{BackendConfig, Outcome, PublishOptions, PublishReport};

/// Archive and upload every module found under `dir`.
pub async fn run(dir: &Path, backend: &BackendConfig, options: &PublishOptions) -> Result<()> {
    if !dir.exists() {
        bail!("{} does not exist", dir.display());
    }

    let registry = modstore_registry::open_registry(backend)
        .with_context(|| format!("opening {} registry", backend.kind()))?;

    let report = modstore_registry::publish(dir, registry.as_ref(), options)
        .await
        .with_context(|| format!("publishing modules from {}", dir.display()))?;

    print!("{}", format_report(&report, options.dry_run));
    Ok(())
}

/// One line per module, then a summary.
pub fn format_report(report: &PublishReport, dry_run: bool) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        let _ = match &entry.outcome {
            Outcome::Uploaded { module, digest } => writeln!(
                out,
                "uploaded  {}  {}  sha256:{digest}",
                entry.id, module.download_url
            ),
            Outcome::SkippedFilteredOut(rejection) => writeln!(
                out,
                "skipped   {}  (version constraint: {})",
                entry.id,
                rejection.as_str()
            ),
            Outcome::SkippedAlreadyExists(module) => writeln!(
                out,
                "exists    {}  {}",
                entry.id, module.download_url
            ),
            Outcome::DryRun { key, digest } => {
                writeln!(out, "would add {}  {key}  sha256:{digest}", entry.id)
            }
        };
    }

    if report.entries.is_empty() {
        out.push_str("No modules found.\n");
    } else if dry_run {
        let _ = writeln!(
            out,
            "Dry run: {} module(s) checked, nothing uploaded.",
            report.entries.len()
        );
    } else {
        let _ = writeln!(
            out,
            "Uploaded {} module(s), skipped {}.",
            report.uploaded(),
            report.skipped()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use modstore_registry::{ContentHash, Module, ModuleId, PublishEntry, Rejection};

    fn entry(version: &str, outcome: Outcome) -> PublishEntry {
        PublishEntry {
            descriptor: PathBuf::from("modstore.toml"),
            id: ModuleId::new("acme", "vpc", "aws", version),
            outcome,
        }
    }

    #[test]
    fn report_lists_each_module() {
        let module = Module {
            namespace: "acme".to_string(),
            name: "vpc".to_string(),
            provider: "aws".to_string(),
            version: "1.0.0".to_string(),
            download_url: "s3::https://example/vpc.tar.gz".to_string(),
        };
        let report = PublishReport {
            entries: vec![
                entry("0.9.0", Outcome::SkippedFilteredOut(Rejection::Semver)),
                entry(
                    "1.0.0",
                    Outcome::Uploaded {
                        module,
                        digest: ContentHash::compute(b""),
                    },
                ),
            ],
        };

        let text = format_report(&report, false);
        assert!(text.contains("skipped   acme/vpc/aws@0.9.0  (version constraint: semver)"));
        assert!(text.contains("uploaded  acme/vpc/aws@1.0.0  s3::https://example/vpc.tar.gz"));
        assert!(text.ends_with("Uploaded 1 module(s), skipped 1.\n"));
    }

    #[test]
    fn empty_report() {
        assert_eq!(
            format_report(&PublishReport::default(), false),
            "No modules found.\n"
        );
    }

    #[tokio::test]
    async fn upload_to_local_registry() {
        let dir = tempfile::tempdir().unwrap();
        let modules = dir.path().join("modules");
        std::fs::create_dir_all(modules.join("vpc")).unwrap();
        std::fs::write(
            modules.join("vpc").join(modstore_registry::SPEC_FILE_NAME),
            "[metadata]\nnamespace = \"acme\"\nname = \"vpc\"\nprovider = \"aws\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();

        let backend = BackendConfig::Local(modstore_registry::registry::LocalConfig {
            root: dir.path().join("registry"),
            prefix: String::new(),
        });
        run(&modules, &backend, &PublishOptions::default())
            .await
            .unwrap();

        assert!(dir
            .path()
            .join("registry/namespace=acme/name=vpc/provider=aws/version=1.0.0/acme-vpc-aws-1.0.0.tar.gz")
            .is_file());
    }
}
