//! `modstore list <namespace> <name> <provider>`.

use anyhow::{Context, Result};

use modstore_registry::version::parse_version;
use modstore_registry::{BackendConfig, Module};

/// Print every stored version of a module.
pub async fn run(
    backend: &BackendConfig,
    namespace: &str,
    name: &str,
    provider: &str,
    json: bool,
) -> Result<()> {
    let registry = modstore_registry::open_registry(backend)
        .with_context(|| format!("opening {} registry", backend.kind()))?;

    let mut modules = registry
        .list_module_versions(namespace, name, provider)
        .await
        .with_context(|| format!("listing {namespace}/{name}/{provider}"))?;
    sort_by_version(&mut modules);

    if json {
        println!("{}", serde_json::to_string_pretty(&modules)?);
    } else if modules.is_empty() {
        println!("No versions of {namespace}/{name}/{provider} found.");
    } else {
        for module in &modules {
            println!("{}  {}", module.version, module.download_url);
        }
    }
    Ok(())
}

/// Semver order where versions parse, string order otherwise.
fn sort_by_version(modules: &mut [Module]) {
    modules.sort_by(|a, b| {
        match (parse_version(&a.version), parse_version(&b.version)) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => a.version.cmp(&b.version),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(version: &str) -> Module {
        Module {
            namespace: "acme".to_string(),
            name: "vpc".to_string(),
            provider: "aws".to_string(),
            version: version.to_string(),
            download_url: String::new(),
        }
    }

    #[test]
    fn semver_ordering() {
        let mut modules = vec![module("1.10.0"), module("1.2.0"), module("0.9.0")];
        sort_by_version(&mut modules);
        let versions: Vec<&str> = modules.iter().map(|m| m.version.as_str()).collect();
        assert_eq!(versions, vec!["0.9.0", "1.2.0", "1.10.0"]);
    }
}
