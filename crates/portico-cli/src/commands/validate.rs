//! `portico validate` command implementation

use anyhow::bail;
use colored::Colorize;
use portico_kernel::{Manifest, ModuleCatalog};
use portico_runtime::{AdapterResolver, ManifestLoader};
use std::path::Path;
use std::sync::Arc;

/// Execute the `portico validate` command
pub async fn run(path: &Path, resolve: bool) -> anyhow::Result<()> {
    println!("{} Validating manifest", "->".green());
    println!("  Manifest file: {}", path.display().to_string().cyan());

    let manifest = match ManifestLoader::from_path(path).await {
        Ok(manifest) => manifest,
        Err(e) => {
            println!("{} Manifest validation failed: {}", "✗".red(), e);
            bail!("manifest `{}` is invalid", path.display());
        }
    };

    print_summary(&manifest);

    if resolve {
        let resolver = AdapterResolver::new(Arc::new(ModuleCatalog::with_reference_modules()));
        if let Err(e) = resolver.resolve_all(&manifest) {
            println!("{} Adapter resolution failed: {}", "✗".red(), e);
            bail!("manifest `{}` does not resolve", path.display());
        }
        println!("{} All enabled ports resolve", "✓".green());
    }

    println!("{} Manifest is valid", "✓".green());
    Ok(())
}

fn print_summary(manifest: &Manifest) {
    println!("  Version:     {}", manifest.version.yellow());
    println!("  Environment: {}", manifest.environment.to_string().yellow());

    if manifest.adapters.is_empty() {
        println!("  No adapters declared.");
        return;
    }

    let width = manifest
        .adapters
        .keys()
        .map(|port| port.as_str().len())
        .max()
        .unwrap_or(0);
    for (port, declaration) in &manifest.adapters {
        let adapter = declaration.adapter.as_deref().unwrap_or("<none>");
        if declaration.enabled {
            println!("  {:<width$}  {}", port.as_str(), adapter.cyan());
        } else {
            println!("  {:<width$}  {} {}", port.as_str(), adapter, "(disabled)".dimmed());
        }
    }
}
