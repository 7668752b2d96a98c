use std::{
	path::Path,
	sync::Arc,
};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use servicehub_framework::{
	Loader,
	LoaderError,
	ModuleExport,
};

use crate::{
	catalog::FactoryCatalog,
	manifest::ServiceManifest,
};

/// Loads service manifests from a directory on disk.
///
/// Every regular file in the directory (or symlink to one) is a candidate, listed in file name order.
/// Which candidates are actually loaded is decided by the registry's auto-load
/// filter (extension and exclusion marker).
#[derive(Clone)]
pub struct FsLoader {
	catalog: Arc<FactoryCatalog>,
}

impl FsLoader {
	pub fn new(catalog: FactoryCatalog) -> FsLoader {
		return FsLoader {
			catalog: Arc::new(catalog),
		};
	}

	pub fn catalog(&self) -> &FactoryCatalog {
		return &self.catalog;
	}
}

#[async_trait]
impl Loader for FsLoader {
	async fn list(&self, location: &Path) -> Result<Vec<String>, LoaderError> {
		let enumerate_error = |source: std::io::Error| LoaderError::Enumerate {
			location: location.to_path_buf(),
			source: source.into(),
		};

		let mut entries = tokio::fs::read_dir(location).await.map_err(enumerate_error)?;
		let mut modules = Vec::new();
		while let Some(entry) = entries.next_entry().await.map_err(enumerate_error)? {
			// Follows symlinks, unlike `DirEntry::file_type`
			match tokio::fs::metadata(entry.path()).await {
				Ok(metadata) if metadata.is_file() => {},
				Ok(_) => continue,
				Err(error) => {
					tracing::warn!(path = %entry.path().display(), %error, "skipping unreadable directory entry");
					continue;
				},
			}
			match entry.file_name().into_string() {
				Ok(module) => modules.push(module),
				Err(module) => tracing::warn!(?module, "skipping module with a non-UTF-8 file name"),
			}
		}

		// `read_dir` order is platform-dependent
		modules.sort();
		return Ok(modules);
	}

	async fn load(&self, location: &Path, module: &str) -> Result<ModuleExport, LoaderError> {
		let load_error = |source: anyhow::Error| LoaderError::Load {
			module: String::from(module),
			source,
		};

		let path = location.join(module);
		let contents = tokio::fs::read(&path).await
			.with_context(|| format!("could not read {}", path.display()))
			.map_err(load_error)?;
		let export: Value = serde_json::from_slice(&contents)
			.context("could not parse manifest")
			.map_err(load_error)?;

		let manifest = match ServiceManifest::from_value(export) {
			Ok(manifest) => manifest,
			Err(reason) => return Ok(ModuleExport::Malformed { reason }),
		};
		return Ok(match manifest.into_descriptor(&self.catalog) {
			Ok(descriptor) => ModuleExport::Descriptor(descriptor),
			Err(error) => ModuleExport::Malformed { reason: error.to_string() },
		});
	}
}
