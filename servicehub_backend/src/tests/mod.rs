mod fs_loader;

use std::{
	fs,
	path::Path,
};

use serde_json::Value;

use crate::{
	builtins,
	catalog::FactoryCatalog,
};


/// Catalog with every built-in factory, regardless of enabled features
pub fn builtin_catalog() -> FactoryCatalog {
	let mut catalog = FactoryCatalog::new();
	builtins::register(&mut catalog);
	return catalog;
}

/// Writes `manifest` to `dir/file`
pub fn write_manifest(dir: &Path, file: &str, manifest: Value) {
	fs::write(dir.join(file), serde_json::to_vec_pretty(&manifest).unwrap()).unwrap();
}
