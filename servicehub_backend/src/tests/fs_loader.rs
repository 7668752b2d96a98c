use std::fs;

use serde_json::json;
use tokio::test;

use super::{
	builtin_catalog,
	write_manifest,
};
use crate::{
	fs_loader::FsLoader,
	Loader,
	LoaderError,
	ModuleExport,
	Registry,
	RegistryError,
};


#[test]
async fn lists_files_in_name_order() {
	let dir = tempfile::tempdir().unwrap();
	write_manifest(dir.path(), "b.json", json!({ "name": "B", "factory": "clock" }));
	write_manifest(dir.path(), "a.json", json!({ "name": "A", "factory": "clock" }));
	fs::write(dir.path().join("notes.txt"), "not a manifest").unwrap();
	fs::create_dir(dir.path().join("nested.json")).unwrap();

	let loader = FsLoader::new(builtin_catalog());
	let modules = loader.list(dir.path()).await.unwrap();

	assert_eq!(modules, vec!["a.json", "b.json", "notes.txt"]);
}

#[cfg(unix)]
#[test]
async fn symlinked_manifests_are_listed_and_loaded() {
	let sources = tempfile::tempdir().unwrap();
	write_manifest(sources.path(), "clock.json", json!({ "name": "Clock", "factory": "clock" }));
	let dir = tempfile::tempdir().unwrap();
	std::os::unix::fs::symlink(sources.path().join("clock.json"), dir.path().join("clock.json")).unwrap();
	std::os::unix::fs::symlink(sources.path().join("gone.json"), dir.path().join("dangling.json")).unwrap();
	std::os::unix::fs::symlink(sources.path(), dir.path().join("linked.json")).unwrap();

	let loader = FsLoader::new(builtin_catalog());
	assert_eq!(loader.list(dir.path()).await.unwrap(), vec!["clock.json"]);

	let registry = Registry::new();
	registry.auto_load(&loader, dir.path()).await.unwrap();
	assert_eq!(registry.names().await, vec!["Clock"]);
}

#[test]
async fn missing_directories_cannot_be_enumerated() {
	let dir = tempfile::tempdir().unwrap();
	let missing = dir.path().join("missing");

	let loader = FsLoader::new(builtin_catalog());
	match loader.list(&missing).await {
		Err(LoaderError::Enumerate { location, .. }) => assert_eq!(location, missing),
		other => panic!("expected an enumeration error, got {:?}", other),
	}
}

#[test]
async fn loads_manifests_as_descriptors() {
	let dir = tempfile::tempdir().unwrap();
	write_manifest(dir.path(), "clock.json", json!({ "name": "Clock", "factory": "clock", "priority": 3 }));

	let loader = FsLoader::new(builtin_catalog());
	assert!(loader.catalog().contains("clock"));
	match loader.load(dir.path(), "clock.json").await.unwrap() {
		ModuleExport::Descriptor(descriptor) => {
			assert_eq!(descriptor.name(), "Clock");
			assert_eq!(descriptor.get_priority(), 3);
		},
		other => panic!("expected a descriptor, got {:?}", other),
	}
}

#[test]
async fn wrong_shapes_and_unknown_factories_are_malformed() {
	let dir = tempfile::tempdir().unwrap();
	write_manifest(dir.path(), "list.json", json!([1, 2]));
	write_manifest(dir.path(), "unknown.json", json!({ "name": "Ghost", "factory": "ghost" }));

	let loader = FsLoader::new(builtin_catalog());
	for module in ["list.json", "unknown.json"] {
		let export = loader.load(dir.path(), module).await.unwrap();
		assert!(matches!(export, ModuleExport::Malformed { .. }), "{} should be malformed", module);
	}
}

#[test]
async fn unparsable_json_is_a_load_error() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("broken.json"), "{ \"name\": ").unwrap();

	let loader = FsLoader::new(builtin_catalog());
	let result = loader.load(dir.path(), "broken.json").await;

	assert!(matches!(result, Err(LoaderError::Load { ref module, .. }) if module == "broken.json"));
}

#[test]
async fn auto_load_registers_a_directory_by_priority() {
	let dir = tempfile::tempdir().unwrap();
	write_manifest(dir.path(), "greeter.json", json!({ "name": "Greeter", "factory": "greeter", "priority": 1 }));
	write_manifest(dir.path(), "clock.json", json!({ "name": "Clock", "factory": "clock", "priority": 5 }));
	write_manifest(dir.path(), "settings.json", json!({ "name": "Settings", "factory": "settings", "priority": 3, "args": [{}] }));
	write_manifest(dir.path(), "!disabled.json", json!({ "name": "Disabled", "factory": "clock" }));
	fs::write(dir.path().join("README.txt"), "ignored").unwrap();

	let registry = Registry::new();
	registry.auto_load(&FsLoader::new(builtin_catalog()), dir.path()).await.unwrap();

	assert_eq!(registry.names().await, vec!["Clock", "Settings", "Greeter"]);
}

#[test]
async fn auto_load_reports_malformed_modules() {
	let dir = tempfile::tempdir().unwrap();
	write_manifest(dir.path(), "clock.json", json!({ "name": "Clock", "factory": "clock" }));
	write_manifest(dir.path(), "odd.json", json!([1, 2]));

	let registry = Registry::new();
	let result = registry.auto_load(&FsLoader::new(builtin_catalog()), dir.path()).await;

	assert!(matches!(result, Err(RegistryError::InvalidModule { ref module, .. }) if module == "odd.json"));
	assert!(registry.is_empty().await);
}

#[test]
async fn auto_load_keeps_loader_errors_distinct() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("broken.json"), "not json").unwrap();
	let loader = FsLoader::new(builtin_catalog());
	let registry = Registry::new();

	let result = registry.auto_load(&loader, dir.path()).await;
	assert!(matches!(result, Err(RegistryError::Loader(LoaderError::Load { .. }))));

	let result = registry.auto_load(&loader, dir.path().join("missing")).await;
	assert!(matches!(result, Err(RegistryError::Loader(LoaderError::Enumerate { .. }))));
}
