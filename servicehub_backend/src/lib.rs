pub mod builtins;
pub mod catalog;
pub mod config;
pub mod fs_loader;
pub mod init;
pub mod manifest;

#[cfg(test)]
mod tests;

pub use catalog::{
	CatalogError,
	FactoryCatalog,
};
pub use config::HostConfig;
pub use fs_loader::FsLoader;
pub use init::async_main;
pub use manifest::ServiceManifest;
pub use servicehub_framework::*;
