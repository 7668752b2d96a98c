use std::path::{
	Path,
	PathBuf,
};

use anyhow::Context;
use serde::{
	Serialize,
	Deserialize,
};
use servicehub_framework::RegistryConfig;

/// Configuration for the `servicehub` host, read from a JSON file.
/// Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
	/// Directory scanned for service manifests
	pub services_dir: PathBuf,

	/// `tracing` filter used when `RUST_LOG` is not set
	pub log_filter: String,

	pub registry: RegistryConfig,
}

impl Default for HostConfig {
	fn default() -> Self {
		return HostConfig {
			services_dir: PathBuf::from("services"),
			log_filter: String::from("info"),
			registry: RegistryConfig::default(),
		};
	}
}

impl HostConfig {
	pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<HostConfig> {
		let path = path.as_ref();
		let contents = tokio::fs::read(path).await
			.with_context(|| format!("could not read config file {}", path.display()))?;
		return serde_json::from_slice(&contents)
			.with_context(|| format!("invalid config file {}", path.display()));
	}
}
