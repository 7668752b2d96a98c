use std::path::Path;

use async_trait::async_trait;

use crate::{
	config::RegistryConfig,
	descriptor::ServiceDescriptor,
	errors::{
		LoaderError,
		RegistryError,
		RegistryResult,
	},
	registry::Registry,
};


/// What a module exports, as seen by the loader
#[derive(Debug, Clone)]
pub enum ModuleExport {
	/// A well-formed service descriptor
	Descriptor(ServiceDescriptor),

	/// The module loaded, but does not export an object with a name.
	/// `reason` is shown to the user.
	Malformed {
		reason: String,
	},
}


/// Discovers and loads service modules from some location.
///
/// The registry never touches storage itself; it asks the loader for candidate
/// module identifiers, filters them, and then asks for each remaining module.
#[async_trait]
pub trait Loader: Send + Sync {

	/// Lists candidate module identifiers at `location`, in a stable order
	async fn list(&self, location: &Path) -> Result<Vec<String>, LoaderError>;

	/// Loads a single module listed by `list`
	async fn load(&self, location: &Path, module: &str) -> Result<ModuleExport, LoaderError>;
}


/// Whether auto-load should consider a module identifier at all
pub fn is_candidate(config: &RegistryConfig, module: &str) -> bool {
	if module.starts_with(config.exclusion_marker) {
		return false;
	}
	if config.module_extension.is_empty() {
		return true;
	}
	return Path::new(module)
		.extension()
		.map_or(false, |extension| extension == config.module_extension.as_str());
}

/// Orders descriptors by priority, highest first. Equal priorities keep their order.
pub fn sort_by_priority(descriptors: &mut Vec<ServiceDescriptor>) {
	// `sort_by` is stable
	descriptors.sort_by(|a, b| b.get_priority().cmp(&a.get_priority()));
}


impl Registry {

	/// Discovers services with `loader` and registers them in priority order.
	///
	/// Every module is loaded and checked before anything is registered. A name
	/// that is already registered is disposed of first if its descriptor allows
	/// upserts; otherwise the whole auto-load fails with `DuplicateService` and
	/// the registry is left untouched. The accepted descriptors are then handed
	/// to `register` as a single batch, so its partial-failure behavior applies.
	pub async fn auto_load(&self, loader: &dyn Loader, location: impl AsRef<Path>) -> RegistryResult<()> {
		let _guard = self.lock_mutations().await;
		let location = location.as_ref();

		let modules: Vec<String> = loader.list(location).await?
			.into_iter()
			.filter(|module| is_candidate(self.config(), module))
			.collect();

		// Load and validate everything first
		let mut accepted = Vec::with_capacity(modules.len());
		for module in modules {
			match loader.load(location, &module).await? {
				ModuleExport::Descriptor(descriptor) => {
					tracing::debug!(
						registry = %self.label(),
						module = %module,
						service = descriptor.name(),
						priority = descriptor.get_priority(),
						"discovered service module"
					);
					accepted.push(descriptor);
				},
				ModuleExport::Malformed { reason } => {
					return Err(RegistryError::InvalidModule { module, reason });
				},
			}
		}

		// Reject conflicts before disposing of anything
		let mut replaced: Vec<String> = Vec::new();
		for descriptor in accepted.iter() {
			if self.contains(descriptor.name()).await {
				if descriptor.allows_upsert() {
					if !replaced.iter().any(|name| name == descriptor.name()) {
						replaced.push(String::from(descriptor.name()));
					}
				} else {
					return Err(RegistryError::DuplicateService { name: String::from(descriptor.name()) });
				}
			}
		}
		for name in replaced {
			tracing::debug!(registry = %self.label(), service = %name, "replacing service during auto-load");
			self.dispose_unguarded(&name).await?;
		}

		sort_by_priority(&mut accepted);
		return self.register_unguarded(accepted).await;
	}
}
