// Mods
mod arc_any;
mod autoload;
mod config;
mod descriptor;
mod errors;
mod events;
mod instantiate;
mod registry;

// Tests
#[cfg(test)]
mod tests;

// Re-exports
pub use arc_any::ArcAny;
pub use autoload::{
	is_candidate,
	sort_by_priority,
	Loader,
	ModuleExport,
};
pub use config::RegistryConfig;
pub use descriptor::{
	is_valid_name,
	BoxedFuture,
	Construct,
	Constructor,
	DisposerHook,
	FactoryKind,
	InitializerHook,
	InjectArgs,
	LogCallback,
	LoggingPolicy,
	Payload,
	ServiceDescriptor,
	ServiceFn,
	ServiceValue,
};
pub use errors::{
	LoaderError,
	RegistryError,
	RegistryResult,
};
pub use events::RegistryEvent;
pub use registry::{
	Logger,
	Registry,
	RegistryBuilder,
	RegistryEntry,
	ServiceSummary,
};
