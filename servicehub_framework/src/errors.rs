use std::path::PathBuf;

use thiserror::Error;

/// Result type used by every fallible registry operation
pub type RegistryResult<T> = Result<T, RegistryError>;

/// An error returned by a registry operation.
///
/// Errors are terminal for the operation that produced them. Nothing is retried
/// internally, and a failed `register` batch keeps the services that were
/// registered before the failing descriptor.
#[derive(Debug, Error)]
pub enum RegistryError {
	#[error("{name:?} is not a valid service name")]
	InvalidName {
		name: String,
	},
	#[error("a service named '{name}' is already registered")]
	DuplicateService {
		name: String,
	},
	#[error("no service named '{name}' is registered")]
	NotRegistered {
		name: String,
	},
	#[error("cannot dispose '{name}': no such service")]
	NotFound {
		name: String,
	},
	#[error("failed to construct service '{name}': {source}")]
	ServiceConstruction {
		name: String,
		#[source]
		source: anyhow::Error,
	},
	#[error("module '{module}' does not export a service descriptor: {reason}")]
	InvalidModule {
		module: String,
		reason: String,
	},
	#[error("initializer for service '{name}' failed: {source}")]
	Initializer {
		name: String,
		#[source]
		source: anyhow::Error,
	},
	#[error("disposer for service '{name}' failed: {source}")]
	Disposer {
		name: String,
		#[source]
		source: anyhow::Error,
	},
	#[error("service '{name}' is not a {expected}")]
	TypeMismatch {
		name: String,
		expected: &'static str,
	},
	#[error(transparent)]
	Loader(#[from] LoaderError),
}

/// An error raised by a `Loader` implementation.
///
/// A module that loads fine but exports the wrong shape is not a loader error;
/// the loader reports it as `ModuleExport::Malformed` and auto-load turns that
/// into `RegistryError::InvalidModule`.
#[derive(Debug, Error)]
pub enum LoaderError {
	#[error("cannot enumerate modules in {}: {source}", .location.display())]
	Enumerate {
		location: PathBuf,
		#[source]
		source: anyhow::Error,
	},
	#[error("module '{module}' failed to load: {source}")]
	Load {
		module: String,
		#[source]
		source: anyhow::Error,
	},
}
