use std::{
	any::Any,
	future::Future,
	sync::Arc,
};

use rustc_hash::FxHashMap;
use serde_json::Value;
use servicehub_framework::{
	Construct,
	FactoryKind,
	InjectArgs,
	Payload,
	ServiceValue,
};
use thiserror::Error;

/// Builds a payload from the arguments listed in a manifest
pub type PayloadFactory = Arc<dyn Fn(&[Value]) -> anyhow::Result<Payload> + Send + Sync>;

/// An error returned when a manifest refers to a factory the catalog cannot provide
#[derive(Debug, Error)]
pub enum CatalogError {
	#[error("unknown factory '{id}'")]
	UnknownFactory {
		id: String,
	},
	#[error("factory '{id}' builds a {actual}, but the manifest declares a {declared}")]
	KindMismatch {
		id: String,
		declared: FactoryKind,
		actual: FactoryKind,
	},
	#[error("factory '{id}' rejected its arguments: {source}")]
	Build {
		id: String,
		#[source]
		source: anyhow::Error,
	},
}

#[derive(Clone)]
struct CatalogEntry {
	kind: FactoryKind,
	build: PayloadFactory,
}

/// Maps the factory IDs used by service manifests onto concrete payloads.
///
/// Manifests are plain data, so they can only name code that was compiled in.
/// The catalog is where that code is made available.
#[derive(Clone, Default)]
pub struct FactoryCatalog {
	factories: FxHashMap<String, CatalogEntry>,
}

impl FactoryCatalog {
	pub fn new() -> FactoryCatalog {
		return FactoryCatalog::default();
	}

	/// Catalog holding every built-in factory enabled at compile time
	pub fn with_builtins() -> FactoryCatalog {
		#[allow(unused_mut)]
		let mut catalog = FactoryCatalog::new();
		#[cfg(feature = "builtin-services")]
		crate::builtins::register(&mut catalog);
		return catalog;
	}

	/// Registers a class factory constructed from `T`
	pub fn class<T: Construct>(&mut self, id: impl Into<String>) -> &mut Self {
		return self.insert(id, FactoryKind::Class, Arc::new(|_args: &[Value]| -> anyhow::Result<Payload> {
			return Ok(Payload::class::<T>());
		}));
	}

	/// Registers a function factory
	pub fn function<F, Fut, T>(&mut self, id: impl Into<String>, function: F) -> &mut Self
	where
		F: Fn(InjectArgs) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
		T: Any + Send + Sync,
	{
		let payload = Payload::function(function);
		return self.insert(id, FactoryKind::Function, Arc::new(move |_args: &[Value]| -> anyhow::Result<Payload> {
			return Ok(payload.clone());
		}));
	}

	/// Registers an instance factory. `build` receives the manifest's arguments
	/// and returns the instance itself.
	pub fn instance<F>(&mut self, id: impl Into<String>, build: F) -> &mut Self
	where
		F: Fn(&[Value]) -> anyhow::Result<ServiceValue> + Send + Sync + 'static,
	{
		return self.insert(id, FactoryKind::Instance, Arc::new(move |args: &[Value]| -> anyhow::Result<Payload> {
			return Ok(Payload::Instance(build(args)?));
		}));
	}

	fn insert(&mut self, id: impl Into<String>, kind: FactoryKind, build: PayloadFactory) -> &mut Self {
		self.factories.insert(id.into(), CatalogEntry { kind, build });
		return self;
	}

	pub fn contains(&self, id: &str) -> bool {
		return self.factories.contains_key(id);
	}

	pub fn kind_of(&self, id: &str) -> Option<FactoryKind> {
		return self.factories.get(id).map(|entry| entry.kind);
	}

	/// Sorted factory IDs
	pub fn ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.factories.keys().cloned().collect();
		ids.sort();
		return ids;
	}

	/// Builds the payload for `id`, checking it against the kind a manifest declared
	pub fn build(&self, id: &str, declared: Option<FactoryKind>, args: &[Value]) -> Result<Payload, CatalogError> {
		let entry = self.factories.get(id).ok_or_else(|| CatalogError::UnknownFactory { id: String::from(id) })?;
		if let Some(declared) = declared {
			if declared != entry.kind {
				return Err(CatalogError::KindMismatch {
					id: String::from(id),
					declared,
					actual: entry.kind,
				});
			}
		}
		return (entry.build)(args).map_err(|source| CatalogError::Build {
			id: String::from(id),
			source,
		});
	}
}
