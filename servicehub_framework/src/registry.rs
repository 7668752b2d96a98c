use std::{
	any::{
		type_name,
		Any,
	},
	sync::{
		Arc,
		PoisonError,
		RwLock as StdRwLock,
	},
};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::{
	Serialize,
	Deserialize,
};
use tokio::sync::{
	broadcast,
	Mutex,
	MutexGuard,
	RwLock,
};
use uuid::Uuid;

use crate::{
	arc_any::ArcAny,
	config::RegistryConfig,
	descriptor::{
		is_valid_name,
		FactoryKind,
		LoggingPolicy,
		ServiceDescriptor,
		ServiceValue,
	},
	errors::{
		RegistryError,
		RegistryResult,
	},
	events::RegistryEvent,
	instantiate::instantiate,
};

lazy_static! {
	/// The registry made current with `Registry::make_current`
	static ref CURRENT: StdRwLock<Option<Registry>> = StdRwLock::new(None);
}


/// Registry-wide logger. When one is installed it receives every notice and
/// the per-service `LoggingPolicy` is skipped.
pub trait Logger: Send + Sync {
	fn registered(&self, registry: &Registry, descriptor: &ServiceDescriptor);

	fn disposed(&self, _registry: &Registry, _name: &str) {}
}


/// What the registry stores for each service name
#[derive(Clone)]
pub enum RegistryEntry {
	/// A lazy service that has not been constructed. It is constructed on every resolve.
	Deferred(Arc<ServiceDescriptor>),

	/// A constructed service, along with the descriptor it came from
	Realized {
		value: ServiceValue,
		descriptor: Arc<ServiceDescriptor>,
	},
}

impl RegistryEntry {
	pub fn descriptor(&self) -> &ServiceDescriptor {
		return match self {
			RegistryEntry::Deferred(descriptor) => descriptor.as_ref(),
			RegistryEntry::Realized { descriptor, .. } => descriptor.as_ref(),
		};
	}

	pub fn name(&self) -> &str {
		return self.descriptor().name();
	}

	/// The constructed value, if this entry holds one
	pub fn value(&self) -> Option<&ServiceValue> {
		return match self {
			RegistryEntry::Deferred(_) => None,
			RegistryEntry::Realized { value, .. } => Some(value),
		};
	}

	pub fn is_deferred(&self) -> bool {
		return matches!(self, RegistryEntry::Deferred(_));
	}
}


/// Short description of a registered service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
	pub name: String,
	pub kind: FactoryKind,
	pub lazy: bool,
	pub priority: i64,
}


/// Builds a `Registry`
#[derive(Default)]
pub struct RegistryBuilder {
	config: RegistryConfig,
	logger: Option<Arc<dyn Logger>>,
	set_as_current: bool,
}

impl RegistryBuilder {
	pub fn config(mut self, config: RegistryConfig) -> Self {
		self.config = config;
		return self;
	}

	/// Installs a registry-wide logger override
	pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
		self.logger = Some(Arc::new(logger));
		return self;
	}

	/// Makes the new registry the one returned by `Registry::current`
	pub fn set_as_current(mut self) -> Self {
		self.set_as_current = true;
		return self;
	}

	pub fn build(self) -> Registry {
		// The channel allocates every slot up front
		let capacity = self.config.event_capacity.clamp(1, RegistryConfig::MAX_EVENT_CAPACITY);
		if capacity != self.config.event_capacity {
			tracing::warn!(requested = self.config.event_capacity, capacity, "event capacity out of range, clamping");
		}
		let (events, _) = broadcast::channel(capacity);
		let registry = Registry(Arc::new(RegistryInner {
			id: Uuid::new_v4(),
			config: self.config,
			logger: self.logger,
			entries: RwLock::new(IndexMap::new()),
			mutation_lock: Mutex::new(()),
			events,
		}));
		if self.set_as_current {
			registry.make_current();
		}
		return registry;
	}
}


struct RegistryInner {
	id: Uuid,
	config: RegistryConfig,
	logger: Option<Arc<dyn Logger>>,

	/// Entries in registration order
	entries: RwLock<IndexMap<String, RegistryEntry>>,

	/// Held by mutating operations when `serialize_mutations` is enabled
	mutation_lock: Mutex<()>,

	events: broadcast::Sender<RegistryEvent>,
}

/// # Runtime service registry
///
/// Stores named services, resolves them on demand and disposes of them on command.
/// `Registry` is a cheap handle; clones share the same services.
///
/// ## Lifecycle
///
/// Eager services are constructed during `register` and the same value is returned
/// by every `resolve`. Lazy services are stored unconstructed and a new value is
/// built on *every* `resolve` call. Nothing is cached for them.
///
/// ## Concurrency
///
/// Registration is "check the name is free, construct, insert" without mutual
/// exclusion between the steps. Two concurrent registrations of the same name can
/// both pass the duplicate check, and the later insert silently replaces the
/// earlier one. Callers that mutate one registry from several tasks must serialize
/// those calls themselves, or enable `RegistryConfig::serialize_mutations`.
///
/// Hooks are awaited without a timeout. A hook that never completes stalls the
/// operation that invoked it.
#[derive(Clone)]
pub struct Registry(Arc<RegistryInner>);

impl Registry {
	/// Creates an independent registry with default settings
	pub fn new() -> Registry {
		return RegistryBuilder::default().build();
	}

	pub fn builder() -> RegistryBuilder {
		return RegistryBuilder::default();
	}

	/// Gets the registry made current with `make_current`, if any
	pub fn current() -> Option<Registry> {
		return CURRENT.read().unwrap_or_else(PoisonError::into_inner).clone();
	}

	/// Makes this registry the one returned by `Registry::current`, replacing any previous one
	pub fn make_current(&self) {
		*CURRENT.write().unwrap_or_else(PoisonError::into_inner) = Some(self.clone());
	}

	/// Clears the current registry, returning it
	pub fn clear_current() -> Option<Registry> {
		return CURRENT.write().unwrap_or_else(PoisonError::into_inner).take();
	}

	pub fn id(&self) -> Uuid {
		return self.0.id;
	}

	pub fn config(&self) -> &RegistryConfig {
		return &self.0.config;
	}

	/// Label used in log output. Falls back to the registry's ID.
	pub fn label(&self) -> String {
		return match self.0.config.label {
			Some(ref label) => label.clone(),
			None => self.0.id.to_string(),
		};
	}

	/// Subscribes to registration and disposal events
	pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
		return self.0.events.subscribe();
	}

	/// Registers a batch of services, in the given order.
	///
	/// Each descriptor is validated, checked for duplicates, constructed (unless
	/// lazy), logged, and then its initializer is awaited before the next descriptor
	/// is processed.
	///
	/// The batch is not transactional. If a descriptor fails, the ones before it stay
	/// registered and the ones after it are not processed.
	pub async fn register(&self, descriptors: Vec<ServiceDescriptor>) -> RegistryResult<&Self> {
		let _guard = self.lock_mutations().await;
		self.register_unguarded(descriptors).await?;
		return Ok(self);
	}

	/// Gets a service by name.
	///
	/// Eager services return their stored value. Lazy services are constructed anew.
	pub async fn resolve(&self, name: &str) -> RegistryResult<ServiceValue> {
		let entry = self.0.entries.read().await.get(name).cloned();
		return match entry {
			None => Err(RegistryError::NotRegistered { name: String::from(name) }),
			Some(RegistryEntry::Realized { value, .. }) => Ok(value),
			Some(RegistryEntry::Deferred(descriptor)) => instantiate(&descriptor).await,
		};
	}

	/// Gets a service by name as a `T`
	pub async fn resolve_as<T: Any + Send + Sync>(&self, name: &str) -> RegistryResult<ArcAny<T>> {
		let value = self.resolve(name).await?;
		return ArcAny::new(value).ok_or_else(|| RegistryError::TypeMismatch {
			name: String::from(name),
			expected: type_name::<T>(),
		});
	}

	/// Disposes of a service, running its disposer first.
	///
	/// The service is removed even if its disposer fails. The failure is still
	/// returned as `RegistryError::Disposer`.
	pub async fn dispose(&self, name: &str) -> RegistryResult<()> {
		let _guard = self.lock_mutations().await;
		return self.dispose_unguarded(name).await;
	}

	/// Disposes of every registered service, most recently registered first.
	///
	/// This is best-effort. Disposer failures are logged and the names of the
	/// affected services are returned; every service is removed regardless.
	pub async fn dispose_all(&self) -> Vec<String> {
		let _guard = self.lock_mutations().await;

		// Snapshot names, since disposers may modify the registry
		let names = self.names().await;

		let mut failed = Vec::new();
		for name in names.into_iter().rev() {
			match self.dispose_unguarded(&name).await {
				Ok(()) => {},
				Err(RegistryError::NotFound { .. }) => {},
				Err(error) => {
					tracing::warn!(registry = %self.label(), service = %name, %error, "disposal failed");
					failed.push(name);
				},
			}
		}
		return failed;
	}

	/// Registers `descriptor`, first disposing of any service with the same name.
	///
	/// A failing disposer aborts the upsert before the new service is registered.
	pub async fn upsert(&self, descriptor: ServiceDescriptor) -> RegistryResult<&Self> {
		let _guard = self.lock_mutations().await;
		if self.contains(descriptor.name()).await {
			self.dispose_unguarded(descriptor.name()).await?;
		}
		self.register_unguarded(vec![descriptor]).await?;
		return Ok(self);
	}

	pub async fn contains(&self, name: &str) -> bool {
		return self.0.entries.read().await.contains_key(name);
	}

	/// Names of all registered services, in registration order
	pub async fn names(&self) -> Vec<String> {
		return self.0.entries.read().await.keys().cloned().collect();
	}

	pub async fn len(&self) -> usize {
		return self.0.entries.read().await.len();
	}

	pub async fn is_empty(&self) -> bool {
		return self.0.entries.read().await.is_empty();
	}

	/// Summarizes all registered services, in registration order
	pub async fn describe(&self) -> Vec<ServiceSummary> {
		return self.0.entries.read().await.values().map(|entry| {
			let descriptor = entry.descriptor();
			return ServiceSummary {
				name: String::from(descriptor.name()),
				kind: descriptor.factory_kind(),
				lazy: entry.is_deferred(),
				priority: descriptor.get_priority(),
			};
		}).collect();
	}

	pub(crate) async fn lock_mutations(&self) -> Option<MutexGuard<'_, ()>> {
		if self.0.config.serialize_mutations {
			return Some(self.0.mutation_lock.lock().await);
		} else {
			return None;
		}
	}

	pub(crate) async fn register_unguarded(&self, descriptors: Vec<ServiceDescriptor>) -> RegistryResult<()> {
		for descriptor in descriptors {
			self.register_one(Arc::new(descriptor)).await?;
		}
		return Ok(());
	}

	async fn register_one(&self, descriptor: Arc<ServiceDescriptor>) -> RegistryResult<()> {
		let name = descriptor.name();
		if !is_valid_name(name) {
			return Err(RegistryError::InvalidName { name: String::from(name) });
		}
		if self.contains(name).await {
			return Err(RegistryError::DuplicateService { name: String::from(name) });
		}

		let entry = if descriptor.is_lazy() {
			RegistryEntry::Deferred(Arc::clone(&descriptor))
		} else {
			RegistryEntry::Realized {
				value: instantiate(&descriptor).await?,
				descriptor: Arc::clone(&descriptor),
			}
		};

		// Last write wins if a concurrent registration got here first
		self.0.entries.write().await.insert(String::from(name), entry);

		self.announce_registered(&descriptor);
		self.emit(RegistryEvent::Registered {
			name: String::from(name),
			lazy: descriptor.is_lazy(),
		});

		if let Some(ref initializer) = descriptor.initializer {
			initializer(self.clone()).await.map_err(|source| RegistryError::Initializer {
				name: String::from(name),
				source,
			})?;
		}
		return Ok(());
	}

	pub(crate) async fn dispose_unguarded(&self, name: &str) -> RegistryResult<()> {
		let entry = self.0.entries.read().await.get(name).cloned();
		let entry = entry.ok_or_else(|| RegistryError::NotFound { name: String::from(name) })?;

		let outcome = match entry.descriptor().disposer {
			Some(ref disposer) => disposer(self.clone(), entry.clone()).await,
			None => Ok(()),
		};

		self.0.entries.write().await.shift_remove(name);
		self.announce_disposed(&entry);
		self.emit(RegistryEvent::Disposed { name: String::from(name) });

		return outcome.map_err(|source| RegistryError::Disposer {
			name: String::from(name),
			source,
		});
	}

	fn announce_registered(&self, descriptor: &ServiceDescriptor) {
		if let Some(ref logger) = self.0.logger {
			logger.registered(self, descriptor);
			return;
		}
		match descriptor.logging_policy() {
			LoggingPolicy::Silent => {},
			LoggingPolicy::Standard => tracing::info!(
				registry = %self.label(),
				service = descriptor.name(),
				kind = %descriptor.factory_kind(),
				lazy = descriptor.is_lazy(),
				"service registered"
			),
			LoggingPolicy::Custom(callback) => callback(self, descriptor),
		}
	}

	fn announce_disposed(&self, entry: &RegistryEntry) {
		if let Some(ref logger) = self.0.logger {
			logger.disposed(self, entry.name());
		} else if !matches!(entry.descriptor().logging_policy(), LoggingPolicy::Silent) {
			tracing::debug!(registry = %self.label(), service = entry.name(), "service disposed");
		}
	}

	fn emit(&self, event: RegistryEvent) {
		// Sending only fails when nobody is subscribed
		let _ = self.0.events.send(event);
	}
}

impl Default for Registry {
	fn default() -> Self {
		return Registry::new();
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return f.debug_struct("Registry")
			.field("id", &self.0.id)
			.field("label", &self.0.config.label)
			.finish();
	}
}
