use std::{
	any::{
		type_name,
		Any,
		TypeId,
	},
	fmt,
	future::Future,
	pin::Pin,
	sync::Arc,
};

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{
	Serialize,
	Deserialize,
};
use serde_json::Value;

use crate::registry::{
	Registry,
	RegistryEntry,
};

/// A resolved service. Services are shared between callers, never cloned.
pub type ServiceValue = Arc<dyn Any + Send + Sync>;

/// Boxed future returned by factories and hooks
pub type BoxedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A plain service function. Its return value becomes the service.
pub type ServiceFn = Arc<dyn Fn(InjectArgs) -> BoxedFuture<'static, anyhow::Result<ServiceValue>> + Send + Sync>;

/// Run after a service has been registered and logged
pub type InitializerHook = Arc<dyn Fn(Registry) -> BoxedFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Run before a service is removed from the registry
pub type DisposerHook = Arc<dyn Fn(Registry, RegistryEntry) -> BoxedFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Custom registration notice
pub type LogCallback = Arc<dyn Fn(&Registry, &ServiceDescriptor) + Send + Sync>;


/// Determines how a descriptor's payload becomes a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactoryKind {
	Class,
	Function,
	Instance,
}

impl fmt::Display for FactoryKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.write_str(match self {
			FactoryKind::Class => "class",
			FactoryKind::Function => "function",
			FactoryKind::Instance => "instance",
		});
	}
}


/// A type that can be constructed by the registry from injected arguments.
///
/// Services registered with `ServiceDescriptor::class` are built through this
/// trait, and the resolved value is always a `Self`.
#[async_trait]
pub trait Construct: Sized + Send + Sync + 'static {
	async fn construct(args: InjectArgs) -> anyhow::Result<Self>;
}

/// Type-erased constructor for a `Construct` implementation
#[derive(Clone)]
pub struct Constructor {
	type_id: TypeId,
	type_name: &'static str,
	build: ServiceFn,
}

impl Constructor {
	pub fn of<T: Construct>() -> Constructor {
		return Constructor {
			type_id: TypeId::of::<T>(),
			type_name: type_name::<T>(),
			build: Arc::new(|args| -> BoxedFuture<'static, anyhow::Result<ServiceValue>> {
				return Box::pin(async move {
					let instance = T::construct(args).await?;
					return Ok::<ServiceValue, anyhow::Error>(Arc::new(instance));
				});
			}),
		};
	}

	/// Name of the type this constructor produces
	pub fn type_name(&self) -> &'static str {
		return self.type_name;
	}

	/// Whether `value` is an instance of the constructed type
	pub fn produces(&self, value: &ServiceValue) -> bool {
		return (**value).type_id() == self.type_id;
	}

	pub(crate) fn construct(&self, args: InjectArgs) -> BoxedFuture<'static, anyhow::Result<ServiceValue>> {
		return (self.build)(args);
	}
}

impl fmt::Debug for Constructor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.debug_tuple("Constructor").field(&self.type_name).finish();
	}
}


/// The constructor, function, or ready-made instance behind a service
#[derive(Clone)]
pub enum Payload {
	Class(Constructor),
	Function(ServiceFn),
	Instance(ServiceValue),
}

impl Payload {
	/// Payload constructed from `T`
	pub fn class<T: Construct>() -> Payload {
		return Payload::Class(Constructor::of::<T>());
	}

	/// Payload produced by calling `function` with the injected arguments
	pub fn function<F, Fut, T>(function: F) -> Payload
	where
		F: Fn(InjectArgs) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
		T: Any + Send + Sync,
	{
		let function: ServiceFn = Arc::new(move |args| -> BoxedFuture<'static, anyhow::Result<ServiceValue>> {
			let result = function(args);
			return Box::pin(async move {
				return Ok::<ServiceValue, anyhow::Error>(Arc::new(result.await?));
			});
		});
		return Payload::Function(function);
	}

	/// Payload that resolves to `instance` itself
	pub fn instance<T: Any + Send + Sync>(instance: Arc<T>) -> Payload {
		return Payload::Instance(instance);
	}

	pub fn kind(&self) -> FactoryKind {
		return match self {
			Payload::Class(_) => FactoryKind::Class,
			Payload::Function(_) => FactoryKind::Function,
			Payload::Instance(_) => FactoryKind::Instance,
		};
	}
}


/// Ordered arguments handed to a constructor or service function.
///
/// Arguments are arbitrary shared values. Loaders that read descriptors from
/// JSON inject each argument as a `serde_json::Value`.
#[derive(Clone, Default)]
pub struct InjectArgs(Vec<ServiceValue>);

impl InjectArgs {
	pub fn new(args: Vec<ServiceValue>) -> InjectArgs {
		return InjectArgs(args);
	}

	pub fn len(&self) -> usize {
		return self.0.len();
	}

	pub fn is_empty(&self) -> bool {
		return self.0.is_empty();
	}

	/// Gets the raw value at `index`
	pub fn raw(&self, index: usize) -> Option<&ServiceValue> {
		return self.0.get(index);
	}

	/// Gets the argument at `index` as a `T`, failing if it is missing or of another type
	pub fn get<T: Any>(&self, index: usize) -> anyhow::Result<&T> {
		let value = self.0.get(index).ok_or_else(|| anyhow!("missing injected argument #{}", index))?;
		return (**value).downcast_ref::<T>().ok_or_else(|| anyhow!(
			"injected argument #{} is not a {}",
			index,
			type_name::<T>(),
		));
	}

	/// Gets the argument at `index` as a JSON value, if it is one
	pub fn json(&self, index: usize) -> Option<&Value> {
		return self.0.get(index).and_then(|value| (**value).downcast_ref::<Value>());
	}

	pub fn iter(&self) -> impl Iterator<Item = &ServiceValue> {
		return self.0.iter();
	}
}


/// Controls the notice emitted when a service is registered
#[derive(Clone, Default)]
pub enum LoggingPolicy {
	/// Emit the standard "service registered" log event
	#[default]
	Standard,

	/// Emit nothing
	Silent,

	/// Call the given function instead of logging
	Custom(LogCallback),
}

impl LoggingPolicy {
	pub fn custom<F>(callback: F) -> LoggingPolicy
	where
		F: Fn(&Registry, &ServiceDescriptor) + Send + Sync + 'static,
	{
		return LoggingPolicy::Custom(Arc::new(callback));
	}
}

impl fmt::Debug for LoggingPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.write_str(match self {
			LoggingPolicy::Standard => "Standard",
			LoggingPolicy::Silent => "Silent",
			LoggingPolicy::Custom(_) => "Custom",
		});
	}
}


/// Everything the registry needs to know to register a service.
///
/// Descriptors are built by the caller (or a `Loader`) and never change once
/// they have been submitted.
#[derive(Clone)]
pub struct ServiceDescriptor {
	name: String,
	payload: Payload,
	inject_args: Vec<ServiceValue>,
	lazy: bool,
	priority: i64,
	allow_upsert: bool,
	pub(crate) initializer: Option<InitializerHook>,
	pub(crate) disposer: Option<DisposerHook>,
	logging: LoggingPolicy,
}

impl ServiceDescriptor {
	pub fn new(name: impl Into<String>, payload: Payload) -> ServiceDescriptor {
		return ServiceDescriptor {
			name: name.into(),
			payload,
			inject_args: Vec::new(),
			lazy: false,
			priority: 0,
			allow_upsert: false,
			initializer: None,
			disposer: None,
			logging: LoggingPolicy::Standard,
		};
	}

	/// Describes a service constructed from `T`
	pub fn class<T: Construct>(name: impl Into<String>) -> ServiceDescriptor {
		return ServiceDescriptor::new(name, Payload::class::<T>());
	}

	/// Describes a service produced by calling `function` with the injected arguments
	pub fn function<F, Fut, T>(name: impl Into<String>, function: F) -> ServiceDescriptor
	where
		F: Fn(InjectArgs) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
		T: Any + Send + Sync,
	{
		return ServiceDescriptor::new(name, Payload::function(function));
	}

	/// Describes a service that already exists. Resolving it returns `instance` itself.
	pub fn instance<T: Any + Send + Sync>(name: impl Into<String>, instance: Arc<T>) -> ServiceDescriptor {
		return ServiceDescriptor::new(name, Payload::instance(instance));
	}

	/// Defer construction until the service is resolved
	pub fn lazy(mut self) -> Self {
		self.lazy = true;
		return self;
	}

	/// Sets auto-load priority. Higher priorities are registered first.
	pub fn priority(mut self, priority: i64) -> Self {
		self.priority = priority;
		return self;
	}

	/// Allow auto-load to replace an existing service of the same name
	pub fn allow_upsert(mut self) -> Self {
		self.allow_upsert = true;
		return self;
	}

	/// Appends an argument passed to the constructor or function. Ignored for instances.
	pub fn inject<T: Any + Send + Sync>(mut self, arg: T) -> Self {
		self.inject_args.push(Arc::new(arg));
		return self;
	}

	/// Appends an already-shared argument
	pub fn inject_shared(mut self, arg: ServiceValue) -> Self {
		self.inject_args.push(arg);
		return self;
	}

	pub fn logging(mut self, policy: LoggingPolicy) -> Self {
		self.logging = policy;
		return self;
	}

	/// Runs `hook` after the service has been registered. Initializers of one
	/// batch run one after another in registration order.
	pub fn on_init<F, Fut>(mut self, hook: F) -> Self
	where
		F: Fn(Registry) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
	{
		self.initializer = Some(Arc::new(move |registry| -> BoxedFuture<'static, anyhow::Result<()>> {
			return Box::pin(hook(registry));
		}));
		return self;
	}

	/// Runs `hook` before the service is removed from the registry
	pub fn on_dispose<F, Fut>(mut self, hook: F) -> Self
	where
		F: Fn(Registry, RegistryEntry) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
	{
		self.disposer = Some(Arc::new(move |registry, entry| -> BoxedFuture<'static, anyhow::Result<()>> {
			return Box::pin(hook(registry, entry));
		}));
		return self;
	}

	pub fn name(&self) -> &str {
		return &self.name;
	}

	pub fn factory_kind(&self) -> FactoryKind {
		return self.payload.kind();
	}

	pub fn payload(&self) -> &Payload {
		return &self.payload;
	}

	pub fn inject_args(&self) -> InjectArgs {
		return InjectArgs(self.inject_args.clone());
	}

	pub fn is_lazy(&self) -> bool {
		return self.lazy;
	}

	pub fn get_priority(&self) -> i64 {
		return self.priority;
	}

	pub fn allows_upsert(&self) -> bool {
		return self.allow_upsert;
	}

	pub fn logging_policy(&self) -> &LoggingPolicy {
		return &self.logging;
	}

	pub fn has_initializer(&self) -> bool {
		return self.initializer.is_some();
	}

	pub fn has_disposer(&self) -> bool {
		return self.disposer.is_some();
	}
}

impl fmt::Debug for ServiceDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.debug_struct("ServiceDescriptor")
			.field("name", &self.name)
			.field("kind", &self.factory_kind())
			.field("inject_args", &self.inject_args.len())
			.field("lazy", &self.lazy)
			.field("priority", &self.priority)
			.field("allow_upsert", &self.allow_upsert)
			.field("logging", &self.logging)
			.finish();
	}
}

/// Checks that `name` can be used as a registry key
pub fn is_valid_name(name: &str) -> bool {
	return !name.trim().is_empty() && !name.chars().any(char::is_control);
}
