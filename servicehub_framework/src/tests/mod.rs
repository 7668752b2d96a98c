mod concurrency;

use std::{
	sync::{
		atomic::{
			AtomicUsize,
			Ordering,
		},
		Arc,
		Mutex,
	},
	time::Instant,
};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::{
	Construct,
	InjectArgs,
	Logger,
	Registry,
	ServiceDescriptor,
};


/// Eagerly registered in most tests
pub struct Clock {
	pub started: Instant,
}

#[async_trait]
impl Construct for Clock {
	async fn construct(_args: InjectArgs) -> anyhow::Result<Self> {
		return Ok(Clock { started: Instant::now() });
	}
}

/// Takes a shared counter as its first argument and records its serial number
pub struct Ticker {
	pub serial: usize,
}

#[async_trait]
impl Construct for Ticker {
	async fn construct(args: InjectArgs) -> anyhow::Result<Self> {
		let counter = args.get::<Arc<AtomicUsize>>(0)?;
		return Ok(Ticker { serial: counter.fetch_add(1, Ordering::SeqCst) });
	}
}

pub struct Broken;

#[async_trait]
impl Construct for Broken {
	async fn construct(_args: InjectArgs) -> anyhow::Result<Self> {
		return Err(anyhow!("boom"));
	}
}


/// Shared list of strings, used to record the order things happen in
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
	pub fn push(&self, entry: impl Into<String>) {
		self.0.lock().unwrap().push(entry.into());
	}

	pub fn entries(&self) -> Vec<String> {
		return self.0.lock().unwrap().clone();
	}
}

/// Logger override that records every notice
pub struct JournalLogger(pub Journal);

impl Logger for JournalLogger {
	fn registered(&self, _registry: &Registry, descriptor: &ServiceDescriptor) {
		self.0.push(format!("registered {}", descriptor.name()));
	}

	fn disposed(&self, _registry: &Registry, name: &str) {
		self.0.push(format!("disposed {}", name));
	}
}

/// Instance descriptor whose disposer increments `counter`
pub fn counted_instance(name: &str, value: u32, counter: &Arc<AtomicUsize>) -> ServiceDescriptor {
	let counter = Arc::clone(counter);
	return ServiceDescriptor::instance(name, Arc::new(value)).on_dispose(move |_registry, _entry| {
		let counter = Arc::clone(&counter);
		async move {
			counter.fetch_add(1, Ordering::SeqCst);
			return Ok(());
		}
	});
}
