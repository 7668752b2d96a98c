use std::sync::atomic::{
	AtomicI64,
	Ordering,
};

use async_trait::async_trait;
use servicehub_framework::{
	Construct,
	InjectArgs,
};

/// A shared counter. The first argument, if any, is the starting value.
#[derive(Debug, Default)]
pub struct Counter {
	value: AtomicI64,
}

impl Counter {
	pub fn get(&self) -> i64 {
		return self.value.load(Ordering::Relaxed);
	}

	/// Adds one and returns the new value
	pub fn increment(&self) -> i64 {
		return self.value.fetch_add(1, Ordering::Relaxed) + 1;
	}
}

#[async_trait]
impl Construct for Counter {
	async fn construct(args: InjectArgs) -> anyhow::Result<Self> {
		let start = match args.json(0) {
			None => 0,
			Some(value) => value.as_i64()
				.ok_or_else(|| anyhow::anyhow!("counter start must be an integer, found {}", value))?,
		};
		return Ok(Counter {
			value: AtomicI64::new(start),
		});
	}
}
