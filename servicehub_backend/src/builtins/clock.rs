use std::time::{
	Duration,
	Instant,
};

use async_trait::async_trait;
use serde_json::Value;
use servicehub_framework::{
	Construct,
	InjectArgs,
};

/// Reports how long it has been since it was constructed
#[derive(Debug)]
pub struct Clock {
	label: String,
	started: Instant,
}

impl Clock {
	pub fn label(&self) -> &str {
		return &self.label;
	}

	pub fn uptime(&self) -> Duration {
		return self.started.elapsed();
	}
}

#[async_trait]
impl Construct for Clock {
	async fn construct(args: InjectArgs) -> anyhow::Result<Self> {
		let label = match args.json(0) {
			None | Some(Value::Null) => String::from("clock"),
			Some(Value::String(label)) => label.clone(),
			Some(other) => anyhow::bail!("clock label must be a string, found {}", other),
		};
		return Ok(Clock {
			label,
			started: Instant::now(),
		});
	}
}
