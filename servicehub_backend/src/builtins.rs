//! Demo services that ship with the `servicehub` binary

pub mod clock;
pub mod counter;

use std::sync::Arc;

use serde_json::Value;
use servicehub_framework::{
	InjectArgs,
	ServiceValue,
};

use crate::catalog::FactoryCatalog;

pub use clock::Clock;
pub use counter::Counter;

/// Adds every built-in factory to `catalog`
pub fn register(catalog: &mut FactoryCatalog) {
	catalog
		.class::<Clock>("clock")
		.class::<Counter>("counter")
		.function("greeter", greet)
		.instance("settings", |args: &[Value]| -> anyhow::Result<ServiceValue> {
			let settings = args.first().cloned().unwrap_or(Value::Null);
			return Ok(Arc::new(settings));
		});
}

async fn greet(args: InjectArgs) -> anyhow::Result<String> {
	let subject = args.json(0).and_then(Value::as_str).unwrap_or("world");
	return Ok(format!("Hello, {}!", subject));
}

/// Renders a resolved built-in service for display. Values of other types
/// are shown as opaque.
pub fn describe_value(value: &ServiceValue) -> String {
	if let Some(clock) = value.downcast_ref::<Clock>() {
		return format!("clock '{}' (up {:.1?})", clock.label(), clock.uptime());
	}
	if let Some(counter) = value.downcast_ref::<Counter>() {
		return format!("counter at {}", counter.get());
	}
	if let Some(text) = value.downcast_ref::<String>() {
		return text.clone();
	}
	if let Some(json) = value.downcast_ref::<Value>() {
		return json.to_string();
	}
	return String::from("<opaque>");
}
