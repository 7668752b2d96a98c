use serde::{
	Serialize,
	Deserialize,
};
use serde_json::Value;
use servicehub_framework::{
	FactoryKind,
	LoggingPolicy,
	ServiceDescriptor,
};

use crate::catalog::{
	CatalogError,
	FactoryCatalog,
};

/// Logging setting accepted in a manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestLogging {
	#[default]
	Standard,
	None,
}

/// A service module as stored on disk.
///
/// ```json
/// {
/// 	"name": "Clock",
/// 	"factory": "clock",
/// 	"kind": "class",
/// 	"lazy": false,
/// 	"priority": 10,
/// 	"allow_upsert": false,
/// 	"args": ["wall clock"],
/// 	"logging": "standard"
/// }
/// ```
///
/// Only `name` and `factory` are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceManifest {
	pub name: String,

	/// ID of the catalog factory that provides the payload
	pub factory: String,

	/// Optional assertion about the factory's kind
	#[serde(default)]
	pub kind: Option<FactoryKind>,

	#[serde(default)]
	pub lazy: bool,

	#[serde(default)]
	pub priority: i64,

	#[serde(default)]
	pub allow_upsert: bool,

	/// Injected into the service as `serde_json::Value`s
	#[serde(default)]
	pub args: Vec<Value>,

	#[serde(default)]
	pub logging: ManifestLogging,
}

impl ServiceManifest {

	/// Interprets a module's JSON export. Returns a human-readable reason if it
	/// does not have the shape of a manifest.
	pub fn from_value(value: Value) -> Result<ServiceManifest, String> {
		let object = match value.as_object() {
			Some(object) => object,
			None => return Err(format!("expected an object, found {}", json_type(&value))),
		};
		match object.get("name") {
			Some(Value::String(_)) => {},
			Some(other) => return Err(format!("`name` must be a string, found {}", json_type(other))),
			None => return Err(String::from("missing `name`")),
		}
		return serde_json::from_value(value).map_err(|error| error.to_string());
	}

	/// Turns the manifest into a descriptor, looking its factory up in `catalog`
	pub fn into_descriptor(self, catalog: &FactoryCatalog) -> Result<ServiceDescriptor, CatalogError> {
		let payload = catalog.build(&self.factory, self.kind, &self.args)?;

		let mut descriptor = ServiceDescriptor::new(self.name, payload).priority(self.priority);
		if self.lazy {
			descriptor = descriptor.lazy();
		}
		if self.allow_upsert {
			descriptor = descriptor.allow_upsert();
		}
		if self.logging == ManifestLogging::None {
			descriptor = descriptor.logging(LoggingPolicy::Silent);
		}
		for arg in self.args {
			descriptor = descriptor.inject(arg);
		}
		return Ok(descriptor);
	}
}

fn json_type(value: &Value) -> &'static str {
	return match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	};
}
