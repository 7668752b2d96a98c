use serde::{
	Serialize,
	Deserialize,
};

/// Settings supplied when a registry is built.
///
/// Anything that cannot be expressed as plain data (the logger override, whether
/// the registry becomes the current one) is set on `RegistryBuilder` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
	/// Human-readable label included in log output
	pub label: Option<String>,

	/// File extension (without the dot) that auto-load candidates must carry.
	/// An empty string accepts every extension.
	pub module_extension: String,

	/// Candidates whose identifier starts with this marker are skipped by auto-load
	pub exclusion_marker: char,

	/// Funnel register, dispose, dispose_all, upsert and auto_load through a single
	/// async mutex. Without it the duplicate check and the insert are separate steps,
	/// so concurrent registrations of one name can both succeed.
	///
	/// Hooks must not call mutating registry operations while this is enabled.
	pub serialize_mutations: bool,

	/// Buffer size of the registry event channel. Clamped to
	/// `1..=RegistryConfig::MAX_EVENT_CAPACITY` when the registry is built.
	pub event_capacity: usize,
}

impl RegistryConfig {
	/// Largest event buffer a registry will allocate
	pub const MAX_EVENT_CAPACITY: usize = 4096;
}

impl Default for RegistryConfig {
	fn default() -> Self {
		return RegistryConfig {
			label: None,
			module_extension: String::from("json"),
			exclusion_marker: '!',
			serialize_mutations: false,
			event_capacity: 64,
		};
	}
}
