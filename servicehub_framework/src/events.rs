use serde::{
	Serialize,
	Deserialize,
};

/// Published by a registry whenever its contents change.
///
/// Events are delivered over a broadcast channel (`Registry::subscribe`). Slow or
/// absent subscribers never affect registry operations; a lagging receiver simply
/// misses events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryEvent {
	Registered {
		name: String,
		lazy: bool,
	},
	Disposed {
		name: String,
	},
}

impl RegistryEvent {
	pub fn name(&self) -> &str {
		return match self {
			RegistryEvent::Registered { name, .. } => name,
			RegistryEvent::Disposed { name } => name,
		};
	}
}
