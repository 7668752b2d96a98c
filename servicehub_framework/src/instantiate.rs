use std::sync::Arc;

use crate::{
	descriptor::{
		Payload,
		ServiceDescriptor,
		ServiceValue,
	},
	errors::{
		RegistryError,
		RegistryResult,
	},
};

/// Turns a descriptor's payload into a service value.
///
/// Functions are called and constructors are run with the descriptor's injected
/// arguments. Instances are returned as-is. Any failure is wrapped in
/// `RegistryError::ServiceConstruction` naming the service.
pub(crate) async fn instantiate(descriptor: &ServiceDescriptor) -> RegistryResult<ServiceValue> {
	tracing::trace!(service = descriptor.name(), kind = %descriptor.factory_kind(), "instantiating service");

	let result = match descriptor.payload() {
		Payload::Instance(instance) => return Ok(Arc::clone(instance)),
		Payload::Function(function) => function(descriptor.inject_args()).await,
		Payload::Class(constructor) => {
			let value = constructor.construct(descriptor.inject_args()).await;

			// `Constructor::of` only ever builds its own type
			debug_assert!(value.as_ref().map_or(true, |value| constructor.produces(value)));
			value
		},
	};

	return result.map_err(|source| RegistryError::ServiceConstruction {
		name: String::from(descriptor.name()),
		source,
	});
}
