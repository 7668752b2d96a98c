use std::{
	any::Any,
	ops::Deref,
	sync::Arc,
};

use crate::descriptor::ServiceValue;


/// Typed view of a resolved service.
///
/// Keeps the type-erased handle alongside the typed one, so the value can be
/// used as its intended type without cloning, and still compared against other
/// handles to the same service.
pub struct ArcAny<T: 'static> {
	erased: ServiceValue,
	typed: Arc<T>,
}

impl<T: Any + Send + Sync> ArcAny<T> {

	/// Creates a new `ArcAny` from a type-erased service, if it holds a `T`
	pub fn new(erased: ServiceValue) -> Option<ArcAny<T>> {
		let typed = Arc::downcast::<T>(Arc::clone(&erased)).ok()?;
		return Some(ArcAny { erased, typed });
	}

	/// The typed `Arc` behind this handle
	pub fn as_arc(&self) -> &Arc<T> {
		return &self.typed;
	}

	/// The type-erased handle this was created from
	pub fn erased(&self) -> &ServiceValue {
		return &self.erased;
	}

	pub fn into_arc(self) -> Arc<T> {
		return self.typed;
	}

	/// Whether both handles point at the same service instance
	pub fn ptr_eq(this: &ArcAny<T>, other: &ArcAny<T>) -> bool {
		return Arc::ptr_eq(&this.typed, &other.typed);
	}
}

impl<T: 'static> Clone for ArcAny<T> {
	fn clone(&self) -> Self {
		return ArcAny {
			erased: Arc::clone(&self.erased),
			typed: Arc::clone(&self.typed),
		};
	}
}

impl<T: 'static> Deref for ArcAny<T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		return &self.typed;
	}
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for ArcAny<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return std::fmt::Debug::fmt(&*self.typed, f);
	}
}
