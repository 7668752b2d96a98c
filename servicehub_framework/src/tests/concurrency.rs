use std::sync::{
	atomic::{
		AtomicUsize,
		Ordering,
	},
	Arc,
};

use tokio::test;

use crate::{
	Registry,
	RegistryConfig,
	RegistryError,
	ServiceDescriptor,
};

/// Function service that yields once while "constructing", giving a concurrent
/// registration a chance to run between the duplicate check and the insert
fn slow_service(marker: &'static str, constructions: &Arc<AtomicUsize>) -> ServiceDescriptor {
	let constructions = Arc::clone(constructions);
	return ServiceDescriptor::function("Racer", move |_args| {
		let constructions = Arc::clone(&constructions);
		async move {
			constructions.fetch_add(1, Ordering::SeqCst);
			tokio::task::yield_now().await;
			return Ok(marker);
		}
	});
}

#[test]
async fn concurrent_registrations_of_one_name_both_pass_the_duplicate_check() {
	let constructions = Arc::new(AtomicUsize::new(0));
	let registry = Registry::new();

	let (first, second) = tokio::join!(
		registry.register(vec![slow_service("first", &constructions)]),
		registry.register(vec![slow_service("second", &constructions)]),
	);

	// Both succeed and one silently replaces the other
	assert!(first.is_ok());
	assert!(second.is_ok());
	assert_eq!(constructions.load(Ordering::SeqCst), 2);
	assert_eq!(registry.len().await, 1);

	let winner = registry.resolve_as::<&'static str>("Racer").await.unwrap();
	assert!(*winner == "first" || *winner == "second");
}

#[test]
async fn serialized_mutations_close_the_race() {
	let constructions = Arc::new(AtomicUsize::new(0));
	let registry = Registry::builder()
		.config(RegistryConfig { serialize_mutations: true, ..Default::default() })
		.build();

	let (first, second) = tokio::join!(
		registry.register(vec![slow_service("first", &constructions)]),
		registry.register(vec![slow_service("second", &constructions)]),
	);

	let outcomes = [first, second];
	assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
	assert!(outcomes.iter().any(|outcome| matches!(outcome, Err(RegistryError::DuplicateService { .. }))));
	assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
async fn serialized_upsert_and_dispose_all_do_not_deadlock() {
	let registry = Registry::builder()
		.config(RegistryConfig { serialize_mutations: true, ..Default::default() })
		.build();

	registry.register(vec![ServiceDescriptor::instance("Answer", Arc::new(1u32))]).await.unwrap();
	registry.upsert(ServiceDescriptor::instance("Answer", Arc::new(2u32))).await.unwrap();
	assert_eq!(*registry.resolve_as::<u32>("Answer").await.unwrap(), 2);

	assert!(registry.dispose_all().await.is_empty());
	assert!(registry.is_empty().await);
}

#[test(flavor = "multi_thread", worker_threads = 4)]
async fn registries_can_be_shared_across_tasks() {
	let registry = Registry::new();
	let mut handles = Vec::new();
	for index in 0..16u32 {
		let registry = registry.clone();
		handles.push(tokio::spawn(async move {
			let name = format!("service-{}", index);
			registry.register(vec![ServiceDescriptor::instance(name.as_str(), Arc::new(index))]).await.map(|_| ())
		}));
	}
	for handle in handles {
		handle.await.unwrap().unwrap();
	}
	assert_eq!(registry.len().await, 16);
}
