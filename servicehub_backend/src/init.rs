use std::fmt::Write;

use serde::Serialize;
use servicehub_framework::{
	Registry,
	ServiceSummary,
};

use crate::{
	builtins,
	catalog::FactoryCatalog,
	config::HostConfig,
	fs_loader::FsLoader,
};

/// Outcome of resolving one service requested on the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Everything the host did during startup
#[derive(Debug, Serialize)]
pub struct Report {
	pub services: Vec<ServiceSummary>,
	pub resolved: Vec<Resolution>,

	/// The populated registry. The caller is responsible for disposing of it.
	#[serde(skip)]
	pub registry: Registry,
}

impl Report {
	/// Renders the report as a plain-text table followed by the resolved values
	pub fn table(&self) -> String {
		// Format widths count chars, so measure names the same way
		let width = self.services.iter()
			.map(|service| service.name.chars().count())
			.max()
			.unwrap_or(0)
			.max("SERVICE".len());

		let mut table = String::new();
		let _ = writeln!(table, "{:<width$}  {:<8}  {:>8}  {}", "SERVICE", "KIND", "PRIORITY", "LAZY", width = width);
		for service in self.services.iter() {
			let _ = writeln!(
				table,
				"{:<width$}  {:<8}  {:>8}  {}",
				service.name,
				service.kind.to_string(),
				service.priority,
				if service.lazy { "yes" } else { "no" },
				width = width,
			);
		}

		if !self.resolved.is_empty() {
			table.push('\n');
		}
		for resolution in self.resolved.iter() {
			let _ = match (&resolution.value, &resolution.error) {
				(Some(value), _) => writeln!(table, "{} = {}", resolution.name, value),
				(None, Some(error)) => writeln!(table, "{}: {}", resolution.name, error),
				(None, None) => writeln!(table, "{}", resolution.name),
			};
		}
		return table;
	}
}

/// Builds a registry from `config`, auto-loads its services directory and
/// resolves each name in `resolve`.
///
/// Failing to resolve a requested service is recorded in the report rather
/// than aborting, so one broken service does not hide the others.
pub async fn async_main(config: &HostConfig, catalog: FactoryCatalog, resolve: &[String]) -> anyhow::Result<Report> {
	let registry = Registry::builder()
		.config(config.registry.clone())
		.set_as_current()
		.build();
	let loader = FsLoader::new(catalog);

	tracing::info!(
		registry = %registry.label(),
		directory = %config.services_dir.display(),
		"loading services"
	);
	if let Err(error) = registry.auto_load(&loader, &config.services_dir).await {
		// Whatever was registered before the failure still needs disposing
		registry.dispose_all().await;
		Registry::clear_current();
		return Err(error.into());
	}

	let mut resolved = Vec::with_capacity(resolve.len());
	for name in resolve {
		resolved.push(match registry.resolve(name).await {
			Ok(value) => Resolution {
				name: name.clone(),
				value: Some(builtins::describe_value(&value)),
				error: None,
			},
			Err(error) => {
				tracing::warn!(service = %name, %error, "could not resolve service");
				Resolution {
					name: name.clone(),
					value: None,
					error: Some(error.to_string()),
				}
			},
		});
	}

	return Ok(Report {
		services: registry.describe().await,
		resolved,
		registry,
	});
}
