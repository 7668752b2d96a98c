use std::{
	path::PathBuf,
	process::ExitCode,
};

use clap::Parser;
use servicehub_lib::{
	FactoryCatalog,
	HostConfig,
	Registry,
	init::Report,
};
use tracing_subscriber::EnvFilter;

/// Auto-loads a directory of service manifests and reports what was registered
#[derive(Debug, Parser)]
#[command(name = "servicehub", version)]
struct Cli {
	/// JSON host configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Directory of service manifests. Overrides the configuration file.
	#[arg(short, long)]
	dir: Option<PathBuf>,

	/// Resolve a service after loading. May be repeated.
	#[arg(short, long = "resolve", value_name = "NAME")]
	resolve: Vec<String>,

	/// Print the report as JSON
	#[arg(long)]
	json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();

	let mut config = match cli.config {
		Some(ref path) => match HostConfig::load(path).await {
			Ok(config) => config,
			Err(error) => {
				eprintln!("servicehub: {:#}", error);
				return ExitCode::FAILURE;
			},
		},
		None => HostConfig::default(),
	};
	if let Some(dir) = cli.dir {
		config.services_dir = dir;
	}

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();

	let report = match servicehub_lib::async_main(&config, FactoryCatalog::with_builtins(), &cli.resolve).await {
		Ok(report) => report,
		Err(error) => {
			tracing::error!("{:#}", error);
			return ExitCode::FAILURE;
		},
	};

	let printed = if cli.json {
		print_json(&report)
	} else {
		print!("{}", report.table());
		Ok(())
	};

	let failed = report.registry.dispose_all().await;
	Registry::clear_current();
	if let Err(error) = printed {
		tracing::error!(%error, "could not print report");
		return ExitCode::FAILURE;
	}
	if !failed.is_empty() || report.resolved.iter().any(|resolution| resolution.error.is_some()) {
		return ExitCode::FAILURE;
	}
	return ExitCode::SUCCESS;
}

fn print_json(report: &Report) -> serde_json::Result<()> {
	println!("{}", serde_json::to_string_pretty(report)?);
	return Ok(());
}
