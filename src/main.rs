#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cmd;

#[derive(Parser)]
#[command(name = "pbfish", about = "Runtime-schema protobuf records as URL text or JSON arrays")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Encode a JSON record.
	Encode(cmd::encode::Args),
	/// Decode url or array input into a JSON record.
	Decode(cmd::decode::Args),
	/// Inspect the types of a schema.
	Describe(cmd::describe::Args),
}

fn main() {
	init_tracing();
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_tracing() {
	tracing_subscriber::registry()
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
		.init();
}

fn run() -> pbfish::pbf::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Encode(args) => cmd::encode::run(args),
		Commands::Decode(args) => cmd::decode::run(args),
		Commands::Describe(args) => cmd::describe::run(args),
	}
}
