use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre;

use murmur_config::Config;
use murmur_domain::AudioRecord;
use murmur_service::{
	CulturalRequest, MurmurService, ResonanceRequest, RoamingRequest, SearchResponse,
};
use murmur_storage::{RecordStore, db::Db, memory::MemoryStore};

#[derive(Debug, Parser)]
#[command(
	version = murmur_cli::VERSION,
	rename_all = "kebab",
	styles = murmur_cli::styles(),
)]
pub struct Args {
	/// TOML configuration. Without it, defaults plus `MURMUR_*` environment overrides are used.
	#[arg(long, short = 'c', value_name = "FILE", global = true)]
	pub config: Option<PathBuf>,
	/// Search a JSON array of records in memory instead of Postgres.
	#[arg(long, value_name = "FILE", global = true)]
	pub records: Option<PathBuf>,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Create the extensions, table and indexes if they are missing.
	Bootstrap,
	/// Records from a locality captured around the same time of day.
	Resonance {
		#[arg(long, short = 'q')]
		query: String,
		/// Requester's local hour of day, 0-23.
		#[arg(long, value_name = "HOUR")]
		hour: u8,
		#[arg(long, value_name = "N")]
		limit: Option<u32>,
	},
	/// Records rich in culturally distinctive sounds.
	Culture {
		#[arg(long, short = 'q', default_value = "")]
		query: String,
		#[arg(long, value_name = "N")]
		limit: Option<u32>,
	},
	/// Homesickness-aware ranking for a requester at the given position.
	Roaming {
		#[arg(long, short = 'q')]
		query: String,
		#[arg(long, allow_hyphen_values = true)]
		lat: f64,
		#[arg(long, allow_hyphen_values = true)]
		lon: f64,
		#[arg(long, value_name = "N")]
		limit: Option<u32>,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = match &args.config {
		Some(path) => murmur_config::load(path)?,
		None => murmur_config::load_from_env()?,
	};

	murmur_cli::init_tracing(&cfg.service.log_level);

	if let Command::Bootstrap = args.command {
		if args.records.is_some() {
			return Err(eyre::eyre!("bootstrap requires Postgres; drop --records."));
		}

		let db = Db::connect(&cfg.storage.postgres).await?;

		db.ensure_schema(cfg.providers.embedding.dimensions).await?;

		println!("{}", serde_json::json!({ "vector_dim": cfg.providers.embedding.dimensions }));

		return Ok(());
	}

	let store: Arc<dyn RecordStore> = match &args.records {
		Some(path) => Arc::new(load_records(path)?),
		None => Arc::new(Db::connect(&cfg.storage.postgres).await?),
	};
	let service = MurmurService::new(cfg, store);
	let response = search(&service, args.command).await?;

	println!("{}", serde_json::to_string_pretty(&response)?);

	Ok(())
}

pub async fn search(service: &MurmurService, command: Command) -> color_eyre::Result<SearchResponse> {
	let response = match command {
		Command::Bootstrap => return Err(eyre::eyre!("bootstrap is not a search.")),
		Command::Resonance { query, hour, limit } =>
			service.resonance(ResonanceRequest { query, local_hour: hour, limit }).await?,
		Command::Culture { query, limit } =>
			service.cultural(CulturalRequest { query, limit }).await?,
		Command::Roaming { query, lat, lon, limit } =>
			service
				.roaming(RoamingRequest { query, latitude: lat, longitude: lon, limit })
				.await?,
	};

	Ok(response)
}

fn load_records(path: &Path) -> color_eyre::Result<MemoryStore> {
	let raw = fs::read_to_string(path)?;
	let records: Vec<AudioRecord> = serde_json::from_str(&raw)?;

	tracing::info!(path = %path.display(), records = records.len(), "Loaded records into memory.");

	Ok(MemoryStore::with_records(records))
}

/// Builds a service over an in-memory store, for tests and offline runs.
pub fn offline_service(cfg: Config, records: Vec<AudioRecord>) -> MurmurService {
	MurmurService::new(cfg, Arc::new(MemoryStore::with_records(records)))
}
