use std::{
	collections::HashMap,
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use murmur_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("murmur_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

fn no_env(_: &str) -> Option<String> {
	None
}

#[test]
fn sample_config_loads() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let result = murmur_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected sample config to load.");

	assert_eq!(cfg.providers.embedding.dimensions, 768);
	assert_eq!(cfg.providers.embedding.timeout_ms, 2_500);
	assert_eq!(cfg.search.default_limit, 20);
	assert_eq!(cfg.storage.postgres.pool_max_conns, 4);
}

#[test]
fn empty_file_falls_back_to_defaults() {
	let cfg = murmur_config::finish(toml::from_str("").expect("Empty TOML must parse."), no_env)
		.expect("Defaults must validate.");

	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.providers.embedding.dimensions, 768);
	assert_eq!(cfg.search.utc_offset_hours, 8);
	assert_eq!(cfg.search.window_radius_hours, 2);
	assert_eq!(cfg.search.roaming.threshold_meters, 100_000.0);
	assert!(cfg.providers.embedding.credential().is_none());
}

#[test]
fn blank_api_key_disables_vector_search() {
	let mut cfg = base_config();

	cfg.providers.embedding.api_key = Some("   ".to_string());

	let cfg = murmur_config::finish(cfg, no_env).expect("Blank key must not be an error.");

	assert!(cfg.providers.embedding.api_key.is_none());
}

#[test]
fn environment_overrides_each_provider_setting() {
	let vars = HashMap::from([
		(murmur_config::ENV_EMBEDDING_API_BASE, "http://127.0.0.1:9000"),
		(murmur_config::ENV_EMBEDDING_API_KEY, "from-env"),
		(murmur_config::ENV_EMBEDDING_MODEL, "bge-m3"),
		(murmur_config::ENV_EMBEDDING_DIMENSIONS, "1024"),
		(murmur_config::ENV_PG_DSN, "postgres://env/murmur"),
	]);
	let cfg = murmur_config::finish(base_config(), |name| {
		vars.get(name).map(|value| value.to_string())
	})
	.expect("Overrides must validate.");

	assert_eq!(cfg.providers.embedding.endpoint(), "http://127.0.0.1:9000/v1/embeddings");
	assert_eq!(cfg.providers.embedding.credential(), Some("from-env"));
	assert_eq!(cfg.providers.embedding.model, "bge-m3");
	assert_eq!(cfg.providers.embedding.dimensions, 1_024);
	assert_eq!(cfg.storage.postgres.dsn, "postgres://env/murmur");
}

#[test]
fn non_numeric_dimension_override_is_rejected() {
	let err = murmur_config::finish(base_config(), |name| {
		(name == murmur_config::ENV_EMBEDDING_DIMENSIONS).then(|| "wide".to_string())
	})
	.expect_err("Expected env parse error.");

	assert!(matches!(err, Error::Env { .. }), "Unexpected error: {err}");
	assert!(err.to_string().contains(murmur_config::ENV_EMBEDDING_DIMENSIONS));
}

#[test]
fn dimensions_must_be_positive() {
	let mut cfg = base_config();

	cfg.providers.embedding.dimensions = 0;

	let err = murmur_config::validate(&cfg).expect_err("Expected dimensions validation error.");

	assert!(
		err.to_string().contains("providers.embedding.dimensions must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn embedding_timeout_is_bounded() {
	let mut cfg = base_config();

	cfg.providers.embedding.timeout_ms = 3_001;

	let err = murmur_config::validate(&cfg).expect_err("Expected timeout validation error.");

	assert!(
		err.to_string().contains("providers.embedding.timeout_ms must be in the range 1-3000."),
		"Unexpected error: {err}"
	);

	cfg.providers.embedding.timeout_ms = 3_000;

	assert!(murmur_config::validate(&cfg).is_ok());
}

#[test]
fn roaming_threshold_must_be_finite_and_positive() {
	let mut cfg = base_config();

	cfg.search.roaming.threshold_meters = f64::INFINITY;

	let err = murmur_config::validate(&cfg).expect_err("Expected finite threshold error.");

	assert!(err.to_string().contains("must be a finite number"), "Unexpected error: {err}");

	cfg.search.roaming.threshold_meters = 0.0;

	let err = murmur_config::validate(&cfg).expect_err("Expected positive threshold error.");

	assert!(err.to_string().contains("must be greater than zero"), "Unexpected error: {err}");
}

#[test]
fn window_radius_and_offset_are_bounded() {
	let mut cfg = base_config();

	cfg.search.window_radius_hours = 12;

	assert!(murmur_config::validate(&cfg).is_err());

	cfg = base_config();
	cfg.search.utc_offset_hours = 15;

	assert!(murmur_config::validate(&cfg).is_err());

	cfg.search.utc_offset_hours = -12;

	assert!(murmur_config::validate(&cfg).is_ok());
}

#[test]
fn vocabulary_overrides_must_not_be_blank() {
	let mut cfg = base_config();

	cfg.search.vocabulary.cultural = Some(Vec::new());

	let err = murmur_config::validate(&cfg).expect_err("Expected empty vocabulary error.");

	assert!(
		err.to_string().contains("search.vocabulary.cultural must be non-empty when set."),
		"Unexpected error: {err}"
	);

	cfg.search.vocabulary.cultural = Some(vec!["teahouse".to_string(), " ".to_string()]);

	assert!(murmur_config::validate(&cfg).is_err());

	cfg.search.vocabulary.cultural = Some(vec!["teahouse".to_string()]);

	assert!(murmur_config::validate(&cfg).is_ok());
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("murmur_config_test_missing.toml");
	let err = murmur_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}
