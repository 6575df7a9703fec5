use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use paper_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

fn first_provider(value: &mut Value) -> &mut toml::Table {
	value
		.get_mut("providers")
		.and_then(|providers| providers.get_mut("embedding"))
		.and_then(Value::as_array_mut)
		.and_then(|providers| providers.first_mut())
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [[providers.embedding]].")
}

fn write_temp_config(value: &Value) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("paper_config_test_{nanos}_{pid}_{ordinal}.toml"));

	let payload = toml::to_string(value).expect("Failed to render test config.");

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_value(value: &Value) -> paper_config::Result<Config> {
	let path = write_temp_config(value);
	let result = paper_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

#[test]
fn paper_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../paper.example.toml");

	let cfg = paper_config::load(&path).expect("Expected paper.example.toml to be a valid config.");

	assert_eq!(cfg.providers.embedding.len(), 2);
	assert!(cfg.embedding_provider("openai").is_some());
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("paper_config_test_missing.toml");
	let err = paper_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn default_provider_must_be_configured() {
	let mut value = sample_value();

	value
		.get_mut("search")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [search].")
		.insert("default_provider".to_string(), Value::String("cohere".to_string()));

	let err = load_value(&value).expect_err("Expected default_provider validation error.");

	assert!(
		err.to_string()
			.contains("search.default_provider must name a configured embedding provider."),
		"Unexpected error: {err}"
	);
}

#[test]
fn provider_ids_must_be_unique() {
	let mut value = sample_value();
	let duplicate = Value::Table(first_provider(&mut value).clone());

	value
		.get_mut("providers")
		.and_then(|providers| providers.get_mut("embedding"))
		.and_then(Value::as_array_mut)
		.expect("Sample config must include [[providers.embedding]].")
		.push(duplicate);

	let err = load_value(&value).expect_err("Expected duplicate provider validation error.");

	assert!(err.to_string().contains("is declared more than once."), "Unexpected error: {err}");
}

#[test]
fn provider_dimensions_must_be_positive() {
	let mut value = sample_value();

	first_provider(&mut value).insert("dimensions".to_string(), Value::Integer(0));

	let err = load_value(&value).expect_err("Expected dimensions validation error.");

	assert!(
		err.to_string().contains("Provider huggingface dimensions must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn provider_api_key_cannot_be_blank() {
	let mut value = sample_value();

	first_provider(&mut value).insert("api_key".to_string(), Value::String("  ".to_string()));

	let err = load_value(&value).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("Provider huggingface api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn provider_ids_and_collections_are_trimmed() {
	let mut value = sample_value();
	let provider = first_provider(&mut value);

	provider.insert("provider_id".to_string(), Value::String(" huggingface ".to_string()));
	provider.insert("collection".to_string(), Value::String(" papers_hf ".to_string()));

	let cfg = load_value(&value).expect("Expected trimmed config to load.");
	let provider = cfg.embedding_provider("huggingface").expect("Provider must resolve.");

	assert_eq!(provider.collection, "papers_hf");
}

#[test]
fn max_results_must_be_positive() {
	let mut cfg = base_config();

	cfg.search.max_results = 0;

	let err = paper_config::validate(&cfg).expect_err("Expected max_results validation error.");

	assert!(
		err.to_string().contains("search.max_results must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn loader_batch_size_must_be_positive() {
	let mut cfg = base_config();

	if let Some(loader) = cfg.loader.as_mut() {
		loader.batch_size = 0;
	}

	let err = paper_config::validate(&cfg).expect_err("Expected batch_size validation error.");

	assert!(
		err.to_string().contains("loader.batch_size must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn search_defaults_apply_when_omitted() {
	let mut value = sample_value();
	let search = value
		.get_mut("search")
		.and_then(Value::as_table_mut)
		.expect("Sample config must include [search].");

	search.remove("max_results");
	search.remove("default_list_limit");

	let cfg = load_value(&value).expect("Expected config without search limits to load.");

	assert_eq!(cfg.search.max_results, 100);
	assert_eq!(cfg.search.default_list_limit, 20);
}
