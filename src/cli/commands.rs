//! CLI command implementations.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::cache::AnalysisCache;
use crate::server::Server;
use crate::stats::StatsService;
use crate::store::open_store;
use crate::types::config::{Config, CONFIG_FILE, DATA_DIR};
use crate::types::requests::DnaRequest;
use crate::{ScanError, ScanResult};

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> ScanResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    let data_dir = target_dir.join(DATA_DIR);
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("{}/ directory created", DATA_DIR);
    }

    update_gitignore(&target_dir)?;

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("mutant-scan initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Data directory: {}/", DATA_DIR);

    Ok(())
}

/// Adds the data directory to .gitignore.
fn update_gitignore(target_dir: &Path) -> ScanResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = format!("{}/", DATA_DIR);
    let comment = "# mutant-scan - local verdict database";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content
            .lines()
            .any(|line| line.trim() == entry || line.trim() == DATA_DIR)
        {
            tracing::debug!(".gitignore already contains {}", entry);
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(&entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
    } else {
        std::fs::write(&gitignore_path, format!("{}\n{}\n", comment, entry))?;
    }

    Ok(())
}

/// Analyzes one grid and prints `mutant`, `human` or `invalid: <reason>`.
pub async fn analyze(rows: Vec<String>, file: Option<PathBuf>, config: &Config) -> ScanResult<()> {
    let request = match file {
        Some(path) => read_request(&path)?,
        None => DnaRequest::new(rows),
    };

    let store = open_store(&config.store)?;
    let cache = AnalysisCache::new(store, &config.cache);
    let verdict = cache.analyze_request(&request).await?;

    println!("{}", verdict);
    Ok(())
}

/// Reads a request from a JSON file: either a bare array or `{"dna": [...]}`.
fn read_request(path: &Path) -> ScanResult<DnaRequest> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;

    match value {
        Value::Array(_) => Ok(DnaRequest {
            dna: serde_json::from_value(value)?,
            ..DnaRequest::new(Vec::<String>::new())
        }),
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => Err(ScanError::other(format!(
            "{}: expected a JSON array of rows or an object with a \"dna\" field",
            path.display()
        ))),
    }
}

/// Prints the tally as JSON.
pub async fn stats(config: &Config) -> ScanResult<()> {
    let store = open_store(&config.store)?;
    let report = StatsService::new(store).get_stats().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Runs the stdio server.
pub async fn serve(config: &Config) -> ScanResult<()> {
    tracing::info!("Starting mutant-scan server via stdio...");
    let server = Server::new(config)?;
    server.run().await
}

/// Shows the store status.
pub async fn status(config: &Config) -> ScanResult<()> {
    let store = open_store(&config.store)?;
    let records = store.len().await?;
    let counters = store.counters().await?;

    println!("Store backend: {}", store.name());
    if store.name() == "sqlite" {
        println!("Database: {}", config.store.db_path.display());
    }
    println!("Records: {}", records);
    println!("Mutants: {}", counters.mutant);
    println!("Humans: {}", counters.human);
    if config.cache.hot_enabled {
        println!("Hot cache capacity: {}", config.cache.hot_capacity);
    } else {
        println!("Hot cache: disabled");
    }

    Ok(())
}

/// Shows the version.
pub fn version() {
    println!("mutant-scan {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Mutant DNA detector with content-addressed verdict cache");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_request_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dna.json");
        std::fs::write(&path, r#"["AT", "CG"]"#).unwrap();

        let request = read_request(&path).unwrap();
        assert_eq!(request.grid().unwrap().size(), 2);
    }

    #[test]
    fn test_read_request_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dna.json");
        std::fs::write(&path, r#"{"dna": ["AT", null]}"#).unwrap();

        let request = read_request(&path).unwrap();
        assert!(request.grid().is_err());
    }

    #[test]
    fn test_read_request_rejects_scalars() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dna.json");
        std::fs::write(&path, "42").unwrap();

        assert!(matches!(read_request(&path), Err(ScanError::Other(_))));
    }

    #[test]
    fn test_update_gitignore_is_idempotent() {
        let dir = tempdir().unwrap();
        update_gitignore(dir.path()).unwrap();
        update_gitignore(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content.matches(".mutant-scan/").count(), 1);
    }
}
