//! CLI command implementations

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::config::PipelineConfig;
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::identity::DatasetIdentity;
use crate::ingest::{FetchPayload, FixtureFetcher};
use crate::pipeline::Pipeline;

use super::args::{Command, IdentityArgs};
use super::errors::{CliError, CliResult};

/// Dispatch one parsed command.
pub fn run_command(command: Command) -> CliResult<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime_error(format!("failed to start runtime: {}", e)))?;

    match command {
        Command::Serve {
            config,
            data_dir,
            port,
        } => runtime.block_on(serve(&config, data_dir, port)),
        Command::Ingest {
            config,
            data_dir,
            identity,
            file,
            schema_version,
            source,
        } => runtime.block_on(ingest(&config, data_dir, identity, &file, schema_version, source)),
        Command::Status {
            config,
            data_dir,
            identity,
        } => runtime.block_on(status(&config, data_dir, identity)),
    }
}

/// Load the pipeline config; a missing file means defaults.
fn load_config(path: &Path) -> CliResult<PipelineConfig> {
    if path.exists() {
        PipelineConfig::load(path).map_err(CliError::config_error)
    } else {
        Ok(PipelineConfig::default())
    }
}

fn build_pipeline(config_path: &Path, data_dir: PathBuf) -> CliResult<Pipeline> {
    let config = load_config(config_path)?;
    Pipeline::local(config, data_dir).map_err(CliError::pipeline_error)
}

async fn serve(config_path: &Path, data_dir: PathBuf, port: Option<u16>) -> CliResult<()> {
    let pipeline = build_pipeline(config_path, data_dir)?;

    let mut http_config = HttpServerConfig::default();
    if let Some(port) = port {
        http_config.port = port;
    }

    println!("statgate serving on {}", http_config.socket_addr());
    HttpServer::new(pipeline, http_config)
        .serve()
        .await
        .map_err(CliError::runtime_error)
}

async fn ingest(
    config_path: &Path,
    data_dir: PathBuf,
    identity: IdentityArgs,
    file: &Path,
    schema_version: Option<String>,
    source: String,
) -> CliResult<()> {
    let pipeline = build_pipeline(config_path, data_dir)?;

    let raw = fs::read_to_string(file)
        .map_err(|e| CliError::io_error(format!("failed to read '{}': {}", file.display(), e)))?;
    let records: Vec<Value> = serde_json::from_str(&raw)
        .map_err(|e| CliError::io_error(format!("'{}' is not a JSON array: {}", file.display(), e)))?;

    let mut payload = FetchPayload::records(records);
    if let Some(version) = schema_version {
        payload = payload.with_schema_version(version);
    }
    let fetcher = FixtureFetcher::new(payload);

    let outcome = pipeline
        .orchestrator
        .ingest(&to_identity(&identity), &fetcher, &source)
        .await
        .map_err(|e| CliError::pipeline_error(e.to_string()))?;

    let rendered = serde_json::to_string_pretty(&outcome)
        .map_err(|e| CliError::runtime_error(e.to_string()))?;
    println!("{}", rendered);

    if outcome.committed {
        Ok(())
    } else {
        Err(CliError::pipeline_error(
            outcome
                .reason
                .unwrap_or_else(|| "ingestion did not commit".to_string()),
        ))
    }
}

async fn status(config_path: &Path, data_dir: PathBuf, identity: IdentityArgs) -> CliResult<()> {
    let pipeline = build_pipeline(config_path, data_dir)?;

    let identity = to_identity(&identity);
    let normalized = identity
        .normalize(&pipeline.config)
        .map_err(|e| CliError::pipeline_error(e.to_string()))?;
    let (dataset_id, canonical_identity) = normalized.compute_dataset_id();

    let pointer = pipeline
        .commit_log
        .current_pointer(&dataset_id)
        .await
        .map_err(|e| CliError::pipeline_error(e.to_string()))?;
    let commits = pipeline
        .commit_log
        .list_commits(&dataset_id)
        .await
        .map_err(|e| CliError::pipeline_error(e.to_string()))?;
    let readiness = pipeline
        .readiness
        .record(dataset_id.as_str())
        .await
        .map_err(|e| CliError::pipeline_error(e.to_string()))?;
    let snapshot = pipeline
        .snapshots
        .latest(&dataset_id)
        .await
        .ok()
        .flatten()
        .map(|doc| json!({"version": doc.version, "snapshot_at": doc.snapshot_at}));

    let output = json!({
        "dataset_id": dataset_id,
        "canonical_identity": canonical_identity,
        "has_rule": pipeline.rules.get(&dataset_id).is_some(),
        "pointer": pointer,
        "readiness": readiness,
        "latest_snapshot": snapshot,
        "commits": commits,
    });
    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::runtime_error(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

fn to_identity(args: &IdentityArgs) -> DatasetIdentity {
    DatasetIdentity::new(
        args.sport.clone(),
        args.level.clone(),
        args.season.clone(),
        args.dataset_type.clone(),
        args.qualifier.clone(),
    )
}
