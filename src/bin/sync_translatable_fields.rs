//! Add missing per-language columns for translatable fields.
//!
//! Usage:
//!   cargo run --bin sync_translatable_fields
//!   cargo run --bin sync_translatable_fields -- --database=replica
//!
//! Required environment variables:
//! - MODELS_FILE (JSON model manifest)
//! - DATABASE_URL, or DATABASE_URL_<ALIAS> when `--database` names another alias
//!
//! Optional:
//! - LANGUAGES (defaults to "en:English")
//! - LANGUAGE_CODE (defaults to the first language)
//! - TRANSLATABLE_MODELS (JSON object of model label to field names)
//!
//! Each added column is printed to stdout as `<app_label>.<Model>.<field>`
//! followed by the executed SQL. Logs go to stderr.

use anyhow::{bail, Context, Result};
use magic_translation::{
    config::{Config, DEFAULT_DB_ALIAS},
    db::PostgresSchema,
    schema::{manifest::Manifest, ModelRegistry},
    sync,
};
use tracing::info;

const USAGE: &str = "Usage: sync_translatable_fields [--database=NAME]";

/// Database alias from the command line, `None` when help was requested.
fn parse_args(args: &[String]) -> Result<Option<String>> {
    let mut database = DEFAULT_DB_ALIAS.to_string();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--database" => {
                database = iter
                    .next()
                    .context("--database requires a value")?
                    .clone();
            }
            other => match other.strip_prefix("--database=") {
                Some(name) if !name.is_empty() => database = name.to_string(),
                Some(_) => bail!("--database requires a value"),
                None => bail!("Unknown argument: {}\n{}", other, USAGE),
            },
        }
    }

    Ok(Some(database))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Stdout carries the SQL report, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("magic_translation=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(database) = parse_args(&args)? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = Config::from_env()?;
    let models_file = config
        .models_file
        .as_deref()
        .context("MODELS_FILE not set")?;

    let mut registry = ModelRegistry::from_config(&config)?;
    let ids = Manifest::load(models_file)?.register_into(&mut registry)?;
    info!("Loaded {} models from {}", ids.len(), models_file);

    let url = config.database_url(&database)?;
    let mut conn = PostgresSchema::connect(url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = sync::sync_all(&mut registry, &mut conn, &mut out).await?;

    info!(
        "Checked {} models, added {} columns",
        report.models_checked,
        report.added.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_args_default() {
        assert_eq!(parse_args(&[]).unwrap(), Some("default".to_string()));
    }

    #[test]
    fn test_parse_args_database_forms() {
        assert_eq!(
            parse_args(&args(&["--database=replica"])).unwrap(),
            Some("replica".to_string())
        );
        assert_eq!(
            parse_args(&args(&["--database", "replica"])).unwrap(),
            Some("replica".to_string())
        );
    }

    #[test]
    fn test_parse_args_help() {
        assert_eq!(parse_args(&args(&["--help"])).unwrap(), None);
    }

    #[test]
    fn test_parse_args_rejects_unknown() {
        assert!(parse_args(&args(&["--verbose"])).is_err());
        assert!(parse_args(&args(&["--database="])).is_err());
        assert!(parse_args(&args(&["--database"])).is_err());
    }
}
