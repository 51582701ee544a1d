use anyhow::{bail, Context, Result};
use std::collections::HashMap;

/// External translatable-field declarations keyed by lowercased `app_label.module_name`.
pub type TranslatableModels = HashMap<String, Vec<String>>;

/// Alias used when no `--database` is given.
pub const DEFAULT_DB_ALIAS: &str = "default";

#[derive(Debug, Clone)]
pub struct Config {
    // Internationalization
    pub use_i18n: bool,
    pub languages: Vec<(String, String)>,
    pub language_code: String,
    pub translatable_models: TranslatableModels,

    // Middleware
    pub not_localized_urls: Vec<String>,
    pub static_url: String,
    pub media_url: String,
    pub language_cookie_name: String,

    // Database
    pub databases: HashMap<String, String>,

    // Schema
    pub models_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let languages = match std::env::var("LANGUAGES") {
            Ok(raw) => parse_languages(&raw)?,
            Err(_) => vec![("en".to_string(), "English".to_string())],
        };

        let language_code = match std::env::var("LANGUAGE_CODE") {
            Ok(code) => code,
            Err(_) => languages
                .first()
                .map(|(code, _)| code.clone())
                .context("LANGUAGES must contain at least one language")?,
        };

        let translatable_models = match std::env::var("TRANSLATABLE_MODELS") {
            Ok(raw) => parse_translatable_models(&raw)?,
            Err(_) => TranslatableModels::new(),
        };

        // DATABASE_URL is the default alias, DATABASE_URL_<ALIAS> names the rest
        let mut databases = HashMap::new();
        for (key, value) in std::env::vars() {
            if key == "DATABASE_URL" {
                databases.insert(DEFAULT_DB_ALIAS.to_string(), value);
            } else if let Some(alias) = key.strip_prefix("DATABASE_URL_") {
                databases.insert(alias.to_lowercase(), value);
            }
        }

        Ok(Self {
            use_i18n: std::env::var("USE_I18N")
                .ok()
                .map(|v| parse_bool(&v))
                .transpose()
                .context("USE_I18N must be a boolean")?
                .unwrap_or(true),
            languages,
            language_code,
            translatable_models,

            not_localized_urls: std::env::var("NOT_LOCALIZED_URLS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            static_url: std::env::var("STATIC_URL").unwrap_or_else(|_| "/static/".to_string()),
            media_url: std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string()),
            language_cookie_name: std::env::var("LANGUAGE_COOKIE_NAME")
                .unwrap_or_else(|_| "django_language".to_string()),

            databases,

            models_file: std::env::var("MODELS_FILE").ok(),
        })
    }

    /// Configuration with the given languages and defaults everywhere else.
    ///
    /// The first language becomes the default.
    pub fn with_languages(languages: &[(&str, &str)]) -> Self {
        let languages: Vec<(String, String)> = languages
            .iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect();
        let language_code = languages
            .first()
            .map(|(code, _)| code.clone())
            .unwrap_or_else(|| "en".to_string());

        Self {
            use_i18n: true,
            languages,
            language_code,
            translatable_models: TranslatableModels::new(),
            not_localized_urls: Vec::new(),
            static_url: "/static/".to_string(),
            media_url: "/media/".to_string(),
            language_cookie_name: "django_language".to_string(),
            databases: HashMap::new(),
            models_file: None,
        }
    }

    /// Connection URL for a database alias.
    pub fn database_url(&self, alias: &str) -> Result<&str> {
        self.databases
            .get(&alias.to_lowercase())
            .map(String::as_str)
            .with_context(|| match alias {
                DEFAULT_DB_ALIAS => "DATABASE_URL not set".to_string(),
                other => format!("DATABASE_URL_{} not set", other.to_uppercase()),
            })
    }

    /// Path prefixes the locale middleware never redirects or strips.
    pub fn excluded_prefixes(&self) -> Vec<String> {
        let mut prefixes = self.not_localized_urls.clone();
        for url in [&self.static_url, &self.media_url] {
            if !url.is_empty() && !prefixes.contains(url) {
                prefixes.push(url.clone());
            }
        }
        prefixes
    }
}

/// Parse `en:English,fr:Français` into ordered (code, name) pairs.
fn parse_languages(raw: &str) -> Result<Vec<(String, String)>> {
    let mut languages = Vec::new();
    for entry in split_list(raw) {
        let (code, name) = match entry.split_once(':') {
            Some((code, name)) => (code.trim(), name.trim()),
            None => (entry.as_str(), entry.as_str()),
        };
        if code.is_empty() {
            bail!("Invalid LANGUAGES entry: '{}'", entry);
        }
        languages.push((code.to_string(), name.to_string()));
    }
    if languages.is_empty() {
        bail!("LANGUAGES must contain at least one language");
    }
    Ok(languages)
}

fn parse_translatable_models(raw: &str) -> Result<TranslatableModels> {
    let parsed: HashMap<String, Vec<String>> =
        serde_json::from_str(raw).context("TRANSLATABLE_MODELS must be a JSON object of field lists")?;
    Ok(parsed
        .into_iter()
        .map(|(model, fields)| (model.to_lowercase(), fields))
        .collect())
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Invalid boolean value: '{}'", other),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
