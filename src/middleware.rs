//! Locale middleware for axum.
//!
//! Every localizable URL carries its language as the first path segment
//! (`/fr/about`). Requests without one are redirected to the prefixed URL;
//! prefixed requests run with that language active and reach the router with
//! the prefix stripped (`/about`).

use crate::config::Config;
use crate::i18n::{activation, LanguageRegistry};
use anyhow::{Context, Result};
use axum::{
    extract::{Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE, COOKIE, LOCATION, SET_COOKIE, VARY},
        HeaderMap, HeaderValue, Method, StatusCode, Uri,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Language the middleware activated for a request, available as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLanguage(pub String);

#[derive(Debug, Clone)]
pub struct LocaleState {
    languages: Arc<LanguageRegistry>,
    excluded_prefixes: Vec<String>,
    cookie_name: String,
    prefix_pattern: Regex,
}

impl LocaleState {
    /// # Arguments
    /// * `languages` - Configured languages
    /// * `excluded_prefixes` - Path prefixes that are never redirected or stripped
    /// * `cookie_name` - Cookie that remembers the visitor's language
    pub fn new(
        languages: Arc<LanguageRegistry>,
        excluded_prefixes: Vec<String>,
        cookie_name: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            languages,
            excluded_prefixes,
            cookie_name: cookie_name.into(),
            prefix_pattern: Regex::new(r"^/([\w@-]+)(/|$)").context("Invalid language prefix pattern")?,
        })
    }

    /// `None` when internationalization is disabled.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        if !config.use_i18n {
            return Ok(None);
        }
        let languages = Arc::new(LanguageRegistry::from_config(config)?);
        Self::new(languages, config.excluded_prefixes(), config.language_cookie_name.clone()).map(Some)
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    /// Configured language matching `candidate`, ignoring case and falling
    /// back to the primary subtag (`fr-CA` matches `fr`).
    fn supported<'a>(&'a self, candidate: &str) -> Option<&'a str> {
        let exact = self
            .languages
            .codes()
            .find(|code| code.eq_ignore_ascii_case(candidate));
        if exact.is_some() {
            return exact;
        }
        let primary = candidate.split(['-', '_']).next()?;
        self.languages
            .codes()
            .find(|code| code.eq_ignore_ascii_case(primary))
    }

    /// Language named by the first path segment, if it is configured.
    pub fn language_from_path(&self, path: &str) -> Option<&str> {
        let captures = self.prefix_pattern.captures(path)?;
        let candidate = captures.get(1)?.as_str();
        self.languages
            .codes()
            .find(|code| code.eq_ignore_ascii_case(candidate))
    }

    /// Path prefix, then cookie, then `Accept-Language`, then the default.
    pub fn language_from_request(&self, headers: &HeaderMap, path: &str) -> String {
        if let Some(code) = self.language_from_path(path) {
            return code.to_string();
        }
        if let Some(code) = cookie_value(headers, &self.cookie_name).and_then(|c| self.supported(&c)) {
            return code.to_string();
        }
        if let Some(code) = headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| self.language_from_accept(value))
        {
            return code.to_string();
        }
        self.languages.default_language().to_string()
    }

    fn language_from_accept(&self, value: &str) -> Option<&str> {
        let mut tags: Vec<(&str, f32)> = value
            .split(',')
            .filter_map(|part| {
                let mut components = part.trim().split(';');
                let tag = components.next()?.trim();
                if tag.is_empty() || tag == "*" {
                    return None;
                }
                let quality = components
                    .find_map(|param| param.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((tag, quality))
            })
            .filter(|(_, quality)| *quality > 0.0)
            .collect();
        // Stable sort keeps header order among equal weights
        tags.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        tags.into_iter().find_map(|(tag, _)| self.supported(tag))
    }

    pub fn must_localize(&self, path: &str) -> bool {
        !self
            .excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    fn finish_response(&self, mut response: Response, language: &str, request_cookie: Option<&str>) -> Response {
        let headers = response.headers_mut();
        patch_vary(headers, "Accept-Language");

        if !headers.contains_key(CONTENT_LANGUAGE) {
            if let Ok(value) = HeaderValue::from_str(language) {
                headers.insert(CONTENT_LANGUAGE, value);
            }
        }

        if request_cookie != Some(language) {
            let cookie = format!("{}={}; Path=/", self.cookie_name, language);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                headers.append(SET_COOKIE, value);
            }
        }
        response
    }
}

/// Wrap a router with the locale middleware.
///
/// The router is mounted as the fallback of an outer router so the
/// middleware sees requests before routing and can strip the language
/// prefix. Returns the router unchanged when internationalization is off.
pub fn apply_locale_middleware(router: Router, config: &Config) -> Result<Router> {
    match LocaleState::from_config(config)? {
        Some(state) => Ok(localized(router, Arc::new(state))),
        None => Ok(router),
    }
}

pub fn localized(router: Router, state: Arc<LocaleState>) -> Router {
    Router::new()
        .fallback_service(router)
        .layer(middleware::from_fn_with_state(state, locale_middleware))
}

pub async fn locale_middleware(
    State(state): State<Arc<LocaleState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let language = state.language_from_request(request.headers(), &path);
    let cookie = cookie_value(request.headers(), &state.cookie_name);
    let must_localize = state.must_localize(&path);

    if state.language_from_path(&path).is_none() && must_localize {
        // Redirecting would drop the body
        if request.method() == Method::POST {
            let response = next.run(request).await;
            return state.finish_response(response, &language, cookie.as_deref());
        }

        let full_path = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or(path);
        let location = format!("/{}{}", language, full_path);
        debug!(%location, "Redirecting to language prefixed path");

        let response = (StatusCode::FOUND, [(LOCATION, location)]).into_response();
        return state.finish_response(response, &language, cookie.as_deref());
    }

    if must_localize {
        if let Some(uri) = strip_language_prefix(request.uri()) {
            *request.uri_mut() = uri;
        }
    }
    request.extensions_mut().insert(RequestLanguage(language.clone()));

    let response = activation::scope(language.clone(), next.run(request)).await;
    state.finish_response(response, &language, cookie.as_deref())
}

/// `/fr/about?x=1` becomes `/about?x=1`, `/fr` becomes `/`.
fn strip_language_prefix(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let rest = match path.get(1..)?.find('/') {
        Some(index) => &path[index + 1..],
        None => "/",
    };
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", rest, query),
        None => rest.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Add `value` to `Vary` unless it is already listed.
fn patch_vary(headers: &mut HeaderMap, value: &str) {
    let existing: Vec<String> = headers
        .get_all(VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    if existing.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        return;
    }

    let mut combined = existing;
    combined.push(value.to_string());
    if let Ok(header) = HeaderValue::from_str(&combined.join(", ")) {
        headers.insert(VARY, header);
    }
}
