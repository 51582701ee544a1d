//! Language-prefixed links for templates.

use crate::i18n::LanguageRegistry;
use crate::schema::ModelInstance;
use std::borrow::Cow;

/// Anything that can produce an absolute site path.
pub trait AbsoluteUrl {
    fn absolute_url(&self) -> Option<Cow<'_, str>>;
}

impl AbsoluteUrl for str {
    fn absolute_url(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self))
    }
}

impl AbsoluteUrl for String {
    fn absolute_url(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }
}

/// Instances build their URL from the model's pattern, e.g.
/// `/articles/{slug}/`, filling each `{attr}` through the regular attribute
/// accessors. `None` when the model has no pattern or an attribute is unset.
impl AbsoluteUrl for ModelInstance<'_> {
    fn absolute_url(&self) -> Option<Cow<'_, str>> {
        let pattern = self.model().url_pattern()?;
        let mut url = String::with_capacity(pattern.len());
        let mut rest = pattern;

        while let Some(start) = rest.find('{') {
            url.push_str(&rest[..start]);
            let end = rest[start..].find('}')? + start;
            let attr = &rest[start + 1..end];
            match self.get(attr)? {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => url.push_str(&s),
                other => url.push_str(&other.to_string()),
            }
            rest = &rest[end + 1..];
        }
        url.push_str(rest);

        Some(Cow::Owned(url))
    }
}

/// Whether `url` starts with `/<code>/` or is exactly `/<code>` for a
/// configured language.
pub fn has_language_prefix(url: &str, languages: &LanguageRegistry) -> bool {
    match url.strip_prefix('/') {
        Some(rest) => {
            let first = rest.split('/').next().unwrap_or_default();
            languages.codes().any(|code| code == first)
        }
        None => false,
    }
}

/// URL of `item` carrying the language prefix of `language`, or of the
/// current language when none is given.
///
/// An existing language prefix is replaced; otherwise one is added. With
/// internationalization disabled the URL is returned as is.
pub fn language_url<T: AbsoluteUrl + ?Sized>(
    item: &T,
    language: Option<&str>,
    languages: &LanguageRegistry,
    use_i18n: bool,
) -> Option<String> {
    let url = item.absolute_url()?;
    if !use_i18n {
        return Some(url.into_owned());
    }

    let language = language.unwrap_or_else(|| languages.current_language());
    if has_language_prefix(&url, languages) {
        let mut bits: Vec<&str> = url.splitn(3, '/').collect();
        bits[1] = language;
        return Some(bits.join("/"));
    }
    Some(format!("/{}{}", language, url))
}
