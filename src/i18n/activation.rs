//! Ambient "current language" state.
//!
//! Two slots carry the active language. Requests handled by the locale
//! middleware run inside a task-local scope; synchronous callers (the CLI,
//! tests, background code) use a thread-local slot set with [`activate`].
//! The task-local scope wins when both are set.

use std::cell::RefCell;
use std::future::Future;

tokio::task_local! {
    static REQUEST_LANGUAGE: String;
}

thread_local! {
    static ACTIVE_LANGUAGE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Activate a language for the current thread.
pub fn activate(code: &str) {
    ACTIVE_LANGUAGE.with(|cell| {
        *cell.borrow_mut() = Some(code.to_string());
    });
}

/// Clear the current thread's language.
pub fn deactivate() {
    ACTIVE_LANGUAGE.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// The raw active language, if any.
///
/// This is not validated against the configured languages; use
/// [`LanguageRegistry::current_language`](crate::i18n::LanguageRegistry::current_language)
/// for that.
pub fn get_language() -> Option<String> {
    REQUEST_LANGUAGE
        .try_with(|code| code.clone())
        .ok()
        .or_else(|| ACTIVE_LANGUAGE.with(|cell| cell.borrow().clone()))
}

/// Run `future` with `code` as the active language of the task.
///
/// The language is dropped when the future completes, which is the
/// request-scoped deactivation the middleware relies on.
pub async fn scope<F>(code: String, future: F) -> F::Output
where
    F: Future,
{
    REQUEST_LANGUAGE.scope(code, future).await
}
