//! Builder warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the style loader and the box-tree builder to report conditions
//! that are recovered from (unsupported `display`, broken images, invalid
//! `content` values, dangling cross-references).
//!
//! Every warning is also recorded for the current thread, even when it is
//! not printed again, so callers (and tests) can inspect what a build
//! reported with [`take_warnings`].

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Whether printed warnings are colored.
static COLORED: AtomicBool = AtomicBool::new(true);

thread_local! {
    /// Warnings emitted on this thread since the last [`take_warnings`].
    static RECORDED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Warn about a recoverable condition (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("BOXES", "ignored box x-foo: display property run-in not supported");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    RECORDED.with(|recorded| recorded.borrow_mut().push(key.clone()));

    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        let line = format!("[Koala {component}] ⚠ {message}");
        if COLORED.load(Ordering::Relaxed) {
            eprintln!("{}", line.yellow());
        } else {
            eprintln!("{line}");
        }
    }
}

/// Enable or disable ANSI colors on printed warnings.
pub fn set_colored(enabled: bool) {
    COLORED.store(enabled, Ordering::Relaxed);
}

/// Drain the warnings recorded on the current thread, formatted as
/// `[COMPONENT] message`.
#[must_use]
pub fn take_warnings() -> Vec<String> {
    RECORDED.with(|recorded| std::mem::take(&mut *recorded.borrow_mut()))
}

/// Clear all recorded warnings (call when loading a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
    drop(guard);
    RECORDED.with(|recorded| recorded.borrow_mut().clear());
}
