//! Process metadata attached to every event before delivery.

use crate::context::{Context, Value};
use chrono::Local;
use std::fmt;
use sysinfo::System;

pub const ROOT_LOGGER_NAME: &str = "<root>";
pub const HOSTNAME_UNKNOWN: &str = "unknown";

pub const KEY_PID: &str = "pid";
pub const KEY_HOSTNAME: &str = "hostname";
pub const KEY_TIME: &str = "time";
pub const KEY_NAME: &str = "name";

type HostnameSource = dyn Fn() -> Option<String> + Send + Sync;

/// Adds `pid`, `hostname`, `time` and `name` to event contexts.
pub struct Enricher {
    hostname: Box<HostnameSource>,
}

impl Enricher {
    /// An enricher that asks the operating system for the hostname.
    pub fn system() -> Self {
        Self::with_hostname_source(System::host_name)
    }

    /// An enricher with a custom hostname lookup.
    ///
    /// A lookup that returns `None` or an empty name is replaced by
    /// [`HOSTNAME_UNKNOWN`].
    pub fn with_hostname_source<F>(source: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self {
            hostname: Box::new(source),
        }
    }

    fn hostname(&self) -> String {
        (self.hostname)()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| HOSTNAME_UNKNOWN.to_string())
    }

    /// The metadata every event starts from.
    pub fn base(&self) -> Context {
        let mut base = Context::new();
        base.insert(KEY_PID, std::process::id());
        base.insert(KEY_HOSTNAME, self.hostname());
        base.insert(KEY_TIME, Value::Time(Local::now()));
        base.insert(KEY_NAME, ROOT_LOGGER_NAME);
        base
    }

    /// Merges the base metadata into the caller's context.
    ///
    /// A caller-supplied `name` is kept; `pid`, `hostname` and `time` always
    /// come from the base.
    pub fn enrich(&self, context: Option<Context>) -> Context {
        let mut base = self.base();
        let Some(mut context) = context else {
            return base;
        };
        if context.contains_key(KEY_NAME) {
            base.remove(KEY_NAME);
        }
        context.extend(base);
        context
    }
}

impl Default for Enricher {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Enricher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enricher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(host: &'static str) -> Enricher {
        Enricher::with_hostname_source(move || Some(host.to_string()))
    }

    #[test]
    fn test_enrich_without_context_returns_base() {
        let ctx = fixed("box-1").enrich(None);
        assert_eq!(ctx.len(), 4);
        assert_eq!(ctx.get(KEY_HOSTNAME), Some(&Value::from("box-1")));
        assert_eq!(ctx.get(KEY_NAME), Some(&Value::from(ROOT_LOGGER_NAME)));
        assert_eq!(ctx.get(KEY_PID), Some(&Value::from(std::process::id())));
        assert!(ctx.get(KEY_TIME).and_then(Value::as_time).is_some());
    }

    #[test]
    fn test_caller_name_wins() {
        let ctx = fixed("box-1").enrich(Some(Context::new().with(KEY_NAME, "svc")));
        assert_eq!(ctx.get(KEY_NAME), Some(&Value::from("svc")));
    }

    #[test]
    fn test_reserved_keys_are_not_overridable() {
        let caller = Context::new()
            .with(KEY_PID, 1)
            .with(KEY_HOSTNAME, "spoofed")
            .with(KEY_TIME, "yesterday")
            .with("request", "r-9");
        let ctx = fixed("box-1").enrich(Some(caller));
        assert_eq!(ctx.get(KEY_HOSTNAME), Some(&Value::from("box-1")));
        assert_eq!(ctx.get(KEY_PID), Some(&Value::from(std::process::id())));
        assert!(ctx.get(KEY_TIME).and_then(Value::as_time).is_some());
        assert_eq!(ctx.get("request"), Some(&Value::from("r-9")));
        assert_eq!(ctx.get(KEY_NAME), Some(&Value::from(ROOT_LOGGER_NAME)));
    }

    #[test]
    fn test_hostname_failure_falls_back() {
        let ctx = Enricher::with_hostname_source(|| None).enrich(None);
        assert_eq!(ctx.get(KEY_HOSTNAME), Some(&Value::from(HOSTNAME_UNKNOWN)));

        let ctx = Enricher::with_hostname_source(|| Some(String::new())).enrich(None);
        assert_eq!(ctx.get(KEY_HOSTNAME), Some(&Value::from(HOSTNAME_UNKNOWN)));
    }
}
