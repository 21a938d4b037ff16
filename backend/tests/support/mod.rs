//! Shared helpers for integration tests.

use std::sync::Mutex;

/// Every variable read by `ServiceConfig::apply_env`.
pub const SERVICE_ENV_KEYS: &[&str] = &[
    "HOST",
    "PORT",
    "MAX_BODY_BYTES",
    "PUBLISHER_KIND",
    "RABBITMQ_HOST",
    "RABBITMQ_PORT",
    "RABBITMQ_VHOST",
    "RABBITMQ_USERNAME",
    "RABBITMQ_PASSWORD",
    "RABBITMQ_QUEUE",
    "PUBLISH_TIMEOUT_MS",
    "EVAL_MAX_EXPRESSION_LEN",
    "EVAL_MAX_NESTING",
];

// Tests in one binary run in parallel and share the process environment.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with exactly `vars` set among the service variables.
///
/// Every other key in [`SERVICE_ENV_KEYS`] is removed for the duration of
/// the call. Previous values are restored afterwards, also on panic.
pub fn with_service_env<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _restore = EnvSnapshot::capture();

    for key in SERVICE_ENV_KEYS {
        std::env::remove_var(key);
    }
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    f()
}

struct EnvSnapshot(Vec<(&'static str, Option<String>)>);

impl EnvSnapshot {
    fn capture() -> Self {
        Self(
            SERVICE_ENV_KEYS
                .iter()
                .map(|key| (*key, std::env::var(key).ok()))
                .collect(),
        )
    }
}

impl Drop for EnvSnapshot {
    fn drop(&mut self) {
        for (key, value) in self.0.drain(..) {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}
