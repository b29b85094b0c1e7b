//! Lifecycle hooks around an explicit operation

use crate::hooks::lifecycle::{LifecycleEvent, ModuleHooks};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;

/// Run `operation` between the `before_load` and `after_load` hooks
///
/// `before_load` receives `method` and `args`. On success `after_load` also
/// sees the serialized result; on failure `on_error` sees the error message
/// and the original error is returned unchanged. All three run through
/// `call_async`, so a failing tap never changes the outcome.
pub async fn run_with_lifecycle<T, E, F, Fut>(
    hooks: &ModuleHooks,
    method: &str,
    args: serde_json::Value,
    operation: F,
) -> Result<T, E>
where
    T: Serialize,
    E: Display,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let event = LifecycleEvent::new(method, args);
    hooks.before_load.call_async(event.clone()).await;

    match operation().await {
        Ok(value) => {
            let result = match serde_json::to_value(&value) {
                Ok(result) => Some(result),
                Err(e) => {
                    log::debug!("Result of '{}' is not serializable: {}", method, e);
                    None
                }
            };
            hooks
                .after_load
                .call_async(LifecycleEvent { result, ..event })
                .await;
            Ok(value)
        }
        Err(err) => {
            hooks
                .on_error
                .call_async(LifecycleEvent {
                    error: Some(err.to_string()),
                    ..event
                })
                .await;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_handling::BoxError;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn recording_hooks() -> (ModuleHooks, Arc<Mutex<Vec<(String, LifecycleEvent)>>>) {
        let hooks = ModuleHooks::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for (label, bus) in [
            ("before", &hooks.before_load),
            ("after", &hooks.after_load),
            ("error", &hooks.on_error),
        ] {
            let seen = seen.clone();
            bus.tap_async("record", move |event: LifecycleEvent| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push((label.to_string(), event));
                    Ok::<(), BoxError>(())
                }
            })
            .unwrap();
        }
        (hooks, seen)
    }

    #[tokio::test]
    async fn test_success_fires_before_and_after() {
        let (hooks, seen) = recording_hooks();

        let value: Result<u32, String> =
            run_with_lifecycle(&hooks, "loadModule", json!(["cart"]), || async { Ok(42) }).await;
        assert_eq!(value, Ok(42));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "before");
        assert_eq!(seen[0].1.method, "loadModule");
        assert_eq!(seen[0].1.args, json!(["cart"]));
        assert_eq!(seen[1].0, "after");
        assert_eq!(seen[1].1.result, Some(json!(42)));
    }

    #[tokio::test]
    async fn test_failure_fires_on_error_and_returns_original() {
        let (hooks, seen) = recording_hooks();

        let value: Result<u32, String> = run_with_lifecycle(&hooks, "loadModule", json!([]), || async {
            Err("descriptor missing".to_string())
        })
        .await;
        assert_eq!(value, Err("descriptor missing".to_string()));

        let seen = seen.lock().unwrap();
        let labels: Vec<&str> = seen.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["before", "error"]);
        assert_eq!(seen[1].1.error.as_deref(), Some("descriptor missing"));
    }

    #[tokio::test]
    async fn test_failing_tap_does_not_change_outcome() {
        let hooks = ModuleHooks::default();
        hooks
            .before_load
            .tap_async("broken", |_: LifecycleEvent| async {
                Err::<(), BoxError>("tap failed".into())
            })
            .unwrap();

        let value: Result<&str, String> =
            run_with_lifecycle(&hooks, "init", json!(null), || async { Ok("ready") }).await;
        assert_eq!(value, Ok("ready"));
    }
}
