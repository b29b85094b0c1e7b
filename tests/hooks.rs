//! Hook bus and lifecycle manager through the public API

use std::sync::{Arc, Mutex};
use std::time::Duration;
use uniboost::core::error_handling::BoxError;
use uniboost::hooks::api::{
    run_with_lifecycle, HookBus, HookError, LifecycleEvent, ModuleHooks, TapMode,
};

#[tokio::test]
async fn test_mixed_modes_on_one_bus() {
    let bus: HookBus<String> = HookBus::new("moduleLoaded");
    let log = Arc::new(Mutex::new(Vec::new()));

    let sync_log = log.clone();
    bus.tap("sync", move |name: &String| {
        sync_log.lock().unwrap().push(format!("sync:{}", name));
        Ok(())
    })
    .unwrap();

    let series_log = log.clone();
    bus.tap_async("series", move |name: String| {
        let series_log = series_log.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            series_log.lock().unwrap().push(format!("series:{}", name));
            Ok::<(), BoxError>(())
        }
    })
    .unwrap();

    let parallel_log = log.clone();
    bus.tap_promise("parallel", move |name: String| {
        let parallel_log = parallel_log.clone();
        async move {
            parallel_log.lock().unwrap().push(format!("parallel:{}", name));
            Ok::<(), BoxError>(())
        }
    })
    .unwrap();

    bus.call(&"cart".to_string());
    bus.call_async("user".to_string()).await;
    bus.call_parallel("shop".to_string()).await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["sync:cart", "series:user", "parallel:shop"]
    );
    assert_eq!(bus.tap_names(TapMode::AsyncSeries), vec!["series"]);
}

#[tokio::test]
async fn test_parallel_failure_is_reported() {
    let bus: HookBus<u32> = HookBus::new("build");
    bus.tap_promise("ok", |_: u32| async { Ok::<(), BoxError>(()) })
        .unwrap();
    bus.tap_promise("broken", |n: u32| async move {
        Err::<(), BoxError>(format!("cannot build {}", n).into())
    })
    .unwrap();

    match bus.call_parallel(7).await {
        Err(HookError::TapFailed { tap, mode, source }) => {
            assert_eq!(tap, "broken");
            assert_eq!(mode, TapMode::AsyncParallel);
            assert_eq!(source.to_string(), "cannot build 7");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_lifecycle_wraps_an_operation() {
    let hooks = ModuleHooks::default();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for bus in [&hooks.before_load, &hooks.after_load, &hooks.on_error] {
        let seen = seen.clone();
        bus.tap("record", move |event: &LifecycleEvent| {
            seen.lock().unwrap().push(event.clone());
            Ok(())
        })
        .unwrap();
    }

    let loaded: Result<Vec<&str>, String> = run_with_lifecycle(
        &hooks,
        "loadModules",
        serde_json::json!({ "root": "src/modules" }),
        || async { Ok(vec!["cart", "user"]) },
    )
    .await;
    assert_eq!(loaded, Ok(vec!["cart", "user"]));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].result, None);
    assert_eq!(seen[1].result, Some(serde_json::json!(["cart", "user"])));
    assert_eq!(hooks.stats().total, 3);
}
