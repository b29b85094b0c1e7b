//! HookBus: named callback taps with three execution modes
//!
//! - `Sync` taps run in registration order through [`HookBus::call`]
//! - `AsyncSeries` taps are awaited one after another by [`HookBus::call_async`]
//! - `AsyncParallel` taps run concurrently under [`HookBus::call_parallel`]
//!
//! A failing tap is logged and never stops the others. Only `call_parallel`
//! reports failure back to its caller, after every tap has finished.
//!
//! Taps are stored behind an `RwLock`; each call snapshots the taps it needs
//! and runs them with the lock released, so a tap may register further taps
//! on the same bus.

use crate::core::error_handling::BoxError;
use crate::core::sync::handle_rwlock_write;
use crate::hooks::error::{HookError, HookResult};
use futures::future::{join_all, BoxFuture};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Default tap limit for a general purpose bus
pub const DEFAULT_MAX_TAPS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TapMode {
    Sync,
    AsyncSeries,
    AsyncParallel,
}

impl fmt::Display for TapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TapMode::Sync => "sync",
            TapMode::AsyncSeries => "asyncSeries",
            TapMode::AsyncParallel => "asyncParallel",
        };
        f.write_str(name)
    }
}

type SyncCallback<A> = Arc<dyn Fn(&A) -> Result<(), BoxError> + Send + Sync>;
type AsyncCallback<A> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

enum TapCallback<A> {
    Sync(SyncCallback<A>),
    Async(AsyncCallback<A>),
}

impl<A> Clone for TapCallback<A> {
    fn clone(&self) -> Self {
        match self {
            TapCallback::Sync(callback) => TapCallback::Sync(Arc::clone(callback)),
            TapCallback::Async(callback) => TapCallback::Async(Arc::clone(callback)),
        }
    }
}

struct HookTap<A> {
    name: String,
    mode: TapMode,
    callback: TapCallback<A>,
}

impl<A> Clone for HookTap<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            mode: self.mode,
            callback: self.callback.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HookBusOptions {
    /// Label used in diagnostics
    pub name: String,
    pub max_taps: usize,
    /// Emit debug output for registration and every tap run
    pub enable_logging: bool,
}

impl Default for HookBusOptions {
    fn default() -> Self {
        Self {
            name: "hook".to_string(),
            max_taps: DEFAULT_MAX_TAPS,
            enable_logging: false,
        }
    }
}

/// Ordered, capacity-bounded collection of taps over argument type `A`
pub struct HookBus<A> {
    name: String,
    max_taps: usize,
    enable_logging: AtomicBool,
    taps: RwLock<Vec<HookTap<A>>>,
}

impl<A: Send + Sync + 'static> HookBus<A> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(HookBusOptions {
            name: name.into(),
            ..Default::default()
        })
    }

    pub fn with_options(options: HookBusOptions) -> Self {
        Self {
            name: options.name,
            max_taps: options.max_taps,
            enable_logging: AtomicBool::new(options.enable_logging),
            taps: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_taps(&self) -> usize {
        self.max_taps
    }

    pub fn set_logging(&self, enabled: bool) {
        self.enable_logging.store(enabled, Ordering::Relaxed);
    }

    fn logging(&self) -> bool {
        self.enable_logging.load(Ordering::Relaxed)
    }

    /// Register a synchronous tap
    pub fn tap<F>(&self, name: impl Into<String>, callback: F) -> HookResult<()>
    where
        F: Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.add_tap(HookTap {
            name: name.into(),
            mode: TapMode::Sync,
            callback: TapCallback::Sync(Arc::new(callback)),
        })
    }

    /// Register a tap awaited in sequence by [`HookBus::call_async`]
    pub fn tap_async<F, Fut>(&self, name: impl Into<String>, callback: F) -> HookResult<()>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.add_tap(HookTap {
            name: name.into(),
            mode: TapMode::AsyncSeries,
            callback: TapCallback::Async(boxed_async(callback)),
        })
    }

    /// Register a tap run concurrently by [`HookBus::call_parallel`]
    pub fn tap_promise<F, Fut>(&self, name: impl Into<String>, callback: F) -> HookResult<()>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.add_tap(HookTap {
            name: name.into(),
            mode: TapMode::AsyncParallel,
            callback: TapCallback::Async(boxed_async(callback)),
        })
    }

    // The capacity check counts the tap being replaced, so a full bus
    // rejects replacements too.
    fn add_tap(&self, tap: HookTap<A>) -> HookResult<()> {
        if tap.name.is_empty() {
            return Err(HookError::InvalidName);
        }

        let mut taps = handle_rwlock_write(self.taps.write(), HookError::Poisoned)?;
        if taps.len() >= self.max_taps {
            return Err(HookError::CapacityExceeded {
                bus: self.name.clone(),
                max: self.max_taps,
            });
        }

        match taps
            .iter()
            .position(|existing| existing.name == tap.name && existing.mode == tap.mode)
        {
            Some(index) => {
                if self.logging() {
                    log::warn!(
                        "Hook '{}': replacing existing tap '{}' ({})",
                        self.name,
                        tap.name,
                        tap.mode
                    );
                }
                taps[index] = tap;
            }
            None => {
                if self.logging() {
                    log::debug!("Hook '{}': added tap '{}' ({})", self.name, tap.name, tap.mode);
                }
                taps.push(tap);
            }
        }
        Ok(())
    }

    fn snapshot(&self, mode: TapMode) -> Vec<HookTap<A>> {
        let taps = self.taps.read().unwrap_or_else(|e| e.into_inner());
        taps.iter().filter(|tap| tap.mode == mode).cloned().collect()
    }

    /// Run every sync tap in registration order
    pub fn call(&self, args: &A) {
        let taps = self.snapshot(TapMode::Sync);
        if self.logging() {
            log::debug!("Hook '{}': running {} sync taps", self.name, taps.len());
        }

        for tap in taps {
            let TapCallback::Sync(callback) = &tap.callback else {
                continue;
            };
            match callback(args) {
                Ok(()) => {
                    if self.logging() {
                        log::debug!("Hook '{}': sync tap '{}' succeeded", self.name, tap.name);
                    }
                }
                Err(e) => log::error!("Hook '{}': sync tap '{}' failed: {}", self.name, tap.name, e),
            }
        }
    }

    /// Await every async-series tap one after another
    pub async fn call_async(&self, args: A)
    where
        A: Clone,
    {
        let taps = self.snapshot(TapMode::AsyncSeries);
        if self.logging() {
            log::debug!(
                "Hook '{}': running {} async series taps",
                self.name,
                taps.len()
            );
        }

        for tap in taps {
            let TapCallback::Async(callback) = &tap.callback else {
                continue;
            };
            match callback(args.clone()).await {
                Ok(()) => {
                    if self.logging() {
                        log::debug!(
                            "Hook '{}': async series tap '{}' succeeded",
                            self.name,
                            tap.name
                        );
                    }
                }
                Err(e) => log::error!(
                    "Hook '{}': async series tap '{}' failed: {}",
                    self.name,
                    tap.name,
                    e
                ),
            }
        }
    }

    /// Run every async-parallel tap concurrently and wait for all of them
    ///
    /// Each failure is logged as it is collected. When any tap failed, the
    /// first failure in registration order is returned after all taps have
    /// completed.
    pub async fn call_parallel(&self, args: A) -> HookResult<()>
    where
        A: Clone,
    {
        let taps = self.snapshot(TapMode::AsyncParallel);
        if self.logging() {
            log::debug!(
                "Hook '{}': running {} async parallel taps",
                self.name,
                taps.len()
            );
        }

        let runs = taps.iter().filter_map(|tap| match &tap.callback {
            TapCallback::Async(callback) => Some(callback(args.clone())),
            TapCallback::Sync(_) => None,
        });
        let results = join_all(runs).await;

        let mut first_failure = None;
        for (tap, result) in taps.iter().zip(results) {
            match result {
                Ok(()) => {
                    if self.logging() {
                        log::debug!(
                            "Hook '{}': async parallel tap '{}' succeeded",
                            self.name,
                            tap.name
                        );
                    }
                }
                Err(e) => {
                    log::error!(
                        "Hook '{}': async parallel tap '{}' failed: {}",
                        self.name,
                        tap.name,
                        e
                    );
                    if first_failure.is_none() {
                        first_failure = Some(HookError::TapFailed {
                            tap: tap.name.clone(),
                            mode: TapMode::AsyncParallel,
                            source: e,
                        });
                    }
                }
            }
        }

        match first_failure {
            Some(err) => {
                log::error!("Hook '{}': parallel run finished with failures", self.name);
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Drop every tap in every mode
    pub fn clear(&self) {
        let mut taps = self.taps.write().unwrap_or_else(|e| e.into_inner());
        let count = taps.len();
        taps.clear();
        if self.logging() {
            log::debug!("Hook '{}': cleared {} taps", self.name, count);
        }
    }

    pub fn tap_count(&self) -> usize {
        self.taps.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn tap_count_by_mode(&self, mode: TapMode) -> usize {
        self.taps
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|tap| tap.mode == mode)
            .count()
    }

    /// Tap names of one mode, in call order
    pub fn tap_names(&self, mode: TapMode) -> Vec<String> {
        self.snapshot(mode).into_iter().map(|tap| tap.name).collect()
    }
}

fn boxed_async<A, F, Fut>(callback: F) -> AsyncCallback<A>
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move |args: A| -> BoxFuture<'static, Result<(), BoxError>> { Box::pin(callback(args)) })
}
