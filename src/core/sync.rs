//! Lock poisoning as a domain error
//!
//! Mutating paths report a poisoned lock to the caller. Read-only queries
//! recover the inner value instead, since a half-finished registration
//! leaves the tap table consistent.

use std::sync::{LockResult, RwLockWriteGuard};

/// Map a poisoned `RwLock::write()` through `to_error`
pub fn handle_rwlock_write<T, E>(
    result: LockResult<RwLockWriteGuard<'_, T>>,
    to_error: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<'_, T>, E> {
    result.map_err(|poisoned| {
        to_error(format!(
            "write lock poisoned by an earlier panic ({})",
            poisoned
        ))
    })
}
