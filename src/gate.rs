// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Indexing Gate
//!
//! Thread-scoped switch guarding whether document-index writes occur.
//! Every index-write decision point reads [`indexing_is_enabled`]; bulk
//! operations suspend indexing for their own thread without affecting
//! concurrent workers.
//!
//! Each thread carries an independent override on top of a process-wide
//! configurable default, so enable/disable windows never interfere across
//! threads: isolation, not synchronization.
//!
//! # Example
//!
//! ```
//! use search_bridge::gate;
//!
//! gate::enable();
//! {
//!     let _guard = gate::suspended();
//!     assert!(!gate::indexing_is_enabled());
//! }
//! // Restored when the guard drops.
//! assert!(gate::indexing_is_enabled());
//! ```

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::metrics;

static DEFAULT_ENABLED: AtomicBool = AtomicBool::new(true);

thread_local! {
    static THREAD_STATE: Cell<Option<bool>> = const { Cell::new(None) };
}

/// Set the process-wide default used by threads with no explicit override.
///
/// Applied from [`crate::SearchBridgeConfig::install`].
pub fn set_default_enabled(enabled: bool) {
    DEFAULT_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether search indexing/deleting is enabled on the current thread.
pub fn indexing_is_enabled() -> bool {
    THREAD_STATE
        .with(Cell::get)
        .unwrap_or_else(|| DEFAULT_ENABLED.load(Ordering::Relaxed))
}

/// Enable search indexing for this thread.
pub fn enable() {
    THREAD_STATE.with(|state| state.set(Some(true)));
    metrics::record_gate_toggle(true);
}

/// Disable search indexing for this thread.
pub fn disable() {
    THREAD_STATE.with(|state| state.set(Some(false)));
    metrics::record_gate_toggle(false);
}

/// Suspend indexing until the returned guard drops.
pub fn suspended() -> ScopedGate {
    ScopedGate::new(false)
}

/// Force indexing on until the returned guard drops.
pub fn forced() -> ScopedGate {
    ScopedGate::new(true)
}

/// A scope helper that disables indexing and later restores whatever state
/// was observed when the scope was first entered.
///
/// Usable two ways: as an explicit `enter`/`exit` pair around a block, or as
/// a one-shot toggle via [`DisablingScope::apply`], which always recaptures
/// the prior state so a later `exit` restores symmetrically.
///
/// Nesting caveat: `previous_state` is captured once per instance, so reusing
/// the same instance for nested `enter` calls restores to the *outermost*
/// entry's state, not the immediate caller's.
#[derive(Debug, Default)]
pub struct DisablingScope {
    previous_state: Option<bool>,
}

impl DisablingScope {
    pub fn new() -> Self {
        Self {
            previous_state: None,
        }
    }

    /// Scope entry: capture the current state (first entry only), then
    /// disable indexing.
    pub fn enter(&mut self) {
        if self.previous_state.is_none() {
            self.previous_state = Some(indexing_is_enabled());
        }
        disable();
    }

    /// One-shot toggle: recapture the current state unconditionally, then
    /// disable indexing. Returns `self` so the caller can `exit` later.
    pub fn apply(&mut self) -> &mut Self {
        self.previous_state = Some(indexing_is_enabled());
        disable();
        self
    }

    /// Scope exit: restore the captured state. Exiting a scope that was
    /// never entered leaves indexing disabled.
    pub fn exit(&self) {
        if self.previous_state == Some(true) {
            enable();
        } else {
            disable();
        }
    }
}

/// Counterpart of [`DisablingScope`] that forces indexing on.
///
/// Shares the same capture/restore semantics, including the nesting caveat.
#[derive(Debug, Default)]
pub struct EnablingScope {
    previous_state: Option<bool>,
}

impl EnablingScope {
    pub fn new() -> Self {
        Self {
            previous_state: None,
        }
    }

    /// Scope entry: capture the current state (first entry only), then
    /// enable indexing.
    pub fn enter(&mut self) {
        if self.previous_state.is_none() {
            self.previous_state = Some(indexing_is_enabled());
        }
        enable();
    }

    /// One-shot toggle: recapture the current state unconditionally, then
    /// enable indexing.
    pub fn apply(&mut self) -> &mut Self {
        self.previous_state = Some(indexing_is_enabled());
        enable();
        self
    }

    /// Scope exit: restore the captured state.
    pub fn exit(&self) {
        if self.previous_state == Some(true) {
            enable();
        } else {
            disable();
        }
    }
}

/// RAII guard over the gate: applies the target state on construction and
/// restores the observed state on drop.
#[derive(Debug)]
pub struct ScopedGate {
    restore: bool,
}

impl ScopedGate {
    fn new(target: bool) -> Self {
        let restore = indexing_is_enabled();
        if target {
            enable();
        } else {
            disable();
        }
        Self { restore }
    }
}

impl Drop for ScopedGate {
    fn drop(&mut self) {
        if self.restore {
            enable();
        } else {
            disable();
        }
    }
}
