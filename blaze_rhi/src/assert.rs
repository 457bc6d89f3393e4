//! Contract-violation reporting
//!
//! Caller bugs (null or mismatched resources, size mismatches, recording into
//! an already dispatched command buffer) go through `contract_violation`. The
//! current `AssertMode` of the thread decides what happens next:
//!
//! - `Fatal`: the violation is logged at error severity, then the thread panics.
//! - `Recoverable`: the violation is logged and returned as
//!   `Error::ContractViolation`, so tests can assert on it.
//!
//! Recording and dispatch are single-threaded per device, so the mode is kept
//! per thread and never leaks between concurrently running tests.

use std::cell::Cell;
use crate::error::Error;
use crate::log::{Log, LogSeverity};

/// How contract violations are surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertMode {
    /// Log then panic (debug builds)
    Fatal,
    /// Log then return `Error::ContractViolation`
    Recoverable,
}

impl Default for AssertMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            AssertMode::Fatal
        } else {
            AssertMode::Recoverable
        }
    }
}

thread_local! {
    static ASSERT_MODE: Cell<AssertMode> = Cell::new(AssertMode::default());
}

/// Set the assert mode of the calling thread
pub fn set_assert_mode(mode: AssertMode) {
    ASSERT_MODE.with(|cell| cell.set(mode));
}

/// Assert mode of the calling thread
pub fn assert_mode() -> AssertMode {
    ASSERT_MODE.with(|cell| cell.get())
}

/// Restores the previous assert mode when dropped
///
/// # Example
///
/// ```
/// use blaze_rhi::blaze::{AssertMode, AssertModeGuard, assert_mode};
///
/// {
///     let _guard = AssertModeGuard::new(AssertMode::Recoverable);
///     assert_eq!(assert_mode(), AssertMode::Recoverable);
/// }
/// ```
pub struct AssertModeGuard {
    previous: AssertMode,
}

impl AssertModeGuard {
    pub fn new(mode: AssertMode) -> Self {
        let previous = assert_mode();
        set_assert_mode(mode);
        Self { previous }
    }
}

impl Drop for AssertModeGuard {
    fn drop(&mut self) {
        set_assert_mode(self.previous);
    }
}

/// Report a broken API contract
///
/// Panics in `Fatal` mode, otherwise returns the error for the caller to propagate.
pub fn contract_violation(
    source: &str,
    message: String,
    file: &'static str,
    line: u32,
) -> Error {
    Log::log_detailed(
        LogSeverity::Error,
        source,
        format!("Contract violation: {}", message),
        file,
        line,
    );
    if assert_mode() == AssertMode::Fatal {
        panic!("[{}] contract violation: {}", source, message);
    }
    Error::ContractViolation(message)
}

/// Check a contract; on failure report it and return `Err` from the current function
///
/// # Example
///
/// ```no_run
/// # use blaze_rhi::blaze::Result;
/// fn draw(vertex_count: u32) -> Result<()> {
///     blaze_rhi::rhi_assert!(vertex_count > 0, "blaze::rhi", "draw with zero vertices");
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! rhi_assert {
    ($cond:expr, $source:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::blaze::contract_violation(
                $source,
                format!($($arg)*),
                file!(),
                line!(),
            ));
        }
    };
}

/// Report a contract violation unconditionally and return `Err` from the current function
#[macro_export]
macro_rules! rhi_violation {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::blaze::contract_violation(
            $source,
            format!($($arg)*),
            file!(),
            line!(),
        ))
    };
}

#[cfg(test)]
#[path = "assert_tests.rs"]
mod tests;
