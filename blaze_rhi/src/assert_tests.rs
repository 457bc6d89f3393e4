//! Unit tests for assert.rs

use crate::assert::{assert_mode, contract_violation, set_assert_mode, AssertMode, AssertModeGuard};
use crate::error::{Error, Result};

fn checked_division(a: u32, b: u32) -> Result<u32> {
    crate::rhi_assert!(b != 0, "test::assert", "division of {} by zero", a);
    Ok(a / b)
}

fn always_violates() -> Result<()> {
    crate::rhi_violation!("test::assert", "never allowed");
}

// ============================================================================
// ASSERT MODE
// ============================================================================

#[test]
fn test_default_mode_follows_build_profile() {
    if cfg!(debug_assertions) {
        assert_eq!(AssertMode::default(), AssertMode::Fatal);
    } else {
        assert_eq!(AssertMode::default(), AssertMode::Recoverable);
    }
}

#[test]
fn test_guard_restores_previous_mode() {
    set_assert_mode(AssertMode::Fatal);
    {
        let _guard = AssertModeGuard::new(AssertMode::Recoverable);
        assert_eq!(assert_mode(), AssertMode::Recoverable);
    }
    assert_eq!(assert_mode(), AssertMode::Fatal);
}

#[test]
fn test_mode_is_per_thread() {
    set_assert_mode(AssertMode::Recoverable);
    let other = std::thread::spawn(assert_mode).join().unwrap();
    assert_eq!(other, AssertMode::default());
    assert_eq!(assert_mode(), AssertMode::Recoverable);
    set_assert_mode(AssertMode::default());
}

// ============================================================================
// RECOVERABLE MODE
// ============================================================================

#[test]
fn test_recoverable_violation_returns_error() {
    let _guard = AssertModeGuard::new(AssertMode::Recoverable);
    let err = contract_violation("test::assert", "bad input".to_string(), file!(), line!());
    assert_eq!(err, Error::ContractViolation("bad input".to_string()));
}

#[test]
fn test_rhi_assert_passes_and_fails() {
    let _guard = AssertModeGuard::new(AssertMode::Recoverable);
    assert_eq!(checked_division(10, 2), Ok(5));
    let err = checked_division(10, 0).unwrap_err();
    assert_eq!(err, Error::ContractViolation("division of 10 by zero".to_string()));
}

#[test]
fn test_rhi_violation_always_returns_error() {
    let _guard = AssertModeGuard::new(AssertMode::Recoverable);
    assert!(always_violates().unwrap_err().is_contract_violation());
}

// ============================================================================
// FATAL MODE
// ============================================================================

#[test]
#[should_panic(expected = "contract violation: division of 1 by zero")]
fn test_fatal_violation_panics() {
    let _guard = AssertModeGuard::new(AssertMode::Fatal);
    let _ = checked_division(1, 0);
}
