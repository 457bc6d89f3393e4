//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("glLinkProgram failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("glLinkProgram failed"));
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    assert_eq!(format!("{}", err), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("Texture has zero width".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("Texture has zero width"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("librhi_vulkan.so not found".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("librhi_vulkan.so"));
}

#[test]
fn test_contract_violation_display() {
    let err = Error::ContractViolation("resource group size mismatch".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Contract violation"));
    assert!(display.contains("resource group size mismatch"));
}

#[test]
fn test_unsupported_display() {
    let err = Error::Unsupported("mesh shaders".to_string());
    assert_eq!(format!("{}", err), "Unsupported: mesh shaders");
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let debug = format!("{:?}", Error::BackendError("test".to_string()));
    assert!(debug.contains("BackendError"));
    assert_eq!(format!("{:?}", Error::OutOfMemory), "OutOfMemory");
}

#[test]
fn test_error_clone_and_eq() {
    let err1 = Error::ContractViolation("x".to_string());
    let err2 = err1.clone();
    assert_eq!(err1, err2);
    assert_ne!(err1, Error::OutOfMemory);
}

#[test]
fn test_is_contract_violation() {
    assert!(Error::ContractViolation("x".to_string()).is_contract_violation());
    assert!(!Error::InvalidResource("x".to_string()).is_contract_violation());
    assert!(!Error::OutOfMemory.is_contract_violation());
}

// ============================================================================
// RESULT TYPE
// ============================================================================

#[test]
fn test_result_question_mark_propagation() {
    fn inner() -> Result<u32> {
        Err(Error::Unsupported("bytecode".to_string()))
    }
    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }
    assert_eq!(outer(), Err(Error::Unsupported("bytecode".to_string())));
}
