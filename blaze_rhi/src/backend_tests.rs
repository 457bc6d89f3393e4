//! Unit tests for backend.rs

use std::path::Path;
use crate::backend::*;
use crate::error::Error;
use crate::rhi::mock_device::MockDevice;
use crate::rhi::{Config, Context, Device};

fn mock_registry() -> DeviceRegistry {
    let mut registry = DeviceRegistry::new();
    registry.register_backend("mock", |_context: &Context| -> crate::error::Result<Box<dyn Device>> {
        Ok(Box::new(MockDevice::new()))
    });
    registry
}

// ============================================================================
// REGISTRY TESTS
// ============================================================================

#[test]
fn test_registry_creates_registered_backend() {
    let registry = mock_registry();
    assert!(registry.has_backend("mock"));
    assert!(!registry.has_backend("vulkan"));

    let device = registry.create_device("mock", &Context::default()).unwrap();
    assert_eq!(device.name(), "Mock");
}

#[test]
fn test_registry_unknown_backend_fails() {
    let registry = mock_registry();
    let result = registry.create_device("direct3d12", &Context::default());
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

#[test]
fn test_registry_backend_names_sorted() {
    let mut registry = mock_registry();
    registry.register_backend("null", |_context: &Context| -> crate::error::Result<Box<dyn Device>> {
        Err(Error::Unsupported("null backend".to_string()))
    });
    registry.register_backend("a_first", |_context: &Context| -> crate::error::Result<Box<dyn Device>> {
        Ok(Box::new(MockDevice::new()))
    });
    assert_eq!(registry.backend_names(), ["a_first", "mock", "null"]);
    assert!(DeviceRegistry::default().backend_names().is_empty());
}

#[test]
fn test_registry_factory_error_is_propagated() {
    let mut registry = DeviceRegistry::new();
    registry.register_backend("broken", |context: &Context| -> crate::error::Result<Box<dyn Device>> {
        Err(Error::InitializationFailed(format!("no platform for '{}'", context.config.app_name)))
    });
    let context = Context::new(Config { app_name: "Sample".to_string(), ..Config::default() });
    assert_eq!(
        registry.create_device("broken", &context).err(),
        Some(Error::InitializationFailed("no platform for 'Sample'".to_string()))
    );
}

#[test]
fn test_registry_reregistration_replaces_factory() {
    let mut registry = DeviceRegistry::new();
    registry.register_backend("mock", |_context: &Context| -> crate::error::Result<Box<dyn Device>> {
        Err(Error::OutOfMemory)
    });
    registry.register_backend("mock", |_context: &Context| -> crate::error::Result<Box<dyn Device>> {
        Ok(Box::new(MockDevice::new()))
    });
    assert_eq!(registry.backend_names().len(), 1);
    assert!(registry.create_device("mock", &Context::default()).is_ok());
}

// ============================================================================
// SHARED LIBRARY TESTS
// ============================================================================

#[test]
fn test_shared_library_name() {
    let name = shared_library_name("opengl");
    if cfg!(target_os = "windows") {
        assert_eq!(name, "rhi_opengl.dll");
    } else if cfg!(target_os = "macos") {
        assert_eq!(name, "librhi_opengl.dylib");
    } else {
        assert_eq!(name, "librhi_opengl.so");
    }
}

#[test]
fn test_shared_library_path() {
    let path = shared_library_path("opengl", Path::new("plugins"));
    assert_eq!(path, Path::new("plugins").join(shared_library_name("opengl")));
}

#[test]
fn test_entry_symbol_is_nul_terminated() {
    assert_eq!(CREATE_DEVICE_INSTANCE_SYMBOL.last(), Some(&0));
    assert_eq!(&CREATE_DEVICE_INSTANCE_SYMBOL[..CREATE_DEVICE_INSTANCE_SYMBOL.len() - 1], b"create_rhi_device_instance");
}

#[test]
fn test_load_missing_library_fails() {
    let directory = std::env::temp_dir().join("blaze_rhi_no_backends_here");
    let result = load_device("does_not_exist", &directory, &Context::default());
    match result {
        Err(Error::InitializationFailed(message)) => assert!(message.contains("rhi_does_not_exist")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("loading a missing library succeeded"),
    }
}

#[test]
fn test_device_instance_round_trip_through_raw_pointer() {
    let raw = DeviceInstance::into_raw(Box::new(MockDevice::new()));
    assert!(!raw.is_null());
    let instance = unsafe { Box::from_raw(raw) };
    assert_eq!(instance.device.name(), "Mock");
}
