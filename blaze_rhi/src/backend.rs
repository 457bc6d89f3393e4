//! Backend selection and device creation
//!
//! Two ways to get a `Device`:
//!
//! - `DeviceRegistry`: backends linked into the application register a factory
//!   under a name ("opengl"), the application creates devices by name.
//! - `load_device`: the backend is a shared library (`librhi_opengl.so`,
//!   `rhi_opengl.dll`) exporting `create_rhi_device_instance`. The library stays
//!   loaded for as long as the returned `LoadedDevice` lives.
//!
//! Both paths log environment failures at error severity and return
//! `Error::InitializationFailed`.

use std::path::{Path, PathBuf};
use libloading::Library;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::rhi::{Context, Device};
use crate::{rhi_error, rhi_info, rhi_warn};

const SOURCE: &str = "blaze::rhi::backend";

// ============================================================================
// Registry
// ============================================================================

/// Device factory function type
pub type DeviceFactory = Box<dyn Fn(&Context) -> Result<Box<dyn Device>> + Send + Sync>;

/// Backends available to the application, keyed by name
#[derive(Default)]
pub struct DeviceRegistry {
    backends: FxHashMap<String, DeviceFactory>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend
    ///
    /// # Arguments
    ///
    /// * `name` - Backend name (e.g., "opengl")
    /// * `factory` - Creates a device from a context
    ///
    /// Registering a name twice replaces the previous factory.
    pub fn register_backend<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Context) -> Result<Box<dyn Device>> + Send + Sync + 'static,
    {
        if self.backends.insert(name.to_string(), Box::new(factory)).is_some() {
            rhi_warn!(SOURCE, "Backend '{}' registered twice, previous factory replaced", name);
        }
    }

    pub fn has_backend(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// Registered backend names, sorted
    pub fn backend_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Create a device using a registered backend
    ///
    /// # Arguments
    ///
    /// * `name` - Name the backend was registered under
    /// * `context` - Configuration and platform context handed to the factory
    pub fn create_device(&self, name: &str, context: &Context) -> Result<Box<dyn Device>> {
        let Some(factory) = self.backends.get(name) else {
            rhi_error!(SOURCE, "Backend '{}' not found (registered: {:?})", name, self.backend_names());
            return Err(Error::InitializationFailed(format!("Backend '{}' not found", name)));
        };
        let device = factory(context)?;
        rhi_info!(SOURCE, "Device '{}' created by backend '{}'", device.name(), name);
        Ok(device)
    }
}

// ============================================================================
// Shared library loading
// ============================================================================

/// Entry point exported by backend shared libraries (nul terminated)
pub const CREATE_DEVICE_INSTANCE_SYMBOL: &[u8] = b"create_rhi_device_instance\0";

/// Signature of `create_rhi_device_instance`
///
/// Returns null on failure. Ownership of a non-null instance passes to the
/// caller, which releases it with `Box::from_raw`. Backend and application
/// must be built with the same compiler and `blaze_rhi` version.
pub type CreateDeviceInstanceFn = unsafe extern "C" fn(context: *const Context) -> *mut DeviceInstance;

/// Device handed across the shared library boundary
pub struct DeviceInstance {
    pub device: Box<dyn Device>,
}

impl DeviceInstance {
    /// Box a device for returning from `create_rhi_device_instance`
    pub fn into_raw(device: Box<dyn Device>) -> *mut DeviceInstance {
        Box::into_raw(Box::new(DeviceInstance { device }))
    }
}

/// Platform file name of a backend library
///
/// `shared_library_name("opengl")` is `librhi_opengl.so` on Linux,
/// `librhi_opengl.dylib` on macOS and `rhi_opengl.dll` on Windows.
pub fn shared_library_name(name: &str) -> String {
    format!("{}rhi_{}{}", std::env::consts::DLL_PREFIX, name, std::env::consts::DLL_SUFFIX)
}

/// Full path of a backend library inside `search_directory`
pub fn shared_library_path(name: &str, search_directory: &Path) -> PathBuf {
    search_directory.join(shared_library_name(name))
}

/// Device created by a dynamically loaded backend
///
/// The device is dropped before the library that contains its code.
pub struct LoadedDevice {
    device: Box<dyn Device>,
    library_path: PathBuf,
    _library: Library,
}

impl LoadedDevice {
    pub fn device(&self) -> &dyn Device {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> &mut dyn Device {
        self.device.as_mut()
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }
}

/// Load `rhi_<name>` from `search_directory` and create a device with it
///
/// # Errors
///
/// `Error::InitializationFailed` when the library is missing, does not export
/// `create_rhi_device_instance`, or the backend could not create a device.
pub fn load_device(name: &str, search_directory: &Path, context: &Context) -> Result<LoadedDevice> {
    let library_path = shared_library_path(name, search_directory);

    let library = unsafe { Library::new(&library_path) }.map_err(|e| {
        rhi_error!(SOURCE, "Failed to load backend library '{}': {}", library_path.display(), e);
        Error::InitializationFailed(format!("Backend library '{}' not found", library_path.display()))
    })?;

    let create_device_instance: CreateDeviceInstanceFn = unsafe {
        let symbol = library
            .get::<CreateDeviceInstanceFn>(CREATE_DEVICE_INSTANCE_SYMBOL)
            .map_err(|e| {
                rhi_error!(
                    SOURCE,
                    "Backend library '{}' does not export create_rhi_device_instance: {}",
                    library_path.display(),
                    e
                );
                Error::InitializationFailed(format!(
                    "Missing create_rhi_device_instance in '{}'",
                    library_path.display()
                ))
            })?;
        *symbol
    };

    let instance = unsafe { create_device_instance(context as *const Context) };
    if instance.is_null() {
        rhi_error!(SOURCE, "Backend '{}' failed to create a device", name);
        return Err(Error::InitializationFailed(format!("Backend '{}' returned no device", name)));
    }
    let instance = unsafe { Box::from_raw(instance) };

    rhi_info!(SOURCE, "Device '{}' loaded from '{}'", instance.device.name(), library_path.display());
    Ok(LoadedDevice {
        device: instance.device,
        library_path,
        _library: library,
    })
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
