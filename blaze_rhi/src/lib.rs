/*!
# Blaze RHI

Backend-agnostic Render Hardware Interface.

The crate describes GPU resources, fixed-function state and commands without
committing to a graphics API. A backend (see `blaze_rhi_opengl`) implements the
`Device` trait family and is created either through a `DeviceRegistry` or by
loading its shared library at runtime.

## Architecture

- **Device**: capability queries, resource factories, command dispatch
- **BufferManager / TextureManager**: descriptor -> buffer/texture factories
- **RootSignature / ResourceGroup**: binding layout and bound resource sets
- **GraphicsPipelineState / ComputePipelineState**: immutable pipeline objects
- **CommandBuffer**: ordered, replayable command log recorded through `command::*`

Caller bugs are reported as contract violations: fatal in debug builds,
recoverable `Error::ContractViolation` values when the assert mode says so.
*/

// Internal modules
mod error;
mod assert;
pub mod log;
pub mod rhi;
pub mod backend;

// Main blaze namespace module
pub mod blaze {
    // Error types
    pub use crate::error::{Error, Result};

    // Contract violations
    pub use crate::assert::{assert_mode, contract_violation, set_assert_mode, AssertMode, AssertModeGuard};

    // Device trait and creation
    pub use crate::rhi::Device;
    pub use crate::backend::{load_device, DeviceRegistry, LoadedDevice};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, Log, LogEntry, LogSeverity, Logger};
    }

    // RHI sub-module with all resource, state and command buffer types
    pub mod rhi {
        pub use crate::rhi::*;
    }

    // Command record API
    pub mod command {
        pub use crate::rhi::command::*;
    }
}

// Re-export math library at crate root
pub use glam;
