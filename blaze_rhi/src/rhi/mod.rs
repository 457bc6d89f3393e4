/// RHI module - resource, state and command types shared by every backend

// Module declarations
pub mod resource;
pub mod texture;
pub mod buffer;
pub mod sampler;
pub mod shader;
pub mod root_signature;
pub mod pipeline_state;
pub mod render_target;
pub mod manager;
pub mod capabilities;
pub mod dispatcher;
pub mod device;
pub mod command_buffer;
pub mod command;

#[cfg(test)]
pub(crate) mod mock_device;

// Re-export everything but the command record API, which stays namespaced
// (`command::DrawGraphics::create`)
pub use resource::*;
pub use texture::*;
pub use buffer::*;
pub use sampler::*;
pub use shader::*;
pub use root_signature::*;
pub use pipeline_state::*;
pub use render_target::*;
pub use manager::*;
pub use capabilities::*;
pub use dispatcher::*;
pub use device::*;
pub use command_buffer::*;
