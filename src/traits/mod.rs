pub mod host;
pub mod renderer;

pub use host::*;
pub use renderer::*;
