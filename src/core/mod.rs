pub mod clock;
pub mod frame;
pub mod gpu_context;
pub mod input_adapter;
pub mod lifecycle;
pub mod ramp_texture;
pub mod render_target;
pub mod resize;
pub mod scene_renderer;
pub mod viewport;

pub use clock::Clock;
pub use frame::FrameClock;
pub use gpu_context::GpuContext;
pub use input_adapter::PointerInput;
pub use lifecycle::{Backdrop, LifecycleHandle, LifecycleState, MountError, TickOutcome};
pub use ramp_texture::{RampImage, RampLoader, RampPoll, RampSource};
pub use render_target::{EnvironmentTarget, ENV_TARGET_SIZE};
pub use resize::PendingResize;
pub use scene_renderer::{GpuRendererFactory, GpuSceneRenderer};
pub use viewport::Viewport;
