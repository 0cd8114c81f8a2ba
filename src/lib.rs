pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod displacement;
pub mod math;
pub mod mesh;
pub mod scene;
pub mod shading;
pub mod traits;
pub mod types;

pub use crate::config::BackdropConfig;
pub use crate::core::{Backdrop, LifecycleState, MountError, TickOutcome, Viewport};
