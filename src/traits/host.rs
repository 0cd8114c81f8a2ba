use crate::core::{PendingResize, Viewport};

/// Handle for one scheduled display-refresh callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Handle for one resize subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Identity of a renderer's drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Display-refresh scheduling, one callback per request
pub trait FrameScheduler {
    /// Schedule a callback for the next refresh
    fn request_frame(&mut self) -> FrameRequest;

    /// Drop a scheduled callback; unknown or already fired requests are ignored
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Viewport size-change notifications
pub trait ResizeSource {
    /// Post every future viewport size into `sink` until unsubscribed
    fn subscribe_resize(&mut self, sink: PendingResize) -> ListenerId;

    fn unsubscribe_resize(&mut self, id: ListenerId);
}

/// Where the drawing surface lives
pub trait MountTarget {
    /// Whether the host can drive a graphics surface at all
    fn is_interactive(&self) -> bool;

    /// Current size in physical pixels
    fn viewport(&self) -> Viewport;

    fn attach_surface(&mut self, surface: SurfaceHandle);

    fn detach_surface(&mut self, surface: SurfaceHandle);
}

/// Everything the backdrop needs from its environment
pub trait Host: FrameScheduler + ResizeSource + MountTarget {}

impl<T: FrameScheduler + ResizeSource + MountTarget> Host for T {}
