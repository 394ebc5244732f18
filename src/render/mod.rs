//! Frame compositing.

/// Photo placement and rendering.
pub mod compositor;
/// Canvas-sized frame buffers.
pub mod frame;
