//! Display collaborators
//!
//! The engine itself only knows bitmaps. These types own the memory that
//! ends up on screen and hand it to drawing code as non-owning views.

mod framebuffer;
#[cfg(feature = "window")]
mod window;

pub use framebuffer::Framebuffer;
#[cfg(feature = "window")]
pub use window::{InputEvent, RenderTarget, Window};
