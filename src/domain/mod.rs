//! Run-level domain types shared by the engine and its collaborators.
mod window;

pub use window::TestWindow;
