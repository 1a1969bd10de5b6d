//! Terminal UI layer for the interactive chat.
//!
//! Key submodules include:
//! - [`chat_loop`]: the main interaction loop that feeds keys to
//!   [`crate::core::input`] and runs alongside the dispatcher task.
//! - [`view`]: transcript, user list and input state, plus the
//!   [`crate::core::render::ChatRenderer`] that writes into it.
//! - [`renderer`] and [`transcript`]: frame layout and line formatting.
//! - [`theme`]: color and style policy.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns event routing and session coordination.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
pub mod transcript;
pub mod view;
