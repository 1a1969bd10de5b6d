pub mod channel;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod history;
pub mod input;
pub mod render;
pub mod roster;
pub mod startup;
