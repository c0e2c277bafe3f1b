pub mod commands;
pub mod config;
pub mod digest;
pub mod discord;
pub mod msg_context;
pub mod platform;
pub mod service;
pub mod state;
pub mod statics;

#[cfg(test)]
pub(crate) mod testing;
