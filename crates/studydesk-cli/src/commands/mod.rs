pub mod config;
mod session;
pub mod timer;
