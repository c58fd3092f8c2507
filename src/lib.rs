//! spacesh: a command shell for Spacewalk and Uyuni servers
//!
//! The library holds the session manager, the disk-backed entity caches and
//! the resolver that turns names and selection tokens into server ids.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod resolve;
pub mod session;
