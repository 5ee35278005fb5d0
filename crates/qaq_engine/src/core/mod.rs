//! Core editor modules
//!
//! Houses the unified configuration tree shared by every subsystem.

pub mod config;
