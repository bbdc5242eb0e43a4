// src/tibia/mod.rs
//! Everything that talks to the site: URLs, HTTP transport and the client facade.

pub mod client;
pub mod config;
pub mod transport;
pub mod urls;
