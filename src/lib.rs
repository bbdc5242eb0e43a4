// src/lib.rs
//! Typed records extracted from Tibia.com pages and the TibiaData JSON API.
//!
//! Each entity exposes `from_content` (site markup) and, where the JSON API
//! mirrors it, `from_alternate_json`. Both return `Ok(None)` when the document
//! states the resource does not exist and `Err(InvalidContent)` when the
//! document belongs to some other section.

pub mod extractors;
pub mod models;
pub mod storage;
pub mod tibia;
pub mod utils;

pub use models::*;
pub use tibia::client::{Client, TibiaResponse};
pub use tibia::config::ClientConfig;
pub use tibia::transport::{RawResponse, ReqwestTransport, Transport};
pub use utils::error::{InvalidContent, NetworkError, TibiaError};
