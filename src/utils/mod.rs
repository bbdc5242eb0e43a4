// src/utils/mod.rs
pub mod convert;
pub mod error;
pub mod html;
pub mod logging;

pub use error::AppError; // Re-export main error type for convenience
pub use error::{FieldError, InvalidContent, NetworkError, TibiaError};
