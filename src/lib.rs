pub mod config;
pub mod engines;
pub mod error;
pub mod music;

pub use error::{Result, TunegenError};
