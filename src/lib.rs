pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod figures;
pub mod render;
pub mod stats;

pub use error::{FigureError, Result};
