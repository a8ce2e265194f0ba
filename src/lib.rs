pub mod card;
pub mod config;
pub mod error;
pub mod rng;
pub mod simulation;

pub use error::PenneyError;
