pub mod chirp_service;
pub mod validation;

pub use chirp_service::{ChirpError, ChirpService};
