pub mod chirp;

pub use chirp::Chirp;
