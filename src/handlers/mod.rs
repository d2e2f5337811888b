pub mod chirps;
