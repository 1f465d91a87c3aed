// Start of file: /src/api/mod.rs

pub mod demo;

// End of file: /src/api/mod.rs
