// Start of file: /src/utils/mod.rs

/*
    * Re-exports for utility modules like the outer error boundary
    * and shared JSON helpers.
*/

pub mod error_handler;
pub mod utils;

// End of file: /src/utils/mod.rs
