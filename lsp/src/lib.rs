pub mod analyzer;
pub mod protocol;
pub mod server;
