pub mod auth;
pub mod client;
pub mod types;

pub use client::SpotifyCatalog;
