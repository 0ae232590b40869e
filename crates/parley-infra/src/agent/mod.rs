pub mod client;
pub mod stream;

pub use client::HttpAgentClient;
