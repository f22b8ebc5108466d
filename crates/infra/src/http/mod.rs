//! Shared HTTP transport

mod client;

pub use client::{HttpClient, HttpClientBuilder};
pub(crate) use client::read_json;
