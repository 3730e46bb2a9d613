/// Inbound adapters - Driving side of the application (HTTP API)
pub mod http;
