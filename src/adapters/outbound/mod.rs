/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod console;
pub mod cve_store;
pub mod filesystem;
pub mod memory;
pub mod network;
