/// Ports module defining interfaces for hexagonal architecture
///
/// The application drives infrastructure only through these outbound
/// (driven) ports; the HTTP API calls the use cases directly.
pub mod outbound;
