/// Result alias used by every layer below the HTTP boundary.
/// Typed failures are `VulnTrackError` values carried inside `anyhow::Error`.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
