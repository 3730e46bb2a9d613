/// Vulnerability scanning domain: entities, pure services and policies
pub mod domain;
pub mod policies;
pub mod services;
