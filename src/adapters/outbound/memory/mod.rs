/// In-memory persistence adapters, used when no Supabase project is configured
mod device_repository;
mod scan_repository;

pub use device_repository::InMemoryDeviceRepository;
pub use scan_repository::InMemoryScanRepository;
