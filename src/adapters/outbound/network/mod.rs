/// Network adapters for external API calls
mod brave_search_client;
mod caching_web_search;
mod gemini_client;
mod postgrest_client;
mod rate_limiter;
mod retry;
mod supabase_device_repository;
mod supabase_scan_repository;

pub use brave_search_client::{BraveSearchClient, BraveSearchSettings};
pub use caching_web_search::CachingWebSearch;
pub use gemini_client::{GeminiClient, GeminiSettings};
pub use postgrest_client::{PostgrestClient, SupabaseSettings};
pub use rate_limiter::MinIntervalLimiter;
pub use retry::RetryPolicy;
pub use supabase_device_repository::SupabaseDeviceRepository;
pub use supabase_scan_repository::SupabaseScanRepository;
