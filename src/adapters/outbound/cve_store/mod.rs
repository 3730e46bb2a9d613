/// Local CVE store adapters
mod nvd_feed_repository;

pub use nvd_feed_repository::NvdFeedCveRepository;
