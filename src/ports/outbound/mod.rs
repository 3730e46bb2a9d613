/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (CVE store, search and AI APIs,
/// persistence, console, device list files).
pub mod cve_repository;
pub mod device_list_reader;
pub mod device_repository;
pub mod knowledge_service;
pub mod output_presenter;
pub mod progress_reporter;
pub mod scan_repository;
pub mod web_search_service;

pub use cve_repository::CveRepository;
pub use device_list_reader::DeviceListReader;
pub use device_repository::{DeviceFilter, DeviceRepository, DeviceSearch};
pub use knowledge_service::KnowledgeService;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use scan_repository::{ScanFilter, ScanRepository};
pub use web_search_service::WebSearchService;
