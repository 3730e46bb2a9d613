/// Mock implementations for testing
mod mock_cve_repository;
mod mock_knowledge_service;
mod mock_progress_reporter;
mod mock_web_search;

pub use mock_cve_repository::MockCveRepository;
pub use mock_knowledge_service::MockKnowledgeService;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_web_search::MockWebSearch;
