//! vulntrack - Device vulnerability tracking backend
//!
//! This library tracks network devices (firewalls, routers, appliances) and
//! scans them for known vulnerabilities by combining a local NVD CVE feed,
//! Brave web search and Gemini AI analysis into one confidence-scored report.
//! It follows hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`vulnerability_scanning`): Devices, scans, findings and
//!   the pure matching, filtering and merging services
//! - **Application Layer** (`application`): Use cases and DTOs
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): The HTTP API plus implementations of the ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use vulntrack::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let cve_repository = NvdFeedCveRepository::load(std::path::Path::new("nvdcve-1.1-2024.json"))?;
//! let web_search = BraveSearchClient::new(BraveSearchSettings::default(), RetryPolicy::default())?;
//! let knowledge = GeminiClient::new(GeminiSettings::default(), RetryPolicy::default())?;
//!
//! let use_case = ScanDeviceUseCase::new(
//!     Arc::new(cve_repository),
//!     Arc::new(web_search),
//!     Arc::new(knowledge),
//! );
//!
//! let target = ScanTarget::new("Fortinet", "FortiGate 60F", "7.0.12")?;
//! let report = use_case.execute(&target).await?;
//! println!("{} findings ({})", report.vulnerabilities.len(), report.method);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod logging;
pub mod ports;
pub mod shared;
pub mod vulnerability_scanning;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::inbound::http::{build_router, AppState};
    pub use crate::adapters::outbound::console::{
        ReportFormat, ReportPrinter, StderrProgressReporter, TracingProgressReporter,
    };
    pub use crate::adapters::outbound::cve_store::NvdFeedCveRepository;
    pub use crate::adapters::outbound::memory::{InMemoryDeviceRepository, InMemoryScanRepository};
    pub use crate::adapters::outbound::network::{
        BraveSearchClient, BraveSearchSettings, CachingWebSearch, GeminiClient, GeminiSettings,
        RetryPolicy,
    };
    pub use crate::application::use_cases::{
        BatchScanConfig, BatchScanUseCase, ManageDevicesUseCase, RecordScanUseCase,
        ScanDeviceUseCase, ScanJobsUseCase,
    };
    pub use crate::ports::outbound::{
        CveRepository, DeviceRepository, KnowledgeService, ProgressReporter, ScanRepository,
        WebSearchService,
    };
    pub use crate::shared::Result;
    pub use crate::vulnerability_scanning::domain::{
        CveId, Device, ScanMethod, ScanReport, ScanTarget, Severity, Vulnerability,
    };
}
