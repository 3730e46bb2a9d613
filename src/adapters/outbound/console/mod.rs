/// Console adapters for progress and report output
mod progress_reporter;
mod report_printer;

pub use progress_reporter::{StderrProgressReporter, TracingProgressReporter};
pub use report_printer::{ReportFormat, ReportPrinter};
