use std::io::IsTerminal;
use std::path::Path;
use std::process;
use std::sync::Arc;

use vulntrack::adapters::inbound::http::serve;
use vulntrack::adapters::outbound::console::{
    ReportPrinter, StderrProgressReporter, TracingProgressReporter,
};
use vulntrack::adapters::outbound::filesystem::{FileSystemReader, FileSystemWriter, StdoutPresenter};
use vulntrack::application::use_cases::DeviceScanOutcome;
use vulntrack::bootstrap::{build_app_state, ScanSources};
use vulntrack::cli::{Args, Command, OutputArgs};
use vulntrack::config::{discover_config, load_config_from_path, AppConfig};
use vulntrack::logging::init_tracing;
use vulntrack::ports::outbound::{DeviceListReader, OutputPresenter};
use vulntrack::shared::error::ExitCode;
use vulntrack::shared::Result;
use vulntrack::vulnerability_scanning::domain::ScanTarget;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    match run(args).await {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            for cause in e.chain().skip(1) {
                eprintln!("\nCaused by: {}", cause);
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let file = match args.config.as_deref() {
        Some(path) => load_config_from_path(path)?,
        None => discover_config(Path::new("."))?.unwrap_or_default(),
    };
    let config = AppConfig::from_env(file)?;

    let directives = if args.verbose {
        "vulntrack=debug"
    } else {
        config.log_filter.as_str()
    };
    init_tracing(config.log_format, directives)?;

    match args.command {
        Command::Serve { bind } => {
            let sources = ScanSources::from_config(&config)?;
            let state = build_app_state(&config, &sources, Arc::new(TracingProgressReporter))?;
            serve(bind.unwrap_or(config.bind), state).await?;
            Ok(ExitCode::Success)
        }
        Command::Scan {
            brand,
            model,
            firmware,
            output,
        } => {
            let target = ScanTarget::new(&brand, &model, &firmware)?;
            let sources = ScanSources::from_config(&config)?;
            let scanner = sources.batch_scanner(Arc::new(TracingProgressReporter), &config);

            let outcome = scanner.scan_one(target).await;
            let report = match &outcome.result {
                Ok(report) => report,
                Err(error) => anyhow::bail!("Scan of {} failed: {}", outcome.target.label(), error),
            };

            let printer = report_printer(&output);
            present(&output, &printer.render_report(&outcome.target, report)?)?;

            Ok(if report.has_vulnerabilities() {
                ExitCode::VulnerabilitiesDetected
            } else {
                ExitCode::Success
            })
        }
        Command::Batch { file, output } => {
            let targets = FileSystemReader::new().read_device_list(&file)?;
            let sources = ScanSources::from_config(&config)?;
            let scanner = sources.batch_scanner(Arc::new(StderrProgressReporter::new()), &config);

            let outcomes = scanner.execute(targets).await;

            let printer = report_printer(&output);
            present(&output, &printer.render_batch(&outcomes)?)?;

            Ok(batch_exit_code(&outcomes))
        }
    }
}

fn report_printer(output: &OutputArgs) -> ReportPrinter {
    let color = !output.no_color && output.output.is_none() && std::io::stdout().is_terminal();
    ReportPrinter::new(output.format.into(), color)
}

fn present(output: &OutputArgs, content: &str) -> Result<()> {
    let presenter: Box<dyn OutputPresenter> = match &output.output {
        Some(path) => Box::new(FileSystemWriter::new(path.clone())),
        None => Box::new(StdoutPresenter::new()),
    };
    presenter.present(content)
}

/// Vulnerabilities take precedence over failed device scans.
fn batch_exit_code(outcomes: &[DeviceScanOutcome]) -> ExitCode {
    let vulnerable = outcomes
        .iter()
        .any(|o| o.result.as_ref().is_ok_and(|r| r.has_vulnerabilities()));
    if vulnerable {
        ExitCode::VulnerabilitiesDetected
    } else if outcomes.iter().any(|o| !o.is_success()) {
        ExitCode::ApplicationError
    } else {
        ExitCode::Success
    }
}
