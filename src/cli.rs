use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::adapters::outbound::console::ReportFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid format: {}. Please specify 'text' or 'json'",
                s
            )),
        }
    }
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Track network devices and scan them for known vulnerabilities
#[derive(Parser, Debug)]
#[command(name = "vulntrack")]
#[command(version)]
#[command(about = "Track network devices and scan them for known vulnerabilities", long_about = None)]
pub struct Args {
    /// Path to a config file (defaults to ./vulntrack.config.yml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on, overrides server.bind
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Scan a single device and print its report
    Scan {
        #[arg(long)]
        brand: String,

        #[arg(long)]
        model: String,

        /// Firmware version
        #[arg(long = "version", value_name = "VERSION")]
        firmware: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Scan every device listed in a YAML file
    Batch {
        /// Device list: `devices:` entries with brand, model, version and an optional name
        #[arg(value_name = "DEVICES_FILE")]
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::str::FromStr;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("Text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("table").unwrap(), OutputFormat::Text);
    }

    #[test]
    fn test_output_format_from_str_invalid() {
        let error = OutputFormat::from_str("xml").unwrap_err();
        assert!(error.contains("Invalid format"));
        assert!(error.contains("xml"));
        assert!(error.contains("text"));
        assert!(error.contains("json"));
        assert!(OutputFormat::from_str("").is_err());
    }

    #[test]
    fn test_parse_scan_command() {
        let args = Args::try_parse_from([
            "vulntrack",
            "scan",
            "--brand",
            "Fortinet",
            "--model",
            "FortiGate 60F",
            "--version",
            "7.0.12",
            "--format",
            "json",
        ])
        .unwrap();

        match args.command {
            Command::Scan {
                brand,
                model,
                firmware,
                output,
            } => {
                assert_eq!(brand, "Fortinet");
                assert_eq!(model, "FortiGate 60F");
                assert_eq!(firmware, "7.0.12");
                assert_eq!(output.format, OutputFormat::Json);
                assert!(output.output.is_none());
                assert!(!output.no_color);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "vulntrack",
            "batch",
            "devices.yml",
            "--config",
            "custom.yml",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("custom.yml")));
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Batch { .. }));
    }

    #[test]
    fn test_serve_bind_override() {
        let args = Args::try_parse_from(["vulntrack", "serve", "--bind", "127.0.0.1:9000"]).unwrap();
        match args.command {
            Command::Serve { bind } => assert_eq!(bind, Some("127.0.0.1:9000".parse().unwrap())),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_scan_requires_all_device_fields() {
        let result = Args::try_parse_from(["vulntrack", "scan", "--brand", "Cisco"]);
        assert!(result.is_err());
    }
}
