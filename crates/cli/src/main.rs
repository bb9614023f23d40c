mod commands;
mod logging;
mod render;
mod serve;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use triage_core::{CatalogError, KnowledgeBase};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Layout for human-readable reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    Terminal,
    Markdown,
}

/// Rule-based fever triage: ranks likely diseases from observed symptoms.
#[derive(Parser)]
#[command(
    name = "triage",
    version,
    about = "Rule-based fever triage: ranks likely diseases from observed symptoms"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Rule catalog JSON to use instead of the built-in catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank likely diseases for a set of symptoms
    Diagnose {
        /// Symptom tokens, space- or comma-separated (see `triage symptoms`)
        symptoms: Vec<String>,
        /// Also explain the N highest-ranked diseases
        #[arg(long, default_value = "0")]
        explain_top: usize,
        /// Report layout (terminal or markdown)
        #[arg(long, default_value = "terminal")]
        format: ReportFormat,
    },

    /// Explain which rules supported one disease for a set of symptoms
    Explain {
        /// Disease id (see `triage diseases`)
        disease: String,
        /// Symptom tokens, space- or comma-separated
        symptoms: Vec<String>,
        /// Report layout (terminal or markdown)
        #[arg(long, default_value = "terminal")]
        format: ReportFormat,
    },

    /// List the rule catalog
    Rules {
        /// Only rules supporting this disease
        #[arg(long)]
        disease: Option<String>,
    },

    /// List the recognized symptom vocabulary
    Symptoms,

    /// List the diseases the catalog can conclude
    Diseases,

    /// Validate a rule catalog JSON file
    Validate {
        /// Path to the catalog JSON file
        catalog: PathBuf,
    },

    /// Start the triage HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level) {
        if !cli.quiet {
            eprintln!("warning: {}", e);
        }
    }

    // `validate` inspects its own file and never needs a knowledge base.
    if let Commands::Validate { catalog } = &cli.command {
        commands::validate::cmd_validate(catalog, cli.output, cli.quiet);
        return;
    }

    let kb = match load_knowledge_base(cli.catalog.as_deref()) {
        Ok(kb) => kb,
        Err(e) => fail(&format!("error: {}", e), cli.output, cli.quiet),
    };
    tracing::info!(catalog = kb.name(), rules = kb.len(), "knowledge base loaded");

    match cli.command {
        Commands::Diagnose {
            symptoms,
            explain_top,
            format,
        } => {
            commands::diagnose::cmd_diagnose(
                &kb,
                &split_symptom_args(&symptoms),
                explain_top,
                format,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Explain {
            disease,
            symptoms,
            format,
        } => {
            commands::explain::cmd_explain(
                &kb,
                &disease,
                &split_symptom_args(&symptoms),
                format,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Rules { disease } => {
            commands::catalog::cmd_rules(&kb, disease.as_deref(), cli.output, cli.quiet);
        }
        Commands::Symptoms => {
            commands::catalog::cmd_symptoms(&kb, cli.output, cli.quiet);
        }
        Commands::Diseases => {
            commands::catalog::cmd_diseases(&kb, cli.output, cli.quiet);
        }
        Commands::Validate { .. } => unreachable!("handled before loading the catalog"),
        Commands::Serve { port } => {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => fail(
                    &format!("failed to create tokio runtime: {}", e),
                    cli.output,
                    cli.quiet,
                ),
            };
            if let Err(e) = rt.block_on(serve::start_server(port, kb)) {
                fail(&format!("Server error: {}", e), cli.output, cli.quiet);
            }
        }
    }
}

/// Load the catalog at `path`, or the built-in one.
fn load_knowledge_base(path: Option<&Path>) -> Result<KnowledgeBase, CatalogError> {
    match path {
        Some(p) => triage_core::build_knowledge_base(triage_core::load_catalog(p)?),
        None => triage_core::builtin_knowledge_base(),
    }
}

/// Flatten `["high_fever,rash", "nausea"]` into individual tokens.
pub(crate) fn split_symptom_args(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|a| a.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Report `msg` and exit with status 1.
pub(crate) fn fail(msg: &str, output: OutputFormat, quiet: bool) -> ! {
    report_error(msg, output, quiet);
    process::exit(1);
}

/// Print a JSON value to stdout, pretty-printed.
pub(crate) fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("serialization error: {}", e))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_commas_and_spaces() {
        let args = vec![
            "high_fever,rash".to_string(),
            " nausea ".to_string(),
            "chills, sweating".to_string(),
            ",".to_string(),
        ];
        assert_eq!(
            split_symptom_args(&args),
            vec!["high_fever", "rash", "nausea", "chills", "sweating"]
        );
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
