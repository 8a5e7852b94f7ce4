#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub mod generate;

#[derive(Parser, Debug)]
#[command(
    name = "typeweave",
    version,
    about = "\x1b[36mtypeweave\x1b[0m compiles web-API metadata into typed TypeScript clients"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate client files from a metadata document
    Generate(generate::GenerateArgs),
}

/// Parse `args` (including the program name) and run the command.
/// Returns the process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    init_tracing();
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => generate::run(&args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn init_tracing() {
    // TYPEWEAVE_LOG takes a plain level ("debug") or a full filter spec
    // like "typeweave_core=trace".
    let filter = match std::env::var("TYPEWEAVE_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("typeweave_core={level},typeweave_cli={level}")
        }
        Ok(spec) => spec,
        Err(_) => "typeweave_core=warn,typeweave_cli=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    // A second call (tests run several commands per process) keeps the first
    // subscriber.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_plain_level() {
        assert!(is_plain_level("debug"));
        assert!(is_plain_level("WARN"));
        assert!(!is_plain_level("typeweave_core=debug"));
    }

    #[test]
    fn test_no_command_prints_help() {
        assert_eq!(run_cli(vec!["typeweave".into()]), 0);
    }

    #[test]
    fn test_unknown_flag_fails() {
        assert_eq!(run_cli(vec!["typeweave".into(), "--bogus".into()]), 2);
    }
}
