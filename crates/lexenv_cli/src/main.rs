//! lexenv: Replay scope-chain driver traces.
//!
//! Usage:
//!   lexenv [options] [trace...]
//!
//! Prints every resolution a trace asks for and reports the diagnostics a
//! compiler driving the same calls would see.

use clap::Parser as ClapParser;
use lexenv_diagnostics::{Diagnostic, DiagnosticCategory};
use lexenv_options::{parse_options_file, ProjectConfig};
use lexenv_replay::Session;
use log::LevelFilter;
use std::path::Path;
use std::process;
use std::time::Instant;

const DEFAULT_PROJECT: &str = "lexenv.json";

#[derive(ClapParser, Debug)]
#[command(name = "lexenv", about = "lexenv - compile-time lexical environment tracer", disable_version_flag = true)]
struct Cli {
    /// Trace files to replay.
    #[arg(value_name = "TRACE")]
    files: Vec<String>,

    /// Path to lexenv.json.
    #[arg(short = 'p', long = "project")]
    project: Option<String>,

    /// Warn when a program re-declares a global binding differently.
    #[arg(long)]
    strict: bool,

    /// Log scope pushes, pops and reuse.
    #[arg(long)]
    verbose: bool,

    /// Initialize a lexenv.json file.
    #[arg(long)]
    init: bool,

    /// Print the version.
    #[arg(short = 'v', long)]
    version: bool,

    /// Print diagnostics without color.
    #[arg(long = "no-pretty")]
    no_pretty: bool,
}

impl Cli {
    /// Whether diagnostics may be colored when stderr is a terminal.
    fn pretty(&self) -> bool {
        !self.no_pretty
    }
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.version {
        println!("lexenv Version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if cli.init {
        run_init();
        return;
    }

    let exit_code = run_replay(&cli);
    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run_replay(cli: &Cli) -> i32 {
    let start = Instant::now();

    let (files, config) = resolve_input_files(cli);
    if files.is_empty() {
        print_error("No trace files found.");
        return 1;
    }

    // CLI options override lexenv.json
    let mut options = config.map(|c| c.options()).unwrap_or_default();
    if cli.strict {
        options.strict_redeclaration = Some(true);
    }

    let mut session = match Session::new(files, options) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            return 1;
        }
    };
    if let Err(err) = session.load_root_files() {
        eprintln!("{:?}", miette::Report::new(err));
        return 1;
    }

    let report = session.run();
    for output in &report.outputs {
        println!("{}", output);
    }

    let use_color = cli.pretty() && atty_is_terminal();
    for diag in report.diagnostics.diagnostics() {
        print_diagnostic(diag, use_color);
    }

    if !report.aborted.is_empty() {
        for file in &report.aborted {
            print_error(&format!("Replay of '{}' was abandoned after a scope error.", file));
        }
        return 1;
    }

    if report.has_errors() {
        let count = report.diagnostics.error_count();
        let plural = if count == 1 { "" } else { "s" };
        if use_color {
            eprintln!("\n{}Found {} error{}.{}", RED, count, plural, RESET);
        } else {
            eprintln!("\nFound {} error{}.", count, plural);
        }
        return 2;
    }

    if use_color {
        eprintln!("{}Replay completed in {:.2}s.{}", GRAY, start.elapsed().as_secs_f64(), RESET);
    }
    0
}

fn run_init() {
    let path = Path::new(DEFAULT_PROJECT);
    if path.exists() {
        print_error("A lexenv.json file already exists in the current directory.");
        process::exit(1);
    }

    let written = ProjectConfig::starter()
        .to_json()
        .map_err(|e| e.to_string())
        .and_then(|text| std::fs::write(path, text).map_err(|e| e.to_string()));
    match written {
        Ok(()) => println!("Successfully created a lexenv.json file."),
        Err(e) => {
            print_error(&format!("Failed to create lexenv.json: {}", e));
            process::exit(1);
        }
    }
}

fn resolve_input_files(cli: &Cli) -> (Vec<String>, Option<ProjectConfig>) {
    let project = match cli.project.as_deref() {
        Some(project) => Some(project),
        None if cli.files.is_empty() && Path::new(DEFAULT_PROJECT).exists() => Some(DEFAULT_PROJECT),
        None => None,
    };
    let Some(project) = project else {
        return (cli.files.clone(), None);
    };

    let config = match parse_options_file(project) {
        Ok(config) => config,
        Err(e) => {
            print_error(&format!("Failed to read project '{}': {}", project, e));
            process::exit(1);
        }
    };
    let files = if cli.files.is_empty() {
        let root_dir = Path::new(project).parent().unwrap_or_else(|| Path::new("."));
        config
            .resolved_files(root_dir)
            .into_iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect()
    } else {
        cli.files.clone()
    };
    (files, Some(config))
}

fn print_diagnostic(diag: &Diagnostic, use_color: bool) {
    if !use_color {
        eprintln!("{}", diag);
        return;
    }
    let color = match diag.category {
        DiagnosticCategory::Error => RED,
        DiagnosticCategory::Warning => YELLOW,
        DiagnosticCategory::Message => GRAY,
    };
    if let Some(ref file) = diag.file {
        eprint!("{}{}{}", CYAN, file, RESET);
        if let Some(line) = diag.line {
            eprint!("({})", line);
        }
        eprint!(": ");
    }
    eprintln!(
        "{}{}{}{} {}LX{}{}: {}",
        BOLD, color, diag.category, RESET, CYAN, diag.code, RESET, diag.message_text
    );
}

fn print_error(msg: &str) {
    if atty_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn atty_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_by_default() {
        let cli = Cli::try_parse_from(["lexenv", "main.trace"]).unwrap();
        assert!(cli.pretty());
        assert_eq!(cli.files, vec!["main.trace".to_string()]);
    }

    #[test]
    fn test_no_pretty_turns_color_off() {
        let cli = Cli::try_parse_from(["lexenv", "--no-pretty", "main.trace"]).unwrap();
        assert!(!cli.pretty());
    }

    #[test]
    fn test_pretty_takes_no_value() {
        assert!(Cli::try_parse_from(["lexenv", "--pretty", "false"]).is_err());
    }
}
