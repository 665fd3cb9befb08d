//! Purpose: `xfce4util-probe` CLI entry point.
//! Role: Binary crate root; parses args, runs the probe, prints the results.
//! Invariants: The canonical run writes exactly three labeled lines to stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `to_exit_code`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use xfce4util_probe::{
    Error, ErrorKind, LABEL_DIR_LOCALIZED, LABEL_HOMEDIR, LABEL_VERSION, PATH_ENV, Probe,
    ProbeReport, SearchPath, to_exit_code,
};

struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

#[derive(Parser)]
#[command(
    name = "xfce4util-probe",
    version,
    about = "Smoke-probe a built libxfce4util through its public entry points",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Finds a locally built copy of the library, loads it, and calls three
accessors to prove the bindings work end to end.

Checked, in order:
  - `xfce_get_homedir` (home directory)
  - `xfce_get_dir_localized` (localized variant of the home directory)
  - `xfce_version_string` (release identifier)
"#,
    after_help = r#"EXAMPLES
  $ xfce4util-probe
  homedir: /home/somebody
  get_dir_localized: /home/somebody
  version: 4.21.0

  $ xfce4util-probe --search-path ../libxfce4util/.libs --json
  {"homedir":"/home/somebody","dir_localized":"/home/somebody","version":"4.21.0"}

ENVIRONMENT
  XFCE4UTIL_PROBE_PATH  colon-separated search directories (same override as --search-path)
  RUST_LOG              diagnostic verbosity, e.g. RUST_LOG=debug for resolution traces
"#
)]
struct Cli {
    /// Directory to search for the library; repeatable, replaces the defaults
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    search_path: Vec<PathBuf>,

    /// Emit one JSON object instead of the three text lines
    #[arg(long)]
    json: bool,

    /// ANSI color for human-facing output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => {
                let message = clap_error_summary(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint("Try `xfce4util-probe --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let search = SearchPath::from_invocation(&cli.search_path);
    let probe = Probe::open(&search).map_err(|err| (add_load_hint(err), color_mode))?;

    if cli.json {
        let report = ProbeReport::collect(&probe).map_err(|err| (err, color_mode))?;
        emit_report_json(&report, color_mode).map_err(|err| (err, color_mode))?;
        return Ok(RunOutcome::ok());
    }

    let homedir = probe.homedir().map_err(|err| (err, color_mode))?;
    println!("{LABEL_HOMEDIR}{homedir}");
    let dir_localized = probe
        .dir_localized(&homedir)
        .map_err(|err| (err, color_mode))?;
    println!("{LABEL_DIR_LOCALIZED}{dir_localized}");
    let version = probe.version_string().map_err(|err| (err, color_mode))?;
    println!("{LABEL_VERSION}{version}");

    Ok(RunOutcome::ok())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn add_load_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::NotFound => err.with_hint(format!(
            "Set {PATH_ENV} or pass --search-path to point at a built copy of libxfce4util."
        )),
        ErrorKind::Symbol => {
            err.with_hint("The library loaded but lacks a required entry point; check the build.")
        }
        _ => err,
    }
}

fn emit_report_json(report: &ProbeReport, color_mode: ColorMode) -> Result<(), Error> {
    let value = serde_json::to_value(report).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to serialize report")
            .with_source(err)
    })?;
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let pretty = is_tty || use_color;
    let json = if pretty {
        if use_color {
            pretty_json(&value)
        } else {
            serde_json::to_string_pretty(&value)
                .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
        }
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
    Ok(())
}

// The report is flat, so only string spans need color.
fn pretty_json(value: &Value) -> String {
    let plain = serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    let mut out = String::with_capacity(plain.len());
    let mut in_string = false;
    let mut escaped = false;
    for ch in plain.chars() {
        if in_string && escaped {
            out.push(ch);
            escaped = false;
            continue;
        }
        if in_string && ch == '\\' {
            out.push(ch);
            escaped = true;
            continue;
        }
        if ch == '"' {
            if in_string {
                out.push(ch);
                out.push_str("\u{1b}[0m");
                in_string = false;
                continue;
            }
            out.push_str("\u{1b}[32m");
            out.push(ch);
            in_string = true;
            continue;
        }
        out.push(ch);
    }
    out
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "library not found".to_string(),
        ErrorKind::Version => "version requirement failed".to_string(),
        ErrorKind::Symbol => "missing symbol".to_string(),
        ErrorKind::Call => "native call failed".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    for cause in error_causes(err) {
        lines.push(format!(
            "{} {cause}",
            colorize_label("cause:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
