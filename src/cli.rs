//! Command-line interface for ollama-relay.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

/// What the binary should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Start the HTTP/WebSocket API.
    #[default]
    Serve,
    /// Run a single prompt and print the response.
    Ask,
    /// List configured models.
    Models,
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Selected mode.
    pub mode: Mode,
    /// Prompt words for `ask`, joined with spaces.
    pub prompt: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// Prompt file (TXT or PDF) for `ask`.
    pub file: Option<PathBuf>,
    /// Print every fenced snapshot instead of incremental text.
    pub raw: bool,
    /// External program override.
    pub program: Option<String>,
    /// Host address to bind to.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
///
/// The first item is the program name.
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut mode_set = false;
    let mut words: Vec<String> = Vec::new();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('m') | Long("model") => {
                result.model = Some(parser.value()?.parse()?);
            }
            Short('f') | Long("file") => {
                result.file = Some(parser.value()?.parse()?);
            }
            Long("raw") => {
                result.raw = true;
            }
            Long("program") => {
                result.program = Some(parser.value()?.parse()?);
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("host", value))?,
                );
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                let val: String = val.parse()?;
                if !mode_set && words.is_empty() {
                    mode_set = true;
                    result.mode = match val.as_str() {
                        "serve" => Mode::Serve,
                        "ask" => Mode::Ask,
                        "models" => Mode::Models,
                        _ => return Err(ArgsError::UnknownCommand(val)),
                    };
                } else if result.mode == Mode::Ask {
                    words.push(val);
                } else {
                    return Err(ArgsError::UnexpectedArgument(val));
                }
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    if !words.is_empty() {
        result.prompt = Some(words.join(" "));
    }
    if result.prompt.is_some() && result.file.is_some() {
        return Err(ArgsError::Conflict("a prompt", "--file"));
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"ollama-relay {version}
Streams sanitized, render-ready snapshots of model CLI output

USAGE:
    ollama-relay [serve] [OPTIONS]
    ollama-relay ask [OPTIONS] [PROMPT...]
    ollama-relay models [OPTIONS]

COMMANDS:
    serve                   Start the HTTP/WebSocket API (default)
    ask                     Run one prompt and print the response
    models                  List configured models

OPTIONS:
    -m, --model <MODEL>     Model identifier [default: phi4:latest]
    -f, --file <FILE>       Read the prompt from a TXT or PDF file
        --raw               Print each fenced snapshot (ask)
        --program <PATH>    External program to launch [default: ollama]
    -H, --host <ADDR>       Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>       Port to listen on [default: 7860]
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    OLLAMA_RELAY_PROGRAM    External program (overrides config)
    OLLAMA_RELAY_MODEL      Default model (overrides config)
    OLLAMA_RELAY_HOST       Host address (overrides config)
    OLLAMA_RELAY_PORT       Port number (overrides config)
    OLLAMA_RELAY_LOG_LEVEL  Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Start the API on localhost:7860
    ollama-relay

    # Ask a question with a specific model
    ollama-relay ask -m llama3:latest "Why is the sky blue?"

    # Summarize a PDF
    ollama-relay ask -f report.pdf

    # Prompt from stdin
    echo "Hello" | ollama-relay ask
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("ollama-relay {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unknown subcommand.
    UnknownCommand(String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
    /// Two options that cannot be combined.
    Conflict(&'static str, &'static str),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnknownCommand(cmd) => {
                write!(f, "unknown command: '{}'", cmd)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
            Self::Conflict(a, b) => {
                write!(f, "{} cannot be combined with {}", a, b)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("ollama-relay")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert_eq!(result.mode, Mode::Serve);
        assert!(result.host.is_none());
        assert!(result.port.is_none());
        assert!(result.prompt.is_none());
    }

    #[test]
    fn test_serve_host_port() {
        let result = parse_args_from(args(&["serve", "-H", "0.0.0.0", "-p", "8080"])).unwrap();
        assert_eq!(result.mode, Mode::Serve);
        assert_eq!(result.host.unwrap().to_string(), "0.0.0.0");
        assert_eq!(result.port, Some(8080));
    }

    #[test]
    fn test_ask_prompt_words() {
        let result =
            parse_args_from(args(&["ask", "-m", "llama3:latest", "Why", "is", "it?"])).unwrap();
        assert_eq!(result.mode, Mode::Ask);
        assert_eq!(result.model.as_deref(), Some("llama3:latest"));
        assert_eq!(result.prompt.as_deref(), Some("Why is it?"));
    }

    #[test]
    fn test_ask_file() {
        let result = parse_args_from(args(&["ask", "--file", "report.pdf", "--raw"])).unwrap();
        assert_eq!(result.file, Some(PathBuf::from("report.pdf")));
        assert!(result.raw);
        assert!(result.prompt.is_none());
    }

    #[test]
    fn test_prompt_and_file_conflict() {
        let result = parse_args_from(args(&["ask", "-f", "a.txt", "hello"]));
        assert!(matches!(result, Err(ArgsError::Conflict(_, _))));
    }

    #[test]
    fn test_models_command() {
        let result = parse_args_from(args(&["models"])).unwrap();
        assert_eq!(result.mode, Mode::Models);
    }

    #[test]
    fn test_unknown_command() {
        let result = parse_args_from(args(&["chat"]));
        assert!(matches!(result, Err(ArgsError::UnknownCommand(_))));
    }

    #[test]
    fn test_extra_positional_for_serve() {
        let result = parse_args_from(args(&["serve", "extra"]));
        assert!(matches!(result, Err(ArgsError::UnexpectedArgument(_))));
    }

    #[test]
    fn test_program_override() {
        let result = parse_args_from(args(&["--program", "/opt/ollama/bin/ollama"])).unwrap();
        assert_eq!(result.program.as_deref(), Some("/opt/ollama/bin/ollama"));
    }

    #[test]
    fn test_help_flag() {
        let result = parse_args_from(args(&["-h"])).unwrap();
        assert!(result.help);

        let result = parse_args_from(args(&["--help"])).unwrap();
        assert!(result.help);
    }

    #[test]
    fn test_version_flag() {
        let result = parse_args_from(args(&["-V"])).unwrap();
        assert!(result.version);
    }

    #[test]
    fn test_log_level() {
        let result = parse_args_from(args(&["-l", "debug"])).unwrap();
        assert_eq!(result.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_invalid_port() {
        let result = parse_args_from(args(&["-p", "invalid"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_host() {
        let result = parse_args_from(args(&["-H", "not-an-ip"]));
        assert!(result.is_err());
    }
}
