use std::path::PathBuf;
use std::slice::Iter;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_URL: &str = "http://localhost:8080/api/bench";
pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_BODY: &str = r#"{"id":"1","value":100}"#;
pub const CONTENT_TYPE: &str = "application/json";

// Flags that take a value, without the leading dashes
const VALUE_FLAGS: [&str; 7] = ["url", "n", "c", "name", "timeout", "threads", "out"];

/// What the command line asked for
#[derive(Debug, PartialEq)]
pub enum Command {
    Run(Config),
    Help,
    Version,
}

/// Run configuration, fixed for the whole benchmark once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub url: String,
    pub requests: usize, // total number of job tickets
    pub concurrency: usize, // number of workers
    pub name: String, // run label, also names the export file
    pub body: String,
    pub content_type: String,
    pub timeout: Duration, // per request, covers connect through body drain
    pub threads: Option<usize>, // runtime worker threads, None = runtime default
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: DEFAULT_URL.to_string(),
            requests: 1000,
            concurrency: 10,
            name: DEFAULT_NAME.to_string(),
            body: DEFAULT_BODY.to_string(),
            content_type: CONTENT_TYPE.to_string(),
            timeout: Duration::from_secs(10),
            threads: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /*-------------------- Public Functions -------------------*/
    /// Parse the process arguments
    pub fn parse() -> Result<Command, ConfigError> {
        Self::from_args(std::env::args().skip(1))
    }

    /// Parse an argument list (without the program name).
    ///
    /// Every flag accepts `-flag value`, `-flag=value` and the `--flag` forms.
    pub fn from_args<I, S>(args: I) -> Result<Command, ConfigError>
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut parsed_config = Self::default();
        let mut args_iter = args.iter();

        while let Some(arg) = args_iter.next() {
            if arg == "-h" || arg == "--help" {
                return Ok(Command::Help);
            }
            if arg == "-v" || arg == "--version" {
                return Ok(Command::Version);
            }

            let (flag, inline_value) = Self::split_flag(arg)?;
            let value = match inline_value {
                Some(value) => value.to_string(),
                None => Self::next_value(&mut args_iter, arg)?,
            };

            match flag {
                "url" => {
                    parsed_config.url = Self::parse_url(&value)?;
                }
                "n" => {
                    parsed_config.requests = value
                        .parse()
                        .map_err(|_| ConfigError::InvalidRequests(value.clone()))?;
                }
                "c" => {
                    parsed_config.concurrency = Self::parse_positive(&value).ok_or_else(||
                        ConfigError::InvalidConcurrency(value.clone())
                    )?;
                }
                "name" => {
                    parsed_config.name = value;
                }
                "timeout" => {
                    parsed_config.timeout = Self::parse_duration_string(&value)?;
                }
                "threads" => {
                    parsed_config.threads = Some(
                        Self::parse_positive(&value).ok_or_else(||
                            ConfigError::InvalidThreads(value.clone())
                        )?
                    );
                }
                "out" => {
                    parsed_config.output_dir = PathBuf::from(value);
                }
                _ => {
                    return Err(ConfigError::UnknownFlag(arg.clone()));
                }
            }
        }

        Ok(Command::Run(parsed_config))
    }

    pub fn print_help() {
        let name = env!("CARGO_PKG_NAME");
        println!("Usage: {} [OPTIONS]", name);
        println!();
        println!("Fires a fixed JSON POST at a target and reports latency percentiles.");
        println!();
        println!("Options:");
        println!("  -url     <URL>  Target URL (Default: {})", DEFAULT_URL);
        println!("  -n       <N>    Number of requests (Default: 1000)");
        println!("  -c       <N>    Concurrency level (Default: 10)");
        println!("  -name    <S>    Test name, also names the CSV export (Default: {})", DEFAULT_NAME);
        println!("  -timeout <D>    Per-request timeout (Default: 10s)");
        println!("  -threads <N>    Runtime worker threads (Default: number of CPUs)");
        println!("  -out     <DIR>  Directory for the CSV export (Default: .)");
        println!("  -h, --help      Print help (this)");
        println!("  -v, --version   Print version");
        println!();
        println!("Flags can also be written as --flag or -flag=value.");
        println!("Durations can be specified like: 500ms, 10s, 1m, 1h");
    }

    pub fn print_version() {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }

    /// Name of the CSV export for this run
    pub fn export_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_results.csv", self.name.to_lowercase()))
    }

    /*---------------- Private/Helpers ------------------*/
    // "-c=5" -> ("c", Some("5")), "--url" -> ("url", None)
    fn split_flag(arg: &str) -> Result<(&str, Option<&str>), ConfigError> {
        let stripped = arg
            .strip_prefix("--")
            .or_else(|| arg.strip_prefix('-'))
            .ok_or_else(|| ConfigError::UnknownFlag(arg.to_string()))?;

        let (flag, value) = match stripped.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (stripped, None),
        };

        if !VALUE_FLAGS.contains(&flag) {
            return Err(ConfigError::UnknownFlag(arg.to_string()));
        }
        Ok((flag, value))
    }

    // for -n 10 (space between flag and value)
    fn next_value(args_iter: &mut Iter<String>, flag: &str) -> Result<String, ConfigError> {
        args_iter
            .next()
            .cloned()
            .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
    }

    fn parse_positive(value: &str) -> Option<usize> {
        value
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
    }

    fn parse_url(url: &str) -> Result<String, ConfigError> {
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(url.to_string()),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    // Parses the duration string, a bare number means seconds
    fn parse_duration_string(duration_str: &str) -> Result<Duration, ConfigError> {
        let invalid = || ConfigError::InvalidTimeout(duration_str.to_string());

        let (value_str, unit) = if let Some(value) = duration_str.strip_suffix("ms") {
            (value, "ms")
        } else if
            duration_str.ends_with('s') ||
            duration_str.ends_with('m') ||
            duration_str.ends_with('h')
        {
            duration_str.split_at(duration_str.len() - 1)
        } else {
            (duration_str, "s")
        };

        let value: u64 = value_str.parse().map_err(|_| invalid())?;
        let duration = match unit {
            "ms" => Duration::from_millis(value),
            "m" => Duration::from_secs(value * 60),
            "h" => Duration::from_secs(value * 60 * 60),
            _ => Duration::from_secs(value),
        };

        if duration.is_zero() {
            return Err(invalid());
        }
        Ok(duration)
    }
}
