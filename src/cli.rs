use crate::output::{OutputConfig, OutputFormat};
use clap::{ArgAction, Parser};
use olt_terminal::model::{DEFAULT_SSH_PORT, DEFAULT_TIMEOUT_SECS};
use olt_terminal::ConnectionParams;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about = "SSH terminal for OLT devices, optionally via SOCKS5", long_about = None)]
pub struct Cli {
    /// Device management address
    #[arg(short = 'H', long = "host", value_name = "HOST")]
    pub host: String,

    /// SSH port
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_SSH_PORT)]
    pub port: u16,

    /// SSH login
    #[arg(short = 'l', long = "login")]
    pub login: String,

    /// SSH password
    #[arg(long = "password", env = "OLT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Read and login timeout in seconds, 0 disables it
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// SOCKS5 proxy address
    #[arg(long = "proxy-host", value_name = "HOST")]
    pub proxy_host: Option<String>,

    /// SOCKS5 proxy port
    #[arg(long = "proxy-port", value_name = "PORT")]
    pub proxy_port: Option<u16>,

    /// Command to run; repeat for several
    #[arg(short = 'c', long = "command", value_name = "CMD")]
    pub commands: Vec<String>,

    /// File with one command per line
    #[arg(short = 's', long = "script", value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Pause between sending a command and reading its output, in milliseconds
    #[arg(long = "settle-ms", default_value_t = 500)]
    pub settle_ms: u64,

    /// Do not capture the login banner before the first command
    #[arg(long = "skip-greeting", action = ArgAction::SetTrue)]
    pub skip_greeting: bool,

    /// Output format
    #[arg(long = "output", default_value_t = OutputFormat::Jsonl)]
    pub output: OutputFormat,

    /// Shorthand for --output pretty
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pub pretty: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub params: ConnectionParams,
    pub commands: Vec<String>,
    pub script: Option<PathBuf>,
    pub settle: Duration,
    pub greeting: bool,
    pub output: OutputConfig,
}

impl Cli {
    pub fn into_config(self) -> anyhow::Result<Config> {
        if self.host.trim().is_empty() {
            anyhow::bail!("--host must not be empty");
        }

        let mut params = ConnectionParams::new(self.host, self.login, self.password)
            .with_port(self.port)
            .with_timeout(self.timeout_secs);

        params = match (self.proxy_host, self.proxy_port) {
            (Some(host), Some(port)) => params.with_proxy(host, port),
            (None, None) => params,
            _ => anyhow::bail!("--proxy-host and --proxy-port must be used together"),
        };

        Ok(Config {
            params,
            commands: self.commands,
            script: self.script,
            settle: Duration::from_millis(self.settle_ms),
            greeting: !self.skip_greeting,
            output: OutputConfig {
                format: if self.pretty {
                    OutputFormat::Pretty
                } else {
                    self.output
                },
            },
        })
    }
}
