use clap::ValueEnum;
use olt_terminal::util::hex::to_hex;
use olt_terminal::util::{now_iso8601, sanitize_text};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufWriter, Write};

#[derive(Clone, Debug, Serialize, Deserialize, ValueEnum)]
pub enum OutputFormat {
    Jsonl,
    Pretty,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Pretty => write!(f, "pretty"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// One command and what the device answered. The greeting has no command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub output: String,
    pub raw_hex: String,
    pub bytes: usize,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Exchange {
    pub fn captured(host: &str, port: u16, command: Option<&str>, bytes: &[u8]) -> Self {
        Self {
            host: host.to_string(),
            port,
            command: command.map(str::to_string),
            output: sanitize_text(bytes),
            raw_hex: to_hex(bytes),
            bytes: bytes.len(),
            timestamp: now_iso8601(),
            error: None,
        }
    }

    pub fn failed(host: &str, port: u16, command: Option<&str>, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::captured(host, port, command, &[])
        }
    }
}

pub struct OutputSink<W: Write = std::io::Stdout> {
    cfg: OutputConfig,
    writer: BufWriter<W>,
}

impl OutputSink {
    pub fn stdout(cfg: OutputConfig) -> Self {
        Self::new(cfg, std::io::stdout())
    }
}

impl<W: Write> OutputSink<W> {
    pub fn new(cfg: OutputConfig, writer: W) -> Self {
        Self {
            cfg,
            writer: BufWriter::new(writer),
        }
    }

    pub fn write_exchange(&mut self, exchange: &Exchange) -> anyhow::Result<()> {
        match self.cfg.format {
            OutputFormat::Jsonl => {
                let line = serde_json::to_string(exchange)?;
                writeln!(self.writer, "{line}")?;
            }
            OutputFormat::Pretty => {
                let command = exchange.command.as_deref().unwrap_or("<greeting>");
                writeln!(
                    self.writer,
                    "{}:{} $ {}",
                    exchange.host, exchange.port, command
                )?;
                for line in exchange.output.lines() {
                    writeln!(self.writer, "  {}", line.trim_end_matches('\r'))?;
                }
                if let Some(error) = &exchange.error {
                    writeln!(self.writer, "  error: {error}")?;
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(err) => panic!("flush failed: {}", err.error()),
        }
    }
}
