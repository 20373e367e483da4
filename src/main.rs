mod cli;
mod output;
mod script;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Config};
use olt_terminal::{ErrorKind, Session, Shell};
use output::{Exchange, OutputSink};
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = cli.into_config()?;
    let commands = script::load_commands(&cfg).await?;

    let mut session = match Session::open(&cfg.params).await {
        Ok(session) => session,
        Err(err) if err.kind() == ErrorKind::Auth => {
            eprintln!("{err}");
            std::process::exit(1);
        }
        Err(err) => {
            let target = cfg.params.target();
            return Err(err).with_context(|| format!("cannot open session to {target}"));
        }
    };

    let mut sink = OutputSink::stdout(cfg.output.clone());
    let result = run(&mut session, &cfg, &commands, &mut sink).await;
    sink.flush();

    let closed = session.close().await;
    result?;
    closed.context("failed to close session")?;
    Ok(())
}

async fn run<S: Shell, W: Write>(
    session: &mut Session<S>,
    cfg: &Config,
    commands: &[String],
    sink: &mut OutputSink<W>,
) -> anyhow::Result<()> {
    let host = cfg.params.host();
    let port = cfg.params.port();

    if cfg.greeting {
        tokio::time::sleep(cfg.settle).await;
        let exchange = capture(session, host, port, None).await;
        sink.write_exchange(&exchange)?;
    }

    for command in commands {
        session.send(format!("{command}\n")).await?;
        tokio::time::sleep(cfg.settle).await;
        let exchange = capture(session, host, port, Some(command)).await;
        sink.write_exchange(&exchange)?;
        if session.is_closed() {
            info!(command = %command, "device closed the session");
            break;
        }
    }
    Ok(())
}

/// A failed read becomes an error record; the run goes on with the next command.
async fn capture<S: Shell>(
    session: &mut Session<S>,
    host: &str,
    port: u16,
    command: Option<&str>,
) -> Exchange {
    match session.read_bytes().await {
        Ok(bytes) => Exchange::captured(host, port, command, &bytes),
        Err(err) => {
            warn!(command = command.unwrap_or("<greeting>"), error = %err, "read failed");
            Exchange::failed(host, port, command, err.to_string())
        }
    }
}
