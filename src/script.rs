use crate::cli::Config;
use anyhow::Context;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// `--command` flags first, then the script file, in order.
pub async fn load_commands(cfg: &Config) -> anyhow::Result<Vec<String>> {
    let mut commands = cfg.commands.clone();
    if let Some(path) = &cfg.script {
        commands.extend(read_script(path).await?);
    }
    Ok(commands)
}

async fn read_script(path: &Path) -> anyhow::Result<Vec<String>> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot open script {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let mut commands = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if let Some(command) = parse_line(&line) {
            commands.push(command.to_string());
        }
    }
    tracing::debug!(path = %path.display(), count = commands.len(), "loaded script");
    Ok(commands)
}

fn parse_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{OutputConfig, OutputFormat};
    use olt_terminal::ConnectionParams;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line("  display ont info 0 1  \r"), Some("display ont info 0 1"));
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# enter config mode"), None);
    }

    #[tokio::test]
    async fn appends_script_after_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# board overview").unwrap();
        writeln!(file, "display board 0").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "quit").unwrap();

        let cfg = Config {
            params: ConnectionParams::new("10.0.0.1", "root", "admin"),
            commands: vec!["enable".into()],
            script: Some(file.path().to_path_buf()),
            settle: Duration::from_millis(0),
            greeting: false,
            output: OutputConfig {
                format: OutputFormat::Jsonl,
            },
        };
        let commands = load_commands(&cfg).await.unwrap();
        assert_eq!(commands, vec!["enable", "display board 0", "quit"]);
    }

    #[tokio::test]
    async fn missing_script_names_the_path() {
        let cfg = Config {
            params: ConnectionParams::new("10.0.0.1", "root", "admin"),
            commands: Vec::new(),
            script: Some("/nonexistent/olt-script.txt".into()),
            settle: Duration::from_millis(0),
            greeting: false,
            output: OutputConfig {
                format: OutputFormat::Jsonl,
            },
        };
        let err = load_commands(&cfg).await.unwrap_err();
        assert!(err.to_string().contains("olt-script.txt"));
    }
}
