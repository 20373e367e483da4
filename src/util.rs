pub mod hex;

/// Renders terminal output for humans: control bytes other than line breaks become `.`.
pub fn sanitize_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => c,
            c if c.is_control() => '.',
            c => c,
        })
        .collect()
}

pub fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_escape_sequences() {
        let text = sanitize_text(b"\x1b[1mMA5608T\x1b[0m\r\n");
        assert_eq!(text, ".[1mMA5608T.[0m\r\n");
    }

    #[test]
    fn timestamps_are_rfc3339() {
        let ts = now_iso8601();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
