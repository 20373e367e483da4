pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses `to_hex` output back into bytes; whitespace between pairs is ignored.
#[cfg(test)]
pub(crate) fn from_hex(hex: &str) -> Result<Vec<u8>, String> {
    let cleaned: Vec<char> = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        return Err("hex string has an odd length".into());
    }
    cleaned
        .chunks(2)
        .map(|pair| {
            let pair: String = pair.iter().collect();
            u8::from_str_radix(&pair, 16).map_err(|_| format!("invalid hex pair: {pair}"))
        })
        .collect()
}
