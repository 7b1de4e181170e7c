/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// A CSV cell counts as missing when it is null, empty or only whitespace.
pub fn non_missing(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse an integer cell, tolerating float spellings like `2019.0`
/// that spreadsheet exports tend to produce.
pub fn parse_int(raw: &str) -> Option<i64> {
    let c = clean_str(raw);
    if c.is_empty() {
        return None;
    }
    if let Ok(v) = c.parse::<i64>() {
        return Some(v);
    }
    match c.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}
