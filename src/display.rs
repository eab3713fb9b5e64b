/// `MM:SS.ss`, or `HH:MM:SS.ss` once there is at least an hour.
pub fn format_clock(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let hours = (secs / 3600.0).floor() as u64;
    let minutes = ((secs % 3600.0) / 60.0).floor() as u64;
    let rest = secs % 60.0;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{rest:05.2}")
    } else {
        format!("{minutes:02}:{rest:05.2}")
    }
}

/// Formats with at most `sig` significant digits and no trailing zeros,
/// close to printf's `%g` for the magnitudes a speed factor or fps takes.
pub fn format_general(value: f64, sig: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return if value.is_finite() {
            "0".to_string()
        } else {
            value.to_string()
        };
    }
    let magnitude = value.abs().log10().floor() as i64;
    let decimals = (sig as i64 - 1 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
