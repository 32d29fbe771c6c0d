// ── Form validation helpers ──

/// Hostname accepted by the parameters module: a letter, at least three
/// letters, digits or dashes, then any final character but a dash.
///
/// Same rule as `^[a-zA-Z][0-9a-zA-Z-]{3,}[^-]$`.
pub fn is_valid_hostname(hostname: &str) -> bool {
    let chars: Vec<char> = hostname.chars().collect();
    let [first, middle @ .., last] = chars.as_slice() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && middle.len() >= 3
        && middle.iter().all(|c| c.is_ascii_alphanumeric() || *c == '-')
        && *last != '-'
}
