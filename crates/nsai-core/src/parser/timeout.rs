use nsai_model::{DEFAULT_TIMEOUT_SECS, Timeout};

/// Interpret a declared job timeout as seconds.
///
/// - `Seconds(n)` is taken as is;
/// - text holding a plain integer is taken as seconds;
/// - otherwise the first `<N>h`, `<N>m` and `<N>s` components are summed (`"1h 30m"`, `"45 minutes"`);
/// - text with no usable component falls back to [`DEFAULT_TIMEOUT_SECS`].
///
/// Blank text counts as "no timeout declared" and yields `None`. Never fails.
pub fn timeout_secs(timeout: &Timeout) -> Option<u64> {
    match timeout {
        Timeout::Seconds(secs) => Some(*secs),
        Timeout::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            if let Ok(secs) = text.parse::<u64>() {
                return Some(secs);
            }
            match duration_components(text) {
                0 => Some(DEFAULT_TIMEOUT_SECS),
                secs => Some(secs),
            }
        }
    }
}

/// Sum of the first hour, minute and second components found in `text`.
fn duration_components(text: &str) -> u64 {
    let bytes = text.as_bytes();
    let mut seen = [false; 3];
    let mut total: u64 = 0;
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let digits = &text[start..i];
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let Some(unit) = bytes.get(i).map(u8::to_ascii_lowercase) else {
            break;
        };
        let (slot, multiplier) = match unit {
            b'h' => (0, 3600),
            b'm' => (1, 60),
            b's' => (2, 1),
            _ => continue,
        };
        if seen[slot] {
            continue;
        }
        if let Ok(n) = digits.parse::<u64>() {
            seen[slot] = true;
            total = total.saturating_add(n.saturating_mul(multiplier));
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<u64> {
        timeout_secs(&Timeout::Text(s.to_string()))
    }

    #[test]
    fn integer_forms_are_seconds() {
        assert_eq!(timeout_secs(&Timeout::Seconds(90)), Some(90));
        assert_eq!(text("3600"), Some(3600));
        assert_eq!(text(" 120 "), Some(120));
    }

    #[test]
    fn duration_components_are_summed() {
        assert_eq!(text("1h 30m"), Some(5400));
        assert_eq!(text("1h30m15s"), Some(5415));
        assert_eq!(text("45 minutes"), Some(2700));
        assert_eq!(text("2 hours"), Some(7200));
        assert_eq!(text("10S"), Some(10));
    }

    #[test]
    fn only_first_component_per_unit_counts() {
        assert_eq!(text("1h 2h"), Some(3600));
    }

    #[test]
    fn garbage_defaults_to_one_hour() {
        assert_eq!(text("forever"), Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(text("-"), Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(text("12 parsecs"), Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(text("99999999999999999999999h"), Some(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn blank_text_means_no_timeout() {
        assert_eq!(text(""), None);
        assert_eq!(text("   "), None);
    }
}
