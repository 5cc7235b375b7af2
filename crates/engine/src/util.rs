//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

pub(crate) const MAX_NAME_LEN: usize = 100;
pub(crate) const MAX_URL_LEN: usize = 200;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parses a non-negative or signed decimal string into an integer scaled by
/// `10^scale`.
///
/// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
/// Rejects more than `scale` fractional digits.
pub(crate) fn parse_fixed(s: &str, scale: u32, label: &str) -> ResultEngine<i64> {
    let empty = || EngineError::InvalidQuantity(format!("empty {label}"));
    let invalid = || EngineError::InvalidQuantity(format!("invalid {label}"));
    let overflow = || EngineError::InvalidQuantity(format!("{label} too large"));

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Err(empty());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let whole_str = parts.next().ok_or_else(invalid)?;
    let frac_str = parts.next().unwrap_or("");
    if parts.next().is_some() {
        return Err(invalid());
    }

    if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if !frac_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac_str.len() > scale as usize {
        return Err(EngineError::InvalidQuantity(format!(
            "{label} has too many decimals (max {scale})"
        )));
    }

    let whole: i64 = whole_str.parse().map_err(|_| overflow())?;
    let mut frac: i64 = 0;
    if !frac_str.is_empty() {
        frac = frac_str.parse().map_err(|_| invalid())?;
        frac *= 10_i64.pow(scale - frac_str.len() as u32);
    }

    let total = whole
        .checked_mul(10_i64.pow(scale))
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(overflow)?;

    if negative {
        total.checked_neg().ok_or_else(overflow)
    } else {
        Ok(total)
    }
}

/// Formats a scaled integer with exactly `scale` fractional digits.
pub(crate) fn format_fixed(value: i64, scale: u32) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let divisor = 10_u64.pow(scale);
    let whole = abs / divisor;
    let frac = abs % divisor;
    if scale == 0 {
        return format!("{sign}{whole}");
    }
    format!("{sign}{whole}.{frac:0width$}", width = scale as usize)
}

/// Trims a name and collapses inner whitespace. Rejects empty or over-long
/// names.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let mut out = String::new();
    for token in value.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    if out.chars().count() > MAX_NAME_LEN {
        return Err(EngineError::InvalidName(format!(
            "{label} name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(out)
}

/// Search key for a name: lowercase, accents stripped, punctuation folded to
/// single spaces.
pub(crate) fn name_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Validate an optional image URL. Empty strings are treated as absent.
pub(crate) fn normalize_image_url(value: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(url) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(EngineError::InvalidName(
            "image url must start with http:// or https://".to_string(),
        ));
    }
    if url.len() > MAX_URL_LEN || url.contains(char::is_whitespace) {
        return Err(EngineError::InvalidName("invalid image url".to_string()));
    }
    Ok(Some(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fixed_scales_and_pads() {
        assert_eq!(parse_fixed("2", 3, "quantity").unwrap(), 2000);
        assert_eq!(parse_fixed("0.5", 3, "quantity").unwrap(), 500);
        assert_eq!(parse_fixed("1,25", 3, "quantity").unwrap(), 1250);
        assert_eq!(parse_fixed("-0.001", 3, "quantity").unwrap(), -1);
        assert_eq!(parse_fixed(" 12. ", 2, "price").unwrap(), 1200);
    }

    #[test]
    fn parse_fixed_rejects_garbage() {
        assert!(parse_fixed("", 2, "price").is_err());
        assert!(parse_fixed("-", 2, "price").is_err());
        assert!(parse_fixed("1.2.3", 2, "price").is_err());
        assert!(parse_fixed("abc", 2, "price").is_err());
        assert!(parse_fixed(".5", 2, "price").is_err());
        assert!(parse_fixed("1.234", 2, "price").is_err());
        assert!(parse_fixed("99999999999999999999", 2, "price").is_err());
    }

    #[test]
    fn format_fixed_pads_fraction() {
        assert_eq!(format_fixed(0, 2), "0.00");
        assert_eq!(format_fixed(5, 2), "0.05");
        assert_eq!(format_fixed(-1050, 2), "-10.50");
        assert_eq!(format_fixed(2500, 3), "2.500");
    }

    #[test]
    fn names_are_trimmed_and_collapsed() {
        assert_eq!(
            normalize_required_name("  Olive   oil ", "ingredient").unwrap(),
            "Olive oil"
        );
        assert!(normalize_required_name("   ", "ingredient").is_err());
        assert!(normalize_required_name(&"x".repeat(101), "ingredient").is_err());
    }

    #[test]
    fn name_key_folds_case_and_accents() {
        assert_eq!(name_key("Crème  Fraîche!"), "creme fraiche");
        assert_eq!(name_key("JALAPEÑO"), "jalapeno");
    }

    #[test]
    fn image_url_must_be_http() {
        assert_eq!(normalize_image_url(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_image_url(Some("https://cdn.example.com/burger.png")).unwrap(),
            Some("https://cdn.example.com/burger.png".to_string())
        );
        assert!(normalize_image_url(Some("ftp://example.com/a.png")).is_err());
    }
}
