use crate::types::Pt;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const ELLIPSIS: &str = "\u{2026}";

const TIMESTAMP_FORMAT: &str = "%d/%m/%y, %H:%M";

// Largest integer an f64 holds exactly; beyond it cent values stop being exact.
const MAX_EXACT_UNITS: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyStyle {
    pub symbol: String,
    pub grouping_separator: char,
    pub decimal_separator: char,
    pub fraction_digits: u8,
    pub symbol_space: bool,
}

impl Default for CurrencyStyle {
    fn default() -> Self {
        Self::es_ar()
    }
}

impl CurrencyStyle {
    pub fn es_ar() -> Self {
        Self {
            symbol: "$".to_string(),
            grouping_separator: '.',
            decimal_separator: ',',
            fraction_digits: 2,
            symbol_space: true,
        }
    }

    pub fn format(&self, value: f64) -> String {
        let value = finite_or_zero(value);
        match self.format_localized(value) {
            Some(out) => out,
            None => {
                tracing::warn!(value, "currency style unavailable, using plain format");
                self.format_plain(value)
            }
        }
    }

    fn digits(&self) -> usize {
        self.fraction_digits.min(6) as usize
    }

    fn format_localized(&self, value: f64) -> Option<String> {
        if self.grouping_separator == self.decimal_separator {
            return None;
        }
        let digits = self.digits();
        let scale = 10u64.pow(digits as u32);
        let scaled = (value.abs() * scale as f64).round();
        if scaled > MAX_EXACT_UNITS {
            return None;
        }
        let units = scaled as u64;
        let whole = units / scale;
        let frac = units % scale;

        let mut out = String::new();
        if value < 0.0 && units > 0 {
            out.push('-');
        }
        out.push_str(&self.symbol);
        if self.symbol_space {
            out.push('\u{00A0}');
        }
        out.push_str(&group_thousands(whole, self.grouping_separator));
        if digits > 0 {
            out.push(self.decimal_separator);
            let _ = write!(out, "{:0width$}", frac, width = digits);
        }
        Some(out)
    }

    fn format_plain(&self, value: f64) -> String {
        format!("{}{:.*}", self.symbol, self.digits(), value)
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub fn format_currency(value: impl Into<Option<f64>>) -> String {
    CurrencyStyle::default().format(value.into().unwrap_or(0.0))
}

pub fn format_timestamp(instant: &DateTime<FixedOffset>) -> String {
    let mut out = String::new();
    if write!(out, "{}", instant.format(TIMESTAMP_FORMAT)).is_err() {
        return instant.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    out
}

// No-break spaces glue a currency symbol to its digits; they are content,
// not layout whitespace.
fn is_breaking_space(ch: char) -> bool {
    ch.is_whitespace() && !matches!(ch, '\u{00A0}' | '\u{2007}' | '\u{202F}')
}

pub fn normalize_to_one_line(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let mut out = String::with_capacity(value.len());
    for word in value.split(is_breaking_space).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

// Longest char prefix whose width plus the ellipsis fits. `measure` must be
// monotonic in the prefix length.
pub fn truncate_to_width<F>(measure: F, text: &str, max_width: Pt) -> String
where
    F: Fn(&str) -> Pt,
{
    let text = normalize_to_one_line(Some(text));
    if text.is_empty() {
        return text;
    }
    if measure(&text) <= max_width {
        return text;
    }

    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    let mut candidate = String::with_capacity(text.len() + ELLIPSIS.len());
    let mut fits = |prefix_len: usize| {
        candidate.clear();
        candidate.push_str(&text[..boundaries[prefix_len]]);
        candidate.push_str(ELLIPSIS);
        measure(&candidate) <= max_width
    };

    let (mut lo, mut hi) = (0usize, char_count);
    while lo < hi {
        let mid = (lo + hi).div_ceil(2);
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let mut out = text[..boundaries[lo]].to_string();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontRegistry, HELVETICA};
    use chrono::TimeZone;

    fn monospace(text: &str) -> Pt {
        Pt::from_i32(5) * (text.chars().count() as i32)
    }

    #[test]
    fn currency_uses_es_ar_grouping() {
        assert_eq!(format_currency(1234.5), "$\u{a0}1.234,50");
        assert_eq!(format_currency(1_234_567.891), "$\u{a0}1.234.567,89");
        assert_eq!(format_currency(0.0), "$\u{a0}0,00");
        assert_eq!(format_currency(-15.0), "-$\u{a0}15,00");
        assert_eq!(format_currency(999.999), "$\u{a0}1.000,00");
    }

    #[test]
    fn currency_treats_missing_and_non_finite_as_zero() {
        let zero = format_currency(0.0);
        assert_eq!(format_currency(None::<f64>), zero);
        assert_eq!(format_currency(f64::NAN), zero);
        assert_eq!(format_currency(f64::INFINITY), zero);
        assert_eq!(format_currency(-0.0), zero);
    }

    #[test]
    fn currency_falls_back_to_plain_fixed_point() {
        let huge = 1.0e20;
        assert_eq!(format_currency(huge), "$100000000000000000000.00");

        let style = CurrencyStyle {
            grouping_separator: ',',
            decimal_separator: ',',
            ..CurrencyStyle::es_ar()
        };
        assert_eq!(style.format(1234.5), "$1234.50");
    }

    #[test]
    fn zero_decimal_currency_keeps_digits_consistent() {
        let style = CurrencyStyle {
            fraction_digits: 0,
            ..CurrencyStyle::es_ar()
        };
        assert_eq!(style.format(1234.6), "$\u{a0}1.235");
    }

    #[test]
    fn formatting_is_repeatable() {
        let at = FixedOffset::west_opt(3 * 3600)
            .and_then(|tz| tz.with_ymd_and_hms(2026, 3, 7, 9, 5, 0).single())
            .expect("valid instant");
        let first = (format_currency(4321.0), format_timestamp(&at));
        let _ = format_currency(1.0);
        let second = (format_currency(4321.0), format_timestamp(&at));
        assert_eq!(first, second);
        assert_eq!(first.1, "07/03/26, 09:05");
    }

    #[test]
    fn normalize_collapses_whitespace_runs() {
        assert_eq!(normalize_to_one_line(None), "");
        assert_eq!(normalize_to_one_line(Some("  a \r\n  b\t\tc  ")), "a b c");
        assert_eq!(normalize_to_one_line(Some("plain")), "plain");
    }

    #[test]
    fn normalize_keeps_no_break_spaces() {
        let amount = format_currency(1234.56);
        assert_eq!(normalize_to_one_line(Some(&amount)), amount);
        assert_eq!(
            normalize_to_one_line(Some(" $\u{a0}5 \n x")),
            "$\u{a0}5 x"
        );
    }

    #[test]
    fn truncation_preserves_currency_spacing() {
        let registry = FontRegistry::new();
        let size = Pt::from_i32(9);
        let measure = |s: &str| registry.measure_text_width(HELVETICA, size, s);
        let amount = format_currency(500.0);
        assert_eq!(truncate_to_width(measure, &amount, Pt::from_i32(48)), amount);
    }

    #[test]
    fn truncate_returns_fitting_text_unchanged() {
        assert_eq!(truncate_to_width(monospace, "abcd", Pt::from_i32(20)), "abcd");
        assert_eq!(truncate_to_width(monospace, " \n ", Pt::from_i32(1)), "");
    }

    #[test]
    fn truncate_finds_longest_fitting_prefix() {
        // 5pt per char: 23pt leaves room for 3 chars + ellipsis (20pt).
        let out = truncate_to_width(monospace, "abcdefgh", Pt::from_i32(23));
        assert_eq!(out, "abc…");
    }

    #[test]
    fn truncate_with_proportional_metrics_is_maximal() {
        let registry = FontRegistry::new();
        let size = Pt::from_i32(9);
        let measure = |s: &str| registry.measure_text_width(HELVETICA, size, s);
        let text = "Distribuidora Mayorista del Litoral S.R.L. WWW iii";
        for width in [20, 35, 48, 66, 90, 120] {
            let max = Pt::from_i32(width);
            let out = truncate_to_width(measure, text, max);
            let prefix = out.strip_suffix(ELLIPSIS).expect("text is too wide");
            assert!(measure(&out) <= max, "{out:?} overflows {width}");
            assert!(text.starts_with(prefix));
            let next_len = prefix.chars().count() + 1;
            let longer: String = text.chars().take(next_len).collect::<String>() + ELLIPSIS;
            assert!(measure(&longer) > max, "{longer:?} would also fit {width}");
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let out = truncate_to_width(monospace, "ñandú añejo", Pt::from_i32(21));
        assert_eq!(out, "ñan…");
    }

    #[test]
    fn truncate_to_bare_ellipsis_when_nothing_fits() {
        assert_eq!(truncate_to_width(monospace, "abc", Pt::from_i32(2)), "…");
    }
}
