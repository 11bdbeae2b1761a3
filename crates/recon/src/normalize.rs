//! Cell normalization: supplier codes, trademarks, European-format numbers.
//!
//! Every comparison in the engine goes through these functions so that both
//! sides of a lookup are cleaned identically.

use crate::error::ParseError;

/// Normalize a product code: uppercase, ASCII alphanumerics only, leading
/// zeros stripped (`" k-0123 "` → `"K0123"`, `"00042"` → `"42"`).
///
/// An empty result means "no code".
pub fn clean_code(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let alnum: String = upper
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect();
    alnum.trim_start_matches('0').to_string()
}

/// Normalize a trademark / brand name: trimmed and uppercased.
pub fn clean_trademark(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Parse a numeric cell, accepting `,` as decimal separator and embedded spaces.
pub fn parse_numeric(raw: &str) -> Result<f64, ParseError> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if compact.is_empty() {
        return Err(ParseError::Empty);
    }
    compact
        .parse::<f64>()
        .map_err(|_| ParseError::Invalid(raw.to_string()))
}

/// [`parse_numeric`] with a default substituted for empty or invalid cells.
///
/// Used wherever a single bad cell must not abort the run.
pub fn clean_numeric(raw: &str, default: f64) -> f64 {
    parse_numeric(raw).unwrap_or(default)
}

/// Round to two decimals on the exact binary value, ties to even
/// (`23.625` → `23.62`, `0.875` → `0.88`).
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Render a number for writing back into a table cell.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clean_code_strips_punctuation_and_case() {
        assert_eq!(clean_code("k-123"), "K123");
        assert_eq!(clean_code("  ab 99/x "), "AB99X");
        assert_eq!(clean_code("Bbr.Pc_01"), "BBRPC01");
    }

    #[test]
    fn clean_code_strips_leading_zeros() {
        assert_eq!(clean_code("000123"), "123");
        assert_eq!(clean_code("0-0-7A"), "7A");
        assert_eq!(clean_code("1000"), "1000");
    }

    #[test]
    fn clean_code_empty_results() {
        assert_eq!(clean_code(""), "");
        assert_eq!(clean_code("   "), "");
        assert_eq!(clean_code("---"), "");
        assert_eq!(clean_code("000"), "");
    }

    #[test]
    fn clean_code_drops_non_ascii_letters() {
        assert_eq!(clean_code("éa1"), "A1");
    }

    #[test]
    fn clean_trademark_uppercases() {
        assert_eq!(clean_trademark("  Kyosho "), "KYOSHO");
        assert_eq!(clean_trademark("esval model"), "ESVAL MODEL");
        assert_eq!(clean_trademark(""), "");
    }

    #[test]
    fn parse_numeric_european_format() {
        assert_eq!(parse_numeric("12,50"), Ok(12.5));
        assert_eq!(parse_numeric(" 1 250,5 "), Ok(1250.5));
        assert_eq!(parse_numeric("3"), Ok(3.0));
        assert_eq!(parse_numeric("-2.25"), Ok(-2.25));
    }

    #[test]
    fn parse_numeric_errors() {
        assert_eq!(parse_numeric(""), Err(ParseError::Empty));
        assert_eq!(parse_numeric("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_numeric("n/a"),
            Err(ParseError::Invalid("n/a".to_string()))
        );
        // Thousands separator plus decimal comma is ambiguous and rejected.
        assert!(parse_numeric("1.234,56").is_err());
    }

    #[test]
    fn clean_numeric_substitutes_default() {
        assert_eq!(clean_numeric("abc", 0.0), 0.0);
        assert_eq!(clean_numeric("", 7.0), 7.0);
        assert_eq!(clean_numeric("4,2", 0.0), 4.2);
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(10.0 * 1.75), 17.5);
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(3.0 * 1.333), 4.0);
    }

    #[test]
    fn round2_half_cent_ties_go_to_even() {
        assert_eq!(round2(13.5 * 1.75), 23.62);
        assert_eq!(round2(3.5 * 1.75), 6.12);
        assert_eq!(round2(1.5 * 1.75), 2.62);
        assert_eq!(round2(0.5 * 1.75), 0.88);
        // 2.675 is stored just below the tie
        assert_eq!(round2(2.675), 2.67);
    }

    #[test]
    fn format_number_round_trips() {
        for v in [0.0, 1.0, 17.5, 12.35, 1234.56] {
            assert_eq!(parse_numeric(&format_number(v)), Ok(v));
        }
    }

    proptest! {
        #[test]
        fn clean_code_is_idempotent(raw in ".{0,24}") {
            let once = clean_code(&raw);
            prop_assert_eq!(clean_code(&once), once.clone());
        }

        #[test]
        fn clean_code_output_alphabet(raw in ".{0,24}") {
            let code = clean_code(&raw);
            prop_assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            prop_assert!(!code.starts_with('0'));
        }
    }
}
