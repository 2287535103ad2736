//! Premium amounts.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a printed amount (`1.234,56`, `1 234,56`, `1234.56`, `1234,5 RON`).
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Comma after the last dot is the decimal separator
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        (None, _) => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1 234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount(" 812,00 "), Some(dec("812.00")));
        assert_eq!(parse_amount("950"), Some(dec("950")));
    }

    #[test]
    fn test_parse_amount_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("Lei"), None);
    }
}
