//! Field normalizer: raw text → typed product fields.
//!
//! Every function here is pure. Surrounding whitespace is ignored; anything
//! else that does not match the expected shape is a [`ParseError`].

use chrono::NaiveDate;

use crate::error::{Field, ParseError};
use crate::model::{Candidate, RawRow};

/// Currency symbols accepted (at most one) in front of a price.
pub const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// Symbol written by [`format_price`].
pub const EXPORT_CURRENCY: char = '$';

/// Textual date layout used on input and export.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Parse a price such as `$12.50` into integer cents.
///
/// Digits past the second decimal place are dropped (truncation toward zero),
/// matching a plain `amount * 100` cast. The arithmetic is done on the decimal
/// digits so exact two-place prices never lose a cent.
pub fn parse_price(text: &str) -> Result<i64, ParseError> {
    let err = |reason: &str| ParseError::new(Field::Price, text, reason);

    let trimmed = text.trim();
    let amount = match trimmed.chars().next() {
        Some(c) if CURRENCY_SYMBOLS.contains(&c) => trimmed[c.len_utf8()..].trim_start(),
        _ => trimmed,
    };

    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(err("missing amount"));
    }
    if amount.starts_with('-') {
        return Err(err("price cannot be negative"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err("not a decimal number"));
    }

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| err("amount too large"))?
    };
    let cents: i64 = frac
        .chars()
        .chain(std::iter::repeat('0'))
        .take(2)
        .collect::<String>()
        .parse()
        .map_err(|_| err("not a decimal number"))?;

    units
        .checked_mul(100)
        .and_then(|u| u.checked_add(cents))
        .ok_or_else(|| err("amount too large"))
}

/// Parse a non-negative base-10 count.
pub fn parse_quantity(text: &str) -> Result<u32, ParseError> {
    let err = |reason: &str| ParseError::new(Field::Quantity, text, reason);

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(err("missing quantity"));
    }
    if trimmed.starts_with('-') {
        return Err(err("quantity cannot be negative"));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err("not a whole number"));
    }
    trimmed.parse().map_err(|_| err("quantity too large"))
}

/// Parse a zero-padded `MM/DD/YYYY` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    let err = |reason: &str| ParseError::new(Field::Date, text, reason);

    let trimmed = text.trim();
    let bytes = trimmed.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'/',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(err("expected MM/DD/YYYY"));
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| err("no such calendar date"))
}

/// Clean a product name: trim, and peel surrounding double quotes until none
/// remain. The result is already clean, so stored names re-import unchanged.
pub fn parse_name(text: &str) -> Result<String, ParseError> {
    let mut name = text.trim();
    while name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
        name = name[1..name.len() - 1].trim();
    }

    if name.is_empty() {
        return Err(ParseError::new(Field::Name, text, "name cannot be empty"));
    }
    Ok(name.to_string())
}

/// Normalize one raw row into a candidate. A missing column fails for that field.
pub fn normalize_row(row: &RawRow) -> Result<Candidate, ParseError> {
    let raw = |field: Field| {
        row.get(field.column())
            .ok_or_else(|| ParseError::new(field, "", format!("column '{}' missing", field.column())))
    };

    Ok(Candidate {
        name: parse_name(raw(Field::Name)?)?,
        price_cents: parse_price(raw(Field::Price)?)?,
        quantity: parse_quantity(raw(Field::Quantity)?)?,
        updated_at: parse_date(raw(Field::Date)?)?,
    })
}

/// Render cents as `$D.CC`; the inverse of [`parse_price`].
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{EXPORT_CURRENCY}{}.{:02}", abs / 100, abs % 100)
}

/// Render a date as `MM/DD/YYYY`; the inverse of [`parse_date`].
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn price_with_symbol() {
        assert_eq!(parse_price("$12.50").unwrap(), 1250);
        assert_eq!(parse_price("$0.99").unwrap(), 99);
        assert_eq!(parse_price("€3.10").unwrap(), 310);
    }

    #[test]
    fn price_without_symbol_or_fraction() {
        assert_eq!(parse_price("7").unwrap(), 700);
        assert_eq!(parse_price("7.5").unwrap(), 750);
        assert_eq!(parse_price(".25").unwrap(), 25);
        assert_eq!(parse_price("4.").unwrap(), 400);
        assert_eq!(parse_price("  $ 3.00 ").unwrap(), 300);
    }

    #[test]
    fn price_truncates_extra_digits() {
        assert_eq!(parse_price("$1.239").unwrap(), 123);
        assert_eq!(parse_price("$1.999").unwrap(), 199);
    }

    #[test]
    fn price_exact_where_float_would_drift() {
        // 4.35 * 100 = 434.99999999999994 in f64
        assert_eq!(parse_price("$4.35").unwrap(), 435);
        assert_eq!(parse_price("$12.29").unwrap(), 1229);
    }

    #[test]
    fn price_rejects_malformed() {
        for bad in ["abc", "$$5.00", "$", "", ".", "1.2.3", "$-4.00", "-4", "1e3", "$4,00", "NaN", "inf"] {
            let err = parse_price(bad).unwrap_err();
            assert_eq!(err.field, Field::Price, "input {bad:?}");
        }
    }

    #[test]
    fn price_rejects_overflow() {
        assert!(parse_price("99999999999999999999").is_err());
        assert!(parse_price("92233720368547758.08").is_err());
    }

    #[test]
    fn quantity_parses() {
        assert_eq!(parse_quantity("0").unwrap(), 0);
        assert_eq!(parse_quantity(" 42 ").unwrap(), 42);
        assert_eq!(parse_quantity("007").unwrap(), 7);
    }

    #[test]
    fn quantity_rejects_bad_input() {
        let neg = parse_quantity("-3").unwrap_err();
        assert!(neg.reason.contains("negative"));
        for bad in ["", "three", "3.0", "+3", "4294967296"] {
            assert!(parse_quantity(bad).is_err(), "input {bad:?}");
        }
    }

    #[test]
    fn date_parses_padded_us_format() {
        assert_eq!(parse_date("01/02/2020").unwrap(), date(2020, 1, 2));
        assert_eq!(parse_date("12/31/1999").unwrap(), date(1999, 12, 31));
        assert_eq!(parse_date("02/29/2024").unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn date_rejects_other_shapes() {
        for bad in ["2020-01-02", "", "1/2/2020", "01/02/20", "13/01/2020", "00/10/2020", "01/32/2020", "02/30/2021", "01-02-2020"] {
            let err = parse_date(bad).unwrap_err();
            assert_eq!(err.field, Field::Date, "input {bad:?}");
        }
    }

    #[test]
    fn name_is_trimmed_and_unquoted() {
        assert_eq!(parse_name("  Widget - Economy ").unwrap(), "Widget - Economy");
        assert_eq!(parse_name("\"Beans - Kidney, Canned\"").unwrap(), "Beans - Kidney, Canned");
        assert!(parse_name("   ").is_err());
        assert!(parse_name("\"\"").is_err());
    }

    #[test]
    fn nested_quotes_are_all_peeled() {
        assert_eq!(parse_name("\"\"Deluxe\"\"").unwrap(), "Deluxe");
        assert_eq!(parse_name(" \" \"Deluxe\" \" ").unwrap(), "Deluxe");
        assert!(parse_name("\" \"\" \"").is_err());
        // Unbalanced quotes are part of the name.
        assert_eq!(parse_name("Pipe 12\"").unwrap(), "Pipe 12\"");
        assert_eq!(parse_name("\"Quoted\" Brand").unwrap(), "\"Quoted\" Brand");
    }

    #[test]
    fn normalize_full_row() {
        let row = RawRow::new(2)
            .with("product_name", "Widget - Economy")
            .with("product_price", "$10.00")
            .with("product_quantity", "5")
            .with("date_updated", "01/01/2020");
        let c = normalize_row(&row).unwrap();
        assert_eq!(c.name, "Widget - Economy");
        assert_eq!(c.price_cents, 1000);
        assert_eq!(c.quantity, 5);
        assert_eq!(c.updated_at, date(2020, 1, 1));
    }

    #[test]
    fn normalize_missing_column() {
        let row = RawRow::new(2)
            .with("product_name", "Widget - Economy")
            .with("product_price", "$10.00")
            .with("date_updated", "01/01/2020");
        let err = normalize_row(&row).unwrap_err();
        assert_eq!(err.field, Field::Quantity);
    }

    #[test]
    fn format_inverses() {
        assert_eq!(format_price(1250), "$12.50");
        assert_eq!(format_price(5), "$0.05");
        assert_eq!(format_price(0), "$0.00");
        assert_eq!(format_date(date(2020, 1, 2)), "01/02/2020");
    }

    proptest! {
        #[test]
        fn two_place_prices_are_exact(units in 0i64..10_000_000, cents in 0i64..100) {
            let text = format!("${units}.{cents:02}");
            prop_assert_eq!(parse_price(&text).unwrap(), units * 100 + cents);
        }

        #[test]
        fn price_format_round_trips(cents in 0i64..1_000_000_000_000) {
            prop_assert_eq!(parse_price(&format_price(cents)).unwrap(), cents);
        }

        #[test]
        fn quantity_round_trips(q in any::<u32>()) {
            prop_assert_eq!(parse_quantity(&q.to_string()).unwrap(), q);
        }

        #[test]
        fn negative_quantity_fails(q in 1i64..1_000_000) {
            let neg = format!("-{q}");
            prop_assert!(parse_quantity(&neg).is_err());
        }

        #[test]
        fn date_format_round_trips(y in 1000i32..=9999, m in 1u32..=12, d in 1u32..=28) {
            let day = date(y, m, d);
            prop_assert_eq!(parse_date(&format_date(day)).unwrap(), day);
        }

        #[test]
        fn name_cleaning_is_idempotent(raw in "[ \"a-zA-Z0-9,-]{0,16}") {
            if let Ok(once) = parse_name(&raw) {
                prop_assert_eq!(parse_name(&once).unwrap(), once);
            }
        }
    }
}
