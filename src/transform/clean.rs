//! Field cleaning across the whole flat row set
//!
//! Cleaning never drops a row and never fails: values that cannot be
//! normalised become `Null` and are logged.

use chrono::{DateTime, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::models::{FlatRow, Value};

static RE_PHONE_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9xX]").expect("Invalid regex"));
static RE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[xX]").expect("Invalid regex"));

/// Naive timestamp layouts accepted after RFC 3339 and RFC 2822
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Normalise a phone number to digits plus an optional ` x<ext>` suffix
///
/// `"+1 (628) 688-6908X23"` becomes `"16286886908 x23"`. Applying it to an
/// already clean number returns the same number.
pub fn clean_phone(raw: &str) -> String {
    let digits = RE_PHONE_DISALLOWED.replace_all(raw, "");
    RE_EXTENSION
        .replace_all(&digits, " x")
        .trim()
        .to_string()
}

/// Collapse accidental `..` typos in email addresses
pub fn clean_email(raw: &str) -> String {
    raw.replace("..", ".")
}

/// Upper-case the first letter of every word, lower-case the rest
///
/// A word starts at any letter that follows a non-letter, so
/// `"very fAKE TREE"` becomes `"Very Fake Tree"`.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_is_letter = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

/// Parse a timestamp, normalising any offset to UTC
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_utc());
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Cast a license number to an integer, or `Null`
pub fn to_license_number(value: &Value) -> Value {
    match value {
        Value::Int(i) => Value::Int(*i),
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::Int(*f as i64),
        Value::Text(s) => s.trim().parse::<i64>().map(Value::Int).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn clean_text(value: &mut Value, f: impl Fn(&str) -> String) {
    if let Value::Text(s) = value {
        *s = f(s);
    }
}

fn clean_timestamp(value: &mut Value, column: &str, plant_id: &Value) {
    let parsed = match &*value {
        Value::Null | Value::Timestamp(_) => return,
        Value::Text(s) => parse_timestamp(s),
        _ => None,
    };
    if parsed.is_none() {
        warn!(
            "Unparsable {} '{}' for plant {}, storing null",
            column, value, plant_id
        );
    }
    *value = parsed.map(Value::Timestamp).unwrap_or(Value::Null);
}

/// Clean every row in place
pub fn clean_rows(rows: &mut [FlatRow]) {
    for row in rows.iter_mut() {
        let license = to_license_number(&row.license_number);
        if license.is_null() && !row.license_number.is_null() {
            warn!(
                "Non-numeric license number '{}' for plant {}, storing null",
                row.license_number, row.plant_id
            );
        }
        row.license_number = license;

        clean_text(&mut row.botanist_email, clean_email);
        clean_text(&mut row.species_name, title_case);
        clean_text(&mut row.species_scientific_name, title_case);
        clean_text(&mut row.city_name, title_case);

        if let Value::Int(number) = row.botanist_phone {
            row.botanist_phone = Value::Text(number.to_string());
        }
        clean_text(&mut row.botanist_phone, clean_phone);

        let plant_id = row.plant_id.clone();
        clean_timestamp(&mut row.reading_last_watered, "last_watered", &plant_id);
        clean_timestamp(&mut row.reading_time_taken, "time_taken", &plant_id);
    }
    info!("Cleaned {} rows", rows.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_clean_phone_symbols_and_extensions() {
        assert_eq!(clean_phone("+44 123-456-7890"), "441234567890");
        assert_eq!(clean_phone("07971231234x55   "), "07971231234 x55");
        assert_eq!(clean_phone("(415) 867-3157"), "4158673157");
        assert_eq!(clean_phone("+1 (628) 688-6908X23"), "16286886908 x23");
    }

    #[test]
    fn test_clean_phone_idempotent() {
        for raw in [
            "+44 123-456-7890",
            "07971231234x55   ",
            "+1 (628) 688-6908X23",
            "001-481-273-3691x1087",
            "",
        ] {
            let once = clean_phone(raw);
            assert_eq!(clean_phone(&once), once);
        }
    }

    #[test]
    fn test_clean_email() {
        assert_eq!(clean_email("pepper@fakegmail..com"), "pepper@fakegmail.com");
        assert_eq!(clean_email("crabby@fakegmail.com"), "crabby@fakegmail.com");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("Very fAKE TREE"), "Very Fake Tree");
        assert_eq!(title_case("lyon"), "Lyon");
        assert_eq!(title_case("saint-étienne"), "Saint-Étienne");
        assert_eq!(title_case("o'neil"), "O'Neil");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 13)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2025-11-13T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-11-13 10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-11-13T10:00:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-11-13T11:00:00+01:00"), Some(expected));
        assert_eq!(
            parse_timestamp("Thu, 13 Nov 2025 10:00:00 GMT"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_to_license_number() {
        assert_eq!(to_license_number(&Value::Int(45)), Value::Int(45));
        assert_eq!(to_license_number(&Value::Float(45.0)), Value::Int(45));
        assert_eq!(to_license_number(&Value::from("123445")), Value::Int(123445));
        assert!(to_license_number(&Value::Float(4.5)).is_null());
        assert!(to_license_number(&Value::from("CC-BY")).is_null());
        assert!(to_license_number(&Value::Null).is_null());
    }

    #[test]
    fn test_clean_rows() {
        let mut rows = vec![
            FlatRow {
                species_name: Value::from("fake plant"),
                city_name: Value::from("lyon"),
                license_number: Value::from("123445"),
                reading_last_watered: Value::from("2025-11-13T10:00:00"),
                reading_time_taken: Value::from("not a time"),
                ..Default::default()
            },
            FlatRow {
                species_scientific_name: Value::from("Very fAKE TREE"),
                botanist_email: Value::from("pepper@fakegmail..com"),
                botanist_phone: Value::from("+44 0987654321"),
                ..Default::default()
            },
        ];

        clean_rows(&mut rows);

        assert_eq!(rows[0].species_name, Value::from("Fake Plant"));
        assert_eq!(rows[0].city_name, Value::from("Lyon"));
        assert_eq!(rows[0].license_number, Value::Int(123445));
        assert!(matches!(rows[0].reading_last_watered, Value::Timestamp(_)));
        assert!(rows[0].reading_time_taken.is_null());
        assert_eq!(rows[1].species_scientific_name, Value::from("Very Fake Tree"));
        assert_eq!(rows[1].botanist_email, Value::from("pepper@fakegmail.com"));
        assert_eq!(rows[1].botanist_phone, Value::from("440987654321"));
        assert!(rows[1].license_number.is_null());
    }
}
