//! Human-readable reference numbers.

use chrono::NaiveDate;
use uuid::Uuid;

use super::family::Family;

/// Builds `PREFIX-YYYYMMDD-xxxxxx` from the family, business date and the
/// first six hex digits of the movement id.
#[must_use]
pub fn generate_reference(family: Family, date: NaiveDate, movement_id: Uuid) -> String {
    let simple = movement_id.simple().to_string();
    format!(
        "{}-{}-{}",
        family.reference_prefix(),
        date.format("%Y%m%d"),
        &simple[..6]
    )
}

/// Trims a caller-supplied reference; blank means "generate one".
#[must_use]
pub fn normalize_reference(reference: Option<&str>) -> Option<String> {
    reference
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reference() {
        let id = Uuid::parse_str("a1b2c3d4-0000-0000-0000-000000000000").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            generate_reference(Family::StockIn, date, id),
            "SI-20261016-a1b2c3"
        );
        assert_eq!(
            generate_reference(Family::Sale, date, id),
            "SALE-20261016-a1b2c3"
        );
        assert_eq!(
            generate_reference(Family::Reject, date, id),
            "REJ-20261016-a1b2c3"
        );
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference(None), None);
        assert_eq!(normalize_reference(Some("   ")), None);
        assert_eq!(
            normalize_reference(Some(" INV-7 ")),
            Some("INV-7".to_string())
        );
    }
}
