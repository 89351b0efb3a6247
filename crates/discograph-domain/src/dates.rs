//! Partial-date normalization (§4.1, tested by §8's date-normalization law).
//!
//! Upstream dates arrive as `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`; this pads the
//! first two forms out to a full date so every stored date column is a
//! `NaiveDate`, never a partial string.

use chrono::NaiveDate;

pub fn normalize_partial_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let parts: Vec<&str> = raw.split('-').collect();
    match parts.as_slice() {
        [y] => NaiveDate::from_ymd_opt(y.parse().ok()?, 1, 1),
        [y, m] => NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1),
        [y, m, d] => NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_a_bare_year() {
        assert_eq!(
            normalize_partial_date(Some("1977")),
            NaiveDate::from_ymd_opt(1977, 1, 1)
        );
    }

    #[test]
    fn pads_a_year_and_month() {
        assert_eq!(
            normalize_partial_date(Some("1977-06")),
            NaiveDate::from_ymd_opt(1977, 6, 1)
        );
    }

    #[test]
    fn passes_a_full_date_through() {
        assert_eq!(
            normalize_partial_date(Some("1977-06-12")),
            NaiveDate::from_ymd_opt(1977, 6, 12)
        );
    }

    #[test]
    fn none_and_empty_both_normalize_to_none() {
        assert_eq!(normalize_partial_date(None), None);
        assert_eq!(normalize_partial_date(Some("")), None);
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        assert_eq!(normalize_partial_date(Some("not-a-date")), None);
    }
}
