use chrono::NaiveDate;

/// Date format used on the site, e.g. `Jul 16, 2010`.
pub const SITE_FORMAT: &str = "%b %d, %Y";

/// Date format written to the sheet, e.g. `07/16/10`.
pub const SHEET_FORMAT: &str = "%m/%d/%y";

pub fn is_site_date(value: &str) -> bool {
    release_date(value).is_some()
}

/// Month, day and year must be separated by whitespace; chrono alone would
/// also accept `Jan 01,2020`.
pub fn release_date(value: &str) -> Option<NaiveDate> {
    if value.split_whitespace().count() != 3 {
        return None;
    }
    NaiveDate::parse_from_str(value, SITE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_site_dates() {
        assert!(is_site_date("Jan 01, 2020"));
        assert!(is_site_date("Jul 16, 2010"));
    }

    #[test]
    fn rejects_other_formats() {
        assert!(!is_site_date("2020-01-01"));
        assert!(!is_site_date(""));
        assert!(!is_site_date("Aired Jun 22, 2023"));
        assert!(!is_site_date("Feb 30, 2020"));
        assert!(!is_site_date("Jan 01,2020"));
        assert!(!is_site_date("January 01, 2020"));
    }

    #[test]
    fn renders_for_the_sheet() {
        let date = release_date("Jul 16, 2010").unwrap();
        assert_eq!(date.format(SHEET_FORMAT).to_string(), "07/16/10");
    }
}
