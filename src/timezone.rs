use time::{Date, OffsetDateTime};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Today's date in `canonical_timezone`, e.g. "Asia/Tokyo".
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the name is not a known canonical
/// timezone.
pub fn local_date(canonical_timezone: &str) -> Result<Date, Error> {
    let timezone = time_tz::timezones::get_by_name(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_string()))?;

    let now = OffsetDateTime::now_utc();
    let offset = timezone.get_offset_utc(&now).to_utc();

    Ok(now.to_offset(offset).date())
}

#[cfg(test)]
mod local_date_tests {
    use crate::Error;

    use super::local_date;

    #[test]
    fn resolves_known_timezone() {
        let result = local_date("Asia/Tokyo");

        assert!(result.is_ok());
    }

    #[test]
    fn rejects_unknown_timezone() {
        let result = local_date("Mars/Olympus_Mons");

        assert_eq!(
            result,
            Err(Error::InvalidTimezone("Mars/Olympus_Mons".to_string()))
        );
    }
}
