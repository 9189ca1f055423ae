use chrono::{DateTime, Datelike, Timelike, Utc};

const MONTHS: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni",
    "Juli", "Agustus", "September", "Oktober", "November", "Desember",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun",
    "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// `5 Maret 2024`
pub fn format_date_id(at: &DateTime<Utc>) -> String {
    format!("{} {} {}", at.day(), MONTHS[at.month0() as usize], at.year())
}

/// `5 Mar 2024, 09:07`
pub fn format_datetime_short_id(at: &DateTime<Utc>) -> String {
    format!(
        "{} {} {}, {:02}:{:02}",
        at.day(),
        MONTHS_SHORT[at.month0() as usize],
        at.year(),
        at.hour(),
        at.minute()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn indonesian_month_names() {
        let at = Utc.with_ymd_and_hms(2024, 8, 17, 9, 5, 0).unwrap();
        assert_eq!(format_date_id(&at), "17 Agustus 2024");
        assert_eq!(format_datetime_short_id(&at), "17 Agu 2024, 09:05");
    }
}
