use time::{Date, Duration};

fn month_day(d: Date) -> (u8, u8) {
    (u8::from(d.month()), d.day())
}

/// Whether `birthday` falls inside the rolling window `[today, today + days]`
/// when only month and day are compared.
///
/// The window endpoints come from real date arithmetic, so `today + days`
/// may land in the next calendar year; in that case the window wraps and a
/// birthday matches when it is on or after the start month-day OR on or
/// before the end month-day. Comparison is on (month, day) tuples, which
/// orders identically to the `MM-DD` strings Postgres `to_char` would
/// produce, including Feb 29: a leap-day birthday matches whenever (2, 29)
/// lies inside the tuple window, whether or not the current year is a leap
/// year.
pub fn birthday_in_window(birthday: Date, today: Date, days: i64) -> bool {
    let end = today.saturating_add(Duration::days(days));
    let b = month_day(birthday);
    let start = month_day(today);
    let end = month_day(end);
    if start <= end {
        b >= start && b <= end
    } else {
        b >= start || b <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn window_within_one_year() {
        let today = date!(2024 - 06 - 10);
        assert!(birthday_in_window(date!(1990 - 06 - 10), today, 7));
        assert!(birthday_in_window(date!(1990 - 06 - 17), today, 7));
        assert!(!birthday_in_window(date!(1990 - 06 - 18), today, 7));
        assert!(!birthday_in_window(date!(1990 - 06 - 09), today, 7));
    }

    #[test]
    fn window_wraps_across_new_year() {
        // Dec 28 + 10 days spans Dec 28-31 and Jan 1-7
        let today = date!(2024 - 12 - 28);
        assert!(birthday_in_window(date!(1985 - 01 - 03), today, 10));
        assert!(birthday_in_window(date!(1970 - 12 - 31), today, 10));
        assert!(birthday_in_window(date!(2000 - 01 - 07), today, 10));
        assert!(!birthday_in_window(date!(1992 - 06 - 15), today, 10));
        assert!(!birthday_in_window(date!(2000 - 01 - 08), today, 10));
        assert!(!birthday_in_window(date!(1970 - 12 - 27), today, 10));
    }

    #[test]
    fn zero_days_matches_only_today() {
        let today = date!(2024 - 06 - 15);
        assert!(birthday_in_window(date!(1999 - 06 - 15), today, 0));
        assert!(!birthday_in_window(date!(1999 - 06 - 16), today, 0));
        assert!(!birthday_in_window(date!(1999 - 06 - 14), today, 0));
    }

    #[test]
    fn leap_day_birthday_in_non_leap_year() {
        // Feb 28 of a non-leap year, one day ahead: the window runs Feb 28
        // through Mar 1 and (2, 29) sits inside it even though the year has
        // no Feb 29.
        let today = date!(2023 - 02 - 28);
        assert!(birthday_in_window(date!(2000 - 02 - 29), today, 1));
        assert!(!birthday_in_window(date!(2000 - 02 - 29), today, 0));

        // in a leap year the day exists and matches exactly
        assert!(birthday_in_window(date!(2000 - 02 - 29), date!(2024 - 02 - 29), 0));
    }

    #[test]
    fn year_of_birth_is_ignored() {
        let today = date!(2024 - 03 - 01);
        for year in [1950, 1988, 2024] {
            let birthday = Date::from_calendar_date(year, time::Month::March, 3).unwrap();
            assert!(birthday_in_window(birthday, today, 5));
        }
    }
}
