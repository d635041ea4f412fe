// src/utils/timesince.rs

use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, Offset, TimeDelta, Timelike, Utc};

/// Language used for month names and relative phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Ru,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

/// Presentation settings for creation timestamps.
#[derive(Debug, Clone, Copy)]
pub struct TimeDisplay {
    pub locale: Locale,
    /// Offset used when printing absolute dates.
    pub utc_offset: FixedOffset,
}

impl TimeDisplay {
    pub fn new(locale: Locale, utc_offset: FixedOffset) -> Self {
        Self { locale, utc_offset }
    }
}

impl Default for TimeDisplay {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            utc_offset: Utc.fix(),
        }
    }
}

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

// Genitive forms, as used after a day number.
const MONTHS_RU: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
    "октября", "ноября", "декабря",
];

const MONTHS_RU_SHORT: [&str; 12] = [
    "янв", "фев", "мар", "апр", "мая", "июн", "июл", "авг", "сен", "окт", "ноя", "дек",
];

#[derive(Debug, Clone, Copy)]
enum Unit {
    Week,
    Day,
    Hour,
    Minute,
}

impl Unit {
    fn word(self, n: i64, locale: Locale) -> &'static str {
        match locale {
            Locale::En => {
                let one = n == 1;
                match (self, one) {
                    (Unit::Week, true) => "week",
                    (Unit::Week, false) => "weeks",
                    (Unit::Day, true) => "day",
                    (Unit::Day, false) => "days",
                    (Unit::Hour, true) => "hour",
                    (Unit::Hour, false) => "hours",
                    (Unit::Minute, true) => "minute",
                    (Unit::Minute, false) => "minutes",
                }
            }
            Locale::Ru => {
                let forms = match self {
                    Unit::Week => ["неделя", "недели", "недель"],
                    Unit::Day => ["день", "дня", "дней"],
                    Unit::Hour => ["час", "часа", "часов"],
                    Unit::Minute => ["минуту", "минуты", "минут"],
                };
                forms[ru_plural(n)]
            }
        }
    }
}

/// Index into `[one, few, many]` following Russian plural rules.
fn ru_plural(n: i64) -> usize {
    let n = n.abs();
    let (rem10, rem100) = (n % 10, n % 100);
    if rem10 == 1 && rem100 != 11 {
        0
    } else if (2..=4).contains(&rem10) && !(12..=14).contains(&rem100) {
        1
    } else {
        2
    }
}

/// How long ago `created` happened, as shown next to posts and comments.
///
/// * a year or more: the date only, `01 January 2000`
/// * more than a week: day, short month and time, `01 Jan at 12:00`
/// * a week or less: the largest whole unit, `3 hours ago`
pub fn format_timesince(
    created: DateTime<Utc>,
    now: DateTime<Utc>,
    display: &TimeDisplay,
) -> String {
    let elapsed = (now - created).max(TimeDelta::zero());

    if elapsed >= TimeDelta::days(365) {
        format_date(created, display)
    } else if elapsed > TimeDelta::days(7) {
        format_date_time(created, display)
    } else {
        format_relative(elapsed, display.locale)
    }
}

fn format_date(created: DateTime<Utc>, display: &TimeDisplay) -> String {
    let local = created.with_timezone(&display.utc_offset);
    let month = local.month0() as usize;
    let name = match display.locale {
        Locale::En => MONTHS_EN[month],
        Locale::Ru => MONTHS_RU[month],
    };
    format!("{:02} {} {}", local.day(), name, local.year())
}

fn format_date_time(created: DateTime<Utc>, display: &TimeDisplay) -> String {
    let local = created.with_timezone(&display.utc_offset);
    let month = local.month0() as usize;
    let (name, at) = match display.locale {
        Locale::En => (&MONTHS_EN[month][..3], "at"),
        Locale::Ru => (MONTHS_RU_SHORT[month], "в"),
    };
    format!(
        "{:02} {} {} {:02}:{:02}",
        local.day(),
        name,
        at,
        local.hour(),
        local.minute()
    )
}

fn format_relative(elapsed: TimeDelta, locale: Locale) -> String {
    let (count, unit) = if elapsed.num_weeks() > 0 {
        (elapsed.num_weeks(), Unit::Week)
    } else if elapsed.num_days() > 0 {
        (elapsed.num_days(), Unit::Day)
    } else if elapsed.num_hours() > 0 {
        (elapsed.num_hours(), Unit::Hour)
    } else {
        (elapsed.num_minutes(), Unit::Minute)
    };

    let ago = match locale {
        Locale::En => "ago",
        Locale::Ru => "назад",
    };
    format!("{} {} {}", count, unit.word(count, locale), ago)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 28, 16, 40, 0).unwrap()
    }

    fn en() -> TimeDisplay {
        TimeDisplay::default()
    }

    fn ru_moscow() -> TimeDisplay {
        TimeDisplay::new(Locale::Ru, FixedOffset::east_opt(3 * 3600).unwrap())
    }

    #[test]
    fn ten_minutes_is_relative() {
        let created = now() - TimeDelta::minutes(10);
        assert_eq!(format_timesince(created, now(), &en()), "10 minutes ago");
        assert_eq!(format_timesince(created, now(), &ru_moscow()), "10 минут назад");
    }

    #[test]
    fn relative_keeps_only_largest_unit() {
        let created = now() - TimeDelta::days(1) - TimeDelta::hours(5);
        assert_eq!(format_timesince(created, now(), &en()), "1 day ago");
        assert_eq!(format_timesince(created, now(), &ru_moscow()), "1 день назад");

        let created = now() - TimeDelta::hours(3) - TimeDelta::minutes(59);
        assert_eq!(format_timesince(created, now(), &en()), "3 hours ago");
        assert_eq!(format_timesince(created, now(), &ru_moscow()), "3 часа назад");
    }

    #[test]
    fn under_a_minute_and_future_are_zero_minutes() {
        let created = now() - TimeDelta::seconds(30);
        assert_eq!(format_timesince(created, now(), &en()), "0 minutes ago");
        let future = now() + TimeDelta::hours(2);
        assert_eq!(format_timesince(future, now(), &en()), "0 minutes ago");
    }

    #[test]
    fn ten_days_is_date_and_time() {
        let created = now() - TimeDelta::days(10);
        assert_eq!(format_timesince(created, now(), &en()), "18 Sep at 16:40");
        assert_eq!(format_timesince(created, now(), &ru_moscow()), "18 сен в 19:40");
    }

    #[test]
    fn two_years_is_date_only() {
        let created = Utc.with_ymd_and_hms(2022, 9, 28, 16, 40, 0).unwrap();
        assert_eq!(format_timesince(created, now(), &en()), "28 September 2022");
        assert_eq!(format_timesince(created, now(), &ru_moscow()), "28 сентября 2022");
    }

    #[test]
    fn exactly_seven_days_is_still_relative() {
        let created = now() - TimeDelta::days(7);
        assert_eq!(format_timesince(created, now(), &en()), "1 week ago");
        assert_eq!(format_timesince(created, now(), &ru_moscow()), "1 неделя назад");
    }

    #[test]
    fn just_over_seven_days_is_date_and_time() {
        let created = now() - TimeDelta::days(7) - TimeDelta::minutes(1);
        assert_eq!(format_timesince(created, now(), &en()), "21 Sep at 16:39");
    }

    #[test]
    fn year_boundary_is_date_only() {
        let created = now() - TimeDelta::days(365);
        assert_eq!(format_timesince(created, now(), &en()), "29 September 2023");

        let created = now() - TimeDelta::days(364);
        assert_eq!(format_timesince(created, now(), &en()), "30 Sep at 16:40");
    }

    #[test]
    fn absolute_dates_use_display_offset() {
        // 22:30 UTC is already the next day in Moscow
        let created = Utc.with_ymd_and_hms(2024, 1, 31, 22, 30, 0).unwrap();
        assert_eq!(format_timesince(created, now(), &ru_moscow()), "01 февраля 2024");
    }

    #[test]
    fn russian_plural_forms() {
        assert_eq!(ru_plural(1), 0);
        assert_eq!(ru_plural(21), 0);
        assert_eq!(ru_plural(11), 2);
        assert_eq!(ru_plural(3), 1);
        assert_eq!(ru_plural(13), 2);
        assert_eq!(ru_plural(5), 2);
        assert_eq!(ru_plural(0), 2);
    }

    #[test]
    fn locale_parses_case_insensitively() {
        assert_eq!("RU".parse::<Locale>(), Ok(Locale::Ru));
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }
}
