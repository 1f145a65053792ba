//! Publication dates as a profile page prints them: `Feb 6` for the current
//! year, `Feb 6, 2023` otherwise.

use chrono::{Datelike, Local, NaiveDate};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Month number for a three-letter abbreviation, in any case.
pub fn month_from_abbrev(token: &str) -> Option<u32> {
    if token.len() != 3 {
        return None;
    }
    let token = token.to_ascii_lowercase();
    MONTHS.iter().position(|m| *m == token).map(|i| i as u32 + 1)
}

/// True for text shaped like `Mon D` or `Mon D, YYYY`.
pub fn looks_like_date(text: &str) -> bool {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (month, day, year) = match tokens.as_slice() {
        [month, day] => (*month, *day, None),
        [month, day, year] => (*month, *day, Some(*year)),
        _ => return false,
    };

    let day = day.trim_end_matches(',');
    month_from_abbrev(month).is_some()
        && (1..=2).contains(&day.len())
        && day.bytes().all(|b| b.is_ascii_digit())
        && year.map_or(true, |y| parse_year(y).is_some())
}

/// Parses `Mon D` (in `today`'s year) or `Mon D, YYYY`. Anything else is `None`.
pub fn parse_published_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (month, day, year) = match tokens.as_slice() {
        [month, day] => (*month, *day, today.year()),
        [month, day, year] => (*month, *day, parse_year(year)?),
        _ => return None,
    };

    let month = month_from_abbrev(month)?;
    let day = day.trim_end_matches(',').parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// [`parse_published_date`] against the local clock.
pub fn parse_published_date_now(text: &str) -> Option<NaiveDate> {
    parse_published_date(text, Local::now().date_naive())
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_month_day_uses_current_year() {
        assert_eq!(parse_published_date("Feb 6", today()), date(2026, 2, 6));
        assert_eq!(parse_published_date("Dec 31", today()), date(2026, 12, 31));
        assert_eq!(parse_published_date("  oct   1 ", today()), date(2026, 10, 1));
    }

    #[test]
    fn test_month_day_year() {
        assert_eq!(parse_published_date("Feb 6, 2023", today()), date(2023, 2, 6));
        assert_eq!(parse_published_date("Jul 14, 2019", today()), date(2019, 7, 14));
        assert_eq!(parse_published_date("Mar 3 2021", today()), date(2021, 3, 3));
    }

    #[test]
    fn test_every_month_parses() {
        for (i, name) in ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"]
            .iter()
            .enumerate()
        {
            let parsed = parse_published_date(&format!("{} 1, 2024", name), today()).unwrap();
            assert_eq!(parsed.month(), i as u32 + 1);
        }
    }

    #[test]
    fn test_unparseable_is_none() {
        for text in [
            "",
            "   ",
            "Feb",
            "Febr 6",
            "Foo 6",
            "Feb x",
            "Feb 30",
            "Feb 29, 2023",
            "Feb 6, 23",
            "Feb 6, 2023 extra",
            "6 Feb",
            "5 min read",
        ] {
            assert_eq!(parse_published_date(text, today()), None, "{:?}", text);
        }
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(parse_published_date("Feb 29, 2024", today()), date(2024, 2, 29));
    }

    #[test]
    fn test_looks_like_date() {
        assert!(looks_like_date("Feb 6"));
        assert!(looks_like_date("Feb 6,"));
        assert!(looks_like_date("Sep 12, 2022"));
        assert!(!looks_like_date("Jan Kowalski"));
        assert!(!looks_like_date("May Chen, PhD"));
        assert!(!looks_like_date("Feb 123"));
        assert!(!looks_like_date("Feb 6, 22"));
        assert!(!looks_like_date("5 min read"));
        assert!(!looks_like_date("Member-only"));
        assert!(!looks_like_date(""));
    }

    #[test]
    fn test_now_wrapper_uses_local_year() {
        let parsed = parse_published_date_now("Feb 6").unwrap();
        assert_eq!(parsed.year(), Local::now().year());
    }
}
