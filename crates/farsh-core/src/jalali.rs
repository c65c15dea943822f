//! # Jalali Dates
//!
//! Solar Hijri (Jalali) calendar display for printed invoices.
//!
//! The shop reads dates in the Jalali calendar; the backend stores Gregorian.
//! Conversion is one-way (Gregorian → Jalali) because input always arrives
//! as ISO dates.
//!
//! ```text
//!   2024-03-20  ──►  1403/01/01   (Nowruz)
//!   2025-03-20  ──►  1403/12/30   (last day of a leap year)
//! ```

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use ts_rs::TS;

/// Cumulative day counts before each Gregorian month (non-leap).
const GREGORIAN_DAYS_BEFORE_MONTH: [i64; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

const MONTH_NAMES: [&str; 12] = [
    "فروردین",
    "اردیبهشت",
    "خرداد",
    "تیر",
    "مرداد",
    "شهریور",
    "مهر",
    "آبان",
    "آذر",
    "دی",
    "بهمن",
    "اسفند",
];

/// A date in the Jalali calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, TS)]
#[ts(export)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    /// Converts a Gregorian date.
    ///
    /// Arithmetic follows the 33-year cycle approximation used by the common
    /// `jdf` routines; it is exact for 1925-2088, which covers every invoice.
    pub fn from_gregorian(date: NaiveDate) -> Self {
        let gy = date.year() as i64;
        let gm = date.month() as usize;
        let gd = date.day() as i64;

        let gy2 = if gm > 2 { gy + 1 } else { gy };
        let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100
            + (gy2 + 399) / 400
            + gd
            + GREGORIAN_DAYS_BEFORE_MONTH[gm - 1];

        let mut jy = -1595 + 33 * (days / 12_053);
        days %= 12_053;
        jy += 4 * (days / 1461);
        days %= 1461;
        if days > 365 {
            jy += (days - 1) / 365;
            days = (days - 1) % 365;
        }

        let (jm, jd) = if days < 186 {
            (1 + days / 31, 1 + days % 31)
        } else {
            (7 + (days - 186) / 30, 1 + (days - 186) % 30)
        };

        JalaliDate {
            year: jy as i32,
            month: jm as u32,
            day: jd as u32,
        }
    }

    /// Persian month name, e.g. "فروردین".
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month as usize).clamp(1, 12) - 1]
    }
}

/// `YYYY/MM/DD` with Latin digits; the built-in PDF fonts have no Persian
/// digit glyphs.
impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for JalaliDate {
    fn from(date: NaiveDate) -> Self {
        JalaliDate::from_gregorian(date)
    }
}

/// Shorthand for `JalaliDate::from_gregorian(date).to_string()`.
pub fn format_jalali(date: NaiveDate) -> String {
    JalaliDate::from_gregorian(date).to_string()
}
