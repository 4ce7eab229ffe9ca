use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use farebox_shared::models::Booking;

/// User-selected temporal filter over a booking list. `Custom` requires
/// both bounds; with either missing it matches nothing. (The reference
/// client happened to carry over the previous filtered list in that case;
/// the documented contract here is the empty result.)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingFilter {
    All,
    Today,
    ThisWeek,
    ThisMonth,
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

/// Filter a booking list by booking time against the local calendar.
/// Order-preserving; the output is always a subset of the input and the
/// input is never mutated. Always computed from the full list.
pub fn filter_bookings(
    bookings: &[Booking],
    filter: &BookingFilter,
    now: DateTime<Local>,
) -> Vec<Booking> {
    match filter {
        BookingFilter::All => bookings.to_vec(),
        BookingFilter::Today => {
            let today = now.date_naive();
            keep(bookings, |t| t.date() == today)
        }
        BookingFilter::ThisWeek => {
            // Week runs Sunday 00:00:00.000 through Saturday 23:59:59.999.
            let offset = now.date_naive().weekday().num_days_from_sunday() as i64;
            let week_start = now.date_naive() - Duration::days(offset);
            let start = start_of_day(week_start);
            let end = end_of_day(week_start + Duration::days(6));
            keep(bookings, |t| t >= start && t <= end)
        }
        BookingFilter::ThisMonth => {
            let (month, year) = (now.month(), now.year());
            keep(bookings, |t| t.month() == month && t.year() == year)
        }
        BookingFilter::Custom {
            start: Some(start),
            end: Some(end),
        } => {
            let lo = start_of_day(*start);
            let hi = end_of_day(*end);
            keep(bookings, |t| t >= lo && t <= hi)
        }
        BookingFilter::Custom { .. } => Vec::new(),
    }
}

fn keep(bookings: &[Booking], mut in_window: impl FnMut(NaiveDateTime) -> bool) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| in_window(b.booking_time.with_timezone(&Local).naive_local()))
        .cloned()
        .collect()
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last_instant =
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid end-of-day time");
    date.and_time(last_instant)
}
