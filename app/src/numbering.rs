use time::{Date, OffsetDateTime};

/// Builds `INV-{YY}{MM}-{load_number}` for the given date.
///
/// An empty load number yields an empty string so callers can hide the
/// preview instead of showing a half-built number.
pub fn invoice_number(load_number: &str, date: Date) -> String {
    if load_number.is_empty() {
        return String::new();
    }
    let yy = date.year().rem_euclid(100);
    let mm = u8::from(date.month());
    format!("INV-{:02}{:02}-{}", yy, mm, load_number)
}

/// Local calendar date, falling back to UTC when the local offset is unknown.
pub fn today() -> Date {
    local_now().date()
}

pub(crate) fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Number shown while the load number is being typed. The persisted number is
/// computed again at submission, so a month rollover in between only changes
/// what was previewed.
pub fn preview_invoice_number(load_number: &str) -> String {
    invoice_number(load_number, today())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn formats_two_digit_year_and_month() {
        assert_eq!(invoice_number("76430", date!(2025 - 08 - 12)), "INV-2508-76430");
        assert_eq!(invoice_number("L-2024-001", date!(2024 - 12 - 31)), "INV-2412-L-2024-001");
        assert_eq!(invoice_number("7", date!(2009 - 01 - 01)), "INV-0901-7");
    }

    #[test]
    fn empty_load_number_gives_empty_string() {
        assert_eq!(invoice_number("", date!(2025 - 08 - 12)), "");
        assert_eq!(preview_invoice_number(""), "");
    }

    #[test]
    fn same_load_in_different_months_differs() {
        let a = invoice_number("76430", date!(2025 - 08 - 31));
        let b = invoice_number("76430", date!(2025 - 09 - 01));
        assert_ne!(a, b);
        assert_eq!(b, "INV-2509-76430");
    }

    #[test]
    fn load_number_is_copied_verbatim() {
        assert_eq!(invoice_number(" 12 ", date!(2030 - 10 - 05)), "INV-3010- 12 ");
    }
}
