//! Brazilian Portuguese presentation of money and timestamps.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Separator between the currency symbol and the amount, as pt-BR formatters emit it.
pub const CURRENCY_SPACE: char = '\u{a0}';

/// Formats a value as BRL, e.g. `R$ 1.234,56`.
pub fn format_price(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let negative = value < 0.0 && cents > 0;

    let units = group_thousands(cents / 100);
    let fraction = cents % 100;

    format!(
        "{}R${}{},{:02}",
        if negative { "-" } else { "" },
        CURRENCY_SPACE,
        units,
        fraction
    )
}

/// Formats a non-negative amount with an explicit `+` or `-` prefix.
pub fn format_signed_price(sign: char, amount: f64) -> String {
    format!("{}{}", sign, format_price(amount))
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if value < 1000 {
            groups.push(value.to_string());
            break;
        }
        groups.push(format!("{:03}", value % 1000));
        value /= 1000;
    }
    groups.reverse();
    groups.join(".")
}

/// `dd/mm/yyyy, HH:MM:SS` in the given offset.
pub fn format_datetime(moment: &DateTime<Utc>, offset: &FixedOffset) -> String {
    moment
        .with_timezone(offset)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string()
}

/// Offset from minutes east of UTC, falling back to UTC when out of range.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| {
        log::warn!("UTC offset of {} minutes is out of range, using UTC", minutes);
        Utc.fix()
    })
}
