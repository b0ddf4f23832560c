//! Utility modules for the serializer.

pub mod datetime;
pub mod number;

pub use datetime::{
    format_date, format_datetime_offset, format_duration, format_time_of_day, parse_date,
    parse_datetime_offset, parse_duration, parse_time_of_day, DateTimeParseError,
};
pub use number::{format_double, format_single};
