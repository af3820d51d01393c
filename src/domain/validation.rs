use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidEmail { input: String },
    InvalidPhoneNumber { input: String },
    InvalidCountryCode { input: String },
    InvalidUrl { field: &'static str, input: String },
    DateRangeInverted { start: String, end: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidEmail { input } => write!(f, "invalid email address: {input}"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidCountryCode { input } => {
                write!(f, "invalid country code: {input} (expected two letters)")
            }
            Self::InvalidUrl { field, input } => write!(f, "invalid {field} URL: {input}"),
            Self::DateRangeInverted { start, end } => {
                write!(f, "date range is inverted: {start} is after {end}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
