/// Errors raised while validating coordinates and locators.
///
/// Every variant is a local, recoverable failure. Callers are expected to keep
/// their previous valid state when one of these comes back.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("{what} {value} is outside of {min}..={max}")]
    Range {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid Maidenhead locator \"{0}\"")]
    Format(String),

    #[error("Couldn't parse {what} from \"{input}\"")]
    Parse { what: &'static str, input: String },
}

impl GeoError {
    pub(crate) fn range(what: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::Range {
            what,
            value,
            min,
            max,
        }
    }

    pub(crate) fn parse(what: &'static str, input: impl Into<String>) -> Self {
        Self::Parse {
            what,
            input: input.into(),
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. })
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
