use bitflags::bitflags;

// -----------------------------------------------------------------------------
// Modifiers

bitflags! {
    /// The fixed modifier vocabulary of a directive.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Skip the attribute when its value is empty (`""`, `[]`, `None`, ...).
        const OMIT_IF_EMPTY = 1 << 0;
        /// Skip the attribute when its value is the zero value of its type.
        const OMIT_IF_ZERO  = 1 << 1;
        /// Seconds-precision ISO-8601 timestamps.
        const ISO8601       = 1 << 2;
        /// RFC 3339 timestamps with automatic fractional seconds.
        const RFC3339       = 1 << 3;
        /// Unix seconds as an integer.
        const TIMESTAMP     = 1 << 4;
        /// `YYYY-MM-DD`.
        const DATE_ONLY     = 1 << 5;
        /// `HH:MM:SS`.
        const TIME_ONLY     = 1 << 6;

        /// All time format modifiers; at most one may be set.
        const TIME_FORMATS = Self::ISO8601.bits()
            | Self::RFC3339.bits()
            | Self::TIMESTAMP.bits()
            | Self::DATE_ONLY.bits()
            | Self::TIME_ONLY.bits();
    }
}

impl Modifiers {
    /// Match a single annotation token against the vocabulary.
    pub fn from_token(token: &str) -> Option<Self> {
        let flag = match token {
            "omit_if_empty" | "omitempty" => Self::OMIT_IF_EMPTY,
            "omit_if_zero" | "omitzero" => Self::OMIT_IF_ZERO,
            "iso8601" => Self::ISO8601,
            "rfc3339" => Self::RFC3339,
            "timestamp" | "unix" => Self::TIMESTAMP,
            "date_only" | "date" => Self::DATE_ONLY,
            "time_only" | "time" => Self::TIME_ONLY,
            _ => return None,
        };
        Some(flag)
    }

    /// Whether `token` is a short alias that doubles as an ordinary word.
    ///
    /// These only act as modifiers after the name slot, so `attr,date`
    /// names an attribute `date`.
    pub fn is_word_alias(token: &str) -> bool {
        matches!(token, "unix" | "date" | "time")
    }

    /// Canonical token of a single flag.
    pub fn token(self) -> Option<&'static str> {
        const TOKENS: [(Modifiers, &str); 7] = [
            (Modifiers::OMIT_IF_EMPTY, "omit_if_empty"),
            (Modifiers::OMIT_IF_ZERO, "omit_if_zero"),
            (Modifiers::ISO8601, "iso8601"),
            (Modifiers::RFC3339, "rfc3339"),
            (Modifiers::TIMESTAMP, "timestamp"),
            (Modifiers::DATE_ONLY, "date_only"),
            (Modifiers::TIME_ONLY, "time_only"),
        ];

        TOKENS
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, token)| *token)
    }
}

// -----------------------------------------------------------------------------
// TimeFormat

/// Wire representation of a time value, resolved from [`Modifiers`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimeFormat {
    /// Millisecond-precision ISO-8601, e.g. `2024-01-02T03:04:05.000Z`.
    #[default]
    Default,
    /// Seconds-precision ISO-8601, e.g. `2024-01-02T03:04:05Z`.
    Iso8601,
    /// RFC 3339 with as many fractional digits as needed.
    Rfc3339,
    /// Unix seconds.
    Timestamp,
    /// `YYYY-MM-DD`.
    DateOnly,
    /// `HH:MM:SS`.
    TimeOnly,
}

impl From<Modifiers> for TimeFormat {
    fn from(modifiers: Modifiers) -> Self {
        if modifiers.contains(Modifiers::TIMESTAMP) {
            Self::Timestamp
        } else if modifiers.contains(Modifiers::DATE_ONLY) {
            Self::DateOnly
        } else if modifiers.contains(Modifiers::TIME_ONLY) {
            Self::TimeOnly
        } else if modifiers.contains(Modifiers::RFC3339) {
            Self::Rfc3339
        } else if modifiers.contains(Modifiers::ISO8601) {
            Self::Iso8601
        } else {
            Self::Default
        }
    }
}
