//! Time bucketing rules

use crate::key::encoder::{KeyEncoder, KeyFragment};

/// The bucketing rule applied to row timestamps during aggregation
///
/// Granularity changes what is computed per segment, so it participates in
/// both cache key tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One bucket spanning the whole query interval
    All,

    /// Calendar second buckets
    Second,

    /// Calendar minute buckets
    Minute,

    /// Calendar hour buckets
    Hour,

    /// Calendar day buckets
    Day,

    /// Calendar week buckets
    Week,

    /// Calendar month buckets
    Month,

    /// Calendar year buckets
    Year,

    /// Fixed-width buckets of the given duration
    Duration {
        /// Bucket width in milliseconds
        millis: i64,
    },
}

impl Granularity {
    fn key_tag(&self) -> u8 {
        match self {
            Granularity::All => 0x10,
            Granularity::Second => 0x11,
            Granularity::Minute => 0x12,
            Granularity::Hour => 0x13,
            Granularity::Day => 0x14,
            Granularity::Week => 0x15,
            Granularity::Month => 0x16,
            Granularity::Year => 0x17,
            Granularity::Duration { .. } => 0x18,
        }
    }
}

impl KeyFragment for Granularity {
    fn write_key(&self, key: &mut KeyEncoder) {
        key.push_byte(self.key_tag());
        if let Granularity::Duration { millis } = self {
            key.push_i64(*millis);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(gran: &Granularity) -> bytes::Bytes {
        let mut key = KeyEncoder::default();
        key.push_fragment(gran);
        key.finish()
    }

    #[test]
    fn test_calendar_variants_distinct() {
        assert_ne!(key_of(&Granularity::Day), key_of(&Granularity::Hour));
        assert_ne!(key_of(&Granularity::All), key_of(&Granularity::Year));
    }

    #[test]
    fn test_duration_width_changes_key() {
        let a = Granularity::Duration { millis: 60_000 };
        let b = Granularity::Duration { millis: 300_000 };
        assert_ne!(key_of(&a), key_of(&b));
    }
}
