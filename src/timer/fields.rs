//! Duration field value objects
//!
//! Each field is a bounded integer that knows its own range and how many
//! milliseconds one unit is worth. Raw user input is normalized on the way
//! in, so a constructed field is always in range.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize, Serializer};

/// Compile-time description of a duration unit
pub trait DurationUnit {
    const NAME: &'static str;
    const MIN: u32;
    const MAX: u32;
    const DEFAULT: u32;
    const MS_PER_UNIT: i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondUnit;

impl DurationUnit for HourUnit {
    const NAME: &'static str = "hours";
    const MIN: u32 = 0;
    const MAX: u32 = 23;
    const DEFAULT: u32 = 0;
    const MS_PER_UNIT: i64 = 3_600_000;
}

impl DurationUnit for MinuteUnit {
    const NAME: &'static str = "minutes";
    const MIN: u32 = 0;
    const MAX: u32 = 59;
    const DEFAULT: u32 = 0;
    const MS_PER_UNIT: i64 = 60_000;
}

impl DurationUnit for SecondUnit {
    const NAME: &'static str = "seconds";
    const MIN: u32 = 0;
    const MAX: u32 = 59;
    const DEFAULT: u32 = 0;
    const MS_PER_UNIT: i64 = 1_000;
}

/// Clamp a raw numeric input into `[min, max]`.
///
/// `NaN` maps to `min`, anything above `max` maps to `max`. Values below
/// `min` (including negative infinity) also map to `min`, and fractional
/// input is truncated toward zero.
pub fn normalize(raw: f64, min: u32, max: u32) -> u32 {
    if raw.is_nan() {
        return min;
    }
    if raw > max as f64 {
        return max;
    }
    if raw < min as f64 {
        return min;
    }
    raw.trunc() as u32
}

/// A single bounded duration component
pub struct DurationField<U> {
    value: u32,
    _unit: PhantomData<U>,
}

pub type Hours = DurationField<HourUnit>;
pub type Minutes = DurationField<MinuteUnit>;
pub type Seconds = DurationField<SecondUnit>;

impl<U: DurationUnit> DurationField<U> {
    /// Build a field from raw input, clamping it into range
    pub fn new(raw: f64) -> Self {
        Self {
            value: normalize(raw, U::MIN, U::MAX),
            _unit: PhantomData,
        }
    }

    pub fn from_value(value: u32) -> Self {
        Self::new(value as f64)
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_min(&self) -> bool {
        self.value == U::MIN
    }

    pub fn to_milliseconds(&self) -> i64 {
        self.value as i64 * U::MS_PER_UNIT
    }

    pub fn name(&self) -> &'static str {
        U::NAME
    }
}

// Manual impls so the marker type doesn't need to carry the bounds.
impl<U> Clone for DurationField<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for DurationField<U> {}

impl<U> PartialEq for DurationField<U> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<U> Eq for DurationField<U> {}

impl<U: DurationUnit> Default for DurationField<U> {
    fn default() -> Self {
        Self::from_value(U::DEFAULT)
    }
}

impl<U: DurationUnit> std::fmt::Debug for DurationField<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", U::NAME, self.value)
    }
}

impl<U> Serialize for DurationField<U> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.value)
    }
}

impl<'de, U: DurationUnit> Deserialize<'de> for DurationField<U> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Ok(Self::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nan_maps_to_minimum() {
        assert_eq!(Hours::new(f64::NAN).value(), 0);
        assert_eq!(Minutes::new(f64::NAN).value(), 0);
        assert_eq!(Seconds::new(f64::NAN).value(), 0);
    }

    #[test]
    fn values_above_max_are_clamped() {
        assert_eq!(Hours::new(24.0).value(), 23);
        assert_eq!(Minutes::new(60.0).value(), 59);
        assert_eq!(Seconds::new(1_000.0).value(), 59);
        assert_eq!(Seconds::new(f64::INFINITY).value(), 59);
    }

    #[test]
    fn negative_and_fractional_input() {
        assert_eq!(Minutes::new(-5.0).value(), 0);
        assert_eq!(Minutes::new(f64::NEG_INFINITY).value(), 0);
        assert_eq!(Seconds::new(12.9).value(), 12);
    }

    #[test]
    fn converts_to_milliseconds() {
        assert_eq!(Hours::new(2.0).to_milliseconds(), 7_200_000);
        assert_eq!(Minutes::new(3.0).to_milliseconds(), 180_000);
        assert_eq!(Seconds::new(5.0).to_milliseconds(), 5_000);
    }

    #[test]
    fn deserializes_through_the_clamp() {
        let hours: Hours = serde_json::from_str("99").unwrap();
        assert_eq!(hours.value(), 23);
        assert_eq!(serde_json::to_string(&hours).unwrap(), "23");
    }

    proptest! {
        #[test]
        fn normalize_stays_in_range(raw in proptest::num::f64::ANY) {
            let hours = normalize(raw, HourUnit::MIN, HourUnit::MAX);
            prop_assert!(hours <= HourUnit::MAX);

            let seconds = Seconds::new(raw).value();
            prop_assert!(seconds <= SecondUnit::MAX);
        }

        #[test]
        fn in_range_integers_are_kept(value in 0u32..=59) {
            prop_assert_eq!(Minutes::from_value(value).value(), value);
        }
    }
}
