//! Angle normalization.
//!
//! Longitudes arrive in whatever convention the source grid uses (0..360,
//! -180..180, or unwrapped values from arithmetic). Everything downstream
//! compares longitudes in a single half-open interval `[start, start + period)`.

use num_traits::{Float, FloatConst};
use serde::{Deserialize, Serialize};

/// Unit of an angle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    /// One full turn in this unit (360 or 2π).
    pub fn period<T: Float + FloatConst + From<u16>>(&self) -> T {
        match self {
            Self::Degrees => <T as From<u16>>::from(360),
            Self::Radians => T::TAU(),
        }
    }
}

/// Wrap `value` into `[start, start + period)`.
///
/// Values any number of periods away, negative or positive, land in the same
/// interval. A value an exact multiple of the period from `start` maps to
/// exactly `start`.
///
/// ```
/// use projection::{adjust_lon_range, AngleUnit};
///
/// assert_eq!(adjust_lon_range(378.0, AngleUnit::Degrees, 0.0), 18.0);
/// assert_eq!(adjust_lon_range(-30.0, AngleUnit::Degrees, 0.0), 330.0);
/// assert_eq!(adjust_lon_range(-30.0, AngleUnit::Degrees, -180.0), -30.0);
/// ```
pub fn adjust_lon_range<T>(value: T, unit: AngleUnit, start: T) -> T
where
    T: Float + FloatConst + From<u16>,
{
    let period: T = unit.period();

    // `%` is a truncated remainder, so negative offsets need one more period.
    let mut offset = (value - start) % period;
    if offset < T::zero() {
        offset = offset + period;
    }
    // A tiny negative remainder can round up to a full period.
    if offset >= period {
        offset = T::zero();
    }

    start + offset
}

/// Slice form of [`adjust_lon_range`].
pub fn adjust_lon_ranges<T>(values: &[T], unit: AngleUnit, start: T) -> Vec<T>
where
    T: Float + FloatConst + From<u16>,
{
    values
        .iter()
        .map(|&v| adjust_lon_range(v, unit, start))
        .collect()
}
