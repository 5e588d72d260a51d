//! Unit newtypes for grid quantities.
//!
//! Loads, generator capacities and losses are carried as [`Megawatts`];
//! system frequency and its deviation as [`Hertz`]. Both are
//! `#[repr(transparent)]` wrappers over `f64`, so they cost nothing at runtime
//! while keeping megawatts from being added to hertz.
//!
//! ```
//! use avenue_core::units::{Hertz, Megawatts};
//!
//! let load = Megawatts(10.0) + Megawatts(2.5);
//! assert_eq!(load.value(), 12.5);
//!
//! let freq = Hertz(60.0) + Hertz(-0.02);
//! assert!(freq.value() < 60.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.2} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Active power in megawatts (MW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

/// Frequency (or frequency deviation) in hertz
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Hertz(pub f64);

impl_unit_ops!(Hertz, "Hz");

/// Nominal system frequency the deviation is reported against.
pub const BASE_FREQUENCY: Hertz = Hertz(60.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_of_loads() {
        let loads = [Megawatts(10.0), Megawatts(10.0), Megawatts(5.0)];
        let total: Megawatts = loads.iter().sum();
        assert_eq!(total, Megawatts(25.0));
    }

    #[test]
    fn test_ratio_is_dimensionless() {
        let ratio = Megawatts(5.0) / Megawatts(20.0);
        assert!((ratio - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_display_rounds_to_two_places() {
        assert_eq!(Hertz(59.98765).to_string(), "59.99 Hz");
        assert_eq!(Megawatts(3.0).to_string(), "3.00 MW");
    }
}
