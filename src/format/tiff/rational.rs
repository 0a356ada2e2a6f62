//! Rational number pairs as stored in RATIONAL and SRATIONAL entries.
//!
//! Values are surfaced exactly as stored: no reduction, and a zero
//! denominator is not rejected.

use std::fmt;

/// Unsigned numerator/denominator pair (TIFF RATIONAL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// Numerator as stored
    pub numerator: u32,

    /// Denominator as stored, possibly zero
    pub denominator: u32,
}

impl Rational {
    /// Create a pair without reducing it.
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Quotient as a float. A zero denominator yields infinity or NaN.
    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl From<(u32, u32)> for Rational {
    fn from((numerator, denominator): (u32, u32)) -> Self {
        Self::new(numerator, denominator)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Signed numerator/denominator pair (TIFF SRATIONAL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignedRational {
    /// Numerator as stored
    pub numerator: i32,

    /// Denominator as stored, possibly zero
    pub denominator: i32,
}

impl SignedRational {
    /// Create a pair without reducing it.
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Quotient as a float. A zero denominator yields infinity or NaN.
    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl From<(i32, i32)> for SignedRational {
    fn from((numerator, denominator): (i32, i32)) -> Self {
        Self::new(numerator, denominator)
    }
}

impl fmt::Display for SignedRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
