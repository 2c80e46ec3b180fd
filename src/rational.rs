use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivideByZero,
}

/// Exact rational number over 64-bit integers.
///
/// Always fully reduced with a positive denominator; the sign lives in the
/// numerator and zero is stored as `0/1`. Products of oversized operands can
/// overflow 64 bits; callers must bound their inputs (ballot and seat counts
/// are small integers in practice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

impl Rational {
    pub const ZERO: Rational = Rational {
        numerator: 0,
        denominator: 1,
    };

    /// Build a reduced rational. Fails when `denominator` is zero.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, ArithmeticError> {
        if denominator == 0 {
            return Err(ArithmeticError::DivideByZero);
        }
        Ok(Self::reduced(numerator, denominator))
    }

    pub fn from_integer(value: i64) -> Self {
        Rational {
            numerator: value,
            denominator: 1,
        }
    }

    /// Normalizing constructor for internal use where the denominator is
    /// already known to be nonzero.
    fn reduced(numerator: i64, denominator: i64) -> Self {
        debug_assert!(denominator != 0);
        if numerator == 0 {
            return Rational::ZERO;
        }
        let negative = (numerator < 0) != (denominator < 0);
        let n = numerator.unsigned_abs();
        let d = denominator.unsigned_abs();
        let g = binary_gcd(n, d);
        let reduced_n = (n / g) as i64;
        Rational {
            numerator: if negative { -reduced_n } else { reduced_n },
            denominator: (d / g) as i64,
        }
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// Largest integer not greater than this value.
    pub fn whole_part(&self) -> i64 {
        self.numerator.div_euclid(self.denominator)
    }

    /// The value minus its whole part.
    pub fn fractional_part(&self) -> Rational {
        Rational::reduced(
            self.numerator - self.whole_part() * self.denominator,
            self.denominator,
        )
    }

    pub fn reciprocal(&self) -> Result<Rational, ArithmeticError> {
        if self.numerator == 0 {
            return Err(ArithmeticError::DivideByZero);
        }
        Ok(Rational::reduced(self.denominator, self.numerator))
    }

    /// Division, failing when `divisor` is zero.
    pub fn checked_div(&self, divisor: Rational) -> Result<Rational, ArithmeticError> {
        if divisor.numerator == 0 {
            return Err(ArithmeticError::DivideByZero);
        }
        Ok(Rational::reduced(
            self.numerator * divisor.denominator,
            self.denominator * divisor.numerator,
        ))
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Rational::from_integer(value)
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        Rational::reduced(
            self.numerator * rhs.denominator + rhs.numerator * self.denominator,
            self.denominator * rhs.denominator,
        )
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        Rational::reduced(
            self.numerator * rhs.denominator - rhs.numerator * self.denominator,
            self.denominator * rhs.denominator,
        )
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        Rational::reduced(
            self.numerator * rhs.numerator,
            self.denominator * rhs.denominator,
        )
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Rational) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Rational) -> Ordering {
        // Cross-multiplication; both denominators are positive, so the
        // comparison direction is preserved.
        (self.numerator * other.denominator).cmp(&(other.numerator * self.denominator))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Binary GCD over nonnegative operands: strip the common power of two, then
/// repeatedly subtract the smaller operand from the larger until one reaches
/// zero, and restore the power of two. Avoids a division per step.
fn binary_gcd(mut a: u64, mut b: u64) -> u64 {
    debug_assert!(a != 0 && b != 0);
    let mut twos = 0;
    while a % 2 == 0 && b % 2 == 0 {
        a /= 2;
        b /= 2;
        twos += 1;
    }
    while a != 0 && b != 0 {
        if a >= b {
            a -= b;
        } else {
            b -= a;
        }
    }
    (a + b) << twos
}
