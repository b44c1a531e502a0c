use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const DEFAULT_CURRENCY_CODE: &str = "INR";

//--------------------------------------       Money         ---------------------------------------------------------
/// An amount of money, stored as a count of the smallest currency unit.
///
/// All order totals, charges, commissions and transfer amounts in the food court engine are `Money` values. Keeping
/// amounts in integer minor units means that rounding only ever happens in one place: [`Money::percentage`].
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a money amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to Money", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "¤{}", self.0)
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Apply a fractional rate to this amount, rounding half away from zero to the smallest currency unit.
    ///
    /// Service charges, taxes and platform commissions are all derived with this method, so an order's components
    /// are each rounded independently before being summed.
    pub fn percentage(&self, rate: f64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self((self.0 as f64 * rate).round() as i64)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn percentage_rounds_half_away_from_zero() {
        assert_eq!(Money::from(200).percentage(0.05), Money::from(10));
        assert_eq!(Money::from(50).percentage(0.05), Money::from(3)); // 2.5 rounds up
        assert_eq!(Money::from(50).percentage(0.18), Money::from(9));
        assert_eq!(Money::from(246).percentage(0.10), Money::from(25)); // 24.6 rounds up
        assert_eq!(Money::from(-50).percentage(0.05), Money::from(-3)); // -2.5 rounds away from zero
    }

    #[test]
    fn arithmetic() {
        let a = Money::from(100);
        let b = Money::from(40);
        assert_eq!(a + b, Money::from(140));
        assert_eq!(a - b, Money::from(60));
        assert_eq!(-a, Money::from(-100));
        assert_eq!(a * 3, Money::from(300));
        let total: Money = [a, b, Money::from(1)].into_iter().sum();
        assert_eq!(total, Money::from(141));
    }
}
