//! Prices in the store currency.
//!
//! Amounts are held in the smallest currency unit (cents) so that line totals
//! and cart totals accumulate exactly; rounding to two decimals happens only
//! when the value is rendered.
//!
//! `+`, `*` and `Sum` saturate at `u64::MAX` cents instead of overflowing, so a
//! derived total can never panic. Use `checked_add`/`checked_mul` where an
//! overflow has to be reported.
//!
//! In documents a price is either a JSON integer of cents (`9999`) or a
//! decimal string of dollars (`"99.99"`). Bare JSON decimals (`99.99`) are
//! rejected. Amounts always serialize as integer cents.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// ISO code of the only currency the store sells in.
pub const CURRENCY: &str = "AUD";

/// A non-negative amount of money in cents.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u64", try_from = "MoneyRepr")]
pub struct Money(u64);

/// Accepted document forms of an amount.
#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Cents(u64),
    Decimal(String),
}

impl TryFrom<MoneyRepr> for Money {
    type Error = DomainError;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        match repr {
            MoneyRepr::Cents(cents) => Ok(Money(cents)),
            MoneyRepr::Decimal(amount) => amount.parse(),
        }
    }
}

impl From<Money> for u64 {
    fn from(money: Money) -> u64 {
        money.0
    }
}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    pub const fn cents(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_mul(self, quantity: u64) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// Decimal amount without symbol or currency, e.g. `"34.97"`.
    pub fn amount_string(&self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl ValueObject for Money {}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} {}", self.amount_string(), CURRENCY)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(u64::from(quantity)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Parses a plain decimal amount such as `"119.99"`, `"10"` or `"4.9"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DomainError::validation(format!("invalid amount: {s:?}"));

        let (whole, frac) = match s.split_once('.') {
            Some((_, "")) => return Err(invalid()),
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let dollars: u64 = whole.parse().map_err(|_| invalid())?;
        let cents: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        dollars
            .checked_mul(100)
            .and_then(|d| d.checked_add(cents))
            .map(Money)
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn displays_two_decimals_with_currency() {
        assert_eq!(Money::from_cents(3497).to_string(), "$34.97 AUD");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05 AUD");
        assert_eq!(Money::from_dollars(10).to_string(), "$10.00 AUD");
    }

    #[test]
    fn parses_decimal_amounts() {
        assert_eq!("119.99".parse::<Money>().unwrap(), Money::from_cents(11999));
        assert_eq!("10".parse::<Money>().unwrap(), Money::from_cents(1000));
        assert_eq!("4.9".parse::<Money>().unwrap(), Money::from_cents(490));
        assert_eq!(" 0.05 ".parse::<Money>().unwrap(), Money::from_cents(5));
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", "-1", "1.234", "abc", "1.", ".5", "1,00", "1.x"] {
            assert!(
                matches!(bad.parse::<Money>(), Err(DomainError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn sums_exactly_in_cents() {
        let total: Money = [Money::from_cents(1000) * 2, Money::from_cents(499) * 3]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(3497));
        assert_eq!(total.amount_string(), "34.97");
    }

    #[test]
    fn serializes_as_bare_cents() {
        let json = serde_json::to_string(&Money::from_cents(11999)).unwrap();
        assert_eq!(json, "11999");
    }

    #[test]
    fn deserializes_cents_or_decimal_string() {
        assert_eq!(serde_json::from_str::<Money>("11999").unwrap(), Money::from_cents(11999));
        assert_eq!(serde_json::from_str::<Money>("\"119.99\"").unwrap(), Money::from_cents(11999));
        assert_eq!(serde_json::from_str::<Money>("\"45\"").unwrap(), Money::from_dollars(45));
        assert!(serde_json::from_str::<Money>("119.99").is_err());
        assert!(serde_json::from_str::<Money>("\"1.234\"").is_err());
        assert!(serde_json::from_str::<Money>("-5").is_err());
    }

    #[test]
    fn arithmetic_saturates_instead_of_overflowing() {
        let big = Money::from_cents(10_000_000_000);
        assert_eq!(big * u32::MAX, Money::from_cents(u64::MAX));
        assert_eq!(Money::from_cents(u64::MAX) + Money::from_cents(1), Money::from_cents(u64::MAX));

        let mut acc = Money::from_cents(u64::MAX - 1);
        acc += Money::from_cents(5);
        assert_eq!(acc, Money::from_cents(u64::MAX));

        let total: Money = [Money::from_cents(u64::MAX), Money::from_cents(u64::MAX)].into_iter().sum();
        assert_eq!(total, Money::from_cents(u64::MAX));

        assert_eq!(big.checked_mul(u64::from(u32::MAX)), None);
    }

    proptest! {
        /// Property: rendering then parsing the amount gives back the same money.
        #[test]
        fn amount_string_parses_back(cents in 0u64..10_000_000_000u64) {
            let money = Money::from_cents(cents);
            prop_assert_eq!(money.amount_string().parse::<Money>().unwrap(), money);
        }
    }
}
