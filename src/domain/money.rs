use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Amount of money in minor units (cents), bounded by [`Money::MAX`] in
/// magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    /// Largest amount held anywhere. Below 2^46 major units an `f64` in the
    /// ledger file still resolves to the exact cent.
    pub const MAX: Money = Money::from_minor(999_999_999_999_999);
    pub const TARGET_DECIMALS: u32 = 2;

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub fn is_positive(&self) -> bool {
        *self > Money::ZERO
    }

    pub fn is_negative(&self) -> bool {
        *self < Money::ZERO
    }

    fn in_range(minor: i64) -> Option<Money> {
        (minor.unsigned_abs() <= Self::MAX.0.unsigned_abs()).then_some(Money(minor))
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).and_then(Money::in_range)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).and_then(Money::in_range)
    }

    /// Converts a decimal into minor units, rounding half to even past two places.
    /// Returns `None` beyond [`Money::MAX`].
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let mut rounded =
            value.round_dp_with_strategy(Self::TARGET_DECIMALS, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(Self::TARGET_DECIMALS);
        i64::try_from(rounded.mantissa())
            .ok()
            .and_then(Money::in_range)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, Self::TARGET_DECIMALS)
    }

    /// Parses plain (`12.5`) or scientific (`1.25e1`) decimal text.
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let value = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .ok()?;
        Money::from_decimal(value)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = crate::domain::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_decimal_str(s).ok_or_else(|| crate::domain::Error::InvalidAmount(s.to_string()))
    }
}

// Persisted as a plain JSON number, the way balances were always stored.
// Minor units within MAX are exact in an f64, so the division rounds once.
impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let scale = 10i64.pow(Self::TARGET_DECIMALS) as f64;
        serializer.serialize_f64(self.0 as f64 / scale)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::from_decimal(value)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid Money value: {}", value)))
    }
}
