//! Exact rational prices.
//!
//! A [`Price`] is `n/d` buying units per selling unit, both `u32` and
//! non-zero. All arithmetic goes through `u128` so that no product of a
//! `u64` amount and a `u32` term can overflow.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::orderbook::OrderBookError;

/// Buying units per selling unit, stored in lowest terms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "PriceRepr", into = "PriceRepr")]
pub struct Price {
    n: u32,
    d: u32,
}

#[derive(Serialize, Deserialize)]
struct PriceRepr {
    n: u32,
    d: u32,
}

impl TryFrom<PriceRepr> for Price {
    type Error = OrderBookError;

    fn try_from(repr: PriceRepr) -> Result<Self, Self::Error> {
        Price::new(repr.n, repr.d)
    }
}

impl From<Price> for PriceRepr {
    fn from(price: Price) -> Self {
        Self {
            n: price.n,
            d: price.d,
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Price {
    /// Build `n/d`, reduced. Either term being zero is an error.
    pub fn new(n: u32, d: u32) -> Result<Self, OrderBookError> {
        if n == 0 || d == 0 {
            return Err(OrderBookError::InvalidPrice(format!("{}/{}", n, d)));
        }
        let g = gcd(n as u64, d as u64) as u32;
        Ok(Self { n: n / g, d: d / g })
    }

    /// The price `1/1`.
    pub fn one() -> Self {
        Self { n: 1, d: 1 }
    }

    pub fn numerator(&self) -> u32 {
        self.n
    }

    pub fn denominator(&self) -> u32 {
        self.d
    }

    /// The same exchange rate seen from the other side: `d/n`.
    pub fn invert(&self) -> Self {
        Self {
            n: self.d,
            d: self.n,
        }
    }

    /// Parse a decimal such as `"1.5"` (→ 3/2) or `"0.25"` (→ 1/4).
    pub fn from_decimal_str(text: &str) -> Result<Self, OrderBookError> {
        let invalid = || OrderBookError::InvalidPrice(text.to_string());
        let text = text.trim();
        let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
        if (whole.is_empty() && frac.is_empty())
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
            || frac.len() > 7
        {
            return Err(invalid());
        }

        let digits = format!("{}{}", whole, frac);
        let n: u64 = digits.parse().map_err(|_| invalid())?;
        let d: u64 = 10u64.pow(frac.len() as u32);
        let g = gcd(n, d).max(1);
        let (n, d) = (n / g, d / g);
        let n = u32::try_from(n).map_err(|_| invalid())?;
        let d = u32::try_from(d).map_err(|_| invalid())?;
        Self::new(n, d).map_err(|_| invalid())
    }

    /// Units of the buying asset owed for `amount` units of the selling
    /// asset: `ceil(amount * n / d)`. `None` if the result exceeds `u64`.
    pub fn cost_of(&self, amount: u64) -> Option<u64> {
        let num = amount as u128 * self.n as u128;
        let d = self.d as u128;
        u64::try_from((num + d - 1) / d).ok()
    }

    /// Most selling units a budget of `budget` buying units can pay for:
    /// `floor(budget * d / n)`, saturated at `u64::MAX`.
    pub fn max_for_budget(&self, budget: u64) -> u64 {
        let v = budget as u128 * self.d as u128 / self.n as u128;
        u64::try_from(v).unwrap_or(u64::MAX)
    }

    /// `true` if an offer at `self` and a counter-offer at `other` (on the
    /// opposite side of the same pair) cross, i.e. `self <= 1 / other`.
    pub fn crosses(&self, other: &Price) -> bool {
        self.n as u64 * other.n as u64 <= self.d as u64 * other.d as u64
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.n as u64 * other.d as u64).cmp(&(other.n as u64 * self.d as u64))
    }
}

impl fmt::Display for Price {
    /// Seven-decimal rendering, truncated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scaled = self.n as u128 * 10_000_000 / self.d as u128;
        write!(f, "{}.{:07}", scaled / 10_000_000, scaled % 10_000_000)
    }
}

impl FromStr for Price {
    type Err = OrderBookError;

    /// Accepts `"n/d"` or a decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((n, d)) => {
                let invalid = || OrderBookError::InvalidPrice(s.to_string());
                let n = n.trim().parse().map_err(|_| invalid())?;
                let d = d.trim().parse().map_err(|_| invalid())?;
                Self::new(n, d)
            }
            None => Self::from_decimal_str(s),
        }
    }
}
