// src/fixed.rs

//! 18-decimal fixed point. Products that can outgrow `u128` go through [`U256`].

use core::fmt;
use core::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};

// Own scope: the macro expands to the two-parameter std `Result`.
mod u256 {
    uint::construct_uint! {
        /// Minimal fixed-width 256-bit integer used for precise intermediate math.
        pub struct U256(4);
    }
}

pub use u256::U256;

/// Raw units per `1.0`.
pub const WAD: i128 = 1_000_000_000_000_000_000;

const WAD_U: u128 = WAD as u128;

/// ln(2) scaled by [`WAD`].
const LN_2: i128 = 693_147_180_559_945_309;

pub(crate) fn mul_u256(a: U256, b: U256) -> Result<U256> {
    let (res, overflow) = a.overflowing_mul(b);
    if overflow {
        Err(CurveError::Overflow)
    } else {
        Ok(res)
    }
}

pub(crate) fn narrow_u256(value: U256) -> Result<u128> {
    if value.bits() > 128 {
        Err(CurveError::Overflow)
    } else {
        Ok(value.as_u128())
    }
}

pub(crate) fn narrow_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| CurveError::Overflow)
}

/// Signed 18-decimal fixed-point number.
///
/// Multiplication and division truncate toward zero and saturate instead of
/// wrapping, which keeps extrapolated Bezier evaluation panic-free.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Wad(i128);

impl Wad {
    pub const ZERO: Wad = Wad(0);
    pub const ONE: Wad = Wad(WAD);

    #[inline]
    pub const fn from_raw(raw: i128) -> Self {
        Wad(raw)
    }

    #[inline]
    pub const fn raw(self) -> i128 {
        self.0
    }

    pub const fn from_int(value: i64) -> Self {
        Wad(value as i128 * WAD)
    }

    /// Quantize an authoring coordinate. Returns `None` for NaN, infinities
    /// and magnitudes the fixed-point range cannot hold.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value.abs() > 1.0e18 {
            return None;
        }
        Some(Wad((value * WAD as f64).round() as i128))
    }

    /// `num / den` as a fraction, truncated.
    pub fn from_ratio(num: u64, den: u64) -> Result<Self> {
        if den == 0 {
            return Err(CurveError::Overflow);
        }
        let scaled = (num as u128)
            .checked_mul(WAD_U)
            .ok_or(CurveError::Overflow)?;
        Ok(Wad((scaled / den as u128) as i128))
    }

    #[inline]
    pub fn mul(self, rhs: Wad) -> Wad {
        Wad(self.0.saturating_mul(rhs.0) / WAD)
    }

    /// `None` on division by zero.
    pub fn checked_div(self, rhs: Wad) -> Option<Wad> {
        if rhs.0 == 0 {
            return None;
        }
        Some(Wad(self.0.saturating_mul(WAD) / rhs.0))
    }

    #[inline]
    pub fn times(self, factor: i128) -> Wad {
        Wad(self.0.saturating_mul(factor))
    }

    #[inline]
    pub fn abs(self) -> Wad {
        Wad(self.0.saturating_abs())
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Clamp into `[0, 1]`.
    #[inline]
    pub fn clamp_unit(self) -> Wad {
        Wad(self.0.clamp(0, WAD))
    }

    #[inline]
    pub fn midpoint(self, other: Wad) -> Wad {
        Wad(self.0 + (other.0 - self.0) / 2)
    }
}

impl Add for Wad {
    type Output = Wad;

    fn add(self, rhs: Wad) -> Wad {
        Wad(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Wad {
    type Output = Wad;

    fn sub(self, rhs: Wad) -> Wad {
        Wad(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Wad {
    type Output = Wad;

    fn neg(self) -> Wad {
        Wad(self.0.saturating_neg())
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:018}", sign, abs / WAD_U, abs % WAD_U)
    }
}

/// How a fixed-point amount is turned into integer smallest units.
///
/// Must match the rounding the deployed program performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Truncate, as plain integer division on-chain does.
    #[default]
    Floor,
    /// Round half away from zero.
    HalfUp,
    Ceil,
}

impl Rounding {
    /// `amount * factor` where `factor` is an unsigned raw wad.
    pub fn scale(self, amount: u64, factor: u128) -> Result<u128> {
        let product = mul_u256(U256::from(amount), U256::from(factor))?;
        let wad = U256::from(WAD_U);
        let q = narrow_u256(product / wad)?;
        let r = narrow_u256(product % wad)?;
        let rounded_up = match self {
            Rounding::Floor => false,
            Rounding::HalfUp => r >= WAD_U - r,
            Rounding::Ceil => r > 0,
        };
        if rounded_up {
            q.checked_add(1).ok_or(CurveError::Overflow)
        } else {
            Ok(q)
        }
    }
}

fn mul_wad_u(a: u128, b: u128) -> Result<u128> {
    let product = mul_u256(U256::from(a), U256::from(b))?;
    narrow_u256(product / U256::from(WAD_U))
}

/// `base^exp` for an unsigned raw wad `base`, by repeated squaring.
pub(crate) fn pow_wad(base: u128, mut exp: u64) -> Result<u128> {
    let mut result = WAD_U;
    let mut square = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_wad_u(result, square)?;
        }
        exp >>= 1;
        if exp > 0 {
            square = mul_wad_u(square, square)?;
        }
    }
    Ok(result)
}

/// Natural log of a positive integer.
///
/// `n = 2^k * m` with `m` in `[1, 2)`, then `ln(m) = 2 atanh((m - 1) / (m + 1))`
/// summed until the next term vanishes at wad precision.
pub(crate) fn ln_wad(n: u64) -> Result<Wad> {
    if n == 0 {
        return Err(CurveError::Overflow);
    }
    let k = 63 - n.leading_zeros();
    let m = (((n as u128) * WAD_U) >> k) as i128;

    let z = (m - WAD) * WAD / (m + WAD);
    let z2 = z * z / WAD;
    let mut term = z;
    let mut divisor = 1i128;
    let mut series = 0i128;
    loop {
        let step = term / divisor;
        if step == 0 {
            break;
        }
        series += step;
        term = term * z2 / WAD;
        divisor += 2;
    }

    Ok(Wad(k as i128 * LN_2 + 2 * series))
}
