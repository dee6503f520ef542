// src/error.rs

use thiserror::Error;

use crate::curve::CurveKind;
use crate::fixed::Wad;
use crate::validate::ValidationReport;

/// Every failure the pricing engine can report. Nothing in this crate panics
/// on bad input; callers get one of these instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// The configuration breaks a structural invariant and must not be priced
    /// or deployed.
    #[error("invalid curve configuration: {0}")]
    Invalid(ValidationReport),

    /// Edition index at or past `max_supply`.
    #[error("supply {supply} is outside the curve range 0..{max_supply}")]
    SupplyOutOfRange { supply: u64, max_supply: u32 },

    /// Neither Newton-Raphson nor bisection met the tolerance.
    #[error("root finding diverged for x = {target} after {iterations} iterations")]
    RootFindingDivergence { target: Wad, iterations: u32 },

    #[error("arithmetic overflow in price calculation")]
    Overflow,

    #[error("operation requires a {expected} curve, found {found}")]
    KindMismatch { expected: CurveKind, found: CurveKind },

    #[error("unknown curve type tag {0}")]
    UnknownCurveType(u8),

    #[error("edit index {index} out of range (len {len})")]
    EditOutOfRange { index: usize, len: usize },

    #[error("invalid pricing settings: {0}")]
    InvalidSettings(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CurveError>;

impl From<serde_json::Error> for CurveError {
    fn from(err: serde_json::Error) -> Self {
        CurveError::Serialization(err.to_string())
    }
}
