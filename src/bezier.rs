// src/bezier.rs

//! Cubic Bezier evaluation on fixed-point segments:
//! `B(t) = (1-t)³P0 + 3(1-t)²t·P1 + 3(1-t)t²·P2 + t³P3`, per coordinate.

use tracing::{debug, warn};

use crate::curve::{BezierSegment, ControlPoint};
use crate::error::{CurveError, Result};
use crate::fixed::Wad;

/// Derivatives smaller than this (1e-12) hand the solve over to bisection.
pub const DERIVATIVE_EPSILON: Wad = Wad::from_raw(1_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedPoint {
    pub x: Wad,
    pub y: Wad,
}

impl FixedPoint {
    pub fn from_control_point(p: &ControlPoint) -> Option<Self> {
        Some(Self {
            x: Wad::from_f64(p.x)?,
            y: Wad::from_f64(p.y)?,
        })
    }
}

/// A [`BezierSegment`] quantized once for repeated evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSegment {
    pub p0: FixedPoint,
    pub p1: FixedPoint,
    pub p2: FixedPoint,
    pub p3: FixedPoint,
}

impl FixedSegment {
    /// `None` if any coordinate is not a finite number.
    pub fn from_segment(segment: &BezierSegment) -> Option<Self> {
        Some(Self {
            p0: FixedPoint::from_control_point(&segment.p0)?,
            p1: FixedPoint::from_control_point(&segment.p1)?,
            p2: FixedPoint::from_control_point(&segment.p2)?,
            p3: FixedPoint::from_control_point(&segment.p3)?,
        })
    }

    fn xs(&self) -> [Wad; 4] {
        [self.p0.x, self.p1.x, self.p2.x, self.p3.x]
    }

    fn ys(&self) -> [Wad; 4] {
        [self.p0.y, self.p1.y, self.p2.y, self.p3.y]
    }

    pub fn x_at(&self, t: Wad) -> Wad {
        blend(self.xs(), t)
    }
}

fn blend(c: [Wad; 4], t: Wad) -> Wad {
    let mt = Wad::ONE - t;
    let mt2 = mt.mul(mt);
    let t2 = t.mul(t);

    let w0 = mt2.mul(mt);
    let w1 = mt2.mul(t).times(3);
    let w2 = mt.mul(t2).times(3);
    let w3 = t2.mul(t);

    c[0].mul(w0) + c[1].mul(w1) + c[2].mul(w2) + c[3].mul(w3)
}

/// Point on the segment at `t`. Values of `t` outside `[0, 1]` extrapolate;
/// clamping is the caller's job.
pub fn point_at(segment: &FixedSegment, t: Wad) -> FixedPoint {
    FixedPoint {
        x: blend(segment.xs(), t),
        y: blend(segment.ys(), t),
    }
}

/// `dx/dt = 3[(1-t)²(x1-x0) + 2(1-t)t(x2-x1) + t²(x3-x2)]`
pub fn derivative_x_at(segment: &FixedSegment, t: Wad) -> Wad {
    let [x0, x1, x2, x3] = segment.xs();
    let mt = Wad::ONE - t;

    let a = (x1 - x0).mul(mt.mul(mt));
    let b = (x2 - x1).mul(mt.mul(t)).times(2);
    let c = (x3 - x2).mul(t.mul(t));

    (a + b + c).times(3)
}

/// Find `t` in `[0, 1]` with `|x(t) - target_x| < tolerance`.
///
/// Newton-Raphson from `t0 = target_x`, each iterate clamped back into
/// `[0, 1]`. A near-zero derivative, or an exhausted budget, switches to
/// bisection, which relies on x being non-decreasing in t. Both methods get
/// `max_iterations` steps.
pub fn solve_t_for_x(
    segment: &FixedSegment,
    target_x: Wad,
    tolerance: Wad,
    max_iterations: u32,
) -> Result<Wad> {
    let mut t = target_x.clamp_unit();

    for _ in 0..max_iterations {
        let error = segment.x_at(t) - target_x;
        if error.abs() < tolerance {
            return Ok(t);
        }

        let slope = derivative_x_at(segment, t);
        if slope.abs() < DERIVATIVE_EPSILON {
            debug!(%t, %target_x, "flat segment in x, falling back to bisection");
            return bisect(segment, target_x, tolerance, max_iterations);
        }

        match error.checked_div(slope) {
            Some(step) => t = (t - step).clamp_unit(),
            None => return bisect(segment, target_x, tolerance, max_iterations),
        }
    }

    debug!(%target_x, max_iterations, "newton budget exhausted, falling back to bisection");
    bisect(segment, target_x, tolerance, max_iterations)
}

fn bisect(segment: &FixedSegment, target_x: Wad, tolerance: Wad, max_iterations: u32) -> Result<Wad> {
    let mut lo = Wad::ZERO;
    let mut hi = Wad::ONE;

    for _ in 0..max_iterations {
        let mid = lo.midpoint(hi);
        let error = segment.x_at(mid) - target_x;
        if error.abs() < tolerance {
            return Ok(mid);
        }
        if error.is_negative() {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    warn!(%target_x, max_iterations, "bezier root finding diverged");
    Err(CurveError::RootFindingDivergence {
        target: target_x,
        iterations: max_iterations,
    })
}
