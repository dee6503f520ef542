// src/path.rs

//! Editable Bezier path. Segment `i` runs from `knots[i]` to `knots[i + 1]`,
//! so neighbouring segments share one knot instead of holding copies.

use serde::{Deserialize, Serialize};

use crate::bezier::FixedPoint;
use crate::curve::{BezierCurveData, BezierSegment, ControlPoint};
use crate::error::{CurveError, Result};
use crate::validate::{ValidationReport, Violation};

/// Which of a segment's two handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    /// `p1`, attached to the segment's start knot.
    Leading,
    /// `p2`, attached to the segment's end knot.
    Trailing,
}

impl Handle {
    fn index(self) -> usize {
        match self {
            Handle::Leading => 0,
            Handle::Trailing => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PathParts")]
pub struct CurvePath {
    knots: Vec<ControlPoint>,
    handles: Vec<[ControlPoint; 2]>,
}

/// Unchecked wire form of [`CurvePath`].
#[derive(Deserialize)]
struct PathParts {
    knots: Vec<ControlPoint>,
    handles: Vec<[ControlPoint; 2]>,
}

impl TryFrom<PathParts> for CurvePath {
    type Error = CurveError;

    fn try_from(parts: PathParts) -> Result<Self> {
        if parts.handles.is_empty() || parts.knots.len() != parts.handles.len() + 1 {
            return Err(CurveError::Serialization(format!(
                "path needs one more knot than segments, got {} knots for {} segments",
                parts.knots.len(),
                parts.handles.len()
            )));
        }
        Ok(Self {
            knots: parts.knots,
            handles: parts.handles,
        })
    }
}

impl CurvePath {
    /// One straight segment from `(0, start_y)` to `(1, end_y)`.
    pub fn new(start_y: f64, end_y: f64) -> Self {
        let start = ControlPoint::new(0.0, start_y).clamped();
        let end = ControlPoint::new(1.0, end_y).clamped();
        let segment = BezierSegment::straight(start, end);
        Self {
            knots: vec![start, end],
            handles: vec![[segment.p1, segment.p2]],
        }
    }

    /// Adopt segments loaded from storage. Endpoints that do not match
    /// exactly are reported, never merged.
    pub fn from_curve_data(data: &BezierCurveData) -> Result<Self> {
        let first = data
            .segments
            .first()
            .ok_or_else(|| invalid(vec![Violation::EmptySegments]))?;

        let gaps: Vec<Violation> = data
            .segments
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| !same_point(&pair[0].p3, &pair[1].p0))
            .map(|(segment, _)| Violation::Discontinuous { segment })
            .collect();
        if !gaps.is_empty() {
            return Err(invalid(gaps));
        }

        let mut knots = Vec::with_capacity(data.segments.len() + 1);
        knots.push(first.p0);
        knots.extend(data.segments.iter().map(|segment| segment.p3));

        Ok(Self {
            knots,
            handles: data
                .segments
                .iter()
                .map(|segment| [segment.p1, segment.p2])
                .collect(),
        })
    }

    pub fn segment_count(&self) -> usize {
        self.handles.len()
    }

    pub fn knots(&self) -> &[ControlPoint] {
        &self.knots
    }

    pub fn segment(&self, index: usize) -> Option<BezierSegment> {
        let [p1, p2] = *self.handles.get(index)?;
        Some(BezierSegment::new(
            self.knots[index],
            p1,
            p2,
            self.knots[index + 1],
        ))
    }

    pub fn segments(&self) -> Vec<BezierSegment> {
        (0..self.segment_count())
            .filter_map(|i| self.segment(i))
            .collect()
    }

    /// Move knot `index`, dragging its attached handles along.
    ///
    /// The first and last knots keep x at 0 and 1; interior knots stay
    /// between their neighbours in x.
    pub fn move_knot(&mut self, index: usize, to: ControlPoint) -> Result<()> {
        let len = self.knots.len();
        if index >= len {
            return Err(CurveError::EditOutOfRange { index, len });
        }

        let to = to.clamped();
        let x = if index == 0 {
            0.0
        } else if index == len - 1 {
            1.0
        } else {
            to.x.clamp(self.knots[index - 1].x, self.knots[index + 1].x)
        };
        let target = ControlPoint::new(x, to.y);

        let from = self.knots[index];
        let dx = target.x - from.x;
        let dy = target.y - from.y;
        let shift = |p: ControlPoint| ControlPoint::new(p.x + dx, p.y + dy).clamped();

        if index > 0 {
            let handle = &mut self.handles[index - 1][Handle::Trailing.index()];
            *handle = shift(*handle);
        }
        if index < len - 1 {
            let handle = &mut self.handles[index][Handle::Leading.index()];
            *handle = shift(*handle);
        }
        self.knots[index] = target;
        Ok(())
    }

    /// Move one handle of segment `segment`, kept inside the unit square.
    pub fn move_handle(&mut self, segment: usize, handle: Handle, to: ControlPoint) -> Result<()> {
        let len = self.handles.len();
        let handles = self
            .handles
            .get_mut(segment)
            .ok_or(CurveError::EditOutOfRange { index: segment, len })?;
        handles[handle.index()] = to.clamped();
        Ok(())
    }

    /// Insert a knot on segment `index` at parameter `t` without changing the
    /// curve's shape (de Casteljau subdivision).
    pub fn split_segment(&mut self, index: usize, t: f64) -> Result<()> {
        let segment = self.segment(index).ok_or(CurveError::EditOutOfRange {
            index,
            len: self.segment_count(),
        })?;
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };

        let ab = segment.p0.lerp(segment.p1, t);
        let bc = segment.p1.lerp(segment.p2, t);
        let cd = segment.p2.lerp(segment.p3, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let split = abc.lerp(bcd, t);

        self.handles[index] = [ab, abc];
        self.handles.insert(index + 1, [bcd, cd]);
        self.knots.insert(index + 1, split);
        Ok(())
    }

    /// Remove interior knot `index`, joining its two segments. The joined
    /// segment keeps the outer handles.
    pub fn remove_knot(&mut self, index: usize) -> Result<()> {
        let len = self.knots.len();
        if index == 0 || index + 1 >= len {
            return Err(CurveError::EditOutOfRange { index, len });
        }

        let trailing = self.handles[index][Handle::Trailing.index()];
        self.handles[index - 1][Handle::Trailing.index()] = trailing;
        self.handles.remove(index);
        self.knots.remove(index);
        Ok(())
    }

    pub fn into_curve_data(self, min_price: u64, max_price: u64) -> BezierCurveData {
        BezierCurveData::new(self.segments(), min_price, max_price)
    }
}

fn same_point(a: &ControlPoint, b: &ControlPoint) -> bool {
    match (FixedPoint::from_control_point(a), FixedPoint::from_control_point(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn invalid(violations: Vec<Violation>) -> CurveError {
    CurveError::Invalid(ValidationReport { violations })
}
