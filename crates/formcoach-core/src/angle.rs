//! Joint angle calculation
//!
//! Angle at a vertex between the rays vertex→a and vertex→b, computed from
//! the difference of the two ray headings (atan2) and folded onto the
//! unsigned interior range [0, 180] degrees.

use crate::landmarks::{Joint, LandmarkAccessor, LandmarkFrame, Point};

/// Interior angle in degrees at `vertex`, in [0, 180]
pub fn angle_between(a: Point, vertex: Point, b: Point) -> f32 {
    let heading_b = (b.y - vertex.y).atan2(b.x - vertex.x);
    let heading_a = (a.y - vertex.y).atan2(a.x - vertex.x);

    let mut angle = (heading_b - heading_a).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle.clamp(0.0, 180.0)
}

/// Angle at `vertex` for three joints of a frame.
///
/// `None` if any of the three joints is missing or below the accessor's
/// visibility threshold.
pub fn joint_angle(
    accessor: &LandmarkAccessor,
    frame: &LandmarkFrame,
    a: Joint,
    vertex: Joint,
    b: Joint,
) -> Option<f32> {
    let a = accessor.get(frame, a)?;
    let vertex = accessor.get(frame, vertex)?;
    let b = accessor.get(frame, b)?;
    Some(angle_between(a, vertex, b))
}

/// Linear remap of `value` from `from` onto `to`, clamped to the target
/// range. Either range may be descending.
pub fn remap(value: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
    let span = from.1 - from.0;
    if span.abs() < f32::EPSILON {
        return to.0;
    }
    let t = ((value - from.0) / span).clamp(0.0, 1.0);
    to.0 + t * (to.1 - to.0)
}
