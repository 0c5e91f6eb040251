use {
    auto_ops::impl_op_ex,
    ordered_float::OrderedFloat,
    serde::{
        Deserialize,
        Serialize,
    },
};

/// A centerline reference point of the track.
///
/// A [Waypoint] is a 2-dimensional point of the form `[x, y]`. Waypoints are
/// provided by the simulator in track-direction order, so the segment between
/// two consecutive waypoints gives the local direction of the centerline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Waypoint {
    x: OrderedFloat<f64>,
    y: OrderedFloat<f64>,
}
impl Waypoint {
    pub fn x(&self) -> f64 {
        self.x.into_inner()
    }

    pub fn y(&self) -> f64 {
        self.y.into_inner()
    }

    /// Calculate the distance to another [Waypoint]
    pub fn distance_to(
        &self,
        other: &Self,
    ) -> f64 {
        let v = self - other;
        v.x().hypot(v.y())
    }

    /// The direction of the vector from this [Waypoint] to `other`, in
    /// degrees within `(-180, 180]`.
    ///
    /// A zero-length segment yields `0.0`, following `atan2(0, 0)`.
    pub fn direction_to(
        &self,
        other: &Self,
    ) -> f64 {
        let v = other - self;
        v.y().atan2(v.x()).to_degrees()
    }
}

impl From<(f64, f64)> for Waypoint {
    /// Convert `(f64, f64)` into a [Waypoint]
    fn from(value: (f64, f64)) -> Self {
        Self {
            x: OrderedFloat(value.0),
            y: OrderedFloat(value.1),
        }
    }
}

// Waypoint - Waypoint AND reference types
impl_op_ex!(-|p1: &Waypoint, p2: &Waypoint| -> Waypoint {
    Waypoint {
        x: p1.x - p2.x,
        y: p1.y - p2.y,
    }
});

/// The absolute angular difference between two headings in degrees, wrapped
/// onto the shortest arc `[0, 180]`.
pub fn heading_difference(
    a: f64,
    b: f64,
) -> f64 {
    let diff = (a - b).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}
