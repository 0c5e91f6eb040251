use {
    super::waypoint::Waypoint,
    anyhow::{
        anyhow,
        Result,
    },
    serde::{
        Deserialize,
        Serialize,
    },
};

/// The per-tick snapshot of the car supplied by the training platform.
///
/// A [StepObservation] is read once per simulated step and discarded, the
/// evaluator keeps no state between calls. The caller guarantees all fields
/// are present and well-typed; index fields are still bounds-checked here so
/// that a malformed record surfaces as an error instead of corrupting the
/// learning signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepObservation {
    /// Lateral width of the track at the current position
    pub track_width: f64,
    /// Lateral offset of the car from the track centerline
    pub distance_from_center: f64,
    /// Whether all four wheels are within track bounds
    pub all_wheels_on_track: bool,
    /// Current speed in m/s
    pub speed: f64,
    /// Current steering angle in degrees, signed; only its magnitude matters
    pub steering_angle: f64,
    /// Percent of track completed this episode, 0 to 100
    pub progress: f64,
    /// Elapsed simulation steps. Carried for parity with the simulator's
    /// parameter set, not consulted by the evaluator.
    pub steps: usize,
    /// Whether the car has left the track entirely
    pub is_offtrack: bool,
    /// Whether the car has collided
    pub is_crashed: bool,
    /// Whether the car is driving against track direction
    pub is_reversed: bool,
    /// The car's current orientation in degrees
    pub heading: f64,
    /// Track centerline reference points, in track-direction order
    pub waypoints: Vec<Waypoint>,
    /// Indices of the two waypoints nearest the car, in track-direction order
    pub closest_waypoints: (usize, usize),
}

impl StepObservation {
    /// Whether this step ended in a terminal failure state.
    ///
    /// Any of these earns the floor reward with no further computation:
    /// a wheel off the drivable surface, leaving the track, a collision,
    /// or driving in reverse.
    pub fn is_terminal_failure(&self) -> bool {
        !self.all_wheels_on_track || self.is_offtrack || self.is_crashed || self.is_reversed
    }

    /// The local direction of the track centerline in degrees, taken from
    /// the segment between the two closest waypoints.
    ///
    /// Fails if either index in `closest_waypoints` does not point into
    /// `waypoints`.
    pub fn track_direction(&self) -> Result<f64> {
        let (prev_idx, next_idx) = self.closest_waypoints;
        let prev = self
            .waypoints
            .get(prev_idx)
            .ok_or_else(|| anyhow!("Closest waypoint index {prev_idx} out of bounds"))?;
        let next = self
            .waypoints
            .get(next_idx)
            .ok_or_else(|| anyhow!("Closest waypoint index {next_idx} out of bounds"))?;

        Ok(prev.direction_to(next))
    }
}
