use {
    anyhow::Result,
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        fs::File,
        io::Write,
        path::Path,
    },
};

/// The configuration struct for the [`RewardEvaluator`](super::reward::RewardEvaluator).
///
/// Every constant of the reward shaping rule lives here, so a training run
/// can tune the shaping without touching code. The defaults are the shaping
/// rule as raced: tight centerline tiers, a 1.5..=2.5 m/s sweet spot, and a
/// large completion bonus that dominates momentary penalties near the end of
/// a lap.
///
/// # Fields
/// * `floor` - The minimum reward, returned on any terminal failure and
///   enforced as a lower bound on every result.
/// * `marker_inner` / `marker_middle` / `marker_outer` - Centerline band
///   boundaries as fractions of the track width.
/// * `reward_inner` / `reward_middle` / `reward_outer` - Base reward for
///   each centerline band. Past `marker_outer` the base drops to `floor`.
/// * `steering_threshold` - Absolute steering angle in degrees above which
///   the steering penalty applies.
/// * `steering_penalty` - Multiplier applied for oversteering.
/// * `optimal_speed_min` / `optimal_speed_max` - The inclusive speed band
///   in m/s that earns `optimal_speed_bonus`.
/// * `optimal_speed_bonus` - Multiplier for driving inside the speed band.
/// * `slow_penalty` - Multiplier for driving below the band.
/// * `fast_penalty` - Multiplier for driving above the band.
/// * `direction_threshold` - Heading misalignment in degrees beyond which
///   the direction penalty can apply.
/// * `direction_speed_gate` - The direction penalty only applies above this
///   speed in m/s.
/// * `direction_penalty` - Multiplier for misaligned high-speed driving.
/// * `progress_scale` - The additive progress term is
///   `progress_scale * progress / 100`.
/// * `completion_threshold` - Progress percentage from which the flat
///   completion bonus is added.
/// * `completion_bonus` - The flat bonus for nearing lap completion.
///
/// # Example
/// ```
/// use racer_rl::track::RewardConfig;
///
/// let config = RewardConfig::default();
/// assert_eq!(config.floor, 1e-3);
/// assert_eq!(config.marker_inner, 0.1);
/// assert_eq!(config.optimal_speed_max, 2.5);
/// assert_eq!(config.completion_bonus, 50.0);
/// assert!(config.check().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub floor: f64,
    pub marker_inner: f64,
    pub marker_middle: f64,
    pub marker_outer: f64,
    pub reward_inner: f64,
    pub reward_middle: f64,
    pub reward_outer: f64,
    pub steering_threshold: f64,
    pub steering_penalty: f64,
    pub optimal_speed_min: f64,
    pub optimal_speed_max: f64,
    pub optimal_speed_bonus: f64,
    pub slow_penalty: f64,
    pub fast_penalty: f64,
    pub direction_threshold: f64,
    pub direction_speed_gate: f64,
    pub direction_penalty: f64,
    pub progress_scale: f64,
    pub completion_threshold: f64,
    pub completion_bonus: f64,
}
impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            floor: 1e-3,
            marker_inner: 0.1,
            marker_middle: 0.25,
            marker_outer: 0.5,
            reward_inner: 1.0,
            reward_middle: 0.5,
            reward_outer: 0.1,
            steering_threshold: 10.0,
            steering_penalty: 0.7,
            optimal_speed_min: 1.5,
            optimal_speed_max: 2.5,
            optimal_speed_bonus: 1.5,
            slow_penalty: 0.8,
            fast_penalty: 0.9,
            direction_threshold: 15.0,
            direction_speed_gate: 2.0,
            direction_penalty: 0.5,
            progress_scale: 10.0,
            completion_threshold: 90.0,
            completion_bonus: 50.0,
        }
    }
}
impl RewardConfig {
    pub fn check(&self) -> Result<()> {
        if !(self.floor > 0.0) {
            return Err(anyhow::anyhow!("Floor reward must be positive"));
        }

        if !(0.0 < self.marker_inner
            && self.marker_inner < self.marker_middle
            && self.marker_middle < self.marker_outer
            && self.marker_outer <= 1.0)
        {
            return Err(anyhow::anyhow!(
                "Centerline markers must be strictly increasing fractions in (0.0, 1.0]"
            ));
        }

        if !(self.reward_inner >= self.reward_middle && self.reward_middle >= self.reward_outer) {
            return Err(anyhow::anyhow!(
                "Centerline band rewards must not increase away from the centerline"
            ));
        }

        if !(self.reward_outer >= self.floor) {
            return Err(anyhow::anyhow!(
                "Outer band reward must be at least the floor reward"
            ));
        }

        if !(0.0 < self.optimal_speed_min && self.optimal_speed_min <= self.optimal_speed_max) {
            return Err(anyhow::anyhow!(
                "Optimal speed band must be positive and ordered"
            ));
        }

        for (name, penalty) in [
            ("Steering", self.steering_penalty),
            ("Slow", self.slow_penalty),
            ("Fast", self.fast_penalty),
            ("Direction", self.direction_penalty),
        ] {
            if !(0.0 < penalty && penalty <= 1.0) {
                return Err(anyhow::anyhow!(
                    "{name} penalty must be a multiplier in the range (0.0, 1.0]"
                ));
            }
        }

        if !(self.optimal_speed_bonus >= 1.0) {
            return Err(anyhow::anyhow!("Optimal speed bonus must be at least 1.0"));
        }

        if !(self.steering_threshold >= 0.0) {
            return Err(anyhow::anyhow!("Steering threshold must be non-negative"));
        }

        if !(0.0 <= self.direction_threshold && self.direction_threshold <= 180.0) {
            return Err(anyhow::anyhow!(
                "Direction threshold must be in the range [0.0, 180.0] degrees"
            ));
        }

        if !(self.progress_scale >= 0.0 && self.completion_bonus >= 0.0) {
            return Err(anyhow::anyhow!(
                "Progress scale and completion bonus must be non-negative"
            ));
        }

        if !(0.0 <= self.completion_threshold && self.completion_threshold <= 100.0) {
            return Err(anyhow::anyhow!(
                "Completion threshold must be a percentage in [0.0, 100.0]"
            ));
        }

        Ok(())
    }

    /// Write the config to `path` as pretty-printed RON.
    pub fn save(
        &self,
        path: &dyn AsRef<Path>,
    ) -> Result<()> {
        File::create(path)?.write_all(
            ron::ser::to_string_pretty(
                self,
                ron::ser::PrettyConfig::default(),
            )?
            .as_bytes(),
        )?;

        Ok(())
    }

    /// Read a config from a RON file at `path` and validate it.
    pub fn load(path: &dyn AsRef<Path>) -> Result<Self> {
        let config: Self = ron::de::from_reader(File::open(path)?)?;
        config.check()?;

        Ok(config)
    }
}
