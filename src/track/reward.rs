use {
    super::{
        config::RewardConfig,
        observation::StepObservation,
        waypoint::heading_difference,
    },
    anyhow::Result,
    serde::{
        Deserialize,
        Serialize,
    },
    strum::EnumIter,
    std::fmt::Display,
    tracing::warn,
};

/// The centerline band the car currently occupies, from the distance to the
/// centerline as a fraction of track width.
///
/// Bands are inclusive on the upper bound of each marker, a step function
/// with no interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum CenterlineTier {
    Inner,
    Middle,
    Outer,
    Edge,
}
impl Display for CenterlineTier {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Inner => write!(f, "Inner"),
            Self::Middle => write!(f, "Middle"),
            Self::Outer => write!(f, "Outer"),
            Self::Edge => write!(f, "Edge"),
        }
    }
}
impl CenterlineTier {
    pub fn classify(
        distance_from_center: f64,
        track_width: f64,
        config: &RewardConfig,
    ) -> Self {
        if distance_from_center <= config.marker_inner * track_width {
            Self::Inner
        } else if distance_from_center <= config.marker_middle * track_width {
            Self::Middle
        } else if distance_from_center <= config.marker_outer * track_width {
            Self::Outer
        } else {
            Self::Edge
        }
    }

    /// The base reward for this band. Past the outer marker the car is
    /// likely about to leave the track, so the base drops to the floor.
    pub fn base_reward(
        &self,
        config: &RewardConfig,
    ) -> f64 {
        match self {
            Self::Inner => config.reward_inner,
            Self::Middle => config.reward_middle,
            Self::Outer => config.reward_outer,
            Self::Edge => config.floor,
        }
    }
}

/// The speed band the car currently occupies.
///
/// The bands are a strict partition of the speed axis: the optimal band is
/// inclusive on both ends, so a speed exactly on a boundary earns the bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum SpeedBand {
    Optimal,
    Slow,
    Fast,
}
impl Display for SpeedBand {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "Optimal"),
            Self::Slow => write!(f, "Slow"),
            Self::Fast => write!(f, "Fast"),
        }
    }
}
impl SpeedBand {
    pub fn classify(
        speed: f64,
        config: &RewardConfig,
    ) -> Self {
        if speed >= config.optimal_speed_min && speed <= config.optimal_speed_max {
            Self::Optimal
        } else if speed < config.optimal_speed_min {
            Self::Slow
        } else {
            Self::Fast
        }
    }

    pub fn multiplier(
        &self,
        config: &RewardConfig,
    ) -> f64 {
        match self {
            Self::Optimal => config.optimal_speed_bonus,
            Self::Slow => config.slow_penalty,
            Self::Fast => config.fast_penalty,
        }
    }
}

/// Maps one [StepObservation] to one scalar reward.
///
/// The evaluator is pure and stateless: it holds only its [RewardConfig],
/// reads one observation per call and retains nothing between calls, so it
/// can be shared freely across threads.
///
/// The shaping rule, in evaluation order:
/// 1. Any terminal failure short-circuits to the floor reward.
/// 2. A base reward from the [CenterlineTier] the car occupies.
/// 3. Multiplied by the steering penalty when oversteering.
/// 4. Multiplied by the [SpeedBand] factor, exactly one of which applies.
/// 5. Multiplied by the direction penalty when heading diverges from the
///    local track direction at speed.
/// 6. An additive progress term, plus a flat bonus near lap completion.
/// 7. The result is floored so the reward is always positive.
///
/// The multiplicative penalties compound, so an off-center, oversteering,
/// misaligned step still earns a positive but heavily discounted reward,
/// while the completion bonus can dominate momentary penalties late in a
/// lap.
#[derive(Debug, Clone, Default)]
pub struct RewardEvaluator {
    config: RewardConfig,
}
impl RewardEvaluator {
    /// Creates a new [RewardEvaluator], validating the config.
    pub fn new(config: RewardConfig) -> Result<Self> {
        config.check()?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// The reward for a single simulation step.
    ///
    /// Fails only on a malformed record: a non-positive track width, a
    /// negative distance from center, or closest-waypoint indices that do
    /// not point into the waypoint list. These are violations of the
    /// caller's contract and must surface rather than be masked with a
    /// default, since a silently substituted value would corrupt the
    /// learning signal.
    pub fn evaluate(
        &self,
        obs: &StepObservation,
    ) -> Result<f64> {
        // Terminal failures earn the floor with no further computation
        if obs.is_terminal_failure() {
            return Ok(self.config.floor);
        }

        if !(obs.track_width > 0.0) {
            return Err(anyhow::anyhow!(
                "Track width must be positive, got {}",
                obs.track_width,
            ));
        }

        if obs.distance_from_center < 0.0 {
            return Err(anyhow::anyhow!(
                "Distance from center must be non-negative, got {}",
                obs.distance_from_center,
            ));
        }

        let mut reward = CenterlineTier::classify(
            obs.distance_from_center,
            obs.track_width,
            &self.config,
        )
        .base_reward(&self.config);

        // Penalize large steering to prevent zig-zagging
        if obs.steering_angle.abs() > self.config.steering_threshold {
            reward *= self.config.steering_penalty;
        }

        reward *= SpeedBand::classify(obs.speed, &self.config).multiplier(&self.config);

        let track_direction = obs.track_direction()?;
        let (prev_idx, next_idx) = obs.closest_waypoints;
        if obs.waypoints[prev_idx] == obs.waypoints[next_idx] {
            warn!("Degenerate centerline segment between waypoints {prev_idx} and {next_idx}");
        }

        // Penalize high speed while pointing away from the track direction
        let direction_diff = heading_difference(track_direction, obs.heading);
        if direction_diff > self.config.direction_threshold
            && obs.speed > self.config.direction_speed_gate
        {
            reward *= self.config.direction_penalty;
        }

        reward += self.config.progress_scale * obs.progress / 100.0;
        if obs.progress >= self.config.completion_threshold {
            reward += self.config.completion_bonus;
        }

        Ok(reward.max(self.config.floor))
    }

    /// The `(min, max)` attainable reward under this config.
    ///
    /// The minimum is the floor. The maximum is a full-speed-bonus inner
    /// tier step at 100% progress with the completion bonus.
    pub fn value_range(&self) -> (f64, f64) {
        let best = self.config.reward_inner * self.config.optimal_speed_bonus
            + self.config.progress_scale
            + self.config.completion_bonus;

        (self.config.floor, best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::waypoint::Waypoint;
    use rand::{
        rngs::StdRng,
        Rng,
        SeedableRng,
    };
    use strum::IntoEnumIterator;

    /// The worked example: centered, smooth steering, optimal speed, aligned
    /// with a straight track segment, half a lap done.
    fn base_observation() -> StepObservation {
        StepObservation {
            track_width: 1.0,
            distance_from_center: 0.05,
            all_wheels_on_track: true,
            speed: 2.0,
            steering_angle: 5.0,
            progress: 50.0,
            steps: 120,
            is_offtrack: false,
            is_crashed: false,
            is_reversed: false,
            heading: 0.0,
            waypoints: vec![
                Waypoint::from((0.0, 0.0)),
                Waypoint::from((1.0, 0.0)),
            ],
            closest_waypoints: (0, 1),
        }
    }

    fn evaluate(obs: &StepObservation) -> f64 {
        RewardEvaluator::default().evaluate(obs).unwrap()
    }

    #[test]
    fn test_worked_example() {
        // base 1.0, speed bonus x1.5, progress +5.0
        assert!((evaluate(&base_observation()) - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_failures_earn_exact_floor() {
        let flags: [fn(&mut StepObservation); 4] = [
            |o| o.all_wheels_on_track = false,
            |o| o.is_offtrack = true,
            |o| o.is_crashed = true,
            |o| o.is_reversed = true,
        ];

        for set_flag in flags {
            let mut obs = base_observation();
            // Other fields must not matter, even near-complete progress
            obs.progress = 99.0;
            set_flag(&mut obs);

            assert_eq!(evaluate(&obs), 1e-3);
        }
    }

    #[test]
    fn test_failure_short_circuits_before_waypoint_lookup() {
        let mut obs = base_observation();
        obs.is_crashed = true;
        obs.closest_waypoints = (7, 9);

        assert_eq!(evaluate(&obs), 1e-3);
    }

    #[test]
    fn test_centerline_tiers_are_inclusive_steps() {
        let config = RewardConfig::default();

        assert_eq!(CenterlineTier::classify(0.05, 1.0, &config), CenterlineTier::Inner);
        assert_eq!(CenterlineTier::classify(0.1, 1.0, &config), CenterlineTier::Inner);
        assert_eq!(CenterlineTier::classify(0.101, 1.0, &config), CenterlineTier::Middle);
        assert_eq!(CenterlineTier::classify(0.25, 1.0, &config), CenterlineTier::Middle);
        assert_eq!(CenterlineTier::classify(0.251, 1.0, &config), CenterlineTier::Outer);
        assert_eq!(CenterlineTier::classify(0.5, 1.0, &config), CenterlineTier::Outer);
        assert_eq!(CenterlineTier::classify(0.501, 1.0, &config), CenterlineTier::Edge);
    }

    #[test]
    fn test_tier_rewards_decrease_outward() {
        let config = RewardConfig::default();

        let rewards: Vec<f64> = CenterlineTier::iter()
            .map(|tier| tier.base_reward(&config))
            .collect();

        assert!(rewards.windows(2).all(|w| w[0] >= w[1]));

        assert_eq!(CenterlineTier::Inner.to_string(), "Inner");
        assert_eq!(SpeedBand::Fast.to_string(), "Fast");
    }

    #[test]
    fn test_crossing_a_tier_boundary_inward_never_decreases_reward() {
        let mut wide = base_observation();
        wide.distance_from_center = 0.26;
        let mut tight = base_observation();
        tight.distance_from_center = 0.24;

        assert!(evaluate(&tight) >= evaluate(&wide));
    }

    #[test]
    fn test_speed_bands_partition_with_inclusive_boundaries() {
        let config = RewardConfig::default();

        assert_eq!(SpeedBand::classify(1.5, &config), SpeedBand::Optimal);
        assert_eq!(SpeedBand::classify(2.5, &config), SpeedBand::Optimal);
        assert_eq!(SpeedBand::classify(1.499, &config), SpeedBand::Slow);
        assert_eq!(SpeedBand::classify(2.501, &config), SpeedBand::Fast);
        assert_eq!(SpeedBand::classify(0.0, &config), SpeedBand::Slow);

        // Every speed lands in exactly one band
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let speed = rng.gen_range(0.0..=5.0);
            let band = SpeedBand::classify(speed, &config);
            let matches = SpeedBand::iter().filter(|b| *b == band).count();
            assert_eq!(matches, 1);
        }
    }

    #[test]
    fn test_speed_shaping_multipliers() {
        let mut slow = base_observation();
        slow.speed = 1.0;
        // base 1.0 x0.8 + 5.0
        assert!((evaluate(&slow) - 5.8).abs() < 1e-12);

        // Heading matches the track, so no direction penalty despite the speed
        let mut fast = base_observation();
        fast.speed = 3.0;
        // base 1.0 x0.9 + 5.0
        assert!((evaluate(&fast) - 5.9).abs() < 1e-12);
    }

    #[test]
    fn test_steering_penalty_uses_magnitude() {
        let mut at_threshold = base_observation();
        at_threshold.steering_angle = 10.0;
        // 10 degrees exactly is not oversteering
        assert!((evaluate(&at_threshold) - 6.5).abs() < 1e-12);

        let mut oversteer = base_observation();
        oversteer.steering_angle = -10.1;
        // base 1.0 x0.7 x1.5 + 5.0
        assert!((evaluate(&oversteer) - 6.05).abs() < 1e-12);
    }

    #[test]
    fn test_heading_penalty_wraps_around() {
        // Track direction 170 degrees, car heading -170: raw difference 340,
        // wrapped to 20, which exceeds the 15 degree threshold
        let angle = 170.0_f64.to_radians();
        let mut obs = base_observation();
        obs.waypoints = vec![
            Waypoint::from((0.0, 0.0)),
            Waypoint::from((angle.cos(), angle.sin())),
        ];
        obs.heading = -170.0;

        // At the speed gate exactly, no penalty
        obs.speed = 2.0;
        assert!((evaluate(&obs) - 6.5).abs() < 1e-12);

        // Above the gate the penalty applies: 1.0 x1.5 x0.5 + 5.0
        obs.speed = 2.5;
        assert!((evaluate(&obs) - 5.75).abs() < 1e-12);
    }

    #[test]
    fn test_completion_bonus_steps_at_threshold() {
        let mut almost = base_observation();
        almost.progress = 89.9;
        let mut there = base_observation();
        there.progress = 90.0;

        let jump = evaluate(&there) - evaluate(&almost);
        // 50 flat, plus the continuous 10 * 0.1 / 100 term
        assert!((jump - 50.01).abs() < 1e-9);
    }

    #[test]
    fn test_penalties_compound() {
        let mut obs = base_observation();
        obs.distance_from_center = 0.3;
        obs.steering_angle = 20.0;
        obs.speed = 3.0;
        obs.heading = 90.0;
        obs.progress = 0.0;

        // 0.1 x0.7 x0.9 x0.5 = 0.0315, still positive
        assert!((evaluate(&obs) - 0.0315).abs() < 1e-12);
    }

    #[test]
    fn test_floor_enforced_on_worst_case() {
        let mut obs = base_observation();
        obs.distance_from_center = 0.7;
        obs.steering_angle = 30.0;
        obs.speed = 0.5;
        obs.progress = 0.0;

        // 1e-3 x0.7 x0.8 would fall below the floor
        assert_eq!(evaluate(&obs), 1e-3);
    }

    #[test]
    fn test_malformed_record_surfaces_as_error() {
        let evaluator = RewardEvaluator::default();

        let mut bad_width = base_observation();
        bad_width.track_width = 0.0;
        assert!(evaluator.evaluate(&bad_width).is_err());

        let mut bad_distance = base_observation();
        bad_distance.distance_from_center = -0.1;
        assert!(evaluator.evaluate(&bad_distance).is_err());

        let mut bad_index = base_observation();
        bad_index.closest_waypoints = (0, 5);
        assert!(evaluator.evaluate(&bad_index).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RewardConfig {
            steering_penalty: -0.5,
            ..Default::default()
        };

        assert!(RewardEvaluator::new(config).is_err());
    }

    #[test]
    fn test_value_range_bounds_random_observations() {
        let evaluator = RewardEvaluator::default();
        let (min, max) = evaluator.value_range();
        assert_eq!(min, 1e-3);
        assert!((max - 61.5).abs() < 1e-12);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let mut obs = base_observation();
            obs.distance_from_center = rng.gen_range(0.0..=1.0);
            obs.speed = rng.gen_range(0.0..=5.0);
            obs.steering_angle = rng.gen_range(-30.0..=30.0);
            obs.heading = rng.gen_range(-180.0..=180.0);
            obs.progress = rng.gen_range(0.0..=100.0);
            obs.all_wheels_on_track = rng.gen_bool(0.9);

            let reward = evaluator.evaluate(&obs).unwrap();
            assert!(reward >= min);
            assert!(reward <= max);
        }
    }
}
