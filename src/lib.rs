//! Reward shaping for reinforcement-learning race car agents.
//!
//! The training platform calls [`RewardEvaluator::evaluate`](track::RewardEvaluator::evaluate)
//! once per simulated step with a [`StepObservation`](track::StepObservation)
//! and feeds the returned scalar back into its learning signal.

pub mod logging;

pub mod track;
