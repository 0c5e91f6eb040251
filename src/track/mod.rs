mod config;
mod observation;
mod reward;
mod waypoint;

pub use crate::track::{
    config::RewardConfig,
    observation::StepObservation,
    reward::{
        CenterlineTier,
        RewardEvaluator,
        SpeedBand,
    },
    waypoint::{
        heading_difference,
        Waypoint,
    },
};
