//! Configuration for MargaNav
//!
//! Every empirically tuned constant of the engine lives here so hosts can
//! retune without recompiling. Defaults reproduce the behavior the engine was
//! calibrated with.

use crate::error::{MargaError, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MargaConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub follow: FollowConfig,
    #[serde(default)]
    pub ladder: LadderConfig,
    #[serde(default)]
    pub rail: RailConfig,
    #[serde(default)]
    pub swim: SwimConfig,
    #[serde(default)]
    pub stuck: StuckConfig,
}

/// Worker pool settings
#[derive(Clone, Debug, Deserialize)]
pub struct SchedulerConfig {
    /// Number of pathfinding worker threads (default: 2)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum node expansions before a search gives up (default: 5000)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

/// Path following settings
#[derive(Clone, Debug, Deserialize)]
pub struct FollowConfig {
    /// Minimum accepted speed factor (default: 0.1)
    #[serde(default = "default_min_speed")]
    pub min_speed_factor: f64,

    /// Maximum accepted speed factor (default: 2.0)
    #[serde(default = "default_max_speed")]
    pub max_speed_factor: f64,

    /// Speed multiplier while walking on path-tagged surfaces (default: 1.3)
    #[serde(default = "default_on_path_multiplier")]
    pub on_path_speed_multiplier: f64,

    /// Ticks before an unreached desired position is forgotten (default: 1000)
    #[serde(default = "default_desired_pos_timeout")]
    pub desired_pos_timeout_ticks: u32,

    /// How many upcoming waypoints may be consumed per tick (default: 4)
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// Horizontal tolerance for consuming a waypoint (default: 0.5)
    #[serde(default = "default_waypoint_tolerance")]
    pub waypoint_tolerance: f64,

    /// Vertical closeness required at a ladder bottom (default: 0.001)
    #[serde(default = "default_min_y_distance")]
    pub min_y_distance: f64,

    /// Distance from both current and previous waypoint that counts as having
    /// fallen behind the path (default: 2.0)
    #[serde(default = "default_fall_behind_distance")]
    pub fall_behind_distance: f64,

    /// Radius inside which a past waypoint re-captures the cursor (default: 1.0)
    #[serde(default = "default_fall_behind_rewind")]
    pub fall_behind_rewind_tolerance: f64,
}

/// Ladder handling settings
#[derive(Clone, Debug, Deserialize)]
pub struct LadderConfig {
    /// Target speed while climbing (default: 0.3)
    #[serde(default = "default_climb_speed")]
    pub climb_speed: f64,

    /// Target speed while centering for a descent (default: 0.2)
    #[serde(default = "default_descend_speed")]
    pub descend_speed: f64,

    /// Vertical intent while descending (default: -0.5)
    #[serde(default = "default_descend_intent")]
    pub descend_intent: f64,

    /// Horizontal bias into the ladder facing while climbing (default: 0.4)
    #[serde(default = "default_climb_bias")]
    pub climb_bias: f64,

    /// One-off upward velocity nudge at the ladder base (default: 0.1)
    #[serde(default = "default_edge_nudge")]
    pub edge_nudge: f64,

    /// Squared horizontal distance gate for ladder handling (default: 0.6)
    #[serde(default = "default_gate_distance_sq")]
    pub gate_distance_sq: f64,

    /// Vertical distance gate for ladder handling (default: 2.0)
    #[serde(default = "default_gate_y")]
    pub gate_y: f64,

    /// Speed divisor while approaching a ladder waypoint (default: 4.0)
    #[serde(default = "default_approach_divisor")]
    pub approach_speed_divisor: f64,
}

/// Rail handling settings
#[derive(Clone, Debug, Deserialize)]
pub struct RailConfig {
    /// Per-tick cart velocity increment toward the next waypoint (default: 0.01)
    #[serde(default = "default_rail_nudge")]
    pub nudge: f64,

    /// Cart mount height above the rail cell (default: 0.625)
    #[serde(default = "default_mount_y_offset")]
    pub mount_y_offset: f64,

    /// Extra mount height on ascending rails (default: 0.5)
    #[serde(default = "default_ascend_y_offset")]
    pub ascend_y_offset: f64,

    /// Off-centerline distance (cells) that triggers auto-dismount (default: 7.0)
    #[serde(default = "default_derail_distance")]
    pub derail_distance: f64,
}

/// Swimming settings
#[derive(Clone, Debug, Deserialize)]
pub struct SwimConfig {
    /// Squared horizontal tolerance for consuming waypoints in liquid (default: 0.1)
    #[serde(default = "default_swim_tolerance_sq")]
    pub tolerance_sq: f64,

    /// Vertical tolerance for consuming waypoints in liquid (default: 0.5)
    #[serde(default = "default_swim_y_tolerance")]
    pub y_tolerance: f64,
}

/// Stuck detection settings
#[derive(Clone, Debug, Deserialize)]
pub struct StuckConfig {
    /// Sliding window length in ticks (default: 100)
    #[serde(default = "default_stuck_window")]
    pub window_ticks: u32,

    /// Displacement below which a window counts as stuck (default: 0.1)
    #[serde(default = "default_stuck_displacement")]
    pub displacement_threshold: f64,

    /// Damage applied with each stuck nudge (default: 0.2)
    #[serde(default = "default_stuck_damage")]
    pub nudge_damage: f32,

    /// Consecutive stuck windows before teleporting (default: 6)
    #[serde(default = "default_teleport_steps")]
    pub teleport_steps: u32,

    /// Whether full-stuck recovery may teleport at all (default: true)
    #[serde(default = "default_teleport_on_full_stuck")]
    pub teleport_on_full_stuck: bool,

    /// Full-stuck recoveries before the navigator gives up (default: 3)
    #[serde(default = "default_max_full_stuck")]
    pub max_full_stuck: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            min_speed_factor: default_min_speed(),
            max_speed_factor: default_max_speed(),
            on_path_speed_multiplier: default_on_path_multiplier(),
            desired_pos_timeout_ticks: default_desired_pos_timeout(),
            lookahead: default_lookahead(),
            waypoint_tolerance: default_waypoint_tolerance(),
            min_y_distance: default_min_y_distance(),
            fall_behind_distance: default_fall_behind_distance(),
            fall_behind_rewind_tolerance: default_fall_behind_rewind(),
        }
    }
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            climb_speed: default_climb_speed(),
            descend_speed: default_descend_speed(),
            descend_intent: default_descend_intent(),
            climb_bias: default_climb_bias(),
            edge_nudge: default_edge_nudge(),
            gate_distance_sq: default_gate_distance_sq(),
            gate_y: default_gate_y(),
            approach_speed_divisor: default_approach_divisor(),
        }
    }
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            nudge: default_rail_nudge(),
            mount_y_offset: default_mount_y_offset(),
            ascend_y_offset: default_ascend_y_offset(),
            derail_distance: default_derail_distance(),
        }
    }
}

impl Default for SwimConfig {
    fn default() -> Self {
        Self {
            tolerance_sq: default_swim_tolerance_sq(),
            y_tolerance: default_swim_y_tolerance(),
        }
    }
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            window_ticks: default_stuck_window(),
            displacement_threshold: default_stuck_displacement(),
            nudge_damage: default_stuck_damage(),
            teleport_steps: default_teleport_steps(),
            teleport_on_full_stuck: default_teleport_on_full_stuck(),
            max_full_stuck: default_max_full_stuck(),
        }
    }
}

// Default value functions
fn default_workers() -> usize {
    2
}
fn default_max_iterations() -> usize {
    5000
}
fn default_min_speed() -> f64 {
    0.1
}
fn default_max_speed() -> f64 {
    2.0
}
fn default_on_path_multiplier() -> f64 {
    1.3
}
fn default_desired_pos_timeout() -> u32 {
    1000
}
fn default_lookahead() -> usize {
    4
}
fn default_waypoint_tolerance() -> f64 {
    0.5
}
fn default_min_y_distance() -> f64 {
    0.001
}
fn default_fall_behind_distance() -> f64 {
    2.0
}
fn default_fall_behind_rewind() -> f64 {
    1.0
}
fn default_climb_speed() -> f64 {
    0.3
}
fn default_descend_speed() -> f64 {
    0.2
}
fn default_descend_intent() -> f64 {
    -0.5
}
fn default_climb_bias() -> f64 {
    0.4
}
fn default_edge_nudge() -> f64 {
    0.1
}
fn default_gate_distance_sq() -> f64 {
    0.6
}
fn default_gate_y() -> f64 {
    2.0
}
fn default_approach_divisor() -> f64 {
    4.0
}
fn default_rail_nudge() -> f64 {
    0.01
}
fn default_mount_y_offset() -> f64 {
    0.625
}
fn default_ascend_y_offset() -> f64 {
    0.5
}
fn default_derail_distance() -> f64 {
    7.0
}
fn default_swim_tolerance_sq() -> f64 {
    0.1
}
fn default_swim_y_tolerance() -> f64 {
    0.5
}
fn default_stuck_window() -> u32 {
    100
}
fn default_stuck_displacement() -> f64 {
    0.1
}
fn default_stuck_damage() -> f32 {
    0.2
}
fn default_teleport_steps() -> u32 {
    6
}
fn default_teleport_on_full_stuck() -> bool {
    true
}
fn default_max_full_stuck() -> u32 {
    3
}

impl MargaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MargaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: MargaConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
