//! Load-fairness penalties blended into driver selection.
//!
//! # Known limitation
//!
//! The scheduler picks the minimum *adjusted* cost (`base + penalty`) one ride at
//! a time. Base-cost gaps between drivers routinely exceed any penalty that is
//! practical to tune, so under the greedy policy these penalties do not produce
//! balanced workloads. Balancing needs a globally-aware reassignment pass, which
//! this crate does not implement. The modifiers stay available so that such a
//! solver can reuse the same cost primitives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::params::AssignmentConfig;

/// Strategy that adds a penalty based on how many rides a driver already holds.
///
/// Implementations must be monotonically non-decreasing in `committed_rides`.
pub trait CostModifier: Send + Sync + fmt::Debug {
    /// Penalty for giving one more ride to a driver that already has `committed_rides`.
    fn penalty(&self, committed_rides: usize) -> f64;

    /// Whether this modifier participates at all (drives fairness reporting).
    fn is_enabled(&self) -> bool {
        true
    }
}

/// The default: no penalty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPenalty;

impl CostModifier for NoPenalty {
    fn penalty(&self, _committed_rides: usize) -> f64 {
        0.0
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// `weight × n`.
#[derive(Debug, Clone, Copy)]
pub struct LinearLoadPenalty {
    pub weight: f64,
}

impl CostModifier for LinearLoadPenalty {
    fn penalty(&self, committed_rides: usize) -> f64 {
        self.weight * committed_rides as f64
    }
}

/// `weight × n²`.
#[derive(Debug, Clone, Copy)]
pub struct QuadraticLoadPenalty {
    pub weight: f64,
}

impl CostModifier for QuadraticLoadPenalty {
    fn penalty(&self, committed_rides: usize) -> f64 {
        let n = committed_rides as f64;
        self.weight * n * n
    }
}

/// Shape of the penalty used when fairness mode is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyCurve {
    Linear,
    #[default]
    Quadratic,
}

impl PenaltyCurve {
    pub fn modifier(self, weight: f64) -> Box<dyn CostModifier> {
        match self {
            PenaltyCurve::Linear => Box::new(LinearLoadPenalty { weight }),
            PenaltyCurve::Quadratic => Box::new(QuadraticLoadPenalty { weight }),
        }
    }
}

impl FromStr for PenaltyCurve {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(PenaltyCurve::Linear),
            "quadratic" => Ok(PenaltyCurve::Quadratic),
            other => Err(format!("unknown penalty curve {other:?}, expected linear or quadratic")),
        }
    }
}

/// Modifier selected by the run configuration: [`NoPenalty`] unless fairness mode is on.
pub fn modifier_for(config: &AssignmentConfig) -> Box<dyn CostModifier> {
    if config.fairness_mode {
        config.penalty_curve.modifier(config.fairness_weight)
    } else {
        Box::new(NoPenalty)
    }
}
