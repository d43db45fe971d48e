pub mod cost;
pub mod feasibility;
pub mod penalty;
pub mod types;

pub use cost::{CostBreakdown, CostModel};
pub use feasibility::{can_serve, check_feasibility, departure_point, Infeasibility};
pub use penalty::{
    modifier_for, CostModifier, LinearLoadPenalty, NoPenalty, PenaltyCurve, QuadraticLoadPenalty,
};
pub use types::{select_best, Candidate};
