/// A feasible driver for one ride, with the costs it would commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position of the driver in the fixed driver iteration order.
    pub driver_index: usize,
    pub base_cost: f64,
    /// Penalty in effect before this ride is committed.
    pub penalty: f64,
    pub adjusted_cost: f64,
}

impl Candidate {
    pub fn new(driver_index: usize, base_cost: f64, penalty: f64) -> Self {
        Self {
            driver_index,
            base_cost,
            penalty,
            adjusted_cost: base_cost + penalty,
        }
    }
}

/// Pick the candidate with the strictly lowest finite adjusted cost.
///
/// `evaluations` must be in driver iteration order: on equal cost the earlier
/// driver wins, regardless of which evaluation finished first.
pub fn select_best(evaluations: &[Option<Candidate>]) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for candidate in evaluations.iter().flatten() {
        if !candidate.adjusted_cost.is_finite() {
            continue;
        }
        match best {
            Some(current) if candidate.adjusted_cost >= current.adjusted_cost => {}
            _ => best = Some(*candidate),
        }
    }
    best
}
