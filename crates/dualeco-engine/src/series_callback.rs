//! Step callback that tracks the macro series of a run.

use tracing::debug;

use dualeco_core::{SimulationContext, Snapshot, StepCallback};
use dualeco_types::{RunId, Sector};

/// Tracks unemployment and credit over the run and traces each step.
pub struct SeriesCallback {
    run_id: RunId,
    /// Highest unemployment rate seen.
    pub peak_unemployment: f64,
    /// Loans granted over the run.
    pub credit_granted: f64,
    /// Loans written off over the run.
    pub defaults: f64,
    /// Requests denied at bank ceilings over the run.
    pub denied_at_ceiling: u64,
}

impl SeriesCallback {
    /// Create a callback for the given run.
    pub const fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            peak_unemployment: 0.0,
            credit_granted: 0.0,
            defaults: 0.0,
            denied_at_ceiling: 0,
        }
    }
}

impl StepCallback for SeriesCallback {
    fn on_step(&mut self, snapshot: &Snapshot, ctx: &SimulationContext) {
        self.peak_unemployment = self.peak_unemployment.max(snapshot.unemployment_rate());
        self.credit_granted += snapshot.credit_granted;
        self.defaults += snapshot.defaults;
        self.denied_at_ceiling = self
            .denied_at_ceiling
            .saturating_add(u64::from(snapshot.denied_at_ceiling));

        let government = snapshot
            .stocks
            .get(&Sector::Government)
            .copied()
            .unwrap_or_default();
        debug!(
            run_id = %self.run_id,
            step = snapshot.step,
            remaining = ctx.clock.remaining(),
            government_bonds = government.bonds,
            inventories = snapshot.inventories,
            units_sold = snapshot.units_sold,
            "Step recorded"
        );
    }
}
