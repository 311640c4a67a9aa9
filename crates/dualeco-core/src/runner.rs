//! Run loop for a bounded DualEco simulation.
//!
//! [`run`] repeats [`run_step`] until the clock reaches its horizon,
//! handing every snapshot to a [`StepCallback`]. The first failing step
//! ends the run with its error.

use tracing::info;

use dualeco_ledger::Journal;

use crate::error::StepError;
use crate::snapshot::Snapshot;
use crate::step::{SimulationContext, run_step};

/// Callback invoked after each step completes.
///
/// Implementations can record the series of snapshots, print summaries,
/// or inspect agents through the context.
pub trait StepCallback {
    /// Called after a step closes successfully.
    fn on_step(&mut self, snapshot: &Snapshot, ctx: &SimulationContext);
}

/// A callback that ignores every step.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _snapshot: &Snapshot, _ctx: &SimulationContext) {}
}

/// Keeps every snapshot of the run.
#[derive(Debug, Default)]
pub struct SnapshotRecorder {
    /// Snapshots in step order.
    pub snapshots: Vec<Snapshot>,
}

impl StepCallback for SnapshotRecorder {
    fn on_step(&mut self, snapshot: &Snapshot, _ctx: &SimulationContext) {
        self.snapshots.push(snapshot.clone());
    }
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Steps executed.
    pub total_steps: u64,
    /// Snapshot of the last step, if any step ran.
    pub final_snapshot: Option<Snapshot>,
}

/// Run the simulation until the clock's horizon.
///
/// A context with an unbounded clock (horizon 0) runs no step.
///
/// # Errors
///
/// Returns the first [`StepError`] raised by a step.
pub fn run(
    ctx: &mut SimulationContext,
    callback: &mut dyn StepCallback,
    summary_interval: u64,
) -> Result<RunSummary, StepError> {
    let mut total_steps: u64 = 0;
    let mut final_snapshot = None;

    info!(
        horizon = ctx.clock.horizon(),
        precision = ctx.precision,
        check_every_step = ctx.check_every_step,
        "Simulation starting"
    );

    while ctx.clock.horizon() > 0 && !ctx.clock.is_finished() {
        let snapshot = run_step(ctx)?;
        total_steps = total_steps.saturating_add(1);
        callback.on_step(&snapshot, ctx);

        if snapshot.step.checked_rem(summary_interval) == Some(0) {
            log_summary(&snapshot, &ctx.journal);
        }
        final_snapshot = Some(snapshot);
    }

    Ok(RunSummary {
        total_steps,
        final_snapshot,
    })
}

fn log_summary(snapshot: &Snapshot, journal: &Journal) {
    info!(
        step = snapshot.step,
        unemployment_rate = snapshot.unemployment_rate(),
        vacancy_rate = snapshot.vacancy_rate,
        credit_granted = snapshot.credit_granted,
        denied_at_ceiling = snapshot.denied_at_ceiling,
        defaults = snapshot.defaults,
        bonds_issued = snapshot.bonds_issued,
        transaction_kinds = journal.totals_by_kind().len(),
        "Economy summary"
    );
}

/// Log the end of a run.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        total_steps = summary.total_steps,
        final_step = summary.final_snapshot.as_ref().map(|s| s.step),
        final_unemployed = summary.final_snapshot.as_ref().map(|s| s.unemployed),
        "Simulation ended"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::config::SimulationConfig;

    use super::*;

    #[test]
    fn runs_until_the_horizon() {
        let mut config = SimulationConfig::default();
        config.simulation.steps = 2;
        let mut ctx = SimulationContext::new(&config).unwrap();
        let mut recorder = SnapshotRecorder::default();
        let summary = run(&mut ctx, &mut recorder, 1).unwrap();
        assert_eq!(summary.total_steps, 2);
        assert_eq!(recorder.snapshots.len(), 2);
        assert_eq!(summary.final_snapshot.map(|s| s.step), Some(2));
    }

    #[test]
    fn unbounded_clock_runs_nothing() {
        let mut config = SimulationConfig::default();
        config.simulation.steps = 0;
        let mut ctx = SimulationContext::new(&config).unwrap();
        let summary = run(&mut ctx, &mut NoOpCallback, 0).unwrap();
        assert_eq!(summary.total_steps, 0);
        assert!(summary.final_snapshot.is_none());
    }
}
