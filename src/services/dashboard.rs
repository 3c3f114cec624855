// Dashboard service — the read path consumed by the renderer.
// All queries go through the local snapshot; nothing here talks to the
// remote store.

use crate::state::AppState;
use crate::stats;
use crate::types::{
    CustomerFilter, CustomerRecord, DashboardView, OverviewStats, PeriodStats, SalespersonStats,
};

pub fn overview(state: &AppState) -> OverviewStats {
    stats::overview_stats(&state.snapshot(), state.targets())
}

pub fn by_salesperson(state: &AppState) -> Vec<SalespersonStats> {
    stats::salesperson_stats(&state.snapshot(), state.targets())
}

pub fn by_period(state: &AppState) -> Vec<PeriodStats> {
    stats::period_stats(&state.snapshot())
}

pub fn customers(state: &AppState, filter: &CustomerFilter) -> Vec<CustomerRecord> {
    stats::filter_customers(&state.snapshot(), filter)
}

/// Assemble a full redraw payload.
///
/// Takes the snapshot once and computes every section from that one copy,
/// so a concurrent replacement can never produce sections that disagree.
pub fn view(state: &AppState, filter: &CustomerFilter) -> DashboardView {
    let snapshot = state.snapshot();
    DashboardView {
        overview: stats::overview_stats(&snapshot, state.targets()),
        salespersons: stats::salesperson_stats(&snapshot, state.targets()),
        periods: stats::period_stats(&snapshot),
        customers: stats::filter_customers(&snapshot, filter),
    }
}
