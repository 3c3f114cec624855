//! Aggregation over the customer snapshot.
//!
//! Pure functions: every value is recomputed from scratch on each call.
//! At tens-to-low-hundreds of records a full pass is cheaper than keeping
//! incremental sums correct, and identical snapshots always yield identical
//! output.

use crate::types::{
    CustomerFilter, CustomerRecord, OverviewStats, PeriodStats, ProductType, SalesTargets,
    SalespersonStats,
};

/// Round to one decimal place, matching the displayed percentage precision.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percentage(achieved: i64, target: i64) -> f64 {
    if target > 0 {
        round1(achieved as f64 / target as f64 * 100.0)
    } else {
        0.0
    }
}

/// Overall progress against the summed target table.
pub fn overview_stats(customers: &[CustomerRecord], targets: &SalesTargets) -> OverviewStats {
    let total_target = targets.total_target();
    let total_achieved: i64 = customers.iter().map(|c| c.amount).sum();
    OverviewStats {
        total_target,
        total_achieved,
        total_remaining: total_target - total_achieved,
        progress_percentage: percentage(total_achieved, total_target),
    }
}

/// Per-salesperson progress, one entry per target-table key in table order.
///
/// Records for salespeople outside the table count toward the overview but
/// have no entry here.
pub fn salesperson_stats(
    customers: &[CustomerRecord],
    targets: &SalesTargets,
) -> Vec<SalespersonStats> {
    targets
        .iter()
        .map(|entry| {
            let achieved: i64 = customers
                .iter()
                .filter(|c| c.salesperson == entry.salesperson)
                .map(|c| c.amount)
                .sum();
            SalespersonStats {
                salesperson: entry.salesperson.clone(),
                target: entry.target,
                achieved,
                remaining: entry.target - achieved,
                progress: percentage(achieved, entry.target),
            }
        })
        .collect()
}

/// Per-period totals with the finance/insurance breakdown.
pub fn period_stats(customers: &[CustomerRecord]) -> Vec<PeriodStats> {
    crate::types::Period::ALL
        .iter()
        .map(|&period| {
            let in_period = customers.iter().filter(|c| c.order_month == period);
            let mut total = 0;
            let mut finance = 0;
            let mut insurance = 0;
            for c in in_period {
                total += c.amount;
                match c.product_type {
                    ProductType::Finance => finance += c.amount,
                    ProductType::Insurance => insurance += c.amount,
                    ProductType::Other(_) => {}
                }
            }
            PeriodStats {
                period,
                total,
                finance,
                insurance,
            }
        })
        .collect()
}

/// Filter the customer list and order it newest-first.
///
/// Ordering contract: `createdAt` descending, id descending as tiebreak, so
/// identical snapshots always render identically.
pub fn filter_customers(
    customers: &[CustomerRecord],
    filter: &CustomerFilter,
) -> Vec<CustomerRecord> {
    let mut matched: Vec<CustomerRecord> = customers
        .iter()
        .filter(|c| {
            filter
                .salesperson
                .as_ref()
                .map_or(true, |s| &c.salesperson == s)
                && filter.period.map_or(true, |p| c.order_month == p)
                && filter
                    .product
                    .as_ref()
                    .map_or(true, |p| &c.product_type == p)
        })
        .cloned()
        .collect();
    matched.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Period, SalesTarget};

    fn record(
        id: &str,
        salesperson: &str,
        period: Period,
        product: ProductType,
        amount: i64,
        created_at: &str,
    ) -> CustomerRecord {
        CustomerRecord {
            id: id.to_string(),
            name: format!("客戶{id}"),
            masked_name: format!("客O{id}"),
            salesperson: salesperson.to_string(),
            order_month: period,
            product_type: product,
            amount,
            seq: None,
            created_at: created_at.to_string(),
            updated_at: None,
        }
    }

    fn ab_targets() -> SalesTargets {
        SalesTargets::new(vec![
            SalesTarget {
                salesperson: "A".to_string(),
                target: 1000,
            },
            SalesTarget {
                salesperson: "B".to_string(),
                target: 1000,
            },
        ])
    }

    fn ab_snapshot() -> Vec<CustomerRecord> {
        vec![
            record(
                "1",
                "A",
                Period::Dec2025,
                ProductType::Finance,
                400,
                "2025-12-01T00:00:00+00:00",
            ),
            record(
                "2",
                "A",
                Period::Jan2026,
                ProductType::Insurance,
                300,
                "2025-12-02T00:00:00+00:00",
            ),
            record(
                "3",
                "B",
                Period::Jan2026,
                ProductType::Finance,
                1000,
                "2025-12-03T00:00:00+00:00",
            ),
        ]
    }

    #[test]
    fn overview_matches_worked_scenario() {
        let stats = overview_stats(&ab_snapshot(), &ab_targets());
        assert_eq!(stats.total_target, 2000);
        assert_eq!(stats.total_achieved, 1700);
        assert_eq!(stats.total_remaining, 300);
        assert_eq!(stats.progress_percentage, 85.0);
    }

    #[test]
    fn salesperson_matches_worked_scenario() {
        let stats = salesperson_stats(&ab_snapshot(), &ab_targets());
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].salesperson, "A");
        assert_eq!(stats[0].achieved, 700);
        assert_eq!(stats[0].remaining, 300);
        assert_eq!(stats[0].progress, 70.0);
        assert_eq!(stats[1].achieved, 1000);
        assert_eq!(stats[1].progress, 100.0);
    }

    #[test]
    fn empty_snapshot_is_all_zeros() {
        let stats = salesperson_stats(&[], &ab_targets());
        for s in &stats {
            assert_eq!(s.achieved, 0);
            assert_eq!(s.remaining, s.target);
            assert_eq!(s.progress, 0.0);
        }
        assert_eq!(overview_stats(&[], &ab_targets()).progress_percentage, 0.0);
    }

    #[test]
    fn zero_target_guards_division() {
        let targets = SalesTargets::new(vec![]);
        let stats = overview_stats(&ab_snapshot(), &targets);
        assert_eq!(stats.total_target, 0);
        assert_eq!(stats.progress_percentage, 0.0);
        assert_eq!(stats.total_remaining, -1700);
    }

    #[test]
    fn achieved_is_order_independent() {
        let mut reversed = ab_snapshot();
        reversed.reverse();
        assert_eq!(
            overview_stats(&ab_snapshot(), &ab_targets()),
            overview_stats(&reversed, &ab_targets())
        );
    }

    #[test]
    fn other_salespersons_records_do_not_leak() {
        let mut snapshot = ab_snapshot();
        let before = salesperson_stats(&snapshot, &ab_targets());
        snapshot.push(record(
            "4",
            "C",
            Period::Feb2026,
            ProductType::Finance,
            9999,
            "2025-12-04T00:00:00+00:00",
        ));
        let after = salesperson_stats(&snapshot, &ab_targets());
        assert_eq!(before, after);
        // ...but the overview still counts them
        assert_eq!(
            overview_stats(&snapshot, &ab_targets()).total_achieved,
            1700 + 9999
        );
    }

    #[test]
    fn recomputation_is_idempotent() {
        let snapshot = ab_snapshot();
        let targets = ab_targets();
        assert_eq!(
            overview_stats(&snapshot, &targets),
            overview_stats(&snapshot, &targets)
        );
        assert_eq!(
            salesperson_stats(&snapshot, &targets),
            salesperson_stats(&snapshot, &targets)
        );
        assert_eq!(period_stats(&snapshot), period_stats(&snapshot));
    }

    #[test]
    fn period_breakdown_splits_products() {
        let stats = period_stats(&ab_snapshot());
        assert_eq!(stats[0].period, Period::Dec2025);
        assert_eq!(stats[0].total, 400);
        assert_eq!(stats[0].finance, 400);
        assert_eq!(stats[0].insurance, 0);
        assert_eq!(stats[1].total, 1300);
        assert_eq!(stats[1].finance, 1000);
        assert_eq!(stats[1].insurance, 300);
        assert_eq!(stats[2].total, 0);
    }

    #[test]
    fn other_products_count_in_total_only() {
        let snapshot = vec![record(
            "1",
            "A",
            Period::Dec2025,
            ProductType::Other("基金".to_string()),
            100,
            "2025-12-01T00:00:00+00:00",
        )];
        let stats = period_stats(&snapshot);
        assert_eq!(stats[0].total, 100);
        assert_eq!(stats[0].finance, 0);
        assert_eq!(stats[0].insurance, 0);
    }

    #[test]
    fn progress_rounds_to_one_decimal() {
        let targets = SalesTargets::new(vec![SalesTarget {
            salesperson: "A".to_string(),
            target: 3000,
        }]);
        let snapshot = vec![record(
            "1",
            "A",
            Period::Dec2025,
            ProductType::Finance,
            1000,
            "2025-12-01T00:00:00+00:00",
        )];
        // 1000 / 3000 = 33.333...%
        assert_eq!(salesperson_stats(&snapshot, &targets)[0].progress, 33.3);
    }

    #[test]
    fn filters_and_together() {
        let snapshot = ab_snapshot();
        let filter = CustomerFilter {
            salesperson: Some("A".to_string()),
            period: Some(Period::Jan2026),
            product: None,
        };
        let matched = filter_customers(&snapshot, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "2");

        let everything = filter_customers(&snapshot, &CustomerFilter::default());
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn filtered_list_is_newest_first() {
        let matched = filter_customers(&ab_snapshot(), &CustomerFilter::default());
        let ids: Vec<&str> = matched.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["3", "2", "1"]);
    }

    #[test]
    fn equal_timestamps_break_ties_by_id() {
        let same_time = "2025-12-01T00:00:00+00:00";
        let snapshot = vec![
            record("a", "A", Period::Dec2025, ProductType::Finance, 1, same_time),
            record("b", "A", Period::Dec2025, ProductType::Finance, 2, same_time),
        ];
        let matched = filter_customers(&snapshot, &CustomerFilter::default());
        assert_eq!(matched[0].id, "b");
        assert_eq!(matched[1].id, "a");
    }
}
