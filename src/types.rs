use serde::{Deserialize, Serialize};

/// One customer order as stored in the remote collection.
///
/// Field names serialize camelCase to match the stored document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    /// Document id assigned by the backing store at creation. Immutable.
    pub id: String,
    /// Full customer name, required, non-empty.
    pub name: String,
    /// Derived from `name` at create/update time. Not recomputed reactively.
    pub masked_name: String,
    pub salesperson: String,
    pub order_month: Period,
    pub product_type: ProductType,
    /// Order amount in ten-thousands (萬).
    pub amount: i64,
    /// Locally-assigned monotonic sequence number. Absent for records
    /// written by clients that predate it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    /// RFC 3339, set by the core at creation. Never caller-supplied.
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Raw form payload for create/update, before validation.
///
/// `amount` arrives as the submitted text and is parsed during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: String,
    pub salesperson: String,
    pub order_month: Period,
    pub product_type: ProductType,
    pub amount: String,
}

/// The exact field set written by an update: the full record rebuilt from
/// form input, minus the immutable id, `createdAt`, and `seq`. Backends
/// merge this into the stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub name: String,
    pub masked_name: String,
    pub salesperson: String,
    pub order_month: Period,
    pub product_type: ProductType,
    pub amount: i64,
    pub updated_at: String,
}

/// The three order-month buckets tracked for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "2025-12")]
    Dec2025,
    #[serde(rename = "2026-01")]
    Jan2026,
    #[serde(rename = "2026-02")]
    Feb2026,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Dec2025, Period::Jan2026, Period::Feb2026];

    /// Wire key, as stored in documents.
    pub fn key(self) -> &'static str {
        match self {
            Period::Dec2025 => "2025-12",
            Period::Jan2026 => "2026-01",
            Period::Feb2026 => "2026-02",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "2025-12" => Some(Period::Dec2025),
            "2026-01" => Some(Period::Jan2026),
            "2026-02" => Some(Period::Feb2026),
            _ => None,
        }
    }

    /// Display label shown in confirmations and rendered lists.
    pub fn label(self) -> &'static str {
        match self {
            Period::Dec2025 => "2025年12月",
            Period::Jan2026 => "2026年1月",
            Period::Feb2026 => "2026年2月",
        }
    }
}

/// Product category of an order.
///
/// Finance and insurance are the two categories broken out in the monthly
/// stats; anything else round-trips through `Other` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "理財")]
    Finance,
    #[serde(rename = "保險")]
    Insurance,
    #[serde(untagged)]
    Other(String),
}

impl ProductType {
    pub fn as_str(&self) -> &str {
        match self {
            ProductType::Finance => "理財",
            ProductType::Insurance => "保險",
            ProductType::Other(s) => s,
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "理財" => ProductType::Finance,
            "保險" => ProductType::Insurance,
            other => ProductType::Other(other.to_string()),
        }
    }
}

/// One salesperson's fixed target, in the same ten-thousand unit as
/// order amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTarget {
    pub salesperson: String,
    pub target: i64,
}

/// Static salesperson → target table. Fixed at startup, never mutated.
///
/// Kept as an ordered list so dashboards render salespeople in the
/// configured order rather than by name collation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesTargets(Vec<SalesTarget>);

impl SalesTargets {
    pub fn new(entries: Vec<SalesTarget>) -> Self {
        Self(entries)
    }

    /// The target table shipped with the app.
    pub fn default_table() -> Self {
        let entries = [
            ("璧菁", 3000),
            ("麗鳳", 1000),
            ("馨予", 1000),
            ("淑芬", 1000),
            ("靜芸", 1000),
            ("雨軒", 1000),
            ("祺倫", 1000),
            ("奕憲", 1000),
            ("泓權", 1000),
            ("至浩", 1000),
        ];
        Self(
            entries
                .into_iter()
                .map(|(salesperson, target)| SalesTarget {
                    salesperson: salesperson.to_string(),
                    target,
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &SalesTarget> {
        self.0.iter()
    }

    pub fn get(&self, salesperson: &str) -> Option<i64> {
        self.0
            .iter()
            .find(|t| t.salesperson == salesperson)
            .map(|t| t.target)
    }

    pub fn total_target(&self) -> i64 {
        self.0.iter().map(|t| t.target).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SalesTargets {
    fn default() -> Self {
        Self::default_table()
    }
}

/// Overall progress against the summed target table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_target: i64,
    pub total_achieved: i64,
    /// May be negative once the team overshoots. Not clamped.
    pub total_remaining: i64,
    /// Rounded to one decimal; 0.0 when the target table sums to zero.
    pub progress_percentage: f64,
}

/// Per-salesperson progress. One entry per target-table key, in table order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalespersonStats {
    pub salesperson: String,
    pub target: i64,
    pub achieved: i64,
    pub remaining: i64,
    /// Unclamped; display-width clamping is the renderer's job.
    pub progress: f64,
}

/// Per-period totals with the finance/insurance breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub period: Period,
    pub total: i64,
    pub finance: i64,
    pub insurance: i64,
}

/// Optional filters for the customer list. Absent filters match everything;
/// present filters AND together.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub salesperson: Option<String>,
    pub period: Option<Period>,
    pub product: Option<ProductType>,
}

/// Everything the renderer needs for a full redraw, computed from a single
/// snapshot so the sections can never disagree with each other.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub overview: OverviewStats,
    pub salespersons: Vec<SalespersonStats>,
    pub periods: Vec<PeriodStats>,
    /// Filtered customer list, newest first.
    pub customers: Vec<CustomerRecord>,
}
