//! Display refresh boundary.
//!
//! The core calls `render` with a fully-assembled [`DashboardView`] after
//! every snapshot change and assumes nothing about the rendering
//! technology. `TextRenderer` is the plain-terminal implementation used by
//! the binary.

use std::io::Write;

use crate::types::DashboardView;
use crate::util::format_amount;

pub trait Render: Send + Sync {
    fn render(&self, view: &DashboardView);
}

/// Width of the per-salesperson progress bar, in characters.
const BAR_WIDTH: usize = 20;

pub struct TextRenderer;

impl TextRenderer {
    fn write_view(view: &DashboardView, out: &mut impl Write) -> std::io::Result<()> {
        let o = &view.overview;
        writeln!(out, "== 業績總覽 ==")?;
        writeln!(
            out,
            "目標 {}萬  已達成 {}萬  剩餘 {}萬  達成率 {}%",
            format_amount(o.total_target),
            format_amount(o.total_achieved),
            format_amount(o.total_remaining),
            o.progress_percentage
        )?;

        writeln!(out, "\n== 業務目標 ==")?;
        for s in &view.salespersons {
            // Progress is unclamped in the stats; only the bar width clamps
            let filled =
                ((s.progress.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
            writeln!(
                out,
                "{:<6} [{}{}] {}%  目標 {}萬 已達成 {}萬 剩餘 {}萬",
                s.salesperson,
                "#".repeat(filled),
                "-".repeat(BAR_WIDTH - filled),
                s.progress,
                format_amount(s.target),
                format_amount(s.achieved),
                format_amount(s.remaining),
            )?;
        }

        writeln!(out, "\n== 月份統計 ==")?;
        for p in &view.periods {
            writeln!(
                out,
                "{}  合計 {}萬  理財 {}萬  保險 {}萬",
                p.period.label(),
                format_amount(p.total),
                format_amount(p.finance),
                format_amount(p.insurance),
            )?;
        }

        writeln!(out, "\n== 客戶清單 ==")?;
        if view.customers.is_empty() {
            writeln!(out, "目前沒有符合條件的客戶資料")?;
        }
        for c in &view.customers {
            writeln!(
                out,
                "{}  {}  {}  {}  {}萬",
                c.masked_name,
                c.salesperson,
                c.order_month.label(),
                c.product_type.as_str(),
                format_amount(c.amount),
            )?;
        }
        Ok(())
    }
}

impl Render for TextRenderer {
    fn render(&self, view: &DashboardView) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = Self::write_view(view, &mut out) {
            log::warn!("render: failed to write dashboard: {}", e);
        }
    }
}
