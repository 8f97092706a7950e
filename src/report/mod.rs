//! The monthly report and the aggregation behind it.
//!
//! This module groups a month's transactions by category, ranks the
//! categories by total, and renders the ranked list alongside a pie chart.

mod aggregation;
mod chart;
mod palette;
mod report_page;

pub use aggregation::{
    CategoryTotal, MonthKey, WalletTotals, category_totals, filter_month, filter_month_and_type,
    grand_total, wallet_totals,
};
pub use report_page::get_report_page;
