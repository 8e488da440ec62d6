//! Bonus summation functionality.

use rust_decimal::Decimal;

use crate::models::{BonusLine, BonusRecord};

/// The credited bonuses for one teacher's window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonusResult {
    /// One line per bonus record, ordered by date then record id.
    pub lines: Vec<BonusLine>,
    /// Sum of all lines.
    pub total: Decimal,
}

/// Sums bonus records into credit lines.
///
/// Bonuses are manual grants with no derivation rule of their own; the
/// calculator only orders and totals them.
pub fn sum_bonuses(records: &[BonusRecord]) -> BonusResult {
    let mut lines: Vec<BonusLine> = records
        .iter()
        .map(|record| BonusLine {
            record_id: record.id,
            date: record.date,
            amount: record.amount,
            reason: record.reason.clone(),
        })
        .collect();

    lines.sort_by(|a, b| (a.date, a.record_id).cmp(&(b.date, b.record_id)));
    let total = lines.iter().map(|line| line.amount).sum();

    BonusResult { lines, total }
}
