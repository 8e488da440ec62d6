//! Absence deduction functionality.
//!
//! Absence deductions are priced once, when the record is created,
//! from the package-specific flat rates in configuration. Calculation
//! time only decides whether the frozen amount still applies: a waiver
//! removes the record from consideration, and a granted permission
//! forces the contribution to zero without touching the stored value.

use rust_decimal::Decimal;

use crate::config::SalaryCalculationConfig;
use crate::models::{AbsenceRecord, DeductionLine};

/// The outcome of one teacher's absence records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceResult {
    /// One line per non-waived record, ordered by date then record id.
    /// Permitted absences appear with a zero amount so the breakdown
    /// shows the override.
    pub lines: Vec<DeductionLine>,
    /// Sum of all lines.
    pub total: Decimal,
}

/// Sums absence deductions with the permission override applied.
///
/// Waived records are skipped entirely. A record with `permitted`
/// set contributes zero regardless of its stored amount; permission is
/// policy, not arithmetic. Everything else contributes its frozen
/// `deduction_applied`.
pub fn apply_absence_deductions(records: &[AbsenceRecord]) -> AbsenceResult {
    let mut lines = Vec::new();

    for record in records {
        if record.waived {
            continue;
        }
        let (amount, note) = if record.permitted {
            (
                Decimal::ZERO,
                format!("permitted ({}): no deduction", record.reason_category),
            )
        } else {
            (
                record.deduction_applied,
                format!("unpermitted absence ({})", record.reason_category),
            )
        };
        lines.push(DeductionLine {
            record_id: record.id,
            student_id: record.student_id.clone(),
            date: record.date,
            amount,
            note,
        });
    }

    lines.sort_by(|a, b| (a.date, a.record_id).cmp(&(b.date, b.record_id)));
    let total = lines.iter().map(|line| line.amount).sum();

    AbsenceResult { lines, total }
}

/// The flat deduction to freeze into a newly created absence record.
///
/// Looks the package label up in `package_deductions`, first verbatim
/// and then trimmed case-insensitively. An unconfigured package incurs
/// no absence deduction.
pub fn flat_absence_deduction(config: &SalaryCalculationConfig, package_label: &str) -> Decimal {
    if let Some(amount) = config.package_deductions.get(package_label) {
        return *amount;
    }
    let wanted = package_label.trim().to_lowercase();
    config
        .package_deductions
        .iter()
        .filter(|(label, _)| label.trim().to_lowercase() == wanted)
        .map(|(_, amount)| *amount)
        .next()
        .unwrap_or(Decimal::ZERO)
}
