//! Report document projection for PDF export
//!
//! A pure projection of an [`AssessmentResult`] into the content a PDF
//! renderer lays out: header metadata, executive summary, a tabular cost
//! breakdown, a parts checklist, manual-inspection rows, and the formatted
//! grand total. Byte rendering belongs to the rendering collaborator; nothing
//! here feeds back into core state.

use crate::currency::format_currency;
use crate::model::{AssessmentResult, Currency, PartSource, Severity};

/// Blank checklist rows reserved for manual inspection notes
const MANUAL_ENTRY_ROWS: usize = 5;

/// One row of the detailed damage table
#[derive(Debug, Clone, PartialEq)]
pub struct DamageRow {
    /// The named part when the model identified one, otherwise the damage type
    pub item: String,
    pub severity: Severity,
    pub description: String,
    /// Formatted labor and part-option lines, e.g. `Labor: ₹1,200`
    pub detail_lines: Vec<String>,
    /// Formatted summary cost for the row
    pub cost: String,
}

/// One entry of the parts & replacement checklist
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistEntry {
    pub part: String,
    pub reason: String,
}

/// Renderer-ready content of an assessment report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub subtitle: String,
    pub report_date: String,
    pub report_id: String,
    pub vehicle: String,
    pub summary: String,
    pub damage_rows: Vec<DamageRow>,
    /// Empty when the assessment found labor-only work
    pub parts_checklist: Vec<ChecklistEntry>,
    pub manual_entry_rows: usize,
    pub total_label: String,
    pub total: String,
    pub file_name: String,
    /// Pre-rasterized damage-overlay snapshot, when the caller captured one
    pub snapshot: Option<Vec<u8>>,
}

/// Project an assessment into its export document
pub fn build_document(
    result: &AssessmentResult,
    currency: Currency,
    snapshot: Option<Vec<u8>>,
) -> ReportDocument {
    let damage_rows = result
        .damages
        .iter()
        .map(|damage| {
            let mut detail_lines = Vec::new();
            if let Some(costs) = &damage.repair_costs {
                detail_lines.push(format!("Labor: {}", format_currency(costs.labor, currency)));
                for option in &costs.parts {
                    let label = match option.source {
                        PartSource::Used => "Used/Kabli".to_string(),
                        other => other.to_string(),
                    };
                    detail_lines.push(format!(
                        "{label}: {}",
                        format_currency(option.price, currency)
                    ));
                }
            }
            DamageRow {
                item: damage
                    .required_part
                    .clone()
                    .unwrap_or_else(|| damage.damage_type.to_string()),
                severity: damage.severity,
                description: damage.description.clone(),
                detail_lines,
                cost: format_currency(damage.estimated_cost, currency),
            }
        })
        .collect();

    let parts_checklist = result
        .damages
        .iter()
        .filter(|d| {
            d.repair_costs
                .as_ref()
                .is_some_and(|costs| !costs.parts.is_empty())
        })
        .map(|d| ChecklistEntry {
            part: d
                .required_part
                .clone()
                .unwrap_or_else(|| format!("{} (Generic)", d.damage_type)),
            reason: d.description.clone(),
        })
        .collect();

    ReportDocument {
        title: "CarsCube".to_string(),
        subtitle: "Damage Analysis Report".to_string(),
        report_date: result
            .timestamp
            .split('T')
            .next()
            .unwrap_or(&result.timestamp)
            .to_string(),
        report_id: result.id.clone(),
        vehicle: result.vehicle_type.clone(),
        summary: result.summary.clone(),
        damage_rows,
        parts_checklist,
        manual_entry_rows: MANUAL_ENTRY_ROWS,
        total_label: "Total Estimated Repair Cost".to_string(),
        total: format_currency(result.total_estimated_cost, currency),
        file_name: format!("CarsCube_Report_{}.pdf", result.id),
        snapshot,
    }
}
