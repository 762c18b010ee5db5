//! Domain model for damage assessment reports
//!
//! Everything that crosses the vision-model or storage boundary is a closed
//! type here; unknown enum values are rejected at the parse boundary, with the
//! single exception of [`DamageType`], which coerces unknown values to
//! [`DamageType::Other`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display currency for report amounts. Single-valued today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "INR")]
    Inr,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
        }
    }
}

/// A user of the assessment tool. Owned by the auth collaborator; the core
/// reads `credits`/`id` and mutates only through the credit debit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Non-negative; decremented by exactly one per successful scan
    pub credits: u32,
    /// One-way false -> true transition
    pub has_completed_onboarding: bool,
}

/// Kind of detected defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageType {
    Dent,
    Scratch,
    Crack,
    #[serde(rename = "Broken Glass")]
    BrokenGlass,
    #[serde(rename = "Paint Damage")]
    PaintDamage,
    #[serde(rename = "Missing Part")]
    MissingPart,
    /// Fallback for values outside the taxonomy the model was instructed with
    #[serde(other)]
    Other,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DamageType::Dent => "Dent",
            DamageType::Scratch => "Scratch",
            DamageType::Crack => "Crack",
            DamageType::BrokenGlass => "Broken Glass",
            DamageType::PaintDamage => "Paint Damage",
            DamageType::MissingPart => "Missing Part",
            DamageType::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Damage severity, ordered Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Whether the damage is purely visual or affects operation/structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageCategory {
    Cosmetic,
    Functional,
}

/// Fraud assessment derived from visible anomalies in the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FraudRisk {
    Low,
    Medium,
    High,
}

/// Sourcing option for a replacement part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartSource {
    Genuine,
    Aftermarket,
    Used,
}

impl fmt::Display for PartSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PartSource::Genuine => "Genuine",
            PartSource::Aftermarket => "Aftermarket",
            PartSource::Used => "Used",
        };
        f.write_str(label)
    }
}

/// One priced sourcing option for a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartOption {
    #[serde(rename = "type")]
    pub source: PartSource,
    pub price: f64,
    /// e.g. "Low stock", "Common"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

/// Cost breakdown for a single damage item. `best_option_total` is expected
/// to equal `labor` plus one selected part price by convention; the core
/// trusts the upstream value and does not cross-validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairCosts {
    pub labor: f64,
    pub parts: Vec<PartOption>,
    pub best_option_total: f64,
}

/// Bounding box on the fixed 0-1000 normalized coordinate scale (not pixels).
/// Wire form is the 4-tuple `[ymin, xmin, ymax, xmax]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = String;

    fn try_from(raw: [f64; 4]) -> Result<Self, Self::Error> {
        let [ymin, xmin, ymax, xmax] = raw;
        if raw.iter().any(|c| !(0.0..=1000.0).contains(c)) {
            return Err(format!("box_2d coordinates outside 0-1000 scale: {raw:?}"));
        }
        if ymin >= ymax || xmin >= xmax {
            return Err(format!("degenerate box_2d: {raw:?}"));
        }
        Ok(BoundingBox { ymin, xmin, ymax, xmax })
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.ymin, b.xmin, b.ymax, b.xmax]
    }
}

/// One detected defect within a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageItem {
    /// Unique within a report, assigned by the model
    pub id: String,
    #[serde(rename = "type")]
    pub damage_type: DamageType,
    pub category: DamageCategory,
    pub severity: Severity,
    pub description: String,
    /// Specific name of the part needing repair/replacement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_part: Option<String>,
    /// Amount in the report's currency; summary figure alongside the breakdown
    pub estimated_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_costs: Option<RepairCosts>,
    #[serde(rename = "box_2d")]
    pub box_2d: BoundingBox,
}

/// A full assessment as produced by the requester: the model's structured
/// payload plus the two fields stamped at parse time (`id`, `timestamp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    /// `RPT-` + 9 random base36 chars, uppercased; assigned at parse time
    pub id: String,
    /// Expected to be one of Scooter/Bike/3-Wheeler/Car/SUV, but free text
    pub vehicle_type: String,
    pub fraud_risk: FraudRisk,
    /// Insertion order = detection order
    pub damages: Vec<DamageItem>,
    /// Trusted upstream value; should equal the sum of damage costs
    pub total_estimated_cost: f64,
    pub summary: String,
    /// In the 0.0..=1.0 range
    pub confidence_score: f64,
    /// RFC 3339, assigned at parse time (not upload time)
    pub timestamp: String,
}

/// An assessment persisted for a user. Created exactly once by the scan
/// workflow, saved exactly once, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
    #[serde(flatten)]
    pub assessment: AssessmentResult,
    /// The preprocessed image encoding, not the original upload
    pub image_url: String,
    pub user_id: String,
}
