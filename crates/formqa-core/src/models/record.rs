//! The structured form record extracted from a model reply

use crate::error::{FormqaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Placeholder written when a form has no expiration date
pub const SENTINEL_EXPIRATION_DATE: &str = "31-12-9999";

/// Placeholder for derived fields with no matching clause
pub const NOT_AVAILABLE: &str = "NA";

/// Free-text column the derived fields are quoted from
pub const FREE_TEXT_COLUMN: &str = "Form Text";

/// A key of the form record schema, in export column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Formcode,
    FormDesc,
    StartEffectiveDate,
    EndEffectiveDate,
    IsMandatory,
    LineOfBusiness,
    IatProduct,
    CoverageSummary,
    Exclusions,
    Conditions,
    LimitsOfLiability,
    Deductibles,
    Definitions,
    CancellationTerms,
}

impl RecordField {
    pub const ALL: [RecordField; 14] = [
        RecordField::Formcode,
        RecordField::FormDesc,
        RecordField::StartEffectiveDate,
        RecordField::EndEffectiveDate,
        RecordField::IsMandatory,
        RecordField::LineOfBusiness,
        RecordField::IatProduct,
        RecordField::CoverageSummary,
        RecordField::Exclusions,
        RecordField::Conditions,
        RecordField::LimitsOfLiability,
        RecordField::Deductibles,
        RecordField::Definitions,
        RecordField::CancellationTerms,
    ];

    /// Output key as it appears in the JSON reply and the export header
    pub fn key(&self) -> &'static str {
        match self {
            RecordField::Formcode => "Formcode",
            RecordField::FormDesc => "FormDesc",
            RecordField::StartEffectiveDate => "StartEffectiveDate",
            RecordField::EndEffectiveDate => "EndEffectiveDate",
            RecordField::IsMandatory => "IsMandatory",
            RecordField::LineOfBusiness => "LineOfBusiness",
            RecordField::IatProduct => "IATProduct",
            RecordField::CoverageSummary => "CoverageSummary",
            RecordField::Exclusions => "Exclusions",
            RecordField::Conditions => "Conditions",
            RecordField::LimitsOfLiability => "LimitsOfLiability",
            RecordField::Deductibles => "Deductibles",
            RecordField::Definitions => "Definitions",
            RecordField::CancellationTerms => "CancellationTerms",
        }
    }

    /// Resolve a reply key, ignoring ASCII case
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL.iter().copied().find(|field| field.key().eq_ignore_ascii_case(key))
    }

    /// Spreadsheet column this field is copied from, for directly mapped fields
    pub fn source_column(&self) -> Option<&'static str> {
        match self {
            RecordField::Formcode => Some("Form Number"),
            RecordField::FormDesc => Some("Form Title"),
            RecordField::StartEffectiveDate => Some("Eff Date"),
            RecordField::EndEffectiveDate => Some("Exp Date"),
            RecordField::IsMandatory => Some("Premium Bearing?"),
            RecordField::LineOfBusiness => Some("Line of Business"),
            RecordField::IatProduct => Some("IAT Product"),
            _ => None,
        }
    }

    /// Fields filled from clauses of the free-text column
    pub fn is_derived(&self) -> bool {
        self.source_column().is_none()
    }

    /// What a derived field should contain, used in the extraction prompt
    pub fn description(&self) -> &'static str {
        match self {
            RecordField::CoverageSummary => "what the form covers (insuring agreement)",
            RecordField::Exclusions => "what the form excludes from coverage",
            RecordField::Conditions => "conditions the insured must meet",
            RecordField::LimitsOfLiability => "limits of insurance or liability",
            RecordField::Deductibles => "deductible or retention amounts",
            RecordField::Definitions => "terms the form defines",
            RecordField::CancellationTerms => "cancellation or non-renewal terms",
            _ => "",
        }
    }
}

/// Form record parsed from a structured model reply
///
/// Every schema key is an optional string. Keys the reply did not provide are
/// listed in `missing_keys`; keys outside the schema are kept out of the record
/// and listed in `unexpected_keys`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(rename = "Formcode")]
    pub formcode: Option<String>,
    #[serde(rename = "FormDesc")]
    pub form_desc: Option<String>,
    #[serde(rename = "StartEffectiveDate")]
    pub start_effective_date: Option<String>,
    #[serde(rename = "EndEffectiveDate")]
    pub end_effective_date: Option<String>,
    #[serde(rename = "IsMandatory")]
    pub is_mandatory: Option<String>,
    #[serde(rename = "LineOfBusiness")]
    pub line_of_business: Option<String>,
    #[serde(rename = "IATProduct")]
    pub iat_product: Option<String>,
    #[serde(rename = "CoverageSummary")]
    pub coverage_summary: Option<String>,
    #[serde(rename = "Exclusions")]
    pub exclusions: Option<String>,
    #[serde(rename = "Conditions")]
    pub conditions: Option<String>,
    #[serde(rename = "LimitsOfLiability")]
    pub limits_of_liability: Option<String>,
    #[serde(rename = "Deductibles")]
    pub deductibles: Option<String>,
    #[serde(rename = "Definitions")]
    pub definitions: Option<String>,
    #[serde(rename = "CancellationTerms")]
    pub cancellation_terms: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unexpected_keys: Vec<String>,
}

impl ExtractedRecord {
    /// Validate a parsed JSON value against the record schema
    ///
    /// Fails when the value is not an object or shares no key with the schema.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| FormqaError::ExtractionFailed {
            reason: format!("expected a JSON object, found {}", json_kind(value)),
        })?;

        let mut record = Self::default();
        let mut seen = HashSet::new();

        for (key, value) in object {
            match RecordField::from_key(key) {
                Some(field) => {
                    record.set(field, json_to_text(value));
                    seen.insert(field);
                }
                None => record.unexpected_keys.push(key.clone()),
            }
        }

        if seen.is_empty() {
            return Err(FormqaError::ExtractionFailed {
                reason: format!(
                    "object has none of the form record keys (found: {})",
                    object.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        record.missing_keys = RecordField::ALL
            .iter()
            .filter(|field| !seen.contains(field))
            .map(|field| field.key().to_string())
            .collect();

        record.apply_defaults();
        Ok(record)
    }

    /// Fill the sentinel expiration date and the `NA` placeholders
    pub fn apply_defaults(&mut self) {
        if is_blank(&self.end_effective_date) {
            self.end_effective_date = Some(SENTINEL_EXPIRATION_DATE.to_string());
        }

        for field in RecordField::ALL.iter().filter(|f| f.is_derived()) {
            if is_blank(self.slot(*field)) {
                self.set(*field, Some(NOT_AVAILABLE.to_string()));
            }
        }
    }

    pub fn get(&self, field: RecordField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: RecordField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Export header row
    pub fn header() -> Vec<&'static str> {
        RecordField::ALL.iter().map(|f| f.key()).collect()
    }

    /// Export value row, aligned with [`ExtractedRecord::header`]
    pub fn values(&self) -> Vec<String> {
        RecordField::ALL
            .iter()
            .map(|f| self.get(*f).unwrap_or_default().to_string())
            .collect()
    }

    /// Download name derived from the form code
    pub fn export_file_name(&self) -> String {
        let stem: String = self
            .formcode
            .as_deref()
            .unwrap_or_default()
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let stem = stem.trim_matches('_');

        if stem.is_empty() {
            "extracted_record.xlsx".to_string()
        } else {
            format!("{}.xlsx", stem)
        }
    }

    /// Whether the reply matched the schema exactly
    pub fn is_complete(&self) -> bool {
        self.missing_keys.is_empty() && self.unexpected_keys.is_empty()
    }

    fn slot(&self, field: RecordField) -> &Option<String> {
        match field {
            RecordField::Formcode => &self.formcode,
            RecordField::FormDesc => &self.form_desc,
            RecordField::StartEffectiveDate => &self.start_effective_date,
            RecordField::EndEffectiveDate => &self.end_effective_date,
            RecordField::IsMandatory => &self.is_mandatory,
            RecordField::LineOfBusiness => &self.line_of_business,
            RecordField::IatProduct => &self.iat_product,
            RecordField::CoverageSummary => &self.coverage_summary,
            RecordField::Exclusions => &self.exclusions,
            RecordField::Conditions => &self.conditions,
            RecordField::LimitsOfLiability => &self.limits_of_liability,
            RecordField::Deductibles => &self.deductibles,
            RecordField::Definitions => &self.definitions,
            RecordField::CancellationTerms => &self.cancellation_terms,
        }
    }

    fn slot_mut(&mut self, field: RecordField) -> &mut Option<String> {
        match field {
            RecordField::Formcode => &mut self.formcode,
            RecordField::FormDesc => &mut self.form_desc,
            RecordField::StartEffectiveDate => &mut self.start_effective_date,
            RecordField::EndEffectiveDate => &mut self.end_effective_date,
            RecordField::IsMandatory => &mut self.is_mandatory,
            RecordField::LineOfBusiness => &mut self.line_of_business,
            RecordField::IatProduct => &mut self.iat_product,
            RecordField::CoverageSummary => &mut self.coverage_summary,
            RecordField::Exclusions => &mut self.exclusions,
            RecordField::Conditions => &mut self.conditions,
            RecordField::LimitsOfLiability => &mut self.limits_of_liability,
            RecordField::Deductibles => &mut self.deductibles,
            RecordField::Definitions => &mut self.definitions,
            RecordField::CancellationTerms => &mut self.cancellation_terms,
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
}

/// Render a JSON value as a cell string; blanks and nulls become `None`
fn json_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(json_to_text).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
