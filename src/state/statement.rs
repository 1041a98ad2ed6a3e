//! The statements grid: record type, column set, CSV layout and the drafts
//! behind the generate / group / listing modals.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::io::csv_export::CsvField;
use crate::state::column::ColumnDescriptor;
use crate::state::data_model::Record;
use crate::state::form::{FormDraft, ValidationError};
use crate::state::projection::MarkerFilter;

pub const GRID_KEY: &str = "statements-table";
pub const CSV_PREFIX: &str = "statements";

pub const SELECT_COLUMN: &str = "select";
pub const ACTIONS_COLUMN: &str = "actions";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementStatus {
    Draft,
    Final,
}

impl StatementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Final => "final",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationType {
    #[default]
    Checkout,
    Calendar,
}

impl CalculationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Calendar => "calendar",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub id: u64,
    pub owner_id: u64,
    pub owner_name: String,
    pub property_id: Option<u64>,
    pub property_name: String,
    #[serde(default)]
    pub group_name: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub status: StatementStatus,
    #[serde(default)]
    pub calculation_type: CalculationType,
    pub total_revenue: f64,
    pub net_payout: f64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Record for Statement {
    type Id = u64;

    fn record_id(&self) -> u64 {
        self.id
    }
}

impl Statement {
    pub fn period_label(&self) -> String {
        format!(
            "{} - {}",
            self.period_start.format("%Y-%m-%d"),
            self.period_end.format("%Y-%m-%d")
        )
    }
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

fn money_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Declared order: selector first, actions last.
pub fn statement_columns() -> Vec<ColumnDescriptor<Statement>> {
    vec![
        ColumnDescriptor::fixed(SELECT_COLUMN, "", 40.0),
        ColumnDescriptor::new("id", "ID", |s: &Statement| json!(s.id)).with_size(70.0, 50.0, 120.0),
        ColumnDescriptor::new("propertyName", "Property", |s: &Statement| {
            json!(s.property_name)
        })
        .with_size(220.0, 100.0, 480.0)
        .searchable(),
        ColumnDescriptor::new("ownerName", "Owner", |s: &Statement| json!(s.owner_name))
            .with_size(180.0, 100.0, 400.0)
            .searchable(),
        ColumnDescriptor::new("groupName", "Group", |s: &Statement| {
            s.group_name.as_ref().map(|g| json!(g)).unwrap_or(Value::Null)
        })
        .with_size(150.0, 80.0, 320.0)
        .searchable(),
        ColumnDescriptor::new("period", "Period", |s: &Statement| {
            json!(s.period_start.format("%Y-%m-%d").to_string())
        })
        .with_size(200.0, 140.0, 300.0)
        .with_render(Statement::period_label),
        ColumnDescriptor::new("status", "Status", |s: &Statement| json!(s.status.as_str()))
            .with_size(100.0, 80.0, 160.0),
        ColumnDescriptor::new("calculationType", "Calculation", |s: &Statement| {
            json!(s.calculation_type.as_str())
        })
        .with_size(120.0, 80.0, 200.0),
        ColumnDescriptor::new("totalRevenue", "Revenue", |s: &Statement| {
            money_value(s.total_revenue)
        })
        .with_size(120.0, 80.0, 220.0)
        .with_render(|s: &Statement| money(s.total_revenue)),
        ColumnDescriptor::new("netPayout", "Net Payout", |s: &Statement| {
            money_value(s.net_payout)
        })
        .with_size(120.0, 80.0, 220.0)
        .with_render(|s: &Statement| money(s.net_payout)),
        ColumnDescriptor::fixed(ACTIONS_COLUMN, "Actions", 140.0),
    ]
}

/// Export layout. Independent of the on-screen column order.
pub fn statement_csv_fields() -> Vec<CsvField<Statement>> {
    vec![
        CsvField::new("ID", |s: &Statement| s.id.to_string()),
        CsvField::new("Property", |s: &Statement| s.property_name.clone()),
        CsvField::new("Owner", |s: &Statement| s.owner_name.clone()),
        CsvField::new("Group", |s: &Statement| {
            s.group_name.clone().unwrap_or_default()
        }),
        CsvField::new("Period Start", |s: &Statement| {
            s.period_start.format("%Y-%m-%d").to_string()
        }),
        CsvField::new("Period End", |s: &Statement| {
            s.period_end.format("%Y-%m-%d").to_string()
        }),
        CsvField::new("Status", |s: &Statement| s.status.as_str().to_string()),
        CsvField::new("Calculation", |s: &Statement| {
            s.calculation_type.as_str().to_string()
        }),
        CsvField::new("Revenue", |s: &Statement| money(s.total_revenue)),
        CsvField::new("Net Payout", |s: &Statement| money(s.net_payout)),
    ]
}

/// Statements carrying the given warning code.
pub fn warning_marker(code: &str) -> MarkerFilter<Statement> {
    let code = code.to_string();
    MarkerFilter::new(
        format!("warning:{code}"),
        format!("Has warning {code}"),
        move |s: &Statement| s.warnings.iter().any(|w| w == &code),
    )
}

/// One backend call issued by the generate modal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub owner_id: Option<u64>,
    pub property_id: Option<u64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub calculation_type: CalculationType,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GenerateStatementDraft {
    pub generate_all: bool,
    pub owner_id: Option<u64>,
    pub property_ids: Vec<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub calculation_type: CalculationType,
}

impl FormDraft for GenerateStatementDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.generate_all && self.owner_id.is_none() && self.property_ids.is_empty() {
            return Err(ValidationError::MissingSelection("an owner"));
        }
        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return Err(ValidationError::MissingDateRange);
        };
        if start > end {
            return Err(ValidationError::InvalidDateRange);
        }
        Ok(())
    }
}

impl GenerateStatementDraft {
    /// One request per selected property, or a single owner-wide request.
    /// Empty when the draft does not validate.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        if self.validate().is_err() {
            return Vec::new();
        }
        let (Some(start_date), Some(end_date)) = (self.start_date, self.end_date) else {
            return Vec::new();
        };
        let owner_id = if self.generate_all { None } else { self.owner_id };

        if self.property_ids.is_empty() || self.generate_all {
            return vec![GenerateRequest {
                owner_id,
                property_id: None,
                start_date,
                end_date,
                calculation_type: self.calculation_type,
            }];
        }

        let mut seen = BTreeSet::new();
        self.property_ids
            .iter()
            .filter(|id| seen.insert(**id))
            .map(|id| GenerateRequest {
                owner_id,
                property_id: Some(*id),
                start_date,
                end_date,
                calculation_type: self.calculation_type,
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDraft {
    pub name: String,
    pub listing_ids: Vec<u64>,
    pub tags: Vec<String>,
}

impl FormDraft for GroupDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("Group name"));
        }
        Ok(())
    }
}

impl GroupDraft {
    /// Trimmed name, listing ids sorted without duplicates, tags trimmed,
    /// lowercased and deduplicated.
    pub fn normalized(&self) -> Self {
        let listing_ids: BTreeSet<u64> = self.listing_ids.iter().copied().collect();
        let tags: BTreeSet<String> = self
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            name: self.name.trim().to_string(),
            listing_ids: listing_ids.into_iter().collect(),
            tags: tags.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSettingsDraft {
    pub display_name: String,
    pub pm_fee_percent: f64,
    pub cleaning_fee: f64,
    pub pass_through_cleaning: bool,
}

impl FormDraft for ListingSettingsDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=100.0).contains(&self.pm_fee_percent) {
            return Err(ValidationError::OutOfRange {
                field: "PM fee",
                min: "0".to_string(),
                max: "100".to_string(),
            });
        }
        if !self.cleaning_fee.is_finite() || self.cleaning_fee < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "Cleaning fee",
                min: "0".to_string(),
                max: "any amount".to_string(),
            });
        }
        Ok(())
    }
}
