use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::amount::{AmountInput, MonetaryAmount};
use super::eligibility::EligibilityCriteria;
use super::fees::{FeeQuote, FeeSchedule};

/// Identifier of a grant in the hosted document store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GrantId(pub String);

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Funding opportunity after boundary validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,
    pub title: String,
    pub organization: String,
    pub amount: Option<AmountInput>,
    pub deadline: Option<NaiveDate>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub eligibility: EligibilityCriteria,
    pub requirements: Vec<String>,
}

/// Rejections raised while coercing a loosely typed grant document.
#[derive(Debug, thiserror::Error)]
pub enum GrantDocumentError {
    #[error("grant document must be a JSON object")]
    NotAnObject,
    #[error("grant document is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("grant field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl Grant {
    /// Validate a stored document and coerce its fields into typed values.
    ///
    /// Documents carry their id as `id` or `$id`. `amount` may be a number or free text.
    /// `eligibility` and `requirements` may be a list of strings or one newline-separated
    /// string. `deadline` accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub fn from_document(document: &Value) -> Result<Self, GrantDocumentError> {
        let fields = document.as_object().ok_or(GrantDocumentError::NotAnObject)?;

        let id = fields
            .get("id")
            .or_else(|| fields.get("$id"))
            .and_then(non_blank_text)
            .ok_or(GrantDocumentError::MissingField("id"))?;
        let title = fields
            .get("title")
            .and_then(non_blank_text)
            .ok_or(GrantDocumentError::MissingField("title"))?;
        let organization = fields
            .get("organization")
            .and_then(non_blank_text)
            .unwrap_or_default();

        let amount = match fields.get("amount") {
            None | Some(Value::Null) => None,
            Some(Value::Number(number)) => number.as_f64().map(AmountInput::Number),
            Some(Value::String(text)) => Some(AmountInput::Text(text.clone())),
            Some(other) => {
                return Err(GrantDocumentError::InvalidField {
                    field: "amount",
                    reason: format!("expected number or text, found {other}"),
                })
            }
        };

        let deadline = match fields.get("deadline") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) if raw.trim().is_empty() => None,
            Some(Value::String(raw)) => Some(parse_deadline(raw)?),
            Some(other) => {
                return Err(GrantDocumentError::InvalidField {
                    field: "deadline",
                    reason: format!("expected date text, found {other}"),
                })
            }
        };

        let eligibility =
            EligibilityCriteria::new(statement_list(fields.get("eligibility"), "eligibility")?);
        let requirements = statement_list(fields.get("requirements"), "requirements")?;

        Ok(Self {
            id: GrantId(id),
            title,
            organization,
            amount,
            deadline,
            category: fields.get("category").and_then(non_blank_text),
            description: fields.get("description").and_then(non_blank_text),
            eligibility,
            requirements,
        })
    }

    pub fn advertised_amount(&self) -> Option<MonetaryAmount> {
        self.amount.as_ref().and_then(AmountInput::resolve)
    }

    pub fn amount_display(&self) -> String {
        self.amount
            .as_ref()
            .map(AmountInput::display)
            .unwrap_or_else(|| "Amount varies".to_string())
    }

    /// Grants without a deadline stay open.
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.deadline.map_or(true, |deadline| date <= deadline)
    }

    pub fn fee_quote(&self, schedule: &FeeSchedule) -> FeeQuote {
        schedule.quote(self.advertised_amount())
    }

    pub fn summary(&self, schedule: &FeeSchedule) -> GrantSummaryView {
        let quote = self.fee_quote(schedule);
        GrantSummaryView {
            id: self.id.clone(),
            title: self.title.clone(),
            organization: self.organization.clone(),
            amount: self.amount_display(),
            deadline: self.deadline,
            category: self.category.clone(),
            criteria_count: self.eligibility.len(),
            fee: quote.fee,
            fee_display: quote.display,
        }
    }
}

fn non_blank_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn statement_list(
    value: Option<&Value>,
    field: &'static str,
) -> Result<Vec<String>, GrantDocumentError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(text)) => Ok(EligibilityCriteria::from_lines(text).into_statements()),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| {
                item.as_str()
                    .map(|text| text.trim().to_string())
                    .ok_or_else(|| GrantDocumentError::InvalidField {
                        field,
                        reason: format!("expected text entries, found {item}"),
                    })
            })
            .filter(|entry| !matches!(entry, Ok(text) if text.is_empty()))
            .collect(),
        Some(other) => Err(GrantDocumentError::InvalidField {
            field,
            reason: format!("expected a list or text, found {other}"),
        }),
    }
}

fn parse_deadline(raw: &str) -> Result<NaiveDate, GrantDocumentError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|moment| moment.date_naive()))
        .map_err(|err| GrantDocumentError::InvalidField {
            field: "deadline",
            reason: format!("failed to parse '{raw}' as a date ({err})"),
        })
}

/// Listing entry returned to the browse page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrantSummaryView {
    pub id: GrantId,
    pub title: String,
    pub organization: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub criteria_count: usize,
    pub fee: u32,
    pub fee_display: String,
}

/// Browse filters; every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GrantFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub open_on: Option<NaiveDate>,
}

impl GrantFilter {
    pub fn matches(&self, grant: &Grant) -> bool {
        let category_matches = self.category.as_deref().map_or(true, |wanted| {
            grant
                .category
                .as_deref()
                .is_some_and(|category| category.eq_ignore_ascii_case(wanted.trim()))
        });

        let search_matches = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map_or(true, |needle| {
                let needle = needle.to_lowercase();
                grant.title.to_lowercase().contains(&needle)
                    || grant.organization.to_lowercase().contains(&needle)
            });

        let open = self.open_on.map_or(true, |date| grant.is_open_on(date));

        category_matches && search_matches && open
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read grant seed: {0}")]
    Io(#[from] std::io::Error),
    #[error("grant seed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grant seed must be a JSON array of grant documents")]
    NotAnArray,
    #[error("grant document #{index} rejected: {source}")]
    Document {
        index: usize,
        #[source]
        source: GrantDocumentError,
    },
    #[error("grant id `{0}` appears more than once")]
    DuplicateGrant(String),
}

/// Read-only set of grants keyed by id.
#[derive(Debug, Clone, Default)]
pub struct GrantCatalog {
    grants: BTreeMap<GrantId, Grant>,
}

impl GrantCatalog {
    pub fn from_grants(grants: impl IntoIterator<Item = Grant>) -> Result<Self, CatalogError> {
        let mut catalog = BTreeMap::new();
        for grant in grants {
            if catalog.contains_key(&grant.id) {
                return Err(CatalogError::DuplicateGrant(grant.id.0));
            }
            catalog.insert(grant.id.clone(), grant);
        }
        Ok(Self { grants: catalog })
    }

    /// Load a seed file holding a JSON array of grant documents.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let document: Value = serde_json::from_reader(reader)?;
        let Value::Array(entries) = document else {
            return Err(CatalogError::NotAnArray);
        };

        let grants = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Grant::from_document(entry).map_err(|source| CatalogError::Document { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_grants(grants)
    }

    pub fn get(&self, id: &GrantId) -> Option<&Grant> {
        self.grants.get(id)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Matching grants, soonest deadline first; open-ended grants last.
    pub fn filter(&self, filter: &GrantFilter) -> Vec<&Grant> {
        let mut matches: Vec<&Grant> = self
            .grants
            .values()
            .filter(|grant| filter.matches(grant))
            .collect();
        matches.sort_by(|left, right| match (left.deadline, right.deadline) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| left.id.cmp(&right.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => left.id.cmp(&right.id),
        });
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed() -> Value {
        json!([
            {
                "$id": "arts-2025",
                "title": "Community Arts Fund",
                "organization": "Metro Arts Council",
                "amount": "$50,000 - $100,000",
                "deadline": "2025-11-30",
                "category": "Arts",
                "eligibility": ["Registered nonprofit", "Serves the metro area"],
                "requirements": "Budget narrative\nTwo letters of support"
            },
            {
                "id": "youth-2025",
                "title": "Youth Sports Equipment",
                "organization": "Active Kids Foundation",
                "amount": 4000,
                "deadline": "2025-10-15T23:59:59.000+00:00",
                "category": "Youth",
                "eligibility": "Serves youth under 18\nOperates in Minnesota"
            },
            {
                "id": "rolling",
                "title": "Rolling Capacity Grants",
                "amount": "Varies"
            }
        ])
    }

    fn catalog() -> GrantCatalog {
        GrantCatalog::from_reader(seed().to_string().as_bytes()).expect("seed loads")
    }

    #[test]
    fn documents_are_coerced_into_grants() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);

        let arts = catalog
            .get(&GrantId("arts-2025".to_string()))
            .expect("arts grant present");
        assert_eq!(arts.eligibility.len(), 2);
        assert_eq!(arts.requirements.len(), 2);
        assert_eq!(arts.advertised_amount().map(MonetaryAmount::value), Some(100_000.0));

        let youth = catalog
            .get(&GrantId("youth-2025".to_string()))
            .expect("youth grant present");
        assert_eq!(youth.deadline, NaiveDate::from_ymd_opt(2025, 10, 15));
        assert_eq!(youth.eligibility.get(1), Some("Operates in Minnesota"));
        assert_eq!(youth.amount_display(), "$4,000.00");
    }

    #[test]
    fn fee_quotes_follow_the_advertised_amount() {
        let catalog = catalog();
        let schedule = FeeSchedule::STANDARD;

        let arts = catalog.get(&GrantId("arts-2025".to_string())).expect("present");
        assert_eq!(arts.fee_quote(&schedule).fee, 500);

        let rolling = catalog.get(&GrantId("rolling".to_string())).expect("present");
        let quote = rolling.fee_quote(&schedule);
        assert!(quote.fallback);
        assert_eq!(quote.fee, 25);
    }

    #[test]
    fn missing_title_is_rejected() {
        let error = Grant::from_document(&json!({ "id": "x" })).expect_err("title required");
        assert!(matches!(error, GrantDocumentError::MissingField("title")));
    }

    #[test]
    fn malformed_fields_are_rejected() {
        let bad_deadline = Grant::from_document(&json!({
            "id": "x", "title": "X", "deadline": "next spring"
        }))
        .expect_err("deadline must parse");
        assert!(matches!(
            bad_deadline,
            GrantDocumentError::InvalidField { field: "deadline", .. }
        ));

        let bad_criteria = Grant::from_document(&json!({
            "id": "x", "title": "X", "eligibility": [true]
        }))
        .expect_err("criteria must be text");
        assert!(matches!(
            bad_criteria,
            GrantDocumentError::InvalidField { field: "eligibility", .. }
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doubled = json!([
            { "id": "a", "title": "First" },
            { "id": "a", "title": "Second" }
        ]);
        let error = GrantCatalog::from_reader(doubled.to_string().as_bytes())
            .expect_err("duplicate ids");
        assert!(matches!(error, CatalogError::DuplicateGrant(id) if id == "a"));
    }

    #[test]
    fn filters_combine_and_sort_by_deadline() {
        let catalog = catalog();

        let everything = catalog.filter(&GrantFilter::default());
        let ids: Vec<&str> = everything.iter().map(|grant| grant.id.0.as_str()).collect();
        assert_eq!(ids, vec!["youth-2025", "arts-2025", "rolling"]);

        let open_in_november = catalog.filter(&GrantFilter {
            open_on: NaiveDate::from_ymd_opt(2025, 11, 1),
            ..GrantFilter::default()
        });
        assert_eq!(open_in_november.len(), 2);

        let arts = catalog.filter(&GrantFilter {
            category: Some("arts".to_string()),
            search: Some("community".to_string()),
            open_on: None,
        });
        assert_eq!(arts.len(), 1);
        assert_eq!(arts[0].id.0, "arts-2025");
    }
}
