// src/domain/normalize.rs

use crate::domain::buyer::{dedupe_tags, BuyerDraft};
use crate::domain::enums::{Bhk, City, PropertyType, Purpose, Source, Status, Timeline};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 80;
pub const NOTES_MAX_CHARS: usize = 1000;
pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;

pub const MISSING_REQUIRED: &str = "Missing required fields: fullName and phone are required";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// One parsed CSV row: column name -> trimmed cell text. Blank cells are empty strings.
pub type RawRow = BTreeMap<String, String>;

/// A single validation failure. `field` is `None` for row-level failures.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: Option<&'static str>,
    pub message: String,
}

impl FieldError {
    fn at(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Collects failures so every field of a row is checked before reporting.
#[derive(Default)]
struct Errors(Vec<FieldError>);

impl Errors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::at(field, message));
    }

    /// Records the error and hands back a placeholder so checking can continue.
    fn take<T: Default, E: fmt::Display>(&mut self, field: &'static str, r: Result<T, E>) -> T {
        match r {
            Ok(v) => v,
            Err(e) => {
                self.push(field, e.to_string());
                T::default()
            }
        }
    }

    fn finish(self, draft: BuyerDraft) -> Result<BuyerDraft, Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(draft)
        } else {
            Err(self.0)
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn check_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    let len = name.chars().count();
    if len < NAME_MIN_CHARS {
        return Err("Name must be at least 2 characters".to_string());
    }
    if len > NAME_MAX_CHARS {
        return Err("Name must be less than 80 characters".to_string());
    }
    Ok(name.to_string())
}

fn check_phone_digits(phone: &str) -> Result<String, String> {
    let ok = phone.chars().all(|c| c.is_ascii_digit())
        && (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&phone.len());
    if ok {
        Ok(phone.to_string())
    } else {
        Err("Phone must be 10-15 digits".to_string())
    }
}

fn check_email(email: Option<&str>) -> Result<Option<String>, String> {
    match non_empty(email) {
        None => Ok(None),
        Some(e) if EMAIL_RE.is_match(e) => Ok(Some(e.to_string())),
        Some(_) => Err("Invalid email address".to_string()),
    }
}

fn check_notes(notes: Option<&str>) -> Result<Option<String>, String> {
    match non_empty(notes) {
        None => Ok(None),
        Some(n) if n.chars().count() > NOTES_MAX_CHARS => {
            Err("Notes must be less than 1000 characters".to_string())
        }
        Some(n) => Ok(Some(n.to_string())),
    }
}

/// Blank -> default, otherwise an exact (case-sensitive) variant name.
fn enum_or_default<T>(raw: Option<&str>) -> Result<T, String>
where
    T: FromStr + Default,
    T::Err: fmt::Display,
{
    match non_empty(raw) {
        None => Ok(T::default()),
        Some(v) => v.parse().map_err(|e: T::Err| e.to_string()),
    }
}

fn enum_optional<T>(raw: Option<&str>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match non_empty(raw) {
        None => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|e: T::Err| e.to_string()),
    }
}

fn enum_required<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match non_empty(Some(raw)) {
        None => Err("Required".to_string()),
        Some(v) => v.parse().map_err(|e: T::Err| e.to_string()),
    }
}

/// Import budgets: strip everything but digits, blank -> none.
fn coerce_budget(raw: Option<&str>) -> Result<Option<i64>, String> {
    let digits = raw.map(digits_only).unwrap_or_default();
    if digits.is_empty() {
        return Ok(None);
    }
    digits
        .parse::<i64>()
        .map(Some)
        .map_err(|_| "Budget must be a valid number".to_string())
}

fn check_budget_range(errors: &mut Errors, min: Option<i64>, max: Option<i64>) {
    if let (Some(min), Some(max)) = (min, max) {
        if max < min {
            errors.push(
                "budgetMax",
                "Maximum budget must be greater than or equal to minimum budget",
            );
        }
    }
}

fn split_tags(raw: Option<&str>) -> Vec<String> {
    match non_empty(raw) {
        None => Vec::new(),
        Some(s) => dedupe_tags(s.split(',').map(str::to_string)),
    }
}

/// Normalizes one row of a bulk import file.
///
/// A missing fullName or phone fails the row immediately. Otherwise every
/// field is checked and all failures are returned together. The BHK
/// requirement for apartments and villas is not applied on this path.
pub fn normalize_import_row(raw: &RawRow) -> Result<BuyerDraft, Vec<FieldError>> {
    let get = |key: &str| raw.get(key).map(String::as_str);

    let (Some(name_raw), Some(phone_raw)) = (non_empty(get("fullName")), non_empty(get("phone")))
    else {
        return Err(vec![FieldError {
            field: None,
            message: MISSING_REQUIRED.to_string(),
        }]);
    };

    let mut errors = Errors::default();

    let full_name = errors.take("fullName", check_name(name_raw));
    let phone = errors.take("phone", check_phone_digits(&digits_only(phone_raw)));
    let email = errors.take("email", check_email(get("email")));
    let city = errors.take("city", enum_or_default::<City>(get("city")));
    let property_type = errors.take(
        "propertyType",
        enum_or_default::<PropertyType>(get("propertyType")),
    );
    let bhk = errors.take("bhk", enum_optional::<Bhk>(get("bhk")));
    let purpose = errors.take("purpose", enum_or_default::<Purpose>(get("purpose")));
    let budget_min = errors.take("budgetMin", coerce_budget(get("budgetMin")));
    let budget_max = errors.take("budgetMax", coerce_budget(get("budgetMax")));
    let timeline = errors.take("timeline", enum_or_default::<Timeline>(get("timeline")));
    let source = errors.take("source", enum_or_default::<Source>(get("source")));
    let status = errors.take("status", enum_or_default::<Status>(get("status")));
    let notes = errors.take("notes", check_notes(get("notes")));
    let tags = split_tags(get("tags"));

    check_budget_range(&mut errors, budget_min, budget_max);

    errors.finish(BuyerDraft {
        full_name,
        email,
        phone,
        city,
        property_type,
        bhk,
        purpose,
        budget_min,
        budget_max,
        timeline,
        source,
        status,
        notes,
        tags,
    })
}

/// JSON body accepted by the interactive create and update endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuyerForm {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub city: String,
    pub property_type: String,
    pub bhk: Option<String>,
    pub purpose: String,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub timeline: String,
    pub source: String,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn check_form_budget(b: Option<i64>) -> Result<Option<i64>, String> {
    match b {
        Some(v) if v < 0 => Err("Budget must be positive".to_string()),
        other => Ok(other),
    }
}

impl BuyerForm {
    /// Validates the form schema. Unlike the import schema this one has no
    /// defaults for the enumerations (except status), requires the phone to
    /// already be bare digits and enforces BHK for apartments and villas.
    pub fn validate(&self) -> Result<BuyerDraft, Vec<FieldError>> {
        let mut errors = Errors::default();

        let full_name = errors.take("fullName", check_name(&self.full_name));
        let phone = errors.take("phone", check_phone_digits(self.phone.trim()));
        let email = errors.take("email", check_email(self.email.as_deref()));
        let city = errors.take("city", enum_required::<City>(&self.city).map(Some));
        let property_type = errors.take(
            "propertyType",
            enum_required::<PropertyType>(&self.property_type).map(Some),
        );
        let bhk = errors.take("bhk", enum_optional::<Bhk>(self.bhk.as_deref()));
        let purpose = errors.take("purpose", enum_required::<Purpose>(&self.purpose).map(Some));
        let budget_min = errors.take("budgetMin", check_form_budget(self.budget_min));
        let budget_max = errors.take("budgetMax", check_form_budget(self.budget_max));
        let timeline = errors.take(
            "timeline",
            enum_required::<Timeline>(&self.timeline).map(Some),
        );
        let source = errors.take("source", enum_required::<Source>(&self.source).map(Some));
        let status = errors.take("status", enum_or_default::<Status>(self.status.as_deref()));
        let notes = errors.take("notes", check_notes(self.notes.as_deref()));
        let tags = dedupe_tags(self.tags.clone().unwrap_or_default());

        if let Some(pt) = property_type {
            if pt.requires_bhk() && bhk.is_none() {
                errors.push("bhk", "BHK is required for Apartment and Villa property types");
            }
        }
        check_budget_range(&mut errors, budget_min, budget_max);

        // The unwrap_or_default placeholders only appear alongside an error.
        errors.finish(BuyerDraft {
            full_name,
            email,
            phone,
            city: city.unwrap_or_default(),
            property_type: property_type.unwrap_or_default(),
            bhk,
            purpose: purpose.unwrap_or_default(),
            budget_min,
            budget_max,
            timeline: timeline.unwrap_or_default(),
            source: source.unwrap_or_default(),
            status,
            notes,
            tags,
        })
    }
}
