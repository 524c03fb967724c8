// src/domain/diff.rs

use crate::domain::buyer::BuyerDraft;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Status value recorded in the history entry written just before a buyer is removed.
pub const DELETED_STATUS: &str = "DELETED";

/// The before/after pair for one changed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// Field name (camelCase, as exposed over the API) -> change.
pub type Diff = BTreeMap<String, FieldChange>;

fn value_of<T: Serialize>(v: &T) -> Value {
    serde_json::to_value(v).unwrap_or(Value::Null)
}

/// Computes the field-level change set between two buyer snapshots.
///
/// With no old snapshot (creation) every non-null field of `new` is emitted
/// with `old: null`. Otherwise a field is emitted only when its typed values
/// differ; tags compare element by element, so equal sequences never show up.
pub fn diff_buyers(old: Option<&BuyerDraft>, new: &BuyerDraft) -> Diff {
    let mut diff = Diff::new();

    // Each tracked field is listed once; the typed `!=` keeps numbers and
    // strings from being confused the way a string comparison would.
    macro_rules! compare_fields {
        ($($field:ident => $name:expr),+ $(,)?) => {
            $(
                match old {
                    None => {
                        let new_value = value_of(&new.$field);
                        if !new_value.is_null() {
                            diff.insert(
                                $name.to_string(),
                                FieldChange { old: Value::Null, new: new_value },
                            );
                        }
                    }
                    Some(old) if old.$field != new.$field => {
                        diff.insert(
                            $name.to_string(),
                            FieldChange {
                                old: value_of(&old.$field),
                                new: value_of(&new.$field),
                            },
                        );
                    }
                    Some(_) => {}
                }
            )+
        };
    }

    compare_fields!(
        full_name => "fullName",
        email => "email",
        phone => "phone",
        city => "city",
        property_type => "propertyType",
        bhk => "bhk",
        purpose => "purpose",
        budget_min => "budgetMin",
        budget_max => "budgetMax",
        timeline => "timeline",
        source => "source",
        status => "status",
        notes => "notes",
        tags => "tags",
    );

    diff
}

/// The change recorded when a buyer is deleted: its status moves to `DELETED`.
pub fn deletion_diff(old: &BuyerDraft) -> Diff {
    let mut diff = Diff::new();
    diff.insert(
        "status".to_string(),
        FieldChange {
            old: value_of(&old.status),
            new: Value::String(DELETED_STATUS.to_string()),
        },
    );
    diff
}
