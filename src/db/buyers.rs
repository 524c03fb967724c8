// src/db/buyers.rs
use crate::domain::buyer::{Buyer, BuyerDraft, BuyerFilter};
use crate::domain::history::Actor;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;

const BUYER_COLUMNS: &str = r#"
    b.id, b.full_name, b.email, b.phone, b.city, b.property_type, b.bhk, b.purpose,
    b.budget_min, b.budget_max, b.timeline, b.source, b.status, b.notes, b.tags,
    b.owner_id, b.created_at, b.updated_at
"#;

/// A buyer row for the list endpoint, with its owner's display fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerListItem {
    #[serde(flatten)]
    pub buyer: Buyer,
    pub owner: Actor,
}

fn tags_to_sql(tags: &[String]) -> rusqlite::Result<String> {
    serde_json::to_string(tags).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn buyer_from_row(row: &Row<'_>) -> rusqlite::Result<Buyer> {
    let tags_json: String = row.get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(14, Type::Text, Box::new(e)))?;

    Ok(Buyer {
        id: row.get("id")?,
        attrs: BuyerDraft {
            full_name: row.get("full_name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            city: row.get("city")?,
            property_type: row.get("property_type")?,
            bhk: row.get("bhk")?,
            purpose: row.get("purpose")?,
            budget_min: row.get("budget_min")?,
            budget_max: row.get("budget_max")?,
            timeline: row.get("timeline")?,
            source: row.get("source")?,
            status: row.get("status")?,
            notes: row.get("notes")?,
            tags,
        },
        owner_id: row.get("owner_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn find_buyer(conn: &Connection, id: &str) -> rusqlite::Result<Option<Buyer>> {
    conn.query_row(
        &format!("SELECT {BUYER_COLUMNS} FROM buyers b WHERE b.id = ?1"),
        params![id],
        buyer_from_row,
    )
    .optional()
}

/// Looks a buyer up by its unique phone, optionally ignoring one id
/// (the buyer being updated).
pub fn find_buyer_by_phone(
    conn: &Connection,
    phone: &str,
    excluding: Option<&str>,
) -> rusqlite::Result<Option<Buyer>> {
    conn.query_row(
        &format!(
            "SELECT {BUYER_COLUMNS} FROM buyers b WHERE b.phone = ?1 AND (?2 IS NULL OR b.id <> ?2)"
        ),
        params![phone, excluding],
        buyer_from_row,
    )
    .optional()
}

pub fn insert_buyer(
    conn: &Connection,
    id: &str,
    draft: &BuyerDraft,
    owner_id: i64,
    now: DateTime<Utc>,
) -> rusqlite::Result<Buyer> {
    conn.execute(
        r#"
        INSERT INTO buyers (
            id, full_name, email, phone, city, property_type, bhk, purpose,
            budget_min, budget_max, timeline, source, status, notes, tags,
            owner_id, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        "#,
        params![
            id,
            &draft.full_name,
            &draft.email,
            &draft.phone,
            draft.city,
            draft.property_type,
            draft.bhk,
            draft.purpose,
            draft.budget_min,
            draft.budget_max,
            draft.timeline,
            draft.source,
            draft.status,
            &draft.notes,
            tags_to_sql(&draft.tags)?,
            owner_id,
            now,
            now,
        ],
    )?;

    Ok(Buyer {
        id: id.to_string(),
        attrs: draft.clone(),
        owner_id,
        created_at: now,
        updated_at: now,
    })
}

/// Overwrites the mutable attributes. Returns the number of rows touched.
pub fn update_buyer(
    conn: &Connection,
    id: &str,
    draft: &BuyerDraft,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        UPDATE buyers SET
            full_name = ?1, email = ?2, phone = ?3, city = ?4, property_type = ?5,
            bhk = ?6, purpose = ?7, budget_min = ?8, budget_max = ?9, timeline = ?10,
            source = ?11, status = ?12, notes = ?13, tags = ?14, updated_at = ?15
        WHERE id = ?16
        "#,
        params![
            &draft.full_name,
            &draft.email,
            &draft.phone,
            draft.city,
            draft.property_type,
            draft.bhk,
            draft.purpose,
            draft.budget_min,
            draft.budget_max,
            draft.timeline,
            draft.source,
            draft.status,
            &draft.notes,
            tags_to_sql(&draft.tags)?,
            now,
            id,
        ],
    )
}

pub fn delete_buyer(conn: &Connection, id: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM buyers WHERE id = ?1", params![id])
}

pub fn count_buyers(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT count(*) FROM buyers", [], |r| r.get(0))
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Builds the WHERE clause and bind list shared by the list and export queries.
fn filter_clause(filter: &BuyerFilter) -> (String, Vec<String>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut bind: Vec<String> = Vec::new();

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        clauses.push(
            r"(lower(b.full_name) LIKE ? ESCAPE '\' OR lower(coalesce(b.email, '')) LIKE ? ESCAPE '\' OR b.phone LIKE ? ESCAPE '\')",
        );
        bind.extend([pattern.clone(), pattern.clone(), pattern]);
    }
    if let Some(city) = filter.city {
        clauses.push("b.city = ?");
        bind.push(city.as_str().to_string());
    }
    if let Some(pt) = filter.property_type {
        clauses.push("b.property_type = ?");
        bind.push(pt.as_str().to_string());
    }
    if let Some(status) = filter.status {
        clauses.push("b.status = ?");
        bind.push(status.as_str().to_string());
    }
    if let Some(timeline) = filter.timeline {
        clauses.push("b.timeline = ?");
        bind.push(timeline.as_str().to_string());
    }

    if clauses.is_empty() {
        (String::new(), bind)
    } else {
        (format!("WHERE {}", clauses.join(" AND ")), bind)
    }
}

/// One page of buyers, newest update first, plus the total matching count.
pub fn list_buyers(
    conn: &Connection,
    filter: &BuyerFilter,
    page: u32,
    limit: u32,
) -> rusqlite::Result<(Vec<BuyerListItem>, i64)> {
    let (where_sql, bind) = filter_clause(filter);

    let total: i64 = conn.query_row(
        &format!("SELECT count(*) FROM buyers b {where_sql}"),
        params_from_iter(bind.iter()),
        |r| r.get(0),
    )?;

    let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
    let sql = format!(
        r#"
        SELECT {BUYER_COLUMNS}, u.name AS owner_name, u.email AS owner_email
        FROM buyers b
        JOIN users u ON u.id = b.owner_id
        {where_sql}
        ORDER BY b.updated_at DESC, b.id
        LIMIT {limit} OFFSET {offset}
        "#
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(bind.iter()), |row| {
        Ok(BuyerListItem {
            buyer: buyer_from_row(row)?,
            owner: Actor {
                name: row.get("owner_name")?,
                email: row.get("owner_email")?,
            },
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok((out, total))
}

/// Every matching buyer, newest update first, for spreadsheet export.
pub fn buyers_for_export(conn: &Connection, filter: &BuyerFilter) -> rusqlite::Result<Vec<Buyer>> {
    let (where_sql, bind) = filter_clause(filter);
    let mut stmt = conn.prepare(&format!(
        "SELECT {BUYER_COLUMNS} FROM buyers b {where_sql} ORDER BY b.updated_at DESC, b.id"
    ))?;
    let rows = stmt.query_map(params_from_iter(bind.iter()), buyer_from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
