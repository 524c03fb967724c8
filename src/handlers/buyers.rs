// src/handlers/buyers.rs
//
// JSON CRUD for single buyers plus the list and history reads.

use crate::buyers;
use crate::db::buyers::{find_buyer, list_buyers, BuyerListItem};
use crate::db::history::history_for_buyer;
use crate::db::users::find_actor;
use crate::db::{SqliteStorage, TxOptions};
use crate::domain::buyer::{Buyer, BuyerDraft};
use crate::domain::history::{Actor, HistoryView};
use crate::domain::normalize::{BuyerForm, FieldError};
use crate::errors::{ResultResp, ServerError};
use crate::handlers::{buyer_filter, pagination, query_params, read_body, require_user};
use crate::responses::json_response;
use crate::router::App;
use astra::Request;
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Detail {
    path: Vec<&'static str>,
    message: String,
}

fn invalid_data(errors: &[FieldError]) -> ResultResp {
    let details: Vec<Detail> = errors
        .iter()
        .map(|e| Detail {
            path: e.field.into_iter().collect(),
            message: e.message.clone(),
        })
        .collect();
    json_response(400, &json!({ "error": "Invalid data", "details": details }))
}

/// Parses and validates a form body. `Err` carries the 400 response to send.
fn read_form(req: Request, app: &App) -> Result<Result<BuyerDraft, ResultResp>, ServerError> {
    let body = read_body(req, app.config.max_upload_bytes)?;
    let form: BuyerForm = match serde_json::from_slice(&body) {
        Ok(form) => form,
        Err(e) => {
            return Ok(Err(invalid_data(&[FieldError {
                field: None,
                message: e.to_string(),
            }])))
        }
    };
    Ok(form.validate().map_err(|errors| invalid_data(&errors)))
}

pub fn create(req: Request, app: &App) -> ResultResp {
    let user = require_user(&req, app)?;
    let draft = match read_form(req, app)? {
        Ok(draft) => draft,
        Err(resp) => return resp,
    };

    let buyer = app.db.with_conn(|conn| {
        let mut storage = SqliteStorage::new(conn);
        Ok(buyers::create_buyer(&mut storage, &TxOptions::default(), &draft, user.id)?)
    })?;
    json_response(201, &buyer)
}

pub fn update(req: Request, app: &App, id: &str) -> ResultResp {
    let user = require_user(&req, app)?;
    let draft = match read_form(req, app)? {
        Ok(draft) => draft,
        Err(resp) => return resp,
    };

    let buyer = app.db.with_conn(|conn| {
        let mut storage = SqliteStorage::new(conn);
        Ok(buyers::update_buyer(&mut storage, &TxOptions::default(), id, &draft, user.id)?)
    })?;
    json_response(200, &buyer)
}

pub fn delete(req: &Request, app: &App, id: &str) -> ResultResp {
    let user = require_user(req, app)?;
    app.db.with_conn(|conn| {
        let mut storage = SqliteStorage::new(conn);
        Ok(buyers::delete_buyer(&mut storage, &TxOptions::default(), id, user.id)?)
    })?;
    json_response(200, &json!({ "message": "Buyer deleted successfully" }))
}

#[derive(Serialize)]
struct BuyerDetail {
    #[serde(flatten)]
    buyer: Buyer,
    owner: Option<Actor>,
    history: Vec<HistoryView>,
}

pub fn show(req: &Request, app: &App, id: &str) -> ResultResp {
    require_user(req, app)?;
    let detail = app.db.with_conn(|conn| {
        let buyer = find_buyer(conn, id)?.ok_or(ServerError::NotFound)?;
        let owner = find_actor(conn, buyer.owner_id)?;
        let history = history_for_buyer(conn, id)?;
        Ok(BuyerDetail {
            buyer,
            owner,
            history,
        })
    })?;
    json_response(200, &detail)
}

pub fn history(req: &Request, app: &App, id: &str) -> ResultResp {
    require_user(req, app)?;
    let entries = app.db.with_conn(|conn| {
        find_buyer(conn, id)?.ok_or(ServerError::NotFound)?;
        Ok(history_for_buyer(conn, id)?)
    })?;
    json_response(200, &entries)
}

#[derive(Serialize)]
struct Pagination {
    page: u32,
    limit: u32,
    total: i64,
    pages: i64,
}

#[derive(Serialize)]
struct BuyerPage {
    buyers: Vec<BuyerListItem>,
    pagination: Pagination,
}

pub fn list(req: &Request, app: &App) -> ResultResp {
    require_user(req, app)?;
    let params = query_params(req);
    let filter = buyer_filter(&params)?;
    let (page, limit) = pagination(&params);

    let (buyers, total) = app
        .db
        .with_conn(|conn| Ok(list_buyers(conn, &filter, page, limit)?))?;

    let pages = (total + i64::from(limit) - 1) / i64::from(limit);
    json_response(
        200,
        &BuyerPage {
            buyers,
            pagination: Pagination {
                page,
                limit,
                total,
                pages,
            },
        },
    )
}
