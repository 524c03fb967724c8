// src/handlers/export.rs

use crate::db::buyers::buyers_for_export;
use crate::errors::ResultResp;
use crate::handlers::{buyer_filter, query_params, require_user};
use crate::responses::{csv_response, xlsx_response};
use crate::router::App;
use crate::spreadsheets::{export_buyers_csv, export_buyers_xlsx, export_file_name};
use astra::Request;
use chrono::Utc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

/// Every buyer matching the list filters, unpaginated.
pub fn export(req: &Request, app: &App, format: ExportFormat) -> ResultResp {
    let user = require_user(req, app)?;
    let filter = buyer_filter(&query_params(req))?;
    let buyers = app.db.with_conn(|conn| Ok(buyers_for_export(conn, &filter)?))?;

    info!(user = user.id, rows = buyers.len(), ?format, "export");
    let today = Utc::now().date_naive();
    match format {
        ExportFormat::Csv => csv_response(export_buyers_csv(&buyers)?, &export_file_name(today, "csv")),
        ExportFormat::Xlsx => {
            xlsx_response(export_buyers_xlsx(&buyers)?, &export_file_name(today, "xlsx"))
        }
    }
}
