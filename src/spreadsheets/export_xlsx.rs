use crate::domain::buyer::Buyer;
use crate::errors::ServerError;
use rust_xlsxwriter::{Workbook, Worksheet};

const HEADERS: [&str; 14] = [
    "Full Name",
    "Email",
    "Phone",
    "City",
    "Property Type",
    "BHK",
    "Purpose",
    "Budget Min",
    "Budget Max",
    "Timeline",
    "Source",
    "Status",
    "Notes",
    "Tags",
];

fn put(ws: &mut Worksheet, r: u32, c: u16, value: &str) -> Result<(), ServerError> {
    ws.write_string(r, c, value)
        .map(|_| ())
        .map_err(|e| ServerError::XlsxError(format!("Failed to write {}: {}", HEADERS[c as usize], e)))
}

fn put_budget(ws: &mut Worksheet, r: u32, c: u16, value: Option<i64>) -> Result<(), ServerError> {
    match value {
        Some(v) => ws
            .write_number(r, c, v as f64)
            .map(|_| ())
            .map_err(|e| ServerError::XlsxError(format!("Failed to write {}: {}", HEADERS[c as usize], e))),
        None => Ok(()),
    }
}

/// Builds a workbook of buyers using display labels for the enumerations.
pub fn export_buyers_xlsx(buyers: &[Buyer]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // Headers
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| {
                ServerError::XlsxError(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    // Rows
    for (i, buyer) in buyers.iter().enumerate() {
        let r = (i + 1) as u32;
        let b = &buyer.attrs;

        put(worksheet, r, 0, &b.full_name)?;
        put(worksheet, r, 1, b.email.as_deref().unwrap_or(""))?;
        put(worksheet, r, 2, &b.phone)?;
        put(worksheet, r, 3, b.city.label())?;
        put(worksheet, r, 4, b.property_type.label())?;
        put(worksheet, r, 5, b.bhk.map(|x| x.label()).unwrap_or(""))?;
        put(worksheet, r, 6, b.purpose.label())?;
        put_budget(worksheet, r, 7, b.budget_min)?;
        put_budget(worksheet, r, 8, b.budget_max)?;
        put(worksheet, r, 9, b.timeline.label())?;
        put(worksheet, r, 10, b.source.label())?;
        put(worksheet, r, 11, b.status.label())?;
        put(worksheet, r, 12, b.notes.as_deref().unwrap_or(""))?;
        put(worksheet, r, 13, &b.tags.join(", "))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {}", e)))
}
