use crate::domain::buyer::Buyer;
use crate::errors::ServerError;
use crate::import::template::COLUMNS;

fn opt_number(v: Option<i64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

/// Writes buyers in import-template column order with wire values, so an
/// export can be fed back into the importer.
pub fn export_buyers_csv(buyers: &[Buyer]) -> Result<Vec<u8>, ServerError> {
    let csv_err = |_: csv::Error| ServerError::InternalError;

    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(COLUMNS).map_err(csv_err)?;

    for buyer in buyers {
        let b = &buyer.attrs;
        w.write_record([
            b.full_name.clone(),
            b.email.clone().unwrap_or_default(),
            b.phone.clone(),
            b.city.to_string(),
            b.property_type.to_string(),
            b.bhk.map(|x| x.to_string()).unwrap_or_default(),
            b.purpose.to_string(),
            opt_number(b.budget_min),
            opt_number(b.budget_max),
            b.timeline.to_string(),
            b.source.to_string(),
            b.status.to_string(),
            b.notes.clone().unwrap_or_default(),
            b.tags.join(","),
        ])
        .map_err(csv_err)?;
    }

    w.into_inner().map_err(|_| ServerError::InternalError)
}

/// `buyers-export-YYYY-MM-DD.csv` for the given day.
pub fn export_file_name(day: chrono::NaiveDate, ext: &str) -> String {
    format!("buyers-export-{}.{ext}", day.format("%Y-%m-%d"))
}
