// src/import/template.rs

/// Column order shared by the import template and the CSV export.
pub const COLUMNS: [&str; 14] = [
    "fullName",
    "email",
    "phone",
    "city",
    "propertyType",
    "bhk",
    "purpose",
    "budgetMin",
    "budgetMax",
    "timeline",
    "source",
    "status",
    "notes",
    "tags",
];

const EXAMPLE_ROW: [&str; 14] = [
    "John Doe",
    "john@example.com",
    "9876543210",
    "Chandigarh",
    "Apartment",
    "Two",
    "Buy",
    "500000",
    "1000000",
    "ZeroToThree",
    "Website",
    "New",
    "Interested in 2BHK",
    "urgent,premium",
];

pub const TEMPLATE_FILE_NAME: &str = "buyers-import-template.csv";

/// Header plus one example row, ready to download.
pub fn template_csv() -> Result<Vec<u8>, csv::Error> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(COLUMNS)?;
    w.write_record(EXAMPLE_ROW)?;
    w.into_inner().map_err(|e| e.into_error().into())
}
