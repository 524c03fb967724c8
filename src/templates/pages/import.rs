// templates/pages/import.rs

use crate::domain::enums::{Bhk, City, PropertyType, Purpose, Source, Status, Timeline};
use crate::import::orchestrator::{ImportReport, RowValidation};
use crate::templates::{button, card, desktop_layout};
use maud::{html, Markup};

fn upload_form() -> Markup {
    html! {
        form method="post" action="/import" enctype="multipart/form-data" {
            label for="file" { "CSV/Excel File" }
            input type="file" id="file" name="file" accept=".csv,.xlsx,.xls";
            p {
                "At most 200 rows. Download the "
                a href="/api/import/template" { "template CSV" }
                " for reference."
            }
            (button("Import File"))
        }
    }
}

fn pairs<T: Copy>(
    all: &[T],
    name: fn(T) -> &'static str,
    label: fn(T) -> &'static str,
) -> Vec<(&'static str, &'static str)> {
    all.iter().map(|v| (name(*v), label(*v))).collect()
}

/// Accepted cell values per enumerated column. Blank cells take the default.
fn accepted_values() -> Markup {
    let columns = [
        ("city", pairs(City::ALL, City::as_str, City::label)),
        ("propertyType", pairs(PropertyType::ALL, PropertyType::as_str, PropertyType::label)),
        ("bhk", pairs(Bhk::ALL, Bhk::as_str, Bhk::label)),
        ("purpose", pairs(Purpose::ALL, Purpose::as_str, Purpose::label)),
        ("timeline", pairs(Timeline::ALL, Timeline::as_str, Timeline::label)),
        ("source", pairs(Source::ALL, Source::as_str, Source::label)),
        ("status", pairs(Status::ALL, Status::as_str, Status::label)),
    ];

    html! {
        table {
            thead { tr { th { "Column" } th { "Values" } } }
            tbody {
                @for (column, values) in &columns {
                    tr {
                        td { code { (column) } }
                        td {
                            @for (i, (name, label)) in values.iter().enumerate() {
                                @if i > 0 { ", " }
                                code { (name) }
                                @if name != label { " (" (label) ")" }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn import_page(user: Option<&str>) -> Markup {
    desktop_layout(
        "Import",
        user,
        html! {
            h1 { "Import Buyers from CSV" }
            (card("Upload", upload_form()))
            (card("Accepted values", accepted_values()))
        },
    )
}

pub fn import_result_page(user: Option<&str>, report: &ImportReport) -> Markup {
    desktop_layout(
        "Import results",
        user,
        html! {
            h1 { "Import completed" }
            p { (report.message) }
            p { (report.imported_count) " successful, " (report.skipped_count) " skipped" }

            @if !report.failed.is_empty() {
                (card("Skipped rows", html! {
                    table {
                        thead { tr { th { "Row" } th { "Name" } th { "Phone" } th { "Reason" } } }
                        tbody {
                            @for o in &report.failed {
                                tr {
                                    td { (o.row) }
                                    td { (o.full_name) }
                                    td { (o.phone) }
                                    td { (o.error.as_deref().unwrap_or("")) }
                                }
                            }
                        }
                    }
                }))
            }

            p { a href="/import" { "Import another file" } }
        },
    )
}

/// Shown when the file is rejected. `rows` is empty for structural failures.
pub fn import_errors_page(user: Option<&str>, message: &str, rows: &[RowValidation]) -> Markup {
    desktop_layout(
        "Import errors",
        user,
        html! {
            h1 { "Import Errors" }
            p { (message) }

            @if !rows.is_empty() {
                table {
                    thead { tr { th { "Row" } th { "Errors" } } }
                    tbody {
                        @for r in rows {
                            tr {
                                td { (r.row) }
                                td { (r.errors.join(", ")) }
                            }
                        }
                    }
                }
            }

            (card("Try again", upload_form()))
        },
    )
}
