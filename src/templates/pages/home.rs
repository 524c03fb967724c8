// templates/pages/home.rs

use crate::templates::{card, desktop_layout};
use maud::{html, Markup};

pub fn home_page(user: Option<&str>, buyer_count: i64) -> Markup {
    desktop_layout(
        "Home",
        user,
        html! {
            h1 { "Buyer Leads" }

            (card("Leads", html! {
                p { (buyer_count) " buyers on file." }
                p {
                    a href="/api/export" { "Download CSV" }
                    " · "
                    a href="/api/export.xlsx" { "Download Excel" }
                }
            }))

            (card("Bulk import", html! {
                p { "Upload up to 200 leads at a time from a CSV file." }
                p { a href="/import" { "Go to import" } }
            }))
        },
    )
}
