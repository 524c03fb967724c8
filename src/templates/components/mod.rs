use maud::{html, Markup};

pub mod error;

pub use error::error_page;

pub fn button(label: &str) -> Markup {
    html! {
        button class="btn" type="submit" { (label) }
    }
}

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}
