use maud::{html, Markup, DOCTYPE};

/// Page shell. `user` is the signed-in email, if any.
pub fn desktop_layout(title: &str, user: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | Buyer Leads" }
                link rel="stylesheet" href="/static/main.css";
            }
            body {
              header class="flex items-center justify-between px-6 py-3 shadow" {
                  h3 { "Buyer Leads" }
                  nav {
                      ul {
                          li { a href="/" { "Home" } }
                          li { a href="/import" { "Import" } }
                          li { a href="/api/export" { "Export CSV" } }
                      }
                  }

                  @match user {
                      Some(email) => span class="text-base font-medium" { (email) },
                      None => span class="text-base font-medium" { "Not signed in" },
                  }
              }
                main class="container" {
                    (content)
                }
            }
        }
    }
}
