// src/handlers/pages.rs

use crate::errors::ResultResp;
use crate::handlers::{buyer_total, optional_user};
use crate::responses::html_response;
use crate::router::App;
use crate::templates::pages::home_page;
use astra::Request;

pub fn home(req: &Request, app: &App) -> ResultResp {
    let user = optional_user(req, app)?;
    let total = buyer_total(app)?;
    html_response(home_page(user.as_ref().map(|u| u.email.as_str()), total))
}
