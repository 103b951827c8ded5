//! Page handlers
//!
//! One module per registry resource, plus the association links, the
//! reports and the health endpoints. The helpers below hold the shared
//! add-flow: render with pending notifications, redirect on success,
//! re-render the submitted form on failure.

pub mod allergies;
pub mod biological_data;
pub mod diseases;
pub mod donors;
pub mod drugs;
pub mod experiments;
pub mod future_works;
pub mod health;
pub mod links;
pub mod operations;
pub mod pages;
pub mod publications;
pub mod researchers;
pub mod treatments;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use biobank_common::{errors::AppError, metrics, Result};
use serde::Serialize;
use std::future::Future;

use crate::flash::{self, FlashMessage};
use crate::views::FormPage;
use crate::AppState;

/// Page response carrying the cookie jar with consumed notifications
pub type PageResult = Result<(SignedCookieJar, Html<String>)>;

/// How an insertable resource reports its outcome
pub struct Resource {
    /// Metrics label and log context
    pub key: &'static str,
    pub list_url: &'static str,
    pub added: &'static str,
    pub failed: &'static str,
}

/// Render a page, consuming any queued notifications
pub fn render<P: Serialize>(
    state: &AppState,
    jar: SignedCookieJar,
    template: &str,
    page: &P,
    notices: Vec<FlashMessage>,
) -> PageResult {
    let (jar, mut flashes) = flash::take(jar, state.flash_cookie());
    flashes.extend(notices);
    let html = state.templates.render(template, page, &flashes)?;
    Ok((jar, Html(html)))
}

/// Load dropdown entries. A failure becomes a notification and an empty list
/// so the page still renders.
pub async fn load_choices<T, F>(what: &str, load: F, notices: &mut Vec<FlashMessage>) -> Vec<T>
where
    F: Future<Output = Result<Vec<T>>>,
{
    match load.await {
        Ok(items) => items,
        Err(e) => {
            e.log(what);
            notices.push(FlashMessage::error(format!(
                "Error loading {}: {}",
                what,
                e.user_message()
            )));
            Vec::new()
        }
    }
}

/// Successful insert: queue the confirmation and go back to the list
pub fn added(state: &AppState, jar: SignedCookieJar, resource: &Resource) -> Response {
    metrics::record_created(resource.key);
    let jar = flash::push(jar, state.flash_cookie(), FlashMessage::success(resource.added));
    (jar, Redirect::to(resource.list_url)).into_response()
}

/// Failed insert: show the error above the form, keeping the submitted values
pub fn rejected(
    state: &AppState,
    jar: SignedCookieJar,
    resource: &Resource,
    err: AppError,
    page: FormPage,
    mut notices: Vec<FlashMessage>,
) -> Response {
    err.log(resource.key);
    metrics::record_error(resource.key);

    let status = if err.is_client_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        err.status_code()
    };

    notices.push(FlashMessage::error(format!("{}: {}", resource.failed, err.user_message())));

    match render(state, jar, "form.html", &page, notices) {
        Ok(page) => (status, page).into_response(),
        Err(e) => e.into_response(),
    }
}
