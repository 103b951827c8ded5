//! Static navigation pages

use axum::extract::State;
use axum_extra::extract::cookie::SignedCookieJar;

use super::{render, PageResult};
use crate::views::StaticPage;
use crate::AppState;

pub async fn index(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "index.html", &StaticPage { title: "Home" }, Vec::new())
}

pub async fn assignations(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "assignations.html", &StaticPage { title: "Assignations" }, Vec::new())
}

pub async fn operations(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "operations.html", &StaticPage { title: "Operations" }, Vec::new())
}
