//! Publication handlers

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;

use super::{added, rejected, render, PageResult, Resource};
use crate::forms::PublicationForm;
use crate::views::{Field, FormPage, ListPage};
use crate::AppState;

const PUBLICATION: Resource = Resource {
    key: "publication",
    list_url: "/publications",
    added: "Publication added successfully!",
    failed: "Error adding publication",
};

pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let publications = state.repo.list_publications().await?;

    let page = ListPage {
        title: "Publications",
        add_url: "/publications/add",
        columns: vec!["DOI", "Title", "Quality", "Publisher"],
        rows: publications
            .into_iter()
            .map(|p| vec![p.doi, p.title, p.quality, p.publisher])
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

fn form_page(form: &PublicationForm) -> FormPage {
    FormPage {
        title: "Add Publication",
        action: "/publications/add",
        back_url: PUBLICATION.list_url,
        fields: vec![
            Field::text("doi", "DOI", &form.doi),
            Field::text("title", "Title", &form.title),
            Field::text("quality", "Quality", &form.quality),
            Field::text("publisher", "Publisher", &form.publisher),
        ],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "form.html", &form_page(&PublicationForm::default()), Vec::new())
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<PublicationForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.create_publication(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(publication) => {
            tracing::info!(doi = %publication.doi, "Publication added");
            added(&state, jar, &PUBLICATION)
        }
        Err(e) => rejected(&state, jar, &PUBLICATION, e, form_page(&form), Vec::new()),
    }
}
