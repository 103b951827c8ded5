//! Researcher handlers

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;

use super::{added, rejected, render, PageResult, Resource};
use crate::forms::ResearcherForm;
use crate::views::{Field, FormPage, ListPage};
use crate::AppState;

const RESEARCHER: Resource = Resource {
    key: "researcher",
    list_url: "/researchers",
    added: "Researcher added successfully!",
    failed: "Error adding researcher",
};

pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let researchers = state.repo.list_researchers().await?;

    let page = ListPage {
        title: "Researchers",
        add_url: "/researchers/add",
        columns: vec!["CF", "Name", "Surname", "Birth"],
        rows: researchers
            .into_iter()
            .map(|r| vec![r.cf, r.name, r.surname, r.birth.to_string()])
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

fn form_page(form: &ResearcherForm) -> FormPage {
    FormPage {
        title: "Add Researcher",
        action: "/researchers/add",
        back_url: RESEARCHER.list_url,
        fields: vec![
            Field::text("cf", "CF", &form.cf),
            Field::text("name", "Name", &form.name),
            Field::text("surname", "Surname", &form.surname),
            Field::date("birth", "Birth date", &form.birth),
        ],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "form.html", &form_page(&ResearcherForm::default()), Vec::new())
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ResearcherForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.create_researcher(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(researcher) => {
            tracing::info!(cf = %researcher.cf, "Researcher added");
            added(&state, jar, &RESEARCHER)
        }
        Err(e) => rejected(&state, jar, &RESEARCHER, e, form_page(&form), Vec::new()),
    }
}
