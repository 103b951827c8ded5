//! Allergy handlers

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;

use super::{added, rejected, render, PageResult, Resource};
use crate::forms::AllergyForm;
use crate::views::{Field, FormPage, ListPage};
use crate::AppState;

const ALLERGY: Resource = Resource {
    key: "allergy",
    list_url: "/allergies",
    added: "Allergy added successfully!",
    failed: "Error adding allergy",
};

pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let allergies = state.repo.list_allergies().await?;

    let page = ListPage {
        title: "Allergies",
        add_url: "/allergies/add",
        columns: vec!["ID", "Name"],
        rows: allergies
            .into_iter()
            .map(|a| vec![a.id.to_string(), a.name])
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

fn form_page(form: &AllergyForm) -> FormPage {
    FormPage {
        title: "Add Allergy",
        action: "/allergies/add",
        back_url: ALLERGY.list_url,
        fields: vec![Field::text("name", "Name", &form.name)],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "form.html", &form_page(&AllergyForm::default()), Vec::new())
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<AllergyForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.create_allergy(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(allergy) => {
            tracing::info!(id = allergy.id, "Allergy added");
            added(&state, jar, &ALLERGY)
        }
        Err(e) => rejected(&state, jar, &ALLERGY, e, form_page(&form), Vec::new()),
    }
}
