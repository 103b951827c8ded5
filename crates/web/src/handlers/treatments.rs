//! Treatment handlers

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;

use super::{added, rejected, render, PageResult, Resource};
use crate::forms::TreatmentForm;
use crate::views::{Field, FormPage, ListPage};
use crate::AppState;

const TREATMENT: Resource = Resource {
    key: "treatment",
    list_url: "/treatments",
    added: "Treatment added successfully!",
    failed: "Error adding treatment",
};

pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let treatments = state.repo.list_treatments().await?;

    let page = ListPage {
        title: "Treatments",
        add_url: "/treatments/add",
        columns: vec!["ID", "Name", "Success %"],
        rows: treatments
            .into_iter()
            .map(|t| vec![t.id.to_string(), t.name, t.success_percentage.to_string()])
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

fn form_page(form: &TreatmentForm) -> FormPage {
    FormPage {
        title: "Add Treatment",
        action: "/treatments/add",
        back_url: TREATMENT.list_url,
        fields: vec![
            Field::text("name", "Name", &form.name),
            Field::number("success_percentage", "Success percentage", &form.success_percentage, "any"),
        ],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "form.html", &form_page(&TreatmentForm::default()), Vec::new())
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<TreatmentForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.create_treatment(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(treatment) => {
            tracing::info!(id = treatment.id, "Treatment added");
            added(&state, jar, &TREATMENT)
        }
        Err(e) => rejected(&state, jar, &TREATMENT, e, form_page(&form), Vec::new()),
    }
}
