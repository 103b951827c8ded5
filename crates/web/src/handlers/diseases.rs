//! Disease handlers

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;
use biobank_common::db::models::excerpt;

use super::{added, rejected, render, PageResult, Resource};
use crate::forms::DiseaseForm;
use crate::views::{Field, FormPage, ListPage};
use crate::AppState;

const DISEASE: Resource = Resource {
    key: "disease",
    list_url: "/diseases",
    added: "Disease added successfully!",
    failed: "Error adding disease",
};

pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let diseases = state.repo.list_diseases().await?;

    let page = ListPage {
        title: "Diseases",
        add_url: "/diseases/add",
        columns: vec!["ID", "Name", "Discovery date", "Description"],
        rows: diseases
            .into_iter()
            .map(|d| {
                vec![
                    d.id.to_string(),
                    d.name,
                    d.discovery_date.to_string(),
                    excerpt(d.description.as_deref()),
                ]
            })
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

fn form_page(form: &DiseaseForm) -> FormPage {
    FormPage {
        title: "Add Disease",
        action: "/diseases/add",
        back_url: DISEASE.list_url,
        fields: vec![
            Field::text("name", "Name", &form.name),
            Field::date("discovery_date", "Discovery date", &form.discovery_date),
            Field::textarea("description", "Description", &form.description),
        ],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "form.html", &form_page(&DiseaseForm::default()), Vec::new())
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<DiseaseForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.create_disease(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(disease) => {
            tracing::info!(id = disease.id, name = %disease.name, "Disease added");
            added(&state, jar, &DISEASE)
        }
        Err(e) => rejected(&state, jar, &DISEASE, e, form_page(&form), Vec::new()),
    }
}
