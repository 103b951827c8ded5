//! Drug handlers

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;
use biobank_common::db::models::excerpt;

use super::{added, rejected, render, PageResult, Resource};
use crate::forms::DrugForm;
use crate::views::{Field, FormPage, ListPage};
use crate::AppState;

const DRUG: Resource = Resource {
    key: "drug",
    list_url: "/drugs",
    added: "Drug added successfully!",
    failed: "Error adding drug",
};

pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let drugs = state.repo.list_drugs().await?;

    let page = ListPage {
        title: "Drugs",
        add_url: "/drugs/add",
        columns: vec!["ID", "Name", "Description"],
        rows: drugs
            .into_iter()
            .map(|d| vec![d.id.to_string(), d.name, excerpt(d.description.as_deref())])
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

fn form_page(form: &DrugForm) -> FormPage {
    FormPage {
        title: "Add Drug",
        action: "/drugs/add",
        back_url: DRUG.list_url,
        fields: vec![
            Field::text("name", "Name", &form.name),
            Field::textarea("description", "Description", &form.description),
        ],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "form.html", &form_page(&DrugForm::default()), Vec::new())
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<DrugForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.create_drug(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(drug) => {
            tracing::info!(id = drug.id, "Drug added");
            added(&state, jar, &DRUG)
        }
        Err(e) => rejected(&state, jar, &DRUG, e, form_page(&form), Vec::new()),
    }
}
