//! Biological data handlers
//!
//! Samples are recorded through the `record_biological_data` procedure
//! rather than a plain insert.

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;

use super::{added, load_choices, rejected, render, PageResult, Resource};
use crate::flash::FlashMessage;
use crate::forms::{BiologicalDataForm, CONDITIONS};
use crate::views::{yes_no, Choice, Field, FormPage, ListPage};
use crate::AppState;

const BIOLOGICAL_DATA: Resource = Resource {
    key: "biological_data",
    list_url: "/biological_data",
    added: "Biological data added successfully!",
    failed: "Error adding biological data",
};

pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let samples = state.repo.list_biological_data().await?;

    let page = ListPage {
        title: "Biological Data",
        add_url: "/biological_data/add",
        columns: vec![
            "ID", "Name", "Type", "Condition", "Required", "Density", "Position", "Donor CF",
        ],
        rows: samples
            .into_iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.name,
                    b.data_type,
                    b.condition,
                    yes_no(b.is_required),
                    b.density.to_string(),
                    b.position,
                    b.donor_cf,
                ]
            })
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

async fn form_page(
    state: &AppState,
    form: &BiologicalDataForm,
    notices: &mut Vec<FlashMessage>,
) -> FormPage {
    let donors = load_choices("donors", state.repo.donor_options(), notices).await;
    let donors = donors
        .into_iter()
        .map(|d| Choice::new(&d.cf, format!("{} {} ({})", d.surname, d.name, d.cf)))
        .collect();

    FormPage {
        title: "Add Biological Data",
        action: "/biological_data/add",
        back_url: BIOLOGICAL_DATA.list_url,
        fields: vec![
            Field::text("name", "Name", &form.name),
            Field::text("data_type", "Type", &form.data_type),
            Field::select(
                "condition",
                "Condition",
                &form.condition,
                CONDITIONS.iter().map(|c| Choice::new(c, *c)).collect(),
            ),
            Field::checkbox("is_required", "Required", &form.is_required),
            Field::number("density", "Density", &form.density, "any"),
            Field::text("position", "Position", &form.position),
            Field::textarea("description", "Description", &form.description),
            Field::select("donor_cf", "Donor", &form.donor_cf, donors),
        ],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let mut notices = Vec::new();
    let page = form_page(&state, &BiologicalDataForm::default(), &mut notices).await;
    render(&state, jar, "form.html", &page, notices)
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<BiologicalDataForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.record_biological_data(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(id) => {
            tracing::info!(id, donor_cf = %form.donor_cf.trim(), "Biological data recorded");
            added(&state, jar, &BIOLOGICAL_DATA)
        }
        Err(e) => {
            let mut notices = Vec::new();
            let page = form_page(&state, &form, &mut notices).await;
            rejected(&state, jar, &BIOLOGICAL_DATA, e, page, notices)
        }
    }
}
