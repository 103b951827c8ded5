//! Experiment handlers

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;
use biobank_common::db::models::excerpt;

use super::{added, load_choices, rejected, render, PageResult, Resource};
use crate::flash::FlashMessage;
use crate::forms::ExperimentForm;
use crate::views::{yes_no, Choice, Field, FormPage, ListPage};
use crate::AppState;

const EXPERIMENT: Resource = Resource {
    key: "experiment",
    list_url: "/experiments",
    added: "Experiment added successfully!",
    failed: "Error adding experiment",
};

/// Most recent first
pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let experiments = state.repo.list_experiments().await?;

    let page = ListPage {
        title: "Experiments",
        add_url: "/experiments/add",
        columns: vec!["ID", "Date", "Positive", "Effect", "Disease ID", "Treatment ID"],
        rows: experiments
            .into_iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    e.exper_date.to_string(),
                    yes_no(e.is_positive),
                    excerpt(e.effect_description.as_deref()),
                    e.disease_id.to_string(),
                    e.treatment_id.to_string(),
                ]
            })
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

async fn form_page(
    state: &AppState,
    form: &ExperimentForm,
    notices: &mut Vec<FlashMessage>,
) -> FormPage {
    let diseases = load_choices("diseases", state.repo.disease_options(), notices).await;
    let treatments = load_choices("treatments", state.repo.treatment_options(), notices).await;

    FormPage {
        title: "Add Experiment",
        action: "/experiments/add",
        back_url: EXPERIMENT.list_url,
        fields: vec![
            Field::date("exper_date", "Date", &form.exper_date),
            Field::checkbox("is_positive", "Positive outcome", &form.is_positive),
            Field::textarea("effect_description", "Effect description", &form.effect_description),
            Field::select(
                "disease_id",
                "Disease",
                &form.disease_id,
                diseases.into_iter().map(|d| Choice::new(d.id, d.name)).collect(),
            ),
            Field::select(
                "treatment_id",
                "Treatment",
                &form.treatment_id,
                treatments.into_iter().map(|t| Choice::new(t.id, t.name)).collect(),
            ),
        ],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let mut notices = Vec::new();
    let page = form_page(&state, &ExperimentForm::default(), &mut notices).await;
    render(&state, jar, "form.html", &page, notices)
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ExperimentForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.create_experiment(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(id) => {
            tracing::info!(id, "Experiment added");
            added(&state, jar, &EXPERIMENT)
        }
        Err(e) => {
            let mut notices = Vec::new();
            let page = form_page(&state, &form, &mut notices).await;
            rejected(&state, jar, &EXPERIMENT, e, page, notices)
        }
    }
}
