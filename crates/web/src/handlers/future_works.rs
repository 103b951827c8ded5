//! Future work handlers

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;

use super::{added, load_choices, rejected, render, PageResult, Resource};
use crate::flash::FlashMessage;
use crate::forms::FutureWorkForm;
use crate::views::{Choice, Field, FormPage, ListPage};
use crate::AppState;

const FUTURE_WORK: Resource = Resource {
    key: "future_work",
    list_url: "/future_works",
    added: "Future work added successfully!",
    failed: "Error adding future work",
};

pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let works = state.repo.list_future_works().await?;

    let page = ListPage {
        title: "Future Works",
        add_url: "/future_works/add",
        columns: vec!["ID", "Title", "Experiment ID", "Publication DOI"],
        rows: works
            .into_iter()
            .map(|w| vec![w.id.to_string(), w.title, w.experiment_id.to_string(), w.publication_doi])
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

async fn form_page(
    state: &AppState,
    form: &FutureWorkForm,
    notices: &mut Vec<FlashMessage>,
) -> FormPage {
    let experiments = load_choices("experiments", state.repo.experiment_options(), notices).await;
    let publications = load_choices("publications", state.repo.publication_options(), notices).await;

    FormPage {
        title: "Add Future Work",
        action: "/future_works/add",
        back_url: FUTURE_WORK.list_url,
        fields: vec![
            Field::text("title", "Title", &form.title),
            Field::select(
                "exp_id",
                "Experiment",
                &form.exp_id,
                experiments
                    .into_iter()
                    .map(|e| Choice::new(e.id, format!("#{} ({})", e.id, e.exper_date)))
                    .collect(),
            ),
            Field::select(
                "pub_doi",
                "Publication",
                &form.pub_doi,
                publications
                    .into_iter()
                    .map(|p| Choice::new(&p.doi, format!("{} ({})", p.title, p.doi)))
                    .collect(),
            ),
        ],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let mut notices = Vec::new();
    let page = form_page(&state, &FutureWorkForm::default(), &mut notices).await;
    render(&state, jar, "form.html", &page, notices)
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<FutureWorkForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.create_future_work(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(id) => {
            tracing::info!(id, "Future work added");
            added(&state, jar, &FUTURE_WORK)
        }
        Err(e) => {
            let mut notices = Vec::new();
            let page = form_page(&state, &form, &mut notices).await;
            rejected(&state, jar, &FUTURE_WORK, e, page, notices)
        }
    }
}
