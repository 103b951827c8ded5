//! Donor handlers

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;

use super::{added, rejected, render, PageResult, Resource};
use crate::forms::DonorForm;
use crate::views::{Field, FormPage, ListPage};
use crate::AppState;

const DONOR: Resource = Resource {
    key: "donor",
    list_url: "/donors",
    added: "Donor added successfully!",
    failed: "Error adding donor",
};

/// List donors by surname, then name
pub async fn list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let donors = state.repo.list_donors().await?;

    let page = ListPage {
        title: "Donors",
        add_url: "/donors/add",
        columns: vec!["CF", "Name", "Surname", "Birth", "Sex", "Age"],
        rows: donors
            .into_iter()
            .map(|d| {
                vec![d.cf, d.name, d.surname, d.birth.to_string(), d.sex, d.age.to_string()]
            })
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

fn form_page(form: &DonorForm) -> FormPage {
    FormPage {
        title: "Add Donor",
        action: "/donors/add",
        back_url: DONOR.list_url,
        fields: vec![
            Field::text("cf", "CF", &form.cf),
            Field::text("name", "Name", &form.name),
            Field::text("surname", "Surname", &form.surname),
            Field::date("birth", "Birth date", &form.birth),
            Field::text("sex", "Sex", &form.sex),
            Field::number("age", "Age", &form.age, "1"),
        ],
    }
}

pub async fn add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "form.html", &form_page(&DonorForm::default()), Vec::new())
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<DonorForm>,
) -> Response {
    let outcome = match form.parse() {
        Ok(input) => state.repo.create_donor(input).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(donor) => {
            tracing::info!(cf = %donor.cf, "Donor added");
            added(&state, jar, &DONOR)
        }
        Err(e) => rejected(&state, jar, &DONOR, e, form_page(&form), Vec::new()),
    }
}
