//! Association link handlers: Assign, Writes, Affected, Cause, Analyze
//!
//! Each link joins two existing records. The insert resolves both ends
//! itself, so an unknown key is reported rather than stored.

use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::SignedCookieJar;
use biobank_common::db::models::NewLink;
use biobank_common::Result;

use super::{added, load_choices, rejected, render, PageResult, Resource};
use crate::flash::FlashMessage;
use crate::forms::{AffectedForm, AnalyzeForm, AssignForm, CauseForm, WritesForm};
use crate::views::{Choice, Field, FormPage, ListPage};
use crate::AppState;

const ASSIGN: Resource = Resource {
    key: "assign",
    list_url: "/assign",
    added: "Assignment added successfully!",
    failed: "Error adding assignment",
};

const WRITES: Resource = Resource {
    key: "writes",
    list_url: "/writes",
    added: "Publication assignment added successfully!",
    failed: "Error adding assignment",
};

const AFFECTED: Resource = Resource {
    key: "affected",
    list_url: "/affected",
    added: "Disease-BioData link added successfully!",
    failed: "Error adding link",
};

const CAUSE: Resource = Resource {
    key: "cause",
    list_url: "/cause",
    added: "Drug-Allergy link added successfully!",
    failed: "Error adding link",
};

const ANALYZE: Resource = Resource {
    key: "analyze",
    list_url: "/analyze",
    added: "BioData-Experiment link added successfully!",
    failed: "Error adding link",
};

async fn create(state: &AppState, parsed: Result<NewLink>) -> Result<i32> {
    let link = parsed?;
    let kind = link.resource();
    let id = state.repo.create_link(link).await?;
    tracing::info!(id, kind, "Link added");
    Ok(id)
}

// ============================================================================
// Assign (treatment uses drug)
// ============================================================================

pub async fn assign_list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let rows = state.repo.list_assign().await?;

    let page = ListPage {
        title: "Treatment-Drug Assignments",
        add_url: "/assign/add",
        columns: vec!["ID", "Treatment ID", "Treatment", "Drug ID", "Drug"],
        rows: rows
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.treatment_id.to_string(),
                    r.treatment_name,
                    r.drug_id.to_string(),
                    r.drug_name,
                ]
            })
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

async fn assign_page(
    state: &AppState,
    form: &AssignForm,
    notices: &mut Vec<FlashMessage>,
) -> FormPage {
    let treatments = load_choices("treatments", state.repo.treatment_options(), notices).await;
    let drugs = load_choices("drugs", state.repo.drug_options(), notices).await;

    FormPage {
        title: "Assign Drug to Treatment",
        action: "/assign/add",
        back_url: ASSIGN.list_url,
        fields: vec![
            Field::select(
                "treatment_id",
                "Treatment",
                &form.treatment_id,
                treatments.into_iter().map(|t| Choice::new(t.id, t.name)).collect(),
            ),
            Field::select(
                "drug_id",
                "Drug",
                &form.drug_id,
                drugs.into_iter().map(|d| Choice::new(d.id, d.name)).collect(),
            ),
        ],
    }
}

pub async fn assign_add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let mut notices = Vec::new();
    let page = assign_page(&state, &AssignForm::default(), &mut notices).await;
    render(&state, jar, "form.html", &page, notices)
}

pub async fn assign_add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<AssignForm>,
) -> Response {
    match create(&state, form.parse()).await {
        Ok(_) => added(&state, jar, &ASSIGN),
        Err(e) => {
            let mut notices = Vec::new();
            let page = assign_page(&state, &form, &mut notices).await;
            rejected(&state, jar, &ASSIGN, e, page, notices)
        }
    }
}

// ============================================================================
// Writes (researcher wrote publication)
// ============================================================================

pub async fn writes_list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let rows = state.repo.list_writes().await?;

    let page = ListPage {
        title: "Researcher-Publication Assignments",
        add_url: "/writes/add",
        columns: vec!["ID", "Researcher CF", "Researcher", "DOI", "Title"],
        rows: rows
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.researcher_cf,
                    format!("{} {}", r.researcher_name, r.researcher_surname),
                    r.publication_doi,
                    r.publication_title,
                ]
            })
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

async fn writes_page(
    state: &AppState,
    form: &WritesForm,
    notices: &mut Vec<FlashMessage>,
) -> FormPage {
    let researchers = load_choices("researchers", state.repo.researcher_options(), notices).await;
    let publications = load_choices("publications", state.repo.publication_options(), notices).await;

    FormPage {
        title: "Assign Publication to Researcher",
        action: "/writes/add",
        back_url: WRITES.list_url,
        fields: vec![
            Field::select(
                "researcher_cf",
                "Researcher",
                &form.researcher_cf,
                researchers
                    .into_iter()
                    .map(|r| Choice::new(&r.cf, format!("{} {} ({})", r.name, r.surname, r.cf)))
                    .collect(),
            ),
            Field::select(
                "publication_doi",
                "Publication",
                &form.publication_doi,
                publications
                    .into_iter()
                    .map(|p| Choice::new(&p.doi, format!("{} ({})", p.title, p.doi)))
                    .collect(),
            ),
        ],
    }
}

pub async fn writes_add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let mut notices = Vec::new();
    let page = writes_page(&state, &WritesForm::default(), &mut notices).await;
    render(&state, jar, "form.html", &page, notices)
}

pub async fn writes_add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<WritesForm>,
) -> Response {
    match create(&state, form.parse()).await {
        Ok(_) => added(&state, jar, &WRITES),
        Err(e) => {
            let mut notices = Vec::new();
            let page = writes_page(&state, &form, &mut notices).await;
            rejected(&state, jar, &WRITES, e, page, notices)
        }
    }
}

// ============================================================================
// Affected (biological sample affected by disease)
// ============================================================================

pub async fn affected_list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let rows = state.repo.list_affected().await?;

    let page = ListPage {
        title: "Disease-Biological Data Links",
        add_url: "/affected/add",
        columns: vec!["ID", "Biological Data ID", "Biological Data", "Disease ID", "Disease"],
        rows: rows
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.biological_data_id.to_string(),
                    r.biological_data_name,
                    r.disease_id.to_string(),
                    r.disease_name,
                ]
            })
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

async fn affected_page(
    state: &AppState,
    form: &AffectedForm,
    notices: &mut Vec<FlashMessage>,
) -> FormPage {
    let diseases = load_choices("diseases", state.repo.disease_options(), notices).await;
    let samples = load_choices(
        "biological data",
        state.repo.diseased_biological_data_options(),
        notices,
    )
    .await;

    FormPage {
        title: "Link Disease to Biological Data",
        action: "/affected/add",
        back_url: AFFECTED.list_url,
        fields: vec![
            Field::select(
                "disease_id",
                "Disease",
                &form.disease_id,
                diseases.into_iter().map(|d| Choice::new(d.id, d.name)).collect(),
            ),
            Field::select(
                "bio_id",
                "Biological Data",
                &form.bio_id,
                samples
                    .into_iter()
                    .map(|b| Choice::new(b.id, format!("#{} {} ({})", b.id, b.name, b.condition)))
                    .collect(),
            ),
        ],
    }
}

pub async fn affected_add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let mut notices = Vec::new();
    let page = affected_page(&state, &AffectedForm::default(), &mut notices).await;
    render(&state, jar, "form.html", &page, notices)
}

pub async fn affected_add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<AffectedForm>,
) -> Response {
    match create(&state, form.parse()).await {
        Ok(_) => added(&state, jar, &AFFECTED),
        Err(e) => {
            let mut notices = Vec::new();
            let page = affected_page(&state, &form, &mut notices).await;
            rejected(&state, jar, &AFFECTED, e, page, notices)
        }
    }
}

// ============================================================================
// Cause (drug causes allergy)
// ============================================================================

pub async fn cause_list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let rows = state.repo.list_cause().await?;

    let page = ListPage {
        title: "Drug-Allergy Links",
        add_url: "/cause/add",
        columns: vec!["ID", "Drug ID", "Drug", "Allergy ID", "Allergy"],
        rows: rows
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.drug_id.to_string(),
                    r.drug_name,
                    r.allergy_id.to_string(),
                    r.allergy_name,
                ]
            })
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

async fn cause_page(
    state: &AppState,
    form: &CauseForm,
    notices: &mut Vec<FlashMessage>,
) -> FormPage {
    let drugs = load_choices("drugs", state.repo.drug_options(), notices).await;
    let allergies = load_choices("allergies", state.repo.allergy_options(), notices).await;

    FormPage {
        title: "Link Drug to Allergy",
        action: "/cause/add",
        back_url: CAUSE.list_url,
        fields: vec![
            Field::select(
                "drug_id",
                "Drug",
                &form.drug_id,
                drugs.into_iter().map(|d| Choice::new(d.id, d.name)).collect(),
            ),
            Field::select(
                "allergy_id",
                "Allergy",
                &form.allergy_id,
                allergies.into_iter().map(|a| Choice::new(a.id, a.name)).collect(),
            ),
        ],
    }
}

pub async fn cause_add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let mut notices = Vec::new();
    let page = cause_page(&state, &CauseForm::default(), &mut notices).await;
    render(&state, jar, "form.html", &page, notices)
}

pub async fn cause_add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<CauseForm>,
) -> Response {
    match create(&state, form.parse()).await {
        Ok(_) => added(&state, jar, &CAUSE),
        Err(e) => {
            let mut notices = Vec::new();
            let page = cause_page(&state, &form, &mut notices).await;
            rejected(&state, jar, &CAUSE, e, page, notices)
        }
    }
}

// ============================================================================
// Analyze (biological sample analysed in experiment)
// ============================================================================

pub async fn analyze_list(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let rows = state.repo.list_analyze().await?;

    let page = ListPage {
        title: "Biological Data-Experiment Links",
        add_url: "/analyze/add",
        columns: vec!["ID", "Biological Data ID", "Biological Data", "Experiment ID", "Experiment Date"],
        rows: rows
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.biological_data_id.to_string(),
                    r.biological_data_name,
                    r.experiment_id.to_string(),
                    r.experiment_date.to_string(),
                ]
            })
            .collect(),
    };

    render(&state, jar, "list.html", &page, Vec::new())
}

async fn analyze_page(
    state: &AppState,
    form: &AnalyzeForm,
    notices: &mut Vec<FlashMessage>,
) -> FormPage {
    let samples = load_choices(
        "biological data",
        state.repo.diseased_biological_data_options(),
        notices,
    )
    .await;
    let experiments = load_choices(
        "experiments",
        state.repo.experiment_disease_options(),
        notices,
    )
    .await;

    FormPage {
        title: "Link Biological Data to Experiment",
        action: "/analyze/add",
        back_url: ANALYZE.list_url,
        fields: vec![
            Field::select(
                "bio_id",
                "Biological Data",
                &form.bio_id,
                samples
                    .into_iter()
                    .map(|b| {
                        let diseases = b.diseases.as_deref().unwrap_or("no linked disease");
                        Choice::new(b.id, format!("#{} {} [{}]", b.id, b.name, diseases))
                    })
                    .collect(),
            ),
            Field::select(
                "exp_id",
                "Experiment",
                &form.exp_id,
                experiments
                    .into_iter()
                    .map(|e| {
                        Choice::new(
                            e.id,
                            format!("#{} {} (disease {}: {})", e.id, e.exper_date, e.disease_id, e.disease_name),
                        )
                    })
                    .collect(),
            ),
        ],
    }
}

pub async fn analyze_add_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let mut notices = Vec::new();
    let page = analyze_page(&state, &AnalyzeForm::default(), &mut notices).await;
    render(&state, jar, "form.html", &page, notices)
}

pub async fn analyze_add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<AnalyzeForm>,
) -> Response {
    match create(&state, form.parse()).await {
        Ok(_) => added(&state, jar, &ANALYZE),
        Err(e) => {
            let mut notices = Vec::new();
            let page = analyze_page(&state, &form, &mut notices).await;
            rejected(&state, jar, &ANALYZE, e, page, notices)
        }
    }
}
