//! Report ("operation") handlers
//!
//! Each report calls one database routine and shows its rows verbatim.
//! Failures never leave the page: they are shown as notifications above the
//! parameter form.

use axum::{extract::State, Form};
use axum_extra::extract::cookie::SignedCookieJar;
use biobank_common::{errors::AppError, metrics, Report, ReportTable};
use std::time::Instant;

use super::{load_choices, render, PageResult};
use crate::flash::FlashMessage;
use crate::forms::{parse_float, parse_int, DiseaseParamForm, ThresholdForm, TreatmentParamForm};
use crate::views::{Choice, Field, ReportPage};
use crate::AppState;

fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Database(_) => format!("Database error: {}", err.user_message()),
        AppError::DatabaseConnection { message } => format!("Database error: {}", message),
        other => format!("Error executing operation: {}", other.user_message()),
    }
}

/// Run a report, turning a failure into a notification
async fn execute(
    state: &AppState,
    report: Result<Report, AppError>,
    notices: &mut Vec<FlashMessage>,
) -> Option<ReportTable> {
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            e.log("report parameters");
            notices.push(FlashMessage::error(failure_message(&e)));
            return None;
        }
    };

    let start = Instant::now();
    let result = state.repo.run_report(&report).await;
    metrics::record_report(report.key(), start.elapsed(), result.is_ok());

    match result {
        Ok(table) => {
            tracing::info!(
                report = report.key(),
                routine = report.routine(),
                rows = table.len(),
                "Report executed"
            );
            Some(table)
        }
        Err(e) => {
            e.log(report.key());
            notices.push(FlashMessage::error(failure_message(&e)));
            None
        }
    }
}

// ============================================================================
// Operation 2: samples below a density threshold
// ============================================================================

fn below_density_page(threshold: &str, table: Option<ReportTable>) -> ReportPage {
    ReportPage {
        title: "Organs and Tissues Below Density",
        description: "Biological data whose density is below the given threshold.",
        action: Some("/operations/op2"),
        field: Some(Field::number("threshold", "Density threshold", threshold, "any")),
        table,
    }
}

pub async fn below_density_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    render(&state, jar, "report.html", &below_density_page("", None), Vec::new())
}

pub async fn below_density(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ThresholdForm>,
) -> PageResult {
    let mut notices = Vec::new();

    if form.threshold.trim().is_empty() {
        notices.push(FlashMessage::error("Please enter a threshold value"));
        return render(&state, jar, "report.html", &below_density_page("", None), notices);
    }

    let report = parse_float("threshold", &form.threshold)
        .map(|threshold| Report::BelowDensity { threshold });
    let table = execute(&state, report, &mut notices).await;

    render(&state, jar, "report.html", &below_density_page(&form.threshold, table), notices)
}

// ============================================================================
// Operation 3: drugs and allergies of a treatment
// ============================================================================

async fn treatment_info_page(
    state: &AppState,
    treatment_id: &str,
    table: Option<ReportTable>,
    notices: &mut Vec<FlashMessage>,
) -> ReportPage {
    let treatments = load_choices("treatments", state.repo.treatment_options(), notices).await;

    ReportPage {
        title: "Treatment Information",
        description: "Drugs assigned to a treatment and the allergies they cause.",
        action: Some("/operations/op3"),
        field: Some(Field::select(
            "treatment_id",
            "Treatment",
            treatment_id,
            treatments.into_iter().map(|t| Choice::new(t.id, t.name)).collect(),
        )),
        table,
    }
}

pub async fn treatment_info_form(State(state): State<AppState>, jar: SignedCookieJar) -> PageResult {
    let mut notices = Vec::new();
    let page = treatment_info_page(&state, "", None, &mut notices).await;
    render(&state, jar, "report.html", &page, notices)
}

pub async fn treatment_info(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<TreatmentParamForm>,
) -> PageResult {
    let mut notices = Vec::new();

    let table = if form.treatment_id.trim().is_empty() {
        notices.push(FlashMessage::error("Please select a treatment"));
        None
    } else {
        let report = parse_int("treatment_id", &form.treatment_id)
            .map(|treatment_id| Report::TreatmentInfo { treatment_id });
        execute(&state, report, &mut notices).await
    };

    let page = treatment_info_page(&state, &form.treatment_id, table, &mut notices).await;
    render(&state, jar, "report.html", &page, notices)
}

// ============================================================================
// Operation 4: donors with a required organ affected by a disease
// ============================================================================

async fn donors_with_disease_page(
    state: &AppState,
    disease_id: &str,
    table: Option<ReportTable>,
    notices: &mut Vec<FlashMessage>,
) -> ReportPage {
    let diseases = load_choices("diseases", state.repo.disease_options(), notices).await;

    ReportPage {
        title: "Donors with Required Organs Affected",
        description: "Donors whose required organs are affected by the disease, \
                      where the disease has future works planned.",
        action: Some("/operations/op4"),
        field: Some(Field::select(
            "disease_id",
            "Disease",
            disease_id,
            diseases.into_iter().map(|d| Choice::new(d.id, d.name)).collect(),
        )),
        table,
    }
}

pub async fn donors_with_disease_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> PageResult {
    let mut notices = Vec::new();
    let page = donors_with_disease_page(&state, "", None, &mut notices).await;
    render(&state, jar, "report.html", &page, notices)
}

pub async fn donors_with_disease(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<DiseaseParamForm>,
) -> PageResult {
    let mut notices = Vec::new();

    let table = if form.disease_id.trim().is_empty() {
        notices.push(FlashMessage::error("Please select a disease"));
        None
    } else {
        let report = parse_int("disease_id", &form.disease_id)
            .map(|disease_id| Report::DonorsWithDisease { disease_id });
        execute(&state, report, &mut notices).await
    };

    let page = donors_with_disease_page(&state, &form.disease_id, table, &mut notices).await;
    render(&state, jar, "report.html", &page, notices)
}

// ============================================================================
// Operation 5: future works of the top researchers
// ============================================================================

pub async fn top_researcher_future_works(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> PageResult {
    let mut notices = Vec::new();
    let table = execute(&state, Ok(Report::TopResearcherFutureWorks), &mut notices).await;

    let page = ReportPage {
        title: "Future Works of Top Researchers",
        description: "Future works linked to the publications of the most prolific researchers.",
        action: None,
        field: None,
        table,
    };

    render(&state, jar, "report.html", &page, notices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        let db = AppError::Database(sea_orm::DbErr::Custom("relation missing".into()));
        assert!(failure_message(&db).starts_with("Database error: "));

        let conn = AppError::DatabaseConnection { message: "refused".into() };
        assert_eq!(failure_message(&conn), "Database error: refused");

        let parse = parse_float("threshold", "abc").unwrap_err();
        assert_eq!(
            failure_message(&parse),
            "Error executing operation: Invalid value for threshold: 'abc' is not a number"
        );
    }
}
