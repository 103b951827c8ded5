//! HTML rendering
//!
//! Templates are compiled into the binary and registered once at startup.
//! Handlers describe a page as one of the structs below; the generic list,
//! form and report templates lay them out.

use crate::flash::FlashMessage;
use crate::forms::parse_bool;
use biobank_common::db::ReportTable;
use biobank_common::errors::Result;
use minijinja::{context, Environment};
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("assignations.html", include_str!("../templates/assignations.html")),
    ("operations.html", include_str!("../templates/operations.html")),
    ("list.html", include_str!("../templates/list.html")),
    ("form.html", include_str!("../templates/form.html")),
    ("report.html", include_str!("../templates/report.html")),
];

/// Compiled template set, immutable after startup
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render `name` with a page description and the pending notifications
    pub fn render<P: Serialize>(
        &self,
        name: &str,
        page: &P,
        flashes: &[FlashMessage],
    ) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context! { page => page, flashes => flashes })?)
    }
}

/// Static page with only a title
#[derive(Debug, Serialize)]
pub struct StaticPage {
    pub title: &'static str,
}

// ============================================================================
// List views
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ListPage {
    pub title: &'static str,
    pub add_url: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Boolean cell
pub fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

// ============================================================================
// Add forms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Date,
    Number,
    Checkbox,
    Select,
    Textarea,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl ToString, label: impl Into<String>) -> Self {
        Self { value: value.to_string(), label: label.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub required: bool,
    pub checked: bool,
    pub step: Option<&'static str>,
    pub choices: Vec<Choice>,
}

impl Field {
    fn new(kind: FieldKind, name: &'static str, label: &'static str, value: &str) -> Self {
        Self {
            name,
            label,
            kind,
            value: value.to_string(),
            required: true,
            checked: false,
            step: None,
            choices: Vec::new(),
        }
    }

    pub fn text(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(FieldKind::Text, name, label, value)
    }

    pub fn date(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(FieldKind::Date, name, label, value)
    }

    pub fn number(name: &'static str, label: &'static str, value: &str, step: &'static str) -> Self {
        Self { step: Some(step), ..Self::new(FieldKind::Number, name, label, value) }
    }

    pub fn textarea(name: &'static str, label: &'static str, value: &str) -> Self {
        Self { required: false, ..Self::new(FieldKind::Textarea, name, label, value) }
    }

    /// Ticked when the submitted value reads as true
    pub fn checkbox(name: &'static str, label: &'static str, value: &str) -> Self {
        Self {
            required: false,
            checked: parse_bool(name, value).unwrap_or(false),
            ..Self::new(FieldKind::Checkbox, name, label, value)
        }
    }

    pub fn select(
        name: &'static str,
        label: &'static str,
        value: &str,
        choices: Vec<Choice>,
    ) -> Self {
        Self { choices, ..Self::new(FieldKind::Select, name, label, value) }
    }
}

#[derive(Debug, Serialize)]
pub struct FormPage {
    pub title: &'static str,
    pub action: &'static str,
    pub back_url: &'static str,
    pub fields: Vec<Field>,
}

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ReportPage {
    pub title: &'static str,
    pub description: &'static str,
    /// Parameter form target, absent for reports without parameters
    pub action: Option<&'static str>,
    pub field: Option<Field>,
    /// Result of the last run, absent until the report has been executed
    pub table: Option<ReportTable>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::FlashMessage;

    #[test]
    fn test_all_templates_compile() {
        let templates = Templates::new().unwrap();
        let page = StaticPage { title: "Home" };
        for name in ["index.html", "assignations.html", "operations.html"] {
            templates.render(name, &page, &[]).unwrap();
        }
    }

    #[test]
    fn test_list_escapes_cells() {
        let templates = Templates::new().unwrap();
        let page = ListPage {
            title: "Diseases",
            add_url: "/diseases/add",
            columns: vec!["Name"],
            rows: vec![vec!["<script>".to_string()]],
        };
        let html = templates.render("list.html", &page, &[]).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_form_keeps_submitted_values() {
        let templates = Templates::new().unwrap();
        let page = FormPage {
            title: "Add Cause",
            action: "/cause/add",
            back_url: "/cause",
            fields: vec![Field::select(
                "drug_id",
                "Drug",
                "3",
                vec![Choice::new(1, "Aspirin"), Choice::new(3, "Ibuprofen")],
            )],
        };
        let flashes = [FlashMessage::error("Error adding link: boom")];
        let html = templates.render("form.html", &page, &flashes).unwrap();

        assert!(html.contains(r#"<option value="3" selected>Ibuprofen</option>"#));
        assert!(html.contains("Error adding link: boom"));
    }

    #[test]
    fn test_checkbox_state() {
        assert!(Field::checkbox("is_positive", "Positive", "on").checked);
        assert!(!Field::checkbox("is_positive", "Positive", "").checked);
    }
}
