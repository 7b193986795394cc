use scraper::{ElementRef, Html};
use url::Url;

use super::normalizer::{element_text, selector};
use crate::workflows::applications::{
    ApplicationForm, FieldKind, FieldOption, FormField, SubmissionError,
};

const QUESTION_CLASSES: &[&str] = &["application-question", "custom-question"];
const QUESTION_TEXT: &str = ".application-label, .text";

/// Reads the application form from a Lever apply page. Radio inputs sharing
/// a name collapse into one field whose options keep document order.
pub fn parse_application_form(
    html: &str,
    page_url: &Url,
) -> Result<ApplicationForm, SubmissionError> {
    let document = Html::parse_document(html);
    let missing = || SubmissionError::FormMissing(page_url.to_string());

    let form = selector("form#application-form")
        .and_then(|css| document.select(&css).next())
        .or_else(|| selector("form").and_then(|css| document.select(&css).next()))
        .ok_or_else(missing)?;

    let action = match form.value().attr("action").map(str::trim) {
        Some(action) if !action.is_empty() => page_url
            .join(action)
            .map_err(|err| SubmissionError::InvalidUrl(format!("{action}: {err}")))?,
        _ => page_url.clone(),
    };

    let controls = selector("input, select, textarea").ok_or_else(missing)?;
    let mut fields: Vec<FormField> = Vec::new();
    for control in form.select(&controls) {
        let Some(name) = control.value().attr("name").filter(|name| !name.is_empty()) else {
            continue;
        };
        let Some(kind) = field_kind(control) else {
            continue;
        };

        if kind == FieldKind::Radio {
            let option = FieldOption {
                value: control.value().attr("value").unwrap_or_default().to_string(),
                label: option_label(control),
            };
            if let Some(group) = fields
                .iter_mut()
                .find(|field| field.kind == FieldKind::Radio && field.name == name)
            {
                group.required |= is_required(control);
                group.options.push(option);
                continue;
            }
            let mut field = base_field(control, name, kind);
            field.options.push(option);
            fields.push(field);
            continue;
        }

        let mut field = base_field(control, name, kind);
        match field.kind {
            FieldKind::Select => field.options = select_options(control),
            FieldKind::TextArea => {
                let text: String = control.text().collect();
                if !text.trim().is_empty() {
                    field.default_value = Some(text.trim().to_string());
                }
            }
            _ => {
                field.default_value = control.value().attr("value").map(str::to_string);
            }
        }
        fields.push(field);
    }

    if fields.is_empty() {
        return Err(missing());
    }
    Ok(ApplicationForm { action, fields })
}

fn field_kind(control: ElementRef<'_>) -> Option<FieldKind> {
    match control.value().name() {
        "select" => Some(FieldKind::Select),
        "textarea" => Some(FieldKind::TextArea),
        _ => match control
            .value()
            .attr("type")
            .unwrap_or("text")
            .to_ascii_lowercase()
            .as_str()
        {
            "hidden" => Some(FieldKind::Hidden),
            "file" => Some(FieldKind::File),
            "checkbox" => Some(FieldKind::Checkbox),
            "radio" => Some(FieldKind::Radio),
            "submit" | "button" | "reset" | "image" => None,
            _ => Some(FieldKind::Text),
        },
    }
}

fn base_field(control: ElementRef<'_>, name: &str, kind: FieldKind) -> FormField {
    let mut field = FormField::new(name, kind);
    field.required = is_required(control);
    field.label = question_label(control);
    field
}

fn is_required(control: ElementRef<'_>) -> bool {
    let element = control.value();
    element.attr("required").is_some()
        || element
            .attr("aria-required")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Question text from the enclosing `.application-question` block, or the
/// wrapping `<label>` for plain inputs.
fn question_label(control: ElementRef<'_>) -> Option<String> {
    let question_text = selector(QUESTION_TEXT);
    let mut wrapping_label = None;

    for ancestor in control.ancestors().filter_map(ElementRef::wrap) {
        let element = ancestor.value();
        if element.classes().any(|class| QUESTION_CLASSES.contains(&class)) {
            let text = question_text
                .as_ref()
                .and_then(|css| ancestor.select(css).map(element_text).find(|t| !t.is_empty()));
            if text.is_some() {
                return text;
            }
        }
        if wrapping_label.is_none() && element.name() == "label" {
            wrapping_label = Some(element_text(ancestor)).filter(|text| !text.is_empty());
        }
    }

    wrapping_label
}

fn option_label(control: ElementRef<'_>) -> String {
    control
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "label")
        .map(element_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| control.value().attr("value").unwrap_or_default().to_string())
}

fn select_options(control: ElementRef<'_>) -> Vec<FieldOption> {
    let Some(options) = selector("option") else {
        return Vec::new();
    };
    control
        .select(&options)
        .map(|option| {
            let label = element_text(option);
            let value = option
                .value()
                .attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| label.clone());
            FieldOption { value, label }
        })
        .collect()
}
