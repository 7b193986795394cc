use tracing::debug;

use super::form::{
    ApplicationForm, Attachment, FieldKind, FieldOption, FormField, FormSubmission,
    SubmissionError,
};
use super::profile::{normalize_key, ApplicantProfile};

/// Normalized form field name -> profile keys tried in order.
const ALIASES: &[(&str, &[&str])] = &[
    ("name", &["name", "full_name"]),
    ("email", &["email", "email_address"]),
    ("phone", &["phone", "phone_number"]),
    ("org", &["current_company", "company", "org"]),
    ("location", &["location", "city"]),
    ("urls_linkedin", &["linkedin"]),
    ("urls_github", &["github"]),
    ("urls_twitter", &["twitter"]),
    ("urls_portfolio", &["portfolio", "website"]),
    ("urls_other", &["website", "other_url"]),
    ("comments", &["cover_letter", "comments"]),
    ("eeo_gender", &["gender"]),
    ("eeo_race", &["race"]),
    ("eeo_veteran", &["veteran_status", "veteran"]),
    ("eeo_disability", &["disability", "disability_status"]),
];

/// Screening question keywords -> profile key answering them. Checked in
/// order against the lowercased question text.
const QUESTION_KEYS: &[(&[&str], &str)] = &[
    (&["eligible", "authoriz"], "authorized"),
    (&["sponsor"], "sponsor"),
];

const TRUTHY: &[&str] = &["yes", "true", "y", "1", "on"];

/// Fills `form` from `profile`. Optional fields without a matching value
/// are left out; a required one fails the whole attempt.
pub fn map_form(
    form: &ApplicationForm,
    profile: &ApplicantProfile,
) -> Result<FormSubmission, SubmissionError> {
    let mut values = Vec::new();
    let mut attachments = Vec::new();

    for field in &form.fields {
        let filled = match field.kind {
            FieldKind::Hidden => {
                if let Some(value) = &field.default_value {
                    values.push((field.name.clone(), value.clone()));
                }
                true
            }
            FieldKind::File => match resume_for(field, profile) {
                Some(path) => {
                    attachments.push(Attachment {
                        field: field.name.clone(),
                        path,
                    });
                    true
                }
                None => false,
            },
            FieldKind::Text | FieldKind::TextArea => match lookup(field, profile) {
                Some(value) => {
                    values.push((field.name.clone(), value.to_string()));
                    true
                }
                None => false,
            },
            FieldKind::Select | FieldKind::Radio => {
                match lookup(field, profile).and_then(|value| choose_option(&field.options, value))
                {
                    Some(option) => {
                        values.push((field.name.clone(), option.value.clone()));
                        true
                    }
                    None => false,
                }
            }
            FieldKind::Checkbox => {
                let checked = lookup(field, profile).is_some_and(is_truthy);
                if checked {
                    let value = field.default_value.as_deref().unwrap_or("on");
                    values.push((field.name.clone(), value.to_string()));
                }
                checked
            }
        };

        if !filled {
            if field.required {
                return Err(SubmissionError::FieldNotFound(field.name.clone()));
            }
            debug!(field = %field.name, "no profile value for optional field");
        }
    }

    Ok(FormSubmission {
        action: form.action.clone(),
        values,
        attachments,
    })
}

fn lookup<'p>(field: &FormField, profile: &'p ApplicantProfile) -> Option<&'p str> {
    if let Some(value) = profile.get(&field.name) {
        return Some(value);
    }

    let normalized = normalize_key(&field.name);
    let aliased = ALIASES
        .iter()
        .find(|(name, _)| *name == normalized)
        .and_then(|(_, keys)| keys.iter().find_map(|key| profile.get(key)));
    if aliased.is_some() {
        return aliased;
    }

    let label = field.label.as_deref()?;
    let question = label.to_lowercase();
    QUESTION_KEYS
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| question.contains(needle)))
        .and_then(|(_, key)| profile.get(key))
        .or_else(|| profile.get(label))
}

fn resume_for(field: &FormField, profile: &ApplicantProfile) -> Option<std::path::PathBuf> {
    let name = normalize_key(&field.name);
    let label = field.label.as_deref().map(normalize_key).unwrap_or_default();
    let wants_resume = ["resume", "cv"]
        .iter()
        .any(|needle| name.contains(needle) || label.contains(needle));
    if wants_resume {
        profile.resume_path()
    } else {
        None
    }
}

/// Exact (case-insensitive) value or label match first, then an option
/// whose label starts with the answer ("Yes" -> "Yes, I am authorized").
fn choose_option<'f>(options: &'f [FieldOption], answer: &str) -> Option<&'f FieldOption> {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return None;
    }

    let candidates = options.iter().filter(|option| !option.value.is_empty());
    candidates
        .clone()
        .find(|option| {
            option.value.to_lowercase() == answer || option.label.trim().to_lowercase() == answer
        })
        .or_else(|| {
            candidates
                .clone()
                .find(|option| option.label.trim().to_lowercase().starts_with(&answer))
        })
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    TRUTHY.contains(&value.as_str())
}
