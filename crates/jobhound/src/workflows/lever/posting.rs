use chrono::{DateTime, Utc};
use scraper::Html;

use super::normalizer::{clean_text, dollar_amounts, element_text, first_text, selector};
use crate::workflows::listings::{JobListing, PostingLink, RecordError};

const SECTION: &str = "div.section.page-centered";
/// Section list items shorter than this are bullets or separators.
const MIN_ITEM_LEN: usize = 4;

/// Extracts a listing from a Lever posting page.
///
/// The `<title>` reads `Company - Job Title`; categories sit in
/// `div.location`, `div.department`, `div.commitment` and
/// `div.workplaceTypes`. The second and third centered sections hold the
/// description and qualification bullets. Salary comes from the
/// `salary-range` section, falling back to dollar amounts in the closing
/// paragraph; two amounts are needed to fill the range.
pub fn parse_posting(
    html: &str,
    link: &PostingLink,
    source: &str,
    discovered_at: DateTime<Utc>,
) -> Result<JobListing, RecordError> {
    let document = Html::parse_document(html);
    let parse_error = |detail: &str| RecordError::Parse {
        url: link.posting_url.to_string(),
        detail: detail.to_string(),
    };

    let heading = first_text(&document, "title").ok_or_else(|| parse_error("missing <title>"))?;
    let (company, title) = split_heading(&heading, link);
    if title.is_empty() {
        return Err(parse_error("empty job title"));
    }

    let location = if heading.to_lowercase().contains("remote") {
        Some("Remote".to_string())
    } else {
        category(&document, "location")
    };

    let sections = section_items(&document);
    let description = sections.get(1).cloned().unwrap_or_default();
    let qualifications = sections.get(2).cloned().filter(|text| !text.is_empty());
    let (min_salary, max_salary) = salary_range(&document);

    Ok(JobListing {
        id: link.id.clone(),
        title,
        company,
        location,
        source: source.to_string(),
        team: category(&document, "department"),
        commitment: category(&document, "commitment"),
        workplace: category(&document, "workplaceTypes"),
        min_salary,
        max_salary,
        description,
        qualifications,
        posting_url: link.posting_url.to_string(),
        apply_url: link.apply_url.to_string(),
        discovered_at,
    })
}

/// Falls back to the company slug in the URL when the title has no
/// separator.
fn split_heading(heading: &str, link: &PostingLink) -> (String, String) {
    match heading.split_once(" - ") {
        Some((company, title)) => (company.trim().to_string(), title.trim().to_string()),
        None => {
            let company = link
                .posting_url
                .path_segments()
                .and_then(|mut segments| segments.next())
                .unwrap_or_default()
                .to_string();
            (company, heading.trim().to_string())
        }
    }
}

fn category(document: &Html, class: &str) -> Option<String> {
    first_text(document, &format!("div.{class}"))
        .map(|text| text.trim_end_matches('/').trim().to_string())
        .filter(|text| !text.is_empty())
}

fn section_items(document: &Html) -> Vec<String> {
    let (Some(sections), Some(items)) = (selector(SECTION), selector("li")) else {
        return Vec::new();
    };

    document
        .select(&sections)
        .map(|section| {
            section
                .select(&items)
                .map(element_text)
                .filter(|text| text.chars().count() >= MIN_ITEM_LEN)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn salary_range(document: &Html) -> (Option<u32>, Option<u32>) {
    let text = first_text(document, &format!("{SECTION}[data-qa=\"salary-range\"]"))
        .or_else(|| first_text(document, &format!("{SECTION}[data-qa=\"closing-description\"]")))
        .map(|text| clean_text(&text))
        .unwrap_or_default();

    let mut amounts = dollar_amounts(&text);
    if amounts.len() < 2 {
        return (None, None);
    }
    amounts.sort_unstable_by(|a, b| b.cmp(a));
    (Some(amounts[1]), Some(amounts[0]))
}
