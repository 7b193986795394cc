use scraper::{ElementRef, Html, Selector};

/// Collapses whitespace and drops the list markup noise Lever leaves in
/// scraped text (non-breaking spaces, brackets, stray quotes).
pub(crate) fn clean_text(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
        .replace(['[', ']', '"'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Cleaned text of the first element matching `css`, if it has any.
pub(crate) fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Whole-dollar amounts mentioned in `text`: `$120,000`, `$95k`, `$48.50`.
/// Ranges such as `$120,000-$150,000` yield both ends.
pub(crate) fn dollar_amounts(text: &str) -> Vec<u32> {
    text.split(|c: char| c.is_whitespace() || matches!(c, '-' | '\u{2013}' | '\u{2014}' | '/'))
        .filter_map(|token| token.split_once('$').map(|(_, amount)| amount))
        .filter_map(parse_amount)
        .collect()
}

fn parse_amount(raw: &str) -> Option<u32> {
    let raw = raw.trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
    let (digits, multiplier) = match raw.strip_suffix(['k', 'K']) {
        Some(rest) => (rest, 1_000.0),
        None => (raw, 1.0),
    };
    let digits: String = digits.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let value = digits.parse::<f64>().ok()? * multiplier;
    if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) {
        Some(value.round() as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_markup_noise() {
        assert_eq!(
            clean_text("  Build\u{a0}[data] \"pipelines\"\n\n  daily "),
            "Build data pipelines daily"
        );
    }

    #[test]
    fn dollar_amounts_handles_ranges_and_suffixes() {
        assert_eq!(
            dollar_amounts("The range is $120,000-$150,000 per year."),
            vec![120_000, 150_000]
        );
        assert_eq!(dollar_amounts("$95k \u{2013} $110K"), vec![95_000, 110_000]);
        assert_eq!(dollar_amounts("Hourly: $48.50/hr"), vec![49]);
    }

    #[test]
    fn dollar_amounts_ignores_text_without_amounts() {
        assert!(dollar_amounts("Competitive pay and $ equity").is_empty());
        assert!(dollar_amounts("no salary here").is_empty());
    }
}
