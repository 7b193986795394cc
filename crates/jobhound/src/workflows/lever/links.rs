use url::Url;

use crate::workflows::listings::PostingLink;

const BOARD_DOMAIN: &str = "lever.co";
const APPLY_SEGMENT: &str = "apply";

/// Turns a search hit into a posting link when it points at a single Lever
/// posting (`/<company>/<posting id>`, optionally followed by `/apply`).
/// Board indexes, search pages and other hosts are rejected.
pub fn posting_link(url: &Url) -> Option<PostingLink> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    if host != BOARD_DOMAIN && !host.ends_with(&format!(".{BOARD_DOMAIN}")) {
        return None;
    }
    if url.query_pairs().any(|(key, _)| key == "q") {
        return None;
    }

    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();
    let (company, posting) = match segments.as_slice() {
        [company, posting] | [company, posting, APPLY_SEGMENT] => (*company, *posting),
        _ => return None,
    };
    if posting.eq_ignore_ascii_case(APPLY_SEGMENT) {
        return None;
    }

    let posting_url = Url::parse(&format!("https://{host}/{company}/{posting}")).ok()?;
    let apply_url = Url::parse(&format!("{posting_url}/{APPLY_SEGMENT}")).ok()?;
    Some(PostingLink::new(posting_url, apply_url))
}
