use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use jobhound::net::{PageFetcher, TransportError};
use jobhound::workflows::applications::{
    status_counts, ApplicantProfile, ApplicationForm, ApplicationStatus, Applicator,
    ApplyOptions, CsvListingStore, FormGateway, FormSubmission, ListingStore, RunSummary,
    SubmissionError,
};
use jobhound::workflows::lever::{parse_application_form, LeverSource};
use jobhound::workflows::listings::{
    JobSource, ListingCollector, ScrapeHistory, SearchCriteria,
};
use jobhound::workflows::pacing::Pacer;
use jobhound::workflows::search::{SearchEngine, SearchError};
use url::Url;

const POSTING_ONE: &str = "https://jobs.lever.co/acme/0001";
const POSTING_TWO: &str = "https://jobs.lever.co/globex/0002";

#[derive(Debug)]
struct FixedResults(Vec<&'static str>);

impl SearchEngine for FixedResults {
    fn name(&self) -> &str {
        "fixed"
    }

    fn search(&self, query: &str, _pages: usize) -> Result<Vec<Url>, SearchError> {
        assert!(query.starts_with("site:jobs.lever.co"));
        Ok(self
            .0
            .iter()
            .map(|hit| Url::parse(hit).expect("fixture url"))
            .collect())
    }
}

#[derive(Debug, Default)]
struct FixturePages(HashMap<String, String>);

impl PageFetcher for FixturePages {
    fn fetch_page(&self, url: &Url) -> Result<String, TransportError> {
        self.0
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| TransportError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

fn posting_page(company: &str, title: &str, location: &str) -> String {
    format!(
        r#"<html><head><title>{company} - {title}</title></head><body>
        <div class="location">{location}</div>
        <div class="commitment">Full-time</div>
        <div class="section page-centered"><p>About us</p></div>
        <div class="section page-centered"><ul><li>Ship reliable data pipelines</li></ul></div>
        <div class="section page-centered"><ul><li>Three years of Rust</li></ul></div>
        <div class="section page-centered" data-qa="salary-range">$130,000 - $160,000</div>
        </body></html>"#
    )
}

const APPLY_PAGE: &str = r#"<html><body>
<form id="application-form" action="" method="POST">
  <div class="application-question"><div class="application-label">Full name</div><input name="name" required></div>
  <div class="application-question"><div class="application-label">Email</div><input type="email" name="email" required></div>
  <div class="application-question"><div class="application-label">Current company</div><input name="org"></div>
  <div class="application-question custom-question">
    <div class="text">Are you authorized to work in the US?</div>
    <label><input type="radio" name="cards[a][field0]" value="Yes" required>Yes</label>
    <label><input type="radio" name="cards[a][field0]" value="No">No</label>
  </div>
</form></body></html>"#;

/// Parses the real form markup and records submissions instead of posting.
#[derive(Debug, Default)]
struct RecordingGateway {
    submitted: Mutex<Vec<FormSubmission>>,
    unreachable: Vec<String>,
}

impl FormGateway for RecordingGateway {
    fn load_form(&self, apply_url: &Url) -> Result<ApplicationForm, SubmissionError> {
        if self.unreachable.iter().any(|url| url == apply_url.as_str()) {
            return Err(SubmissionError::Timeout);
        }
        parse_application_form(APPLY_PAGE, apply_url)
    }

    fn submit(&self, submission: &FormSubmission) -> Result<(), SubmissionError> {
        self.submitted
            .lock()
            .expect("gateway mutex poisoned")
            .push(submission.clone());
        Ok(())
    }
}

fn workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("jobhound-it-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn lever_collector() -> ListingCollector {
    let mut pages = HashMap::new();
    pages.insert(
        POSTING_ONE.to_string(),
        posting_page("Acme", "Data Engineer", "Austin, TX"),
    );
    pages.insert(
        POSTING_TWO.to_string(),
        posting_page("Globex", "Analytics Engineer", "Austin, TX"),
    );
    let source = LeverSource::new(
        FixedResults(vec![
            POSTING_ONE,
            "https://jobs.lever.co/acme/0001/apply",
            POSTING_TWO,
            "https://jobs.lever.co/acme",
        ]),
        Arc::new(FixturePages(pages)),
    );
    ListingCollector::new(vec![Box::new(source) as Box<dyn JobSource>], Pacer::disabled())
}

#[test]
fn collect_then_apply_persists_outcomes_in_csv() {
    let dir = workspace("pipeline");
    let store = CsvListingStore::new(dir.join("output").join("main.csv"));
    let mut history =
        ScrapeHistory::load(dir.join("output").join("scraped_urls.txt")).expect("history");
    let mut criteria = SearchCriteria::new("data engineer");
    criteria.location = Some("Austin".to_string());

    let collection = lever_collector()
        .collect_into(&criteria, &store, &mut history)
        .expect("collect");
    assert_eq!(collection.collected.len(), 2);
    assert!(collection.warnings.is_empty());

    let rows = store.load().expect("rows");
    assert_eq!(rows[0].listing.company, "Acme");
    assert_eq!(rows[0].listing.min_salary, Some(130_000));
    assert_eq!(rows[0].listing.max_salary, Some(160_000));
    assert_eq!(rows[0].listing.apply_url, "https://jobs.lever.co/acme/0001/apply");

    let profile = ApplicantProfile::from_json(
        r#"{"name": "Ada Lovelace", "email": "ada@example.com", "current_company": "Engines",
            "authorized": "Yes", "phone": null}"#,
    )
    .expect("profile");
    let gateway = RecordingGateway {
        unreachable: vec!["https://jobs.lever.co/globex/0002/apply".to_string()],
        ..RecordingGateway::default()
    };

    let report = Applicator::new(
        &store,
        &gateway,
        &profile,
        Pacer::disabled(),
        ApplyOptions::default(),
    )
    .run()
    .expect("apply");

    let mut summary = RunSummary::default();
    summary.record_collection(&collection);
    summary.record_applications(&report);
    assert_eq!(summary.to_string(), "collected: 2, applied: 1, failed: 1");

    let submitted = gateway.submitted.lock().expect("gateway mutex poisoned");
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].value("org"), Some("Engines"));
    assert_eq!(submitted[0].value("cards[a][field0]"), Some("Yes"));

    let reopened = CsvListingStore::new(store.path());
    let rows = reopened.load().expect("reload");
    assert_eq!(
        status_counts(&rows),
        vec![
            (ApplicationStatus::Pending, 0),
            (ApplicationStatus::Applied, 1),
            (ApplicationStatus::Failed, 1),
        ]
    );
    let failed = rows
        .iter()
        .find(|row| row.application.status == ApplicationStatus::Failed)
        .expect("failed row");
    assert_eq!(failed.application.failure_reason.as_deref(), Some("timeout"));

    let second = lever_collector()
        .collect_into(&criteria, &store, &mut history)
        .expect("second collect");
    assert!(second.collected.is_empty());
    assert_eq!(store.load().expect("rows").len(), 2);

    let _ = std::fs::remove_dir_all(dir);
}
