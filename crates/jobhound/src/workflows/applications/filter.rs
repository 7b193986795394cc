use super::domain::{ApplicationStatus, TrackedListing};
use super::repository::{ListingStore, StoreError};

/// Pending rows, oldest discovery first. Ties fall back to the listing id so
/// the order is deterministic.
pub fn pending_in_order(rows: Vec<TrackedListing>) -> Vec<TrackedListing> {
    let mut pending: Vec<TrackedListing> = rows
        .into_iter()
        .filter(TrackedListing::is_pending)
        .collect();
    pending.sort_by(|a, b| {
        a.listing
            .discovered_at
            .cmp(&b.listing.discovered_at)
            .then_with(|| a.listing.id.cmp(&b.listing.id))
    });
    pending
}

/// Reads the store and returns the rows still awaiting an application.
pub fn pending_applications<S>(store: &S) -> Result<Vec<TrackedListing>, StoreError>
where
    S: ListingStore + ?Sized,
{
    Ok(pending_in_order(store.load()?))
}

/// Row counts per status, in lifecycle order.
pub fn status_counts(rows: &[TrackedListing]) -> Vec<(ApplicationStatus, usize)> {
    ApplicationStatus::ordered()
        .into_iter()
        .map(|status| {
            let count = rows
                .iter()
                .filter(|row| row.application.status == status)
                .count();
            (status, count)
        })
        .collect()
}
