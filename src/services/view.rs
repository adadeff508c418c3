use feruca::Collator;

use crate::models::{
    activity::Activity,
    view::{SortKey, StatusFilter, ViewState},
};

/// Produces the records to display: status filter, then search, then sort.
/// The input is never reordered or mutated.
pub fn visible_activities<'a>(activities: &'a [Activity], view: &ViewState) -> Vec<&'a Activity> {
    let query = view.search_query.trim().to_lowercase();

    let mut list: Vec<&Activity> = activities
        .iter()
        .filter(|a| matches_status(a, view.status_filter))
        .filter(|a| query.is_empty() || matches_query(a, &query))
        .collect();

    // `sort_by` is stable, equal keys keep their filtered order
    match view.sort_key {
        SortKey::None => {}
        SortKey::Title => {
            let mut collator = Collator::default();
            list.sort_by(|a, b| {
                collator
                    .collate(a.title.as_str(), b.title.as_str())
                    .then_with(|| a.title.cmp(&b.title))
            });
        }
        SortKey::Priority => list.sort_by_key(|a| a.priority.rank()),
        SortKey::Deadline => list.sort_by(|a, b| a.deadline.cmp(&b.deadline)),
    }

    list
}

fn matches_status(activity: &Activity, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Pending => !activity.completed,
        StatusFilter::Completed => activity.completed,
    }
}

/// `query` must already be trimmed and lower-cased
fn matches_query(activity: &Activity, query: &str) -> bool {
    activity.title.to_lowercase().contains(query)
        || activity.subject.to_lowercase().contains(query)
}
