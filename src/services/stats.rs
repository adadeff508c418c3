use crate::models::activity::Activity;

/// Counters over the whole collection, independent of the current view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub estimated_hours: f64,
}

pub fn compute_stats(activities: &[Activity]) -> Stats {
    let completed = activities.iter().filter(|a| a.completed).count();
    Stats {
        total: activities.len(),
        completed,
        pending: activities.len() - completed,
        estimated_hours: activities.iter().map(|a| a.estimated_time).sum(),
    }
}
