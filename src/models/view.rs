use clap::ValueEnum;

/// Which records survive the first pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    Title,
    Priority,
    Deadline,
}

impl SortKey {
    /// Unknown keys fall back to `None` so a stale selection never hides records.
    pub fn parse_lenient(value: &str) -> SortKey {
        match value.trim().to_lowercase().as_str() {
            "title" => SortKey::Title,
            "priority" => SortKey::Priority,
            "deadline" => SortKey::Deadline,
            _ => SortKey::None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub status_filter: StatusFilter,
    pub search_query: String,
    pub sort_key: SortKey,
}
