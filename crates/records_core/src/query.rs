use crate::Status;

/// Categorical filter over the status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    /// Parses `"All"` (any case) or a status label.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Some(StatusFilter::All);
        }
        Status::parse(raw).map(StatusFilter::Only)
    }

    pub fn matches(self, status: Option<Status>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == Some(wanted),
        }
    }
}

/// Tri-state column sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

impl SortDirection {
    /// unsorted -> ascending -> descending -> unsorted
    pub fn next(self) -> Self {
        match self {
            SortDirection::Unsorted => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Unsorted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: Option<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        if direction == SortDirection::Unsorted {
            return Self::unsorted();
        }
        Self {
            field: Some(field.into()),
            direction,
        }
    }

    /// The active `(field, direction)` pair, or `None` for pass-through.
    pub fn active(&self) -> Option<(&str, SortDirection)> {
        match (&self.field, self.direction) {
            (_, SortDirection::Unsorted) | (None, _) => None,
            (Some(field), direction) => Some((field.as_str(), direction)),
        }
    }
}

/// Immutable query value; every interaction produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuerySpec {
    pub text: String,
    pub status: StatusFilter,
    pub sort: SortSpec,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    pub fn with_status(&self, status: StatusFilter) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: SortSpec) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    /// Header-click rule: the same column advances the tri-state cycle, a new
    /// column starts at ascending.
    pub fn cycle_sort(&self, field: &str) -> Self {
        let direction = match self.sort.active() {
            Some((current, direction)) if current == field => direction.next(),
            _ => SortDirection::Ascending,
        };
        self.with_sort(SortSpec::by(field, direction))
    }
}
