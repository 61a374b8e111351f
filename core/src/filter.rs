//! View-side filtering of the todo list.

use std::fmt;
use std::str::FromStr;

use crate::types::Todo;

/// Which subset of the list is displayed. Pure view state, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    pub const ALL_MODES: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Completed];

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !todo.completed,
            FilterMode::Completed => todo.completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Active => "Active",
            FilterMode::Completed => "Completed",
        }
    }

    /// Hash-route spelling, also accepted by `FromStr`.
    pub fn route(self) -> &'static str {
        match self {
            FilterMode::All => "#/",
            FilterMode::Active => "#/active",
            FilterMode::Completed => "#/completed",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        })
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(FilterMode::All);
        }
        FilterMode::ALL_MODES
            .into_iter()
            .find(|mode| mode.to_string() == wanted || mode.route() == wanted)
            .ok_or_else(|| format!("unknown filter '{wanted}', expected all, active or completed"))
    }
}

/// Returns the items matching `mode`, preserving their relative order.
pub fn project<T: AsRef<Todo>>(items: &[T], mode: FilterMode) -> Vec<&T> {
    items
        .iter()
        .filter(|item| mode.matches(<T as AsRef<Todo>>::as_ref(item)))
        .collect()
}

/// Number of items that are not completed.
pub fn active_count<T: AsRef<Todo>>(items: &[T]) -> usize {
    items
        .iter()
        .filter(|item| !<T as AsRef<Todo>>::as_ref(item).completed)
        .count()
}

pub fn completed_count<T: AsRef<Todo>>(items: &[T]) -> usize {
    items.len() - active_count(items)
}
