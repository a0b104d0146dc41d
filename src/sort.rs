#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Which column of a view is sorted and how.
///
/// Re-activating the active column flips the direction, any other column
/// starts ascending. The state lives as long as the view it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    column: Option<usize>,
    direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: None,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    pub fn activate(&mut self, column: usize) -> SortDirection {
        if self.column == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Ascending;
        }
        self.direction
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Arrow for the header of `column`, if it is the sorted one.
    pub fn indicator(&self, column: usize) -> Option<&'static str> {
        (self.column == Some(column)).then(|| self.direction.arrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_active_column() {
        let state = SortState::default();
        assert_eq!(state.column(), None);
        assert_eq!(state.indicator(0), None);
    }

    #[test]
    fn same_column_toggles_other_column_resets() {
        let mut state = SortState::default();
        assert_eq!(state.activate(2), SortDirection::Ascending);
        assert_eq!(state.activate(2), SortDirection::Descending);
        assert_eq!(state.indicator(2), Some("▼"));

        assert_eq!(state.activate(3), SortDirection::Ascending);
        assert_eq!(state.column(), Some(3));
        assert_eq!(state.indicator(2), None);
        assert_eq!(state.indicator(3), Some("▲"));
    }

    #[test]
    fn descending_column_turns_ascending_again() {
        let mut state = SortState::default();
        state.activate(1);
        state.activate(1);
        assert_eq!(state.activate(1), SortDirection::Ascending);
    }
}
