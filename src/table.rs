use tracing::{debug, trace};

use crate::comparator::{CellComparator, SortKey};
use crate::search;
use crate::sort::{SortDirection, SortState};

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub name: String,
    pub sortable: bool,
}

impl Header {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sortable: true,
        }
    }
}

/// One rendered record. Cells are trimmed display strings.
#[derive(Debug, Clone)]
pub struct Row {
    cells: Vec<String>,
    search_text: String, // Lower-cased concatenation of all cells
    visible: bool,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        let cells: Vec<String> = cells.into_iter().map(|c| c.trim().to_string()).collect();
        let search_text = cells.join(" ").to_lowercase();
        Self {
            cells,
            search_text,
            visible: true,
        }
    }

    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// The rows of the current page together with their sort state.
pub struct TableView {
    name: String,
    headers: Vec<Header>,
    rows: Vec<Row>,
    sort: SortState,
}

impl TableView {
    pub fn new(name: impl Into<String>, headers: Vec<Header>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
            sort: SortState::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows currently shown, in display order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| r.is_visible())
    }

    pub fn visible_len(&self) -> usize {
        self.visible_rows().count()
    }

    pub fn visible_row(&self, idx: usize) -> Option<&Row> {
        self.visible_rows().nth(idx)
    }

    fn sort_by_column(&mut self, column: usize, cmp: &CellComparator) -> Option<SortDirection> {
        if !self.headers.get(column)?.sortable {
            trace!("Column {column} is not sortable");
            return None;
        }
        let direction = self.sort.activate(column);

        // Hidden rows are reordered as well, so a later search shows them in order.
        let mut keyed: Vec<(SortKey, Row)> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| (CellComparator::key(row.cell(column).unwrap_or("")), row))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| {
            let ord = cmp.compare_keys(a, b);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();
        debug!(
            "Sorted {} rows by \"{}\" {:?}",
            self.rows.len(),
            self.headers[column].name,
            direction
        );
        Some(direction)
    }
}

/// Activate the header of `column`. Returns `None` when there is no table,
/// the column does not exist or is not sortable.
pub fn sort_table(
    view: Option<&mut TableView>,
    column: usize,
    cmp: &CellComparator,
) -> Option<SortDirection> {
    view?.sort_by_column(column, cmp)
}

/// Show only rows containing `query`. Returns the number of visible rows, or
/// `None` without a table.
pub fn search_table(view: Option<&mut TableView>, query: &str) -> Option<usize> {
    let view = view?;
    let shown = search::apply(&mut view.rows, query);
    trace!("Search \"{query}\" shows {shown}/{} rows", view.rows.len());
    Some(shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> TableView {
        let headers = vec![Header::new("client"), Header::new("montant"), Header::new("statut")];
        let rows = vec![
            vec!["Étienne", "450 FCFA", "A RELANCER"],
            vec!["aminata", "1 200 FCFA", "-"],
            vec!["Zoé", "89 FCFA", "A SURVEILLER"],
            vec!["Bintou", "12 450 FCFA", "AUJOURD'HUI"],
        ]
        .into_iter()
        .map(|r| Row::new(r.into_iter().map(String::from).collect()))
        .collect();
        TableView::new("creances.csv", headers, rows)
    }

    fn column(view: &TableView, idx: usize) -> Vec<String> {
        view.visible_rows()
            .map(|r| r.cell(idx).unwrap().to_string())
            .collect()
    }

    fn amounts(view: &TableView) -> Vec<f64> {
        view.visible_rows()
            .map(|r| crate::comparator::parse_numeric(r.cell(1).unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn cells_are_trimmed() {
        let row = Row::new(vec!["  450 FCFA ".into()]);
        assert_eq!(row.cell(0), Some("450 FCFA"));
        assert_eq!(row.cell(1), None);
    }

    #[test]
    fn numeric_column_sorts_both_ways() {
        let cmp = CellComparator::french().unwrap();
        let mut view = view();

        assert_eq!(sort_table(Some(&mut view), 1, &cmp), Some(SortDirection::Ascending));
        let asc = amounts(&view);
        assert!(asc.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(sort_table(Some(&mut view), 1, &cmp), Some(SortDirection::Descending));
        let desc = amounts(&view);
        assert!(desc.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn text_column_uses_french_collation() {
        let cmp = CellComparator::french().unwrap();
        let mut view = view();
        sort_table(Some(&mut view), 0, &cmp);
        assert_eq!(column(&view, 0), vec!["aminata", "Bintou", "Étienne", "Zoé"]);
    }

    #[test]
    fn even_number_of_activations_returns_to_ascending() {
        let cmp = CellComparator::french().unwrap();
        let mut view = view();
        sort_table(Some(&mut view), 0, &cmp);
        let ascending = column(&view, 0);
        for _ in 0..4 {
            sort_table(Some(&mut view), 0, &cmp);
        }
        assert_eq!(column(&view, 0), ascending);
        sort_table(Some(&mut view), 0, &cmp);
        let mut reversed = ascending.clone();
        reversed.reverse();
        assert_eq!(column(&view, 0), reversed);
    }

    #[test]
    fn switching_column_restarts_ascending() {
        let cmp = CellComparator::french().unwrap();
        let mut view = view();
        sort_table(Some(&mut view), 1, &cmp);
        sort_table(Some(&mut view), 1, &cmp);
        assert_eq!(sort_table(Some(&mut view), 2, &cmp), Some(SortDirection::Ascending));
        assert_eq!(view.sort_state().column(), Some(2));
    }

    #[test]
    fn missing_table_or_column_is_not_available() {
        let cmp = CellComparator::french().unwrap();
        assert_eq!(sort_table(None, 0, &cmp), None);
        assert_eq!(search_table(None, "x"), None);

        let mut view = view();
        assert_eq!(sort_table(Some(&mut view), 7, &cmp), None);
        assert_eq!(view.sort_state().column(), None);
    }

    #[test]
    fn unsortable_header_is_skipped() {
        let cmp = CellComparator::french().unwrap();
        let mut view = view();
        view.headers[2].sortable = false;
        assert_eq!(sort_table(Some(&mut view), 2, &cmp), None);
        assert_eq!(view.sort_state().column(), None);
    }

    #[test]
    fn sort_keeps_hidden_rows_hidden() {
        let cmp = CellComparator::french().unwrap();
        let mut view = view();
        assert_eq!(search_table(Some(&mut view), "relancer"), Some(1));
        sort_table(Some(&mut view), 1, &cmp);
        assert_eq!(view.visible_len(), 1);
        assert_eq!(view.len(), 4);
        assert_eq!(view.visible_row(0).unwrap().cell(0), Some("Étienne"));

        assert_eq!(search_table(Some(&mut view), ""), Some(4));
        assert_eq!(amounts(&view), vec![89.0, 450.0, 1200.0, 12450.0]);
    }

    #[test]
    fn large_mixed_column_sorts_totally() {
        let cmp = CellComparator::french().unwrap();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };
        let rows = (0..3000)
            .map(|_| {
                let letter = (b'A' + (next() % 26) as u8) as char;
                let cell = if next() % 2 == 0 {
                    format!("{letter}Z")
                } else {
                    format!("{letter} {}", next() % 1000)
                };
                Row::new(vec![cell])
            })
            .collect();
        let mut view = TableView::new("references.csv", vec![Header::new("reference")], rows);

        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            assert_eq!(sort_table(Some(&mut view), 0, &cmp), Some(direction));
            let cells = column(&view, 0);
            assert_eq!(cells.len(), 3000);
            assert!(cells.windows(2).all(|w| {
                let ord = cmp.compare(&w[0], &w[1]);
                match direction {
                    SortDirection::Ascending => ord.is_le(),
                    SortDirection::Descending => ord.is_ge(),
                }
            }));
        }

        sort_table(Some(&mut view), 0, &cmp);
        let cells = column(&view, 0);
        let first_text = cells
            .iter()
            .position(|c| crate::comparator::parse_numeric(c).is_none())
            .unwrap();
        assert!(cells[first_text..].iter().all(|c| c.ends_with('Z')));
        assert!(cells[..first_text].iter().all(|c| !c.ends_with('Z')));
    }
}
