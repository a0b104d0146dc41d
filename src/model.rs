use chrono::Local;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, trace};

use crate::calc::{self, format_date};
use crate::comparator::CellComparator;
use crate::domain::{HELP_TEXT, Message, TVConfig, TVError};
use crate::filters::{FilterKey, Location};
use crate::form::{
    self, DATE_ECHEANCE, DATE_FACTURATION, FieldKind, Form, FormKind, SOLDE_CALCULE,
};
use crate::inputter::{InputResult, Inputter};
use crate::source::DataSource;
use crate::table::{self, TableView};
use crate::theme::{Theme, ThemeManager, ThemeStore};
use crate::toast::{Phase, Toast, ToastKind, Toasts};
use crate::ui::{
    CMDLINE_HEIGH, COLUMN_WIDTH_MARGIN, SCROLLBAR_WIDTH, TABLE_BORDER, TABLE_HEADER_HEIGHT,
    TITLE_HEIGHT,
};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modus {
    TABLE,
    POPUP,
    SEARCH,
    FORM,
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let table_width = ui_width.saturating_sub(2 * TABLE_BORDER + SCROLLBAR_WIDTH);
        let table_height = ui_height
            .saturating_sub(TITLE_HEIGHT + CMDLINE_HEIGH + TABLE_HEADER_HEIGHT + 2 * TABLE_BORDER);

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width,
            table_height,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: TVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    source: Option<DataSource>,
    location: Option<Location>,
    table: Option<TableView>,
    column_widths: Vec<usize>,
    comparator: CellComparator,
    theme: ThemeManager,
    toasts: Toasts,
    form: Option<Form>,
    input: Inputter,
    last_input: InputResult,
    search_query: String,
    curser_row: usize, // Index into the visible rows
    curser_column: usize,
    offset_row: usize,
    offset_column: usize,
    uilayout: UILayout,
    clock: String,
    last_clock_update: Instant,
    status_message: String,
}

impl Model {
    pub fn init(
        config: &TVConfig,
        store: Box<dyn ThemeStore>,
        ui_width: usize,
        ui_height: usize,
    ) -> Result<Self, TVError> {
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            source: None,
            location: None,
            table: None,
            column_widths: Vec::new(),
            comparator: CellComparator::french()?,
            theme: ThemeManager::init(store),
            toasts: Toasts::new(config.toast_duration, config.toast_slide),
            form: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            search_query: String::new(),
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            offset_column: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            clock: String::new(),
            last_clock_update: Instant::now(),
            status_message: "Started ctv!".to_string(),
        };
        model.refresh_clock();
        Ok(model)
    }

    pub fn load_data_file(&mut self, path: PathBuf, query: &str) -> Result<bool, TVError> {
        let start_time = Instant::now();
        let source = DataSource::load(path, &self.config.unsortable_columns)?;
        let location = Location::new(source.path().to_string_lossy(), query);
        self.source = Some(source);
        self.navigate(location);
        self.set_status_message(format!(
            "Loaded data in {}ms ...",
            start_time.elapsed().as_millis()
        ));
        Ok(true)
    }

    /// Reload the page for `location`. Search and sort state start over.
    fn navigate(&mut self, location: Location) {
        let Some(source) = self.source.as_ref() else {
            trace!("No data loaded, cannot open {location}");
            return;
        };
        let table = source.render(&location);
        info!("Showing {} ({} rows)", table.name(), table.len());
        self.column_widths = Self::calculate_column_widths(&table, self.config.max_column_width);
        self.table = Some(table);
        self.location = Some(location);
        self.search_query.clear();
        self.curser_row = 0;
        self.offset_row = 0;
        self.curser_column = 0;
        self.offset_column = 0;
    }

    fn calculate_column_widths(table: &TableView, max_column_width: usize) -> Vec<usize> {
        table
            .headers()
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                // Room for the sort arrow behind the name
                let header_width = header.name.chars().count() + 2;
                let data_width = table
                    .visible_rows()
                    .map(|r| r.cell(idx).map(|c| c.chars().count()).unwrap_or(0))
                    .max()
                    .unwrap_or(0);
                std::cmp::min(
                    std::cmp::max(header_width, data_width) + COLUMN_WIDTH_MARGIN,
                    max_column_width,
                )
            })
            .collect()
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn refresh_clock(&mut self) {
        self.clock = calc::format_clock(&Local::now());
        self.last_clock_update = Instant::now();
    }

    /// Timer driven work, independent of the table.
    fn tick(&mut self, now: Instant) {
        self.toasts.expire(now);
        if now.saturating_duration_since(self.last_clock_update) >= self.config.clock_refresh {
            self.refresh_clock();
        }
    }

    pub fn raw_keyevents(&self) -> bool {
        matches!(self.modus, Modus::SEARCH | Modus::FORM)
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.scroll_to_curser();
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TVError> {
        self.tick(Instant::now());

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_table_selection_down(1),
                    Message::MoveUp => self.move_table_selection_up(1),
                    Message::MoveLeft => self.move_table_selection_left(),
                    Message::MoveRight => self.move_table_selection_right(),
                    Message::MovePageUp => {
                        self.move_table_selection_up(self.uilayout.table_height.max(1))
                    }
                    Message::MovePageDown => {
                        self.move_table_selection_down(self.uilayout.table_height.max(1))
                    }
                    Message::MoveBeginning => self.move_table_selection_beginning(),
                    Message::MoveEnd => self.move_table_selection_end(),
                    Message::MoveToFirstColumn => self.select_column(0),
                    Message::MoveToLastColumn => {
                        self.select_column(self.column_widths.len().saturating_sub(1))
                    }
                    Message::SortCurrentColumn => self.sort_column(self.curser_column),
                    Message::SortColumn(idx) => self.sort_column(idx),
                    Message::Search => self.enter_search_mode(),
                    Message::Filter => self.open_filter_form(),
                    Message::ResetFilters => self.reset_filters(),
                    Message::ToggleTheme => self.toggle_theme(),
                    Message::Calculator => self.open_calculator_form(),
                    Message::Help => self.show_help(),
                    Message::Exit => self.clear_search(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Enter | Message::Help => self.exit_popup(),
                    _ => (),
                },
                Modus::SEARCH | Modus::FORM => match msg {
                    Message::RawKey(key) => self.raw_input(key),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Quit => self.quit(),
                    _ => (),
                },
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn exit_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        match self.modus {
            Modus::SEARCH => self.search_input(key),
            Modus::FORM => self.form_input(key),
            _ => {}
        }
    }

    fn sort_column(&mut self, column: usize) {
        match table::sort_table(self.table.as_mut(), column, &self.comparator) {
            Some(direction) => {
                let name = self
                    .table
                    .as_ref()
                    .and_then(|t| t.headers().get(column))
                    .map(|h| h.name.clone())
                    .unwrap_or_default();
                self.set_status_message(format!("Tri par {name} {}", direction.arrow()));
                self.select_column(column);
            }
            None => trace!("Sorting column {column} not available"),
        }
    }

    fn enter_search_mode(&mut self) {
        if self.table.is_none() {
            return;
        }
        trace!("Entering search mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::SEARCH;
        self.input.set(&self.search_query);
        self.last_input = self.input.get();
    }

    fn search_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            self.search(self.last_input.input.clone());
        }
        if self.last_input.finished {
            self.modus = Modus::TABLE;
            self.previous_modus = Modus::SEARCH;
        }
    }

    fn search(&mut self, query: String) {
        self.search_query = query;
        if let Some(shown) = table::search_table(self.table.as_mut(), &self.search_query) {
            self.curser_row = 0;
            self.offset_row = 0;
            let total = self.table.as_ref().map(|t| t.len()).unwrap_or(0);
            self.set_status_message(format!("{shown}/{total} lignes"));
        }
    }

    fn clear_search(&mut self) {
        if !self.search_query.is_empty() {
            self.search(String::new());
        }
    }

    fn reset_filters(&mut self) {
        if let Some(location) = self.location.as_ref().map(|l| l.reset_filters()) {
            self.navigate(location);
            self.toasts.show("Filtres réinitialisés", ToastKind::Info);
        }
    }

    fn toggle_theme(&mut self) {
        let message = match self.theme.toggle() {
            Theme::Dark => "Thème sombre activé",
            Theme::Light => "Thème clair activé",
        };
        self.toasts.show(message, ToastKind::Info);
    }

    fn open_filter_form(&mut self) {
        let (Some(source), Some(location)) = (self.source.as_ref(), self.location.as_ref()) else {
            return;
        };
        let form = Form::filters(
            &location.selection(),
            source.distinct_values(FilterKey::Commercial),
            source.distinct_values(FilterKey::Statut),
        );
        self.open_form(form);
    }

    fn open_calculator_form(&mut self) {
        let mut form = Form::calculator();
        form.default_dates(Local::now().date_naive());
        form::calculer_date_echeance(Some(&mut form), self.config.due_days);
        form::calculer_solde(Some(&mut form));
        self.open_form(form);
    }

    fn open_form(&mut self, form: Form) {
        trace!("Open form {:?}", form.kind);
        self.form = Some(form);
        self.previous_modus = self.modus;
        self.modus = Modus::FORM;
        self.load_focused_field();
    }

    fn close_form(&mut self) {
        self.form = None;
        self.input.clear();
        self.last_input = self.input.get();
        self.modus = Modus::TABLE;
        self.previous_modus = Modus::FORM;
    }

    fn load_focused_field(&mut self) {
        let value = self
            .form
            .as_ref()
            .and_then(|f| f.focused())
            .map(|f| f.value.clone())
            .unwrap_or_default();
        self.input.set(&value);
        self.last_input = self.input.get();
    }

    fn form_input(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            self.modus = Modus::TABLE;
            return;
        };
        let on_select = matches!(
            form.focused().map(|f| &f.kind),
            Some(FieldKind::Select { .. })
        );
        match key.code {
            KeyCode::Esc => self.close_form(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => {
                form.focus_next();
                self.load_focused_field();
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus_prev();
                self.load_focused_field();
            }
            KeyCode::Left | KeyCode::Right if on_select => {
                form.cycle_option(key.code == KeyCode::Right);
            }
            _ if on_select => {}
            _ => {
                let result = self.input.read(key);
                if result.changed {
                    form.set_focused_value(&result.input);
                    self.last_input = result;
                    self.recompute_form();
                } else {
                    self.last_input = result;
                }
            }
        }
    }

    fn recompute_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        if form.kind != FormKind::Calculator {
            return;
        }
        let invoice_date_changed =
            form.focused().map(|f| f.name.as_str()) == Some(DATE_FACTURATION);
        form::calculer_solde(self.form.as_mut());
        if invoice_date_changed {
            form::calculer_date_echeance(self.form.as_mut(), self.config.due_days);
        }
    }

    fn submit_form(&mut self) {
        let Some(kind) = self.form.as_ref().map(|f| f.kind) else {
            return;
        };
        match kind {
            FormKind::Filters => {
                let selection = self
                    .form
                    .as_ref()
                    .map(|f| f.selection())
                    .unwrap_or_default();
                let location = self.location.as_ref().map(|l| l.apply_filters(&selection));
                if let Some(location) = location {
                    self.navigate(location);
                    let message = if selection.is_empty() {
                        "Filtres réinitialisés"
                    } else {
                        "Filtres appliqués"
                    };
                    self.toasts.show(message, ToastKind::Info);
                }
                self.close_form();
            }
            FormKind::Calculator => {
                if form::validate_form(self.form.as_mut()) {
                    let summary = self
                        .form
                        .as_ref()
                        .map(|f| {
                            format!(
                                "Solde {} · échéance {}",
                                f.value(SOLDE_CALCULE).unwrap_or(""),
                                format_date(f.value(DATE_ECHEANCE).unwrap_or(""))
                            )
                        })
                        .unwrap_or_default();
                    self.toasts.show(summary, ToastKind::Success);
                    self.close_form();
                } else {
                    self.toasts.show(form::REQUIRED_MESSAGE, ToastKind::Error);
                }
            }
        }
    }

    // -------------------- Cursor movement ---------------------- //

    fn nrows(&self) -> usize {
        self.table.as_ref().map(|t| t.visible_len()).unwrap_or(0)
    }

    fn scroll_to_curser(&mut self) {
        let height = self.uilayout.table_height.max(1);
        if self.curser_row < self.offset_row {
            self.offset_row = self.curser_row;
        } else if self.curser_row >= self.offset_row + height {
            self.offset_row = self.curser_row + 1 - height;
        }
    }

    fn move_table_selection_beginning(&mut self) {
        self.curser_row = 0;
        self.offset_row = 0;
    }

    fn move_table_selection_end(&mut self) {
        self.curser_row = self.nrows().saturating_sub(1);
        self.scroll_to_curser();
    }

    fn move_table_selection_up(&mut self, size: usize) {
        self.curser_row = self.curser_row.saturating_sub(size);
        self.scroll_to_curser();
    }

    fn move_table_selection_down(&mut self, size: usize) {
        let nrows = self.nrows();
        if nrows == 0 {
            return;
        }
        self.curser_row = std::cmp::min(self.curser_row + size, nrows - 1);
        self.scroll_to_curser();
    }

    fn move_table_selection_left(&mut self) {
        self.select_column(self.curser_column.saturating_sub(1));
    }

    fn move_table_selection_right(&mut self) {
        if self.curser_column + 1 < self.column_widths.len() {
            self.select_column(self.curser_column + 1);
        }
    }

    fn select_column(&mut self, column: usize) {
        if column >= self.column_widths.len() {
            return;
        }
        self.curser_column = column;
        if column < self.offset_column {
            self.offset_column = column;
        }
        while self.offset_column < column && !self.visible_columns().contains(&column) {
            self.offset_column += 1;
        }
        trace!("Select column {column}, offset {}", self.offset_column);
    }

    // -------------------- Accessors for rendering ---------------------- //

    /// Columns that fit the table width, starting at the column offset. The
    /// first one is always included.
    pub fn visible_columns(&self) -> Vec<usize> {
        let mut visible = Vec::new();
        let mut used = 0;
        for (idx, width) in self.column_widths.iter().enumerate().skip(self.offset_column) {
            if used + width + 1 > self.uilayout.table_width && !visible.is_empty() {
                break;
            }
            visible.push(idx);
            used += width + 1;
        }
        visible
    }

    pub fn column_width(&self, column: usize) -> usize {
        self.column_widths.get(column).copied().unwrap_or(0)
    }

    pub fn table(&self) -> Option<&TableView> {
        self.table.as_ref()
    }

    pub fn modus(&self) -> Modus {
        self.modus
    }

    pub fn curser(&self) -> (usize, usize) {
        (self.curser_row, self.curser_column)
    }

    pub fn offset_row(&self) -> usize {
        self.offset_row
    }

    pub fn layout(&self) -> &UILayout {
        &self.uilayout
    }

    pub fn last_input(&self) -> &InputResult {
        &self.last_input
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn help_text(&self) -> Option<&'static str> {
        (self.modus == Modus::POPUP).then_some(HELP_TEXT)
    }

    pub fn toasts(&self, now: Instant) -> Vec<(&Toast, Phase)> {
        self.toasts.visible(now)
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn clock(&self) -> &str {
        &self.clock
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterSelection;
    use crate::sort::SortDirection;
    use ratatui::crossterm::event::KeyModifiers;

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/creances.csv");

    struct NullStore;

    impl ThemeStore for NullStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), TVError> {
            Ok(())
        }
    }

    fn empty_model() -> Model {
        Model::init(&TVConfig::default(), Box::new(NullStore), 120, 40).unwrap()
    }

    fn model() -> Model {
        let mut model = empty_model();
        model.load_data_file(PathBuf::from(FIXTURE), "").unwrap();
        model
    }

    fn send(model: &mut Model, message: Message) {
        model.update(Some(message)).unwrap();
    }

    fn key(model: &mut Model, code: KeyCode) {
        send(model, Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_str(model: &mut Model, s: &str) {
        for c in s.chars() {
            key(model, KeyCode::Char(c));
        }
    }

    fn first_cell(model: &Model, column: usize) -> String {
        model
            .table()
            .and_then(|t| t.visible_row(0))
            .and_then(|r| r.cell(column))
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn operations_without_data_are_ignored() {
        let mut model = empty_model();
        send(&mut model, Message::SortColumn(1));
        send(&mut model, Message::Search);
        assert_eq!(model.modus(), Modus::TABLE);
        send(&mut model, Message::Filter);
        assert!(model.form().is_none());
        send(&mut model, Message::ResetFilters);
        assert!(model.table().is_none());
        send(&mut model, Message::MoveDown);
        assert_eq!(model.curser(), (0, 0));
    }

    #[test]
    fn sorting_by_amount_toggles_direction() {
        let mut model = model();
        send(&mut model, Message::SortColumn(4));
        assert_eq!(first_cell(&model, 4), "450 FCFA");
        assert_eq!(model.curser().1, 4);

        send(&mut model, Message::SortCurrentColumn);
        assert_eq!(first_cell(&model, 4), "7\u{202f}095\u{202f}000 FCFA");
        let state = model.table().unwrap().sort_state();
        assert_eq!(state.direction(), SortDirection::Descending);
    }

    #[test]
    fn unsortable_column_is_left_alone() {
        let mut model = empty_model();
        model.config.unsortable_columns = vec!["client".into()];
        model.load_data_file(PathBuf::from(FIXTURE), "").unwrap();
        send(&mut model, Message::SortColumn(2));
        assert_eq!(model.table().unwrap().sort_state().column(), None);
    }

    #[test]
    fn search_as_you_type() {
        let mut model = model();
        send(&mut model, Message::Search);
        assert!(model.raw_keyevents());

        type_str(&mut model, "hamd");
        assert_eq!(model.table().unwrap().visible_len(), 2);
        type_str(&mut model, "alaye");
        assert_eq!(model.table().unwrap().visible_len(), 2);

        key(&mut model, KeyCode::Enter);
        assert_eq!(model.modus(), Modus::TABLE);
        assert_eq!(model.search_query(), "hamdalaye");

        // Esc in the table clears the search.
        send(&mut model, Message::Exit);
        assert_eq!(model.table().unwrap().visible_len(), 8);
    }

    #[test]
    fn escape_in_search_shows_everything() {
        let mut model = model();
        send(&mut model, Message::Search);
        type_str(&mut model, "yaya");
        assert_eq!(model.table().unwrap().visible_len(), 3);
        key(&mut model, KeyCode::Esc);
        assert_eq!(model.table().unwrap().visible_len(), 8);
        assert_eq!(model.search_query(), "");
    }

    #[test]
    fn filter_dialog_navigates_and_reset_clears() {
        let mut model = model();
        send(&mut model, Message::SortColumn(4));
        send(&mut model, Message::Filter);
        assert_eq!(model.modus(), Modus::FORM);

        key(&mut model, KeyCode::Right); // "" -> DIDIER DEMBELE
        key(&mut model, KeyCode::Enter);

        assert_eq!(model.modus(), Modus::TABLE);
        assert_eq!(model.location().unwrap().query(), "commercial=DIDIER+DEMBELE");
        let table = model.table().unwrap();
        assert_eq!(table.len(), 3);
        // A new page starts unsorted.
        assert_eq!(table.sort_state().column(), None);

        send(&mut model, Message::ResetFilters);
        assert_eq!(model.location().unwrap().query(), "");
        assert_eq!(model.table().unwrap().len(), 8);
    }

    #[test]
    fn filter_dialog_client_text() {
        let mut model = model();
        send(&mut model, Message::Filter);
        key(&mut model, KeyCode::Tab);
        key(&mut model, KeyCode::Tab);
        type_str(&mut model, "ISSA DIALLO");
        key(&mut model, KeyCode::Enter);
        assert_eq!(
            model.location().unwrap().selection(),
            FilterSelection::default().with(FilterKey::Client, "ISSA DIALLO")
        );
        assert_eq!(model.table().unwrap().len(), 1);
    }

    #[test]
    fn calculator_validates_and_computes() {
        let mut model = model();
        send(&mut model, Message::Calculator);
        let form = model.form().unwrap();
        assert_eq!(form.value(SOLDE_CALCULE), Some("0 FCFA"));
        assert!(!form.value(DATE_ECHEANCE).unwrap().is_empty());

        // Montant is required and empty.
        key(&mut model, KeyCode::Enter);
        assert_eq!(model.modus(), Modus::FORM);
        assert!(model.form().unwrap().fields()[0].invalid);

        type_str(&mut model, "3625000");
        key(&mut model, KeyCode::Tab);
        type_str(&mut model, "725000");
        assert_eq!(
            model.form().unwrap().value(SOLDE_CALCULE),
            Some("2\u{202f}900\u{202f}000 FCFA")
        );

        key(&mut model, KeyCode::Tab); // date_facturation, solde is skipped
        for _ in 0..10 {
            key(&mut model, KeyCode::Backspace);
        }
        type_str(&mut model, "2026-10-09");
        assert_eq!(model.form().unwrap().value(DATE_ECHEANCE), Some("2026-10-19"));

        key(&mut model, KeyCode::Enter);
        assert_eq!(model.modus(), Modus::TABLE);
        assert!(model.form().is_none());
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = model();
        send(&mut model, Message::Help);
        assert!(model.help_text().is_some());
        send(&mut model, Message::SortColumn(1));
        assert_eq!(model.table().unwrap().sort_state().column(), None);
        send(&mut model, Message::Exit);
        assert_eq!(model.modus(), Modus::TABLE);
        assert!(model.help_text().is_none());
    }

    #[test]
    fn theme_toggle_shows_a_toast() {
        let mut model = model();
        send(&mut model, Message::ToggleTheme);
        assert_eq!(model.theme(), Theme::Dark);
        let toasts = model.toasts(Instant::now());
        assert_eq!(toasts.last().unwrap().0.message, "Thème sombre activé");
    }

    #[test]
    fn cursor_stays_inside_visible_rows() {
        let mut model = model();
        send(&mut model, Message::MoveEnd);
        assert_eq!(model.curser().0, 7);
        send(&mut model, Message::MovePageDown);
        assert_eq!(model.curser().0, 7);

        send(&mut model, Message::Search);
        type_str(&mut model, "diakite");
        key(&mut model, KeyCode::Enter);
        assert_eq!(model.curser().0, 0);
        send(&mut model, Message::MoveDown);
        send(&mut model, Message::MoveDown);
        assert_eq!(model.curser().0, 1);
    }

    #[test]
    fn narrow_screen_scrolls_columns() {
        let mut model = model();
        send(&mut model, Message::Resize(30, 20));
        send(&mut model, Message::MoveToLastColumn);
        assert_eq!(model.curser().1, 9);
        assert!(model.visible_columns().contains(&9));
        assert!(!model.visible_columns().contains(&0));
        send(&mut model, Message::MoveToFirstColumn);
        assert_eq!(model.visible_columns()[0], 0);
    }
}
