use chrono::NaiveDate;
use tracing::trace;

use crate::calc::{self, DATE_INPUT_FORMAT};
use crate::filters::{FilterKey, FilterSelection};

pub const REQUIRED_MESSAGE: &str = "Veuillez remplir tous les champs obligatoires.";

pub const MONTANT: &str = "montant";
pub const VERSEMENT: &str = "versement";
pub const SOLDE_CALCULE: &str = "solde_calcule";
pub const DATE_FACTURATION: &str = "date_facturation";
pub const DATE_ECHEANCE: &str = "date_echeance";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Date,
    /// One of `options`; the first option is the empty choice.
    Select { options: Vec<String>, selected: usize },
    /// Read only, filled by the form itself.
    Computed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub value: String,
    pub kind: FieldKind,
    pub required: bool,
    pub invalid: bool,
}

impl Field {
    fn editable(&self) -> bool {
        self.kind != FieldKind::Computed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Filters,
    Calculator,
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub title: String,
    fields: Vec<Field>,
    focus: usize,
}

impl Form {
    pub fn new(kind: FormKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            fields: Vec::new(),
            focus: 0,
        }
    }

    pub fn field(mut self, name: &str, label: &str, kind: FieldKind, required: bool) -> Self {
        let value = match &kind {
            FieldKind::Select { options, selected } => {
                options.get(*selected).cloned().unwrap_or_default()
            }
            _ => String::new(),
        };
        self.fields.push(Field {
            name: name.to_string(),
            label: label.to_string(),
            value,
            kind,
            required,
            invalid: false,
        });
        self
    }

    /// Invoice calculator: balance and due date of a receivable.
    pub fn calculator() -> Self {
        Form::new(FormKind::Calculator, " Calculatrice ")
            .field(MONTANT, "Montant", FieldKind::Text, true)
            .field(VERSEMENT, "Versement", FieldKind::Text, false)
            .field(SOLDE_CALCULE, "Solde", FieldKind::Computed, false)
            .field(DATE_FACTURATION, "Date de facturation", FieldKind::Date, true)
            .field(DATE_ECHEANCE, "Date d'échéance", FieldKind::Date, false)
    }

    /// Filter dialog preset with the current selection. `options` lists the
    /// choices of the select fields.
    pub fn filters(
        current: &FilterSelection,
        commercial_options: Vec<String>,
        statut_options: Vec<String>,
    ) -> Self {
        let select = |key: FilterKey, values: Vec<String>| {
            let mut options = vec![String::new()];
            options.extend(values.into_iter().filter(|v| !v.is_empty()));
            let selected = current
                .get(key)
                .and_then(|v| options.iter().position(|o| o == v))
                .unwrap_or(0);
            FieldKind::Select { options, selected }
        };
        let mut form = Form::new(FormKind::Filters, " Filtres ")
            .field(
                FilterKey::Commercial.param(),
                "Commercial",
                select(FilterKey::Commercial, commercial_options),
                false,
            )
            .field(
                FilterKey::Statut.param(),
                "Statut",
                select(FilterKey::Statut, statut_options),
                false,
            )
            .field(FilterKey::Client.param(), "Client", FieldKind::Text, false);
        if let Some(client) = current.get(FilterKey::Client) {
            form.set_value(FilterKey::Client.param(), client);
        }
        form
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Set a field's value. `None` if the form has no such field.
    pub fn set_value(&mut self, name: &str, value: &str) -> Option<()> {
        let field = self.fields.iter_mut().find(|f| f.name == name)?;
        field.value = value.to_string();
        Some(())
    }

    pub fn set_focused_value(&mut self, value: &str) -> Option<&Field> {
        let field = self.fields.get_mut(self.focus)?;
        if matches!(field.kind, FieldKind::Text | FieldKind::Date) {
            field.value = value.to_string();
        }
        Some(&*field)
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(self.fields.len().saturating_sub(1));
    }

    fn move_focus(&mut self, step: usize) {
        let n = self.fields.len();
        if n == 0 {
            return;
        }
        for _ in 0..n {
            self.focus = (self.focus + step) % n;
            if self.fields[self.focus].editable() {
                break;
            }
        }
        trace!("Form focus on {}", self.fields[self.focus].name);
    }

    /// Step through the options of the focused select field.
    pub fn cycle_option(&mut self, forward: bool) -> Option<&Field> {
        let field = self.fields.get_mut(self.focus)?;
        if let FieldKind::Select { options, selected } = &mut field.kind {
            if options.is_empty() {
                return None;
            }
            *selected = if forward {
                (*selected + 1) % options.len()
            } else {
                (*selected + options.len() - 1) % options.len()
            };
            field.value = options[*selected].clone();
            return Some(&*field);
        }
        None
    }

    /// Empty date fields start at `today`.
    pub fn default_dates(&mut self, today: NaiveDate) {
        for field in self.fields.iter_mut() {
            if field.kind == FieldKind::Date && field.value.is_empty() {
                field.value = today.format(DATE_INPUT_FORMAT).to_string();
            }
        }
    }

    /// The filter values entered in this form.
    pub fn selection(&self) -> FilterSelection {
        let mut selection = FilterSelection::default();
        for key in FilterKey::ALL {
            if let Some(value) = self.value(key.param()) {
                selection.set(key, value.trim());
            }
        }
        selection
    }
}

/// Check every required field. Blank ones are flagged invalid, the others
/// cleared. A missing form counts as valid.
pub fn validate_form(form: Option<&mut Form>) -> bool {
    let Some(form) = form else {
        return true;
    };
    let mut valid = true;
    for field in form.fields.iter_mut().filter(|f| f.required) {
        field.invalid = field.value.trim().is_empty();
        valid &= !field.invalid;
    }
    valid
}

/// Refresh the computed balance from amount and payment.
pub fn calculer_solde(form: Option<&mut Form>) -> Option<f64> {
    let form = form?;
    let solde = calc::calculer_solde(
        form.value(MONTANT).unwrap_or(""),
        form.value(VERSEMENT).unwrap_or(""),
    );
    form.set_value(SOLDE_CALCULE, &calc::format_cfa(solde))?;
    Some(solde)
}

/// Fill the due date from the invoice date. Skipped while the invoice date
/// is empty or either field is missing.
pub fn calculer_date_echeance(form: Option<&mut Form>, days: u64) -> Option<String> {
    let form = form?;
    form.value(DATE_ECHEANCE)?;
    let due = calc::date_echeance(form.value(DATE_FACTURATION)?, days)?;
    form.set_value(DATE_ECHEANCE, &due)?;
    Some(due)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_form_is_valid() {
        assert!(validate_form(None));
    }

    #[test]
    fn blank_required_fields_are_flagged() {
        let mut form = Form::calculator();
        form.set_value(MONTANT, "   ");
        form.set_value(VERSEMENT, "");
        assert!(!validate_form(Some(&mut form)));

        let invalid: Vec<&str> = form
            .fields()
            .iter()
            .filter(|f| f.invalid)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(invalid, vec![MONTANT, DATE_FACTURATION]);
    }

    #[test]
    fn filled_fields_clear_their_flag() {
        let mut form = Form::calculator();
        validate_form(Some(&mut form));
        form.set_value(MONTANT, "3625000");
        form.set_value(DATE_FACTURATION, "2026-10-09");
        assert!(validate_form(Some(&mut form)));
        assert!(form.fields().iter().all(|f| !f.invalid));
    }

    #[test]
    fn solde_and_due_date() {
        let mut form = Form::calculator();
        form.set_value(MONTANT, "3625000");
        form.set_value(VERSEMENT, "725000");
        assert_eq!(calculer_solde(Some(&mut form)), Some(2900000.0));
        assert_eq!(form.value(SOLDE_CALCULE), Some("2\u{202f}900\u{202f}000 FCFA"));

        assert_eq!(calculer_date_echeance(Some(&mut form), 10), None);
        form.set_value(DATE_FACTURATION, "2026-10-09");
        assert_eq!(calculer_date_echeance(Some(&mut form), 10).as_deref(), Some("2026-10-19"));
        assert_eq!(form.value(DATE_ECHEANCE), Some("2026-10-19"));
        assert_eq!(calculer_solde(None), None);
    }

    #[test]
    fn dates_default_to_today() {
        let mut form = Form::calculator();
        form.set_value(DATE_ECHEANCE, "2026-12-01");
        form.default_dates(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(form.value(DATE_FACTURATION), Some("2026-10-19"));
        assert_eq!(form.value(DATE_ECHEANCE), Some("2026-12-01"));
    }

    #[test]
    fn focus_skips_computed_fields() {
        let mut form = Form::calculator();
        form.focus_next();
        assert_eq!(form.focused().unwrap().name, VERSEMENT);
        form.focus_next();
        assert_eq!(form.focused().unwrap().name, DATE_FACTURATION);
        form.focus_prev();
        assert_eq!(form.focused().unwrap().name, VERSEMENT);
        assert!(form.set_focused_value("100").is_some());
        assert_eq!(form.value(VERSEMENT), Some("100"));
    }

    #[test]
    fn filter_form_builds_selection() {
        let current = FilterSelection::default()
            .with(FilterKey::Statut, "A RELANCER")
            .with(FilterKey::Client, "Ballo");
        let mut form = Form::filters(
            &current,
            vec!["DIDIER DEMBELE".into(), "YAYA CAMARA".into()],
            vec!["A RELANCER".into(), "A SURVEILLER".into()],
        );
        assert_eq!(form.selection(), current);

        // Commercial select: "" -> first commercial.
        assert_eq!(form.cycle_option(true).unwrap().value, "DIDIER DEMBELE");
        form.focus_next();
        // Statut select wraps backwards to the empty choice.
        assert_eq!(form.cycle_option(false).unwrap().value, "");
        assert_eq!(form.selection().to_query(), "commercial=DIDIER+DEMBELE&client=Ballo");
    }
}
