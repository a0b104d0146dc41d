use std::path::Path;
use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Cell, Clear, Paragraph, Row as UIRow, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table, Wrap,
    },
};

use crate::domain::TVConfig;
use crate::form::{Field, FieldKind, Form};
use crate::model::{Modus, Model};
use crate::theme::Palette;
use crate::toast::Phase;

pub const TITLE_HEIGHT: usize = 1;
pub const CMDLINE_HEIGH: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const TABLE_BORDER: usize = 1;
pub const SCROLLBAR_WIDTH: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 2;

const FIELD_HEIGHT: u16 = 3;
const FORM_WIDTH: u16 = 56;
const TOAST_HEIGHT: u16 = 3;

pub struct TableUI {
    max_column_width: usize,
}

impl TableUI {
    pub fn new(config: &TVConfig) -> Self {
        Self {
            max_column_width: config.max_column_width,
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let palette = model.theme().palette();
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(palette.background).fg(palette.foreground)),
            area,
        );

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TITLE_HEIGHT as u16),
                Constraint::Min(1),
                Constraint::Length(CMDLINE_HEIGH as u16),
            ])
            .split(area);

        self.draw_title(model, &palette, frame, layout[0]);
        self.draw_table(model, &palette, frame, layout[1]);
        self.draw_cmdline(model, &palette, frame, layout[2]);

        if let Some(text) = model.help_text() {
            draw_help(text, &palette, frame, area);
        }
        if let Some(form) = model.form() {
            draw_form(model, form, &palette, frame, area);
        }
        draw_toasts(model, frame, Rect { height: area.height.saturating_sub(1), ..area });
    }

    fn draw_title(&self, model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
        let location = model
            .location()
            .map(|l| {
                let file = Path::new(l.path())
                    .file_name()
                    .map(|f| f.to_string_lossy().to_string())
                    .unwrap_or_else(|| l.path().to_string());
                if l.query().is_empty() {
                    file
                } else {
                    format!("{file}?{}", l.query())
                }
            })
            .unwrap_or_default();

        let style = Style::default()
            .bg(palette.header_background)
            .fg(palette.header_foreground);
        let left = Line::from(vec![
            Span::styled(" ctv ", style.add_modifier(Modifier::BOLD)),
            Span::styled(location, style),
        ]);
        let right = Line::from(format!("{}  {} ", model.clock(), model.theme().icon()))
            .style(style)
            .right_aligned();
        frame.render_widget(Paragraph::new(left).style(style), area);
        frame.render_widget(right, area);
    }

    fn draw_table(&self, model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_style(Style::default().fg(palette.border))
            .style(Style::default().bg(palette.table_background));
        let Some(table) = model.table() else {
            frame.render_widget(Paragraph::new(" Aucune donnée").block(block), area);
            return;
        };

        let columns = model.visible_columns();
        let (curser_row, curser_column) = model.curser();
        let offset_row = model.offset_row();
        let height = model.layout().table_height;

        let header_style = Style::default()
            .bg(palette.header_background)
            .fg(palette.header_foreground)
            .add_modifier(Modifier::BOLD);
        let header = UIRow::new(columns.iter().map(|&c| {
            let name = &table.headers()[c].name;
            let text = match table.sort_state().indicator(c) {
                Some(arrow) => format!("{name} {arrow}"),
                None => name.clone(),
            };
            Cell::from(clip(&text, model.column_width(c)))
        }))
        .style(header_style);

        let rows = table
            .visible_rows()
            .enumerate()
            .skip(offset_row)
            .take(height)
            .map(|(idx, row)| {
                let cells = columns.iter().map(|&c| {
                    let text = clip(row.cell(c).unwrap_or(""), model.column_width(c));
                    let cell = Cell::from(text);
                    if idx == curser_row && c == curser_column {
                        cell.style(
                            Style::default()
                                .fg(palette.accent)
                                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                        )
                    } else {
                        cell
                    }
                });
                let row = UIRow::new(cells);
                if idx == curser_row {
                    row.style(Style::default().bg(palette.highlight))
                } else {
                    row
                }
            });

        let widths = columns
            .iter()
            .map(|&c| Constraint::Length(model.column_width(c).min(self.max_column_width) as u16));
        let widget = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .block(block);
        frame.render_widget(widget, area);

        let mut scrollbar_state = ScrollbarState::new(table.visible_len()).position(curser_row);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }

    fn draw_cmdline(&self, model: &Model, palette: &Palette, frame: &mut Frame, area: Rect) {
        let style = Style::default().fg(palette.foreground).bg(palette.background);
        if model.modus() == Modus::SEARCH {
            let input = model.last_input();
            frame.render_widget(
                Paragraph::new(format!("/{}", input.input)).style(style),
                area,
            );
            frame.set_cursor_position((area.x + 1 + input.curser_pos as u16, area.y));
            return;
        }

        let counts = model
            .table()
            .map(|t| {
                if t.is_empty() {
                    "aucune ligne ".to_string()
                } else {
                    format!("{}/{} lignes ", t.visible_len(), t.len())
                }
            })
            .unwrap_or_default();
        let search = if model.search_query().is_empty() {
            String::new()
        } else {
            format!(" [/{}]", model.search_query())
        };
        frame.render_widget(
            Paragraph::new(format!("{}{search}", model.status_message())).style(style),
            area,
        );
        frame.render_widget(Line::from(counts).style(style).right_aligned(), area);
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_help(text: &str, palette: &Palette, frame: &mut Frame, area: Rect) {
    let height = text.lines().count() as u16 + 2;
    let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
    let popup = centered_rect(width, height, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(palette.background).fg(palette.foreground))
            .block(
                Block::bordered()
                    .title(" Aide ")
                    .border_style(Style::default().fg(palette.accent)),
            ),
        popup,
    );
}

fn draw_form(model: &Model, form: &Form, palette: &Palette, frame: &mut Frame, area: Rect) {
    let height = form.fields().len() as u16 * FIELD_HEIGHT + 3;
    let popup = centered_rect(FORM_WIDTH, height, area);
    frame.render_widget(Clear, popup);
    let block = Block::bordered()
        .title(form.title.as_str())
        .title_bottom(Line::from(" Tab: champ suivant  Entrée: valider  Esc: fermer ").centered())
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().bg(palette.background).fg(palette.foreground));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(form.fields().iter().map(|_| Constraint::Length(FIELD_HEIGHT)))
        .split(inner);

    for (idx, (field, &rect)) in form.fields().iter().zip(rows.iter()).enumerate() {
        let focused = idx == form.focus();
        frame.render_widget(field_widget(field, focused, palette), rect);
        if focused && matches!(field.kind, FieldKind::Text | FieldKind::Date) {
            let pos = model.last_input().curser_pos as u16;
            frame.set_cursor_position((rect.x + 1 + pos, rect.y + 1));
        }
    }
}

fn field_widget<'a>(field: &'a Field, focused: bool, palette: &Palette) -> Paragraph<'a> {
    let border = if field.invalid {
        Style::default().fg(Color::Red)
    } else if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.border)
    };
    let label = if field.required {
        format!(" {} * ", field.label)
    } else {
        format!(" {} ", field.label)
    };
    let content = match &field.kind {
        FieldKind::Select { .. } if field.value.is_empty() => "◀ Tous ▶".to_string(),
        FieldKind::Select { .. } => format!("◀ {} ▶", field.value),
        _ => field.value.clone(),
    };
    let style = if field.kind == FieldKind::Computed {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Paragraph::new(content)
        .style(style)
        .block(Block::bordered().title(label).border_style(border))
}

fn draw_toasts(model: &Model, frame: &mut Frame, area: Rect) {
    let mut bottom = area.y + area.height;
    for (toast, phase) in model.toasts(Instant::now()).into_iter().rev() {
        if bottom < area.y + TOAST_HEIGHT {
            break;
        }
        let width = (toast.message.chars().count() as u16 + 4).min(area.width);
        // Hidden share of the toast, slid off the right edge
        let hidden = match phase {
            Phase::SlidingIn(f) => 1.0 - f,
            Phase::SlidingOut(f) => f,
            Phase::Shown | Phase::Gone => 0.0,
        };
        let shift = (width as f32 * hidden).round() as u16;
        let visible_width = width - shift;
        if visible_width == 0 {
            continue;
        }
        let rect = Rect::new(
            area.x + area.width - visible_width,
            bottom - TOAST_HEIGHT,
            visible_width,
            TOAST_HEIGHT,
        );
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(toast.message.as_str())
                .style(Style::default().fg(Color::White).bg(toast.kind.color()))
                .block(Block::bordered().border_style(Style::default().fg(toast.kind.color()))),
            rect,
        );
        bottom -= TOAST_HEIGHT;
    }
}
