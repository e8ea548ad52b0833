//! Table page: the engine's headers, filter controls and visible rows.
//!
//! The view owns only the cursor and the filter being edited. Everything it
//! draws comes from the [`TableEngine`]; every change it wants is returned as
//! a [`GridAction`] for the app to apply.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};
use tracing::trace;

use crate::activation::{Interaction, InteractionTarget};
use crate::table::{HeaderCell, RenderedCell, RowId, TableEngine};
use crate::ui::components::{FilterInput, InputOutcome};

/// A change requested by the table page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAction {
    /// Advance the sort of a column.
    ToggleSort(String),
    /// The filter text of a column changed.
    SetFilter { column_id: String, value: String },
    /// The focused column has no usable filter control.
    FilterUnavailable(String),
    /// Show or hide the filter controls.
    ToggleFilters,
    /// The user pressed something in a cell.
    Interact(Interaction),
    Quit,
}

/// The column filter being edited.
#[derive(Debug, Clone)]
struct FilterEdit {
    column_id: String,
    input: FilterInput,
}

/// Table page state.
#[derive(Debug, Default)]
pub struct GridView {
    /// Position of the focused row among the visible rows.
    row: usize,
    /// Index of the focused column.
    column: usize,
    editing: Option<FilterEdit>,
    state: TableState,
}

impl GridView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focused position as (visible row, column index).
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Raw id of the focused row, if any row is visible.
    pub fn focused_row<T>(&self, engine: &TableEngine<T>) -> Option<RowId> {
        engine.visible_row_ids().get(self.row).copied()
    }

    /// Keep the cursor on the table after the visible rows changed.
    pub fn clamp<T>(&mut self, engine: &TableEngine<T>) {
        self.row = self.row.min(engine.visible_len().saturating_sub(1));
        self.column = self.column.min(engine.column_count().saturating_sub(1));
    }

    pub fn handle_input<T>(&mut self, key: KeyEvent, engine: &TableEngine<T>) -> Option<GridAction> {
        if let Some(edit) = self.editing.as_mut() {
            return match edit.input.handle_input(key) {
                InputOutcome::Changed => Some(GridAction::SetFilter {
                    column_id: edit.column_id.clone(),
                    value: edit.input.value().to_string(),
                }),
                InputOutcome::Done => {
                    self.editing = None;
                    None
                }
                InputOutcome::Unchanged => None,
            };
        }

        self.clamp(engine);
        let column_id = engine.columns().get(self.column)?.id().to_string();

        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => Some(GridAction::Quit),
            (KeyCode::Up | KeyCode::Char('k'), _) => {
                self.row = self.row.saturating_sub(1);
                None
            }
            (KeyCode::Down | KeyCode::Char('j'), _) => {
                if self.row + 1 < engine.visible_len() {
                    self.row += 1;
                }
                None
            }
            (KeyCode::Left | KeyCode::Char('h'), _) => {
                self.column = self.column.saturating_sub(1);
                None
            }
            (KeyCode::Right | KeyCode::Char('l'), _) => {
                if self.column + 1 < engine.column_count() {
                    self.column += 1;
                }
                None
            }
            (KeyCode::Home | KeyCode::Char('g'), _) => {
                self.row = 0;
                None
            }
            (KeyCode::End | KeyCode::Char('G'), _) => {
                self.row = engine.visible_len().saturating_sub(1);
                None
            }
            (KeyCode::Char('s'), KeyModifiers::NONE) => Some(GridAction::ToggleSort(column_id)),
            (KeyCode::Char('f'), KeyModifiers::NONE) => Some(GridAction::ToggleFilters),
            (KeyCode::Char('/'), _) => self.start_editing(column_id, engine),
            (KeyCode::Char(' '), _) => self.press_toggle(engine),
            (KeyCode::Enter, _) => {
                let row = self.focused_row(engine)?;
                Some(GridAction::Interact(Interaction::on_cell(
                    row,
                    self.column,
                    engine.column_count(),
                )))
            }
            _ => None,
        }
    }

    /// Forward pasted text to the filter being edited.
    pub fn handle_paste(&mut self, text: &str) -> Option<GridAction> {
        let edit = self.editing.as_mut()?;
        match edit.input.paste(text) {
            InputOutcome::Changed => Some(GridAction::SetFilter {
                column_id: edit.column_id.clone(),
                value: edit.input.value().to_string(),
            }),
            _ => None,
        }
    }

    fn start_editing<T>(&mut self, column_id: String, engine: &TableEngine<T>) -> Option<GridAction> {
        let filterable = engine.column(&column_id).is_some_and(|c| c.can_filter());
        if !filterable || !engine.filters_visible().is_on() {
            return Some(GridAction::FilterUnavailable(column_id));
        }
        let current = engine
            .filter_value(&column_id)
            .map(crate::table::display_value)
            .unwrap_or_default();
        trace!(column = %column_id, "Editing filter");
        self.editing = Some(FilterEdit {
            column_id,
            input: FilterInput::with_value(current),
        });
        None
    }

    /// Space presses the expand toggle of the focused cell, if it has one.
    fn press_toggle<T>(&self, engine: &TableEngine<T>) -> Option<GridAction> {
        let row = self.focused_row(engine)?;
        let column_id = engine.columns().get(self.column)?.id();
        let cell = engine.render_cell(row, column_id).ok()?;
        cell.content.as_list().filter(|list| !list.is_empty())?;
        Some(GridAction::Interact(
            Interaction::on_cell(row, self.column, engine.column_count())
                .with_target(InteractionTarget::ExpandToggle),
        ))
    }

    pub fn render<T>(&mut self, frame: &mut Frame, area: Rect, engine: &TableEngine<T>, title: &str) {
        self.clamp(engine);

        let filters_on = engine.filters_visible().is_on();
        let headers = engine.render_headers();
        let header = Row::new(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| Cell::from(self.header_text(h, i, filters_on))),
        )
        .height(if filters_on { 2 } else { 1 })
        .style(Style::default().fg(Color::Cyan));

        let rows: Vec<Row> = if engine.visible_len() == 0 {
            vec![Row::new(vec![Cell::from(Span::styled(
                "No records match the current filters",
                Style::default().fg(Color::DarkGray),
            ))])]
        } else {
            engine
                .visible_row_ids()
                .iter()
                .enumerate()
                .filter_map(|(pos, id)| {
                    let cells = engine.render_row(*id).ok()?;
                    Some(self.body_row(pos, &cells))
                })
                .collect()
        };

        let widths = vec![Constraint::Fill(1); engine.column_count().max(1)];
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(format!(" {} ({}/{}) ", title, engine.visible_len(), engine.len())),
            )
            .highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)));

        self.state
            .select((engine.visible_len() > 0).then_some(self.row));
        frame.render_stateful_widget(table, area, &mut self.state);
    }

    fn header_text(&self, header: &HeaderCell, index: usize, filters_on: bool) -> Text<'static> {
        let mut title_style = Style::default().add_modifier(Modifier::BOLD);
        if index == self.column {
            title_style = title_style.add_modifier(Modifier::UNDERLINED);
        }
        let mut lines = vec![Line::styled(header.title(), title_style)];
        if filters_on {
            lines.push(self.filter_line(header));
        }
        Text::from(lines)
    }

    fn filter_line(&self, header: &HeaderCell) -> Line<'static> {
        if let Some(edit) = self
            .editing
            .as_ref()
            .filter(|e| e.column_id == header.column_id)
        {
            let value = edit.input.value();
            let split = value
                .char_indices()
                .nth(edit.input.cursor())
                .map(|(i, _)| i)
                .unwrap_or(value.len());
            return Line::from(vec![
                Span::styled(value[..split].to_string(), Style::default().fg(Color::Yellow)),
                Span::styled("▏", Style::default().fg(Color::Yellow)),
                Span::styled(value[split..].to_string(), Style::default().fg(Color::Yellow)),
            ]);
        }
        match &header.filter {
            Some(control) if !control.value.is_empty() => {
                Line::styled(control.value.clone(), Style::default().fg(Color::Yellow))
            }
            Some(control) => {
                Line::styled(control.placeholder.clone(), Style::default().fg(Color::DarkGray))
            }
            None => Line::default(),
        }
    }

    fn body_row(&self, position: usize, cells: &[RenderedCell]) -> Row<'static> {
        let focused_row = position == self.row;
        Row::new(cells.iter().enumerate().map(|(i, cell)| {
            let text = Text::from(
                cell.content
                    .lines()
                    .into_iter()
                    .map(Line::from)
                    .collect::<Vec<_>>(),
            );
            let mut rendered = Cell::from(text);
            if focused_row && i == self.column {
                rendered = rendered.style(Style::default().add_modifier(Modifier::REVERSED));
            }
            rendered
        }))
        .height(row_height(cells))
    }
}

/// Lines needed by the tallest cell, at least one.
fn row_height(cells: &[RenderedCell]) -> u16 {
    let height = cells
        .iter()
        .map(|c| c.content.lines().len())
        .max()
        .unwrap_or(1)
        .max(1);
    u16::try_from(height).unwrap_or(u16::MAX)
}
