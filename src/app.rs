//! Main application state and event loop.
//!
//! This module implements The Elm Architecture (TEA): every input goes
//! through [`App::update`] or [`App::handle_detail`], and [`App::view`] draws
//! the current state.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::activation::{ActivationOutcome, Interaction, InteractionTarget, Navigator, RowActivation};
use crate::config::{ConfigError, Settings};
use crate::error::{AppError, Result};
use crate::events::Event;
use crate::lookup::DetailLookup;
use crate::roster::Roster;
use crate::table::{CellKey, FilterVisibility, TableEngine};
use crate::tasks::{DetailFetched, TaskSpawner};
use crate::ui::components::{hint_spans, FILTER_HINTS, TABLE_HINTS, VIEWER_HINTS};
use crate::ui::{GridAction, GridView, ObjectViewer, Spinner, Toasts, ViewerAction};

/// The page on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Table,
    ObjectViewer,
}

impl Page {
    /// Look up a page by its navigation name.
    pub fn from_name(name: &str) -> Option<Page> {
        match name {
            "Table" => Some(Page::Table),
            "ObjectViewer" => Some(Page::ObjectViewer),
            _ => None,
        }
    }
}

/// Navigation state written by row activation.
#[derive(Debug, Default)]
pub struct ViewState {
    page: Page,
    view_type: Option<String>,
    object: Option<Value>,
}

impl ViewState {
    pub fn page(&self) -> Page {
        self.page
    }

    pub fn view_type(&self) -> Option<&str> {
        self.view_type.as_deref()
    }

    pub fn object(&self) -> Option<&Value> {
        self.object.as_ref()
    }

    fn go_back(&mut self) {
        self.page = Page::Table;
    }
}

impl Navigator<Value> for ViewState {
    fn set_view_object(&mut self, object: Value) {
        self.object = Some(object);
    }

    fn set_view_type(&mut self, view_type: &str) {
        self.view_type = Some(view_type.to_string());
    }

    fn set_page(&mut self, page: &str) {
        match Page::from_name(page) {
            Some(page) => self.page = page,
            None => warn!(page, "Unknown page, staying on the current one"),
        }
    }
}

/// The application model.
pub struct App {
    roster: Roster,
    engine: TableEngine<Value>,
    activation: RowActivation<Value, Value>,
    spawner: TaskSpawner<Value>,
    view: ViewState,
    grid: GridView,
    viewer: ObjectViewer,
    toasts: Toasts,
    spinner: Spinner,
    should_quit: bool,
}

impl App {
    /// Create the application over a dataset.
    ///
    /// # Errors
    ///
    /// Fails when the roster's columns cannot build a table, or when the
    /// navigation page is not one this application can show.
    pub fn new(
        roster: Roster,
        rows: Vec<Value>,
        settings: &Settings,
        lookup: Arc<dyn DetailLookup<Value, Detail = Value>>,
        spawner: TaskSpawner<Value>,
    ) -> Result<Self> {
        // Checked before any lookup so navigation never stops halfway
        if Page::from_name(&settings.navigation.page).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "navigation.page '{}' is not a known page",
                settings.navigation.page
            ))
            .into());
        }
        let engine = TableEngine::new(
            roster.columns(),
            rows,
            FilterVisibility::new(settings.filters_on),
        )?;
        debug!(table = %roster, rows = engine.len(), "Creating application");

        Ok(Self {
            roster,
            engine,
            activation: RowActivation::new(lookup, settings.navigation.clone()),
            spawner,
            view: ViewState::default(),
            grid: GridView::new(),
            viewer: ObjectViewer::new(),
            toasts: Toasts::new(),
            spinner: Spinner::default(),
            should_quit: false,
        })
    }

    pub fn engine(&self) -> &TableEngine<Value> {
        &self.engine
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn page(&self) -> Page {
        self.view.page
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn is_loading(&self) -> bool {
        self.spinner.is_active()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Update the application state based on an event.
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Quit => {
                info!("Quit event received");
                self.should_quit = true;
            }
            Event::Key(key_event) => {
                trace!(key = ?key_event.code, modifiers = ?key_event.modifiers, "Key event");
                self.handle_key_event(key_event);
            }
            Event::Paste(text) => {
                if self.view.page == Page::Table {
                    if let Some(action) = self.grid.handle_paste(&text) {
                        self.apply_grid_action(action);
                    }
                }
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
            }
            Event::Tick => self.handle_tick(),
        }
    }

    /// Apply a settled detail lookup.
    pub fn handle_detail(&mut self, message: DetailFetched<Value>) {
        let outcome = self.activation.complete(message, &mut self.view);
        match outcome {
            ActivationOutcome::Navigated { .. } => self.viewer.reset(),
            ActivationOutcome::Fetched { row_type } => {
                self.toasts
                    .info(format!("No detail page for {} rows", row_type));
            }
            ActivationOutcome::Failed { message, .. } => {
                self.toasts.error(format!("Could not load details: {}", message));
            }
            ActivationOutcome::Ignored(_) => {}
        }
        if !self.activation.has_pending() {
            self.spinner.stop();
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.code == KeyCode::Char('c') && key_event.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return;
        }

        match self.view.page {
            Page::Table => {
                if let Some(action) = self.grid.handle_input(key_event, &self.engine) {
                    self.apply_grid_action(action);
                }
            }
            Page::ObjectViewer => {
                if let Some(ViewerAction::Back) = self.viewer.handle_input(key_event) {
                    debug!("Returning to table");
                    self.view.go_back();
                }
            }
        }
    }

    fn apply_grid_action(&mut self, action: GridAction) {
        match action {
            GridAction::Quit => {
                info!("Quit requested");
                self.should_quit = true;
            }
            GridAction::ToggleSort(column_id) => {
                if let Err(e) = self.engine.toggle_sort(&column_id) {
                    self.report(e.into());
                }
            }
            GridAction::SetFilter { column_id, value } => {
                if let Err(e) = self.engine.set_filter(&column_id, value) {
                    self.report(e.into());
                }
                self.grid.clamp(&self.engine);
            }
            GridAction::FilterUnavailable(column_id) => {
                let message = if self.engine.filters_visible().is_on() {
                    format!("{} cannot be filtered", column_id)
                } else {
                    "Filters are hidden, press 'f' to show them".to_string()
                };
                self.toasts.info(message);
            }
            GridAction::ToggleFilters => {
                let on = self.engine.filters_visible().toggle();
                debug!(on, "Filter controls toggled");
            }
            GridAction::Interact(interaction) => self.interact(interaction),
        }
    }

    fn interact(&mut self, interaction: Interaction) {
        if interaction.target == InteractionTarget::ExpandToggle {
            if let Some(column) = self.engine.columns().get(interaction.column_index) {
                let key = CellKey::new(interaction.row, column.id());
                if let Err(e) = self.engine.toggle_expanded(&key) {
                    self.report(e.into());
                }
            }
        }

        let Some(row) = self.engine.row(interaction.row).cloned() else {
            warn!(row = %interaction.row, "Interaction with unknown row");
            return;
        };
        match self
            .activation
            .dispatch(&interaction, row, self.roster.row_type(), &self.spawner)
        {
            Ok(request) => {
                let pending = self.activation.pending_count();
                debug!(%request, pending, "Row activated");
                if pending > 1 {
                    self.spinner
                        .start(format!("Fetching details ({} pending)...", pending));
                } else {
                    self.spinner.start("Fetching details...");
                }
            }
            Err(reason) => trace!(%reason, "Interaction did not activate row"),
        }
    }

    fn report(&mut self, error: AppError) {
        warn!(error = %error, "Action failed");
        self.toasts.error(error.user_message());
    }

    fn handle_tick(&mut self) {
        self.spinner.tick();
        self.toasts.tick();
    }

    /// Render the application UI.
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        match self.view.page {
            Page::Table => {
                self.grid
                    .render(frame, chunks[1], &self.engine, self.roster.title());
            }
            Page::ObjectViewer => self.viewer.render(
                frame,
                chunks[1],
                self.view.object(),
                self.view.view_type().unwrap_or(self.roster.row_type()),
            ),
        }
        self.render_status_bar(frame, chunks[2]);

        self.toasts.render(frame, area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(format!("rostergrid · {}", self.roster.title()))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(title, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.view.page {
            Page::Table if self.grid.is_editing() => FILTER_HINTS,
            Page::Table => TABLE_HINTS,
            Page::ObjectViewer => VIEWER_HINTS,
        };
        let mut spans = Vec::new();
        if let Some(spinner) = self.spinner.span() {
            spans.push(spinner);
            spans.push(Span::raw("  "));
        }
        spans.extend(hint_spans(hints));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{error::Result as LookupResult, LookupError, RowEcho};
    use crate::tasks::create_task_channel;
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct FailingLookup;

    #[async_trait]
    impl DetailLookup<Value> for FailingLookup {
        type Detail = Value;

        async fn lookup_detail(&self, _row: &Value, _row_type: &str) -> LookupResult<Value> {
            Err(LookupError::ServerError("HTTP 502".to_string()))
        }
    }

    fn students() -> Vec<Value> {
        vec![
            json!({"user_id": 2, "first_name": "Alan", "last_name": "Turing",
                   "email": "alan@example.edu",
                   "enrolled_courses": [{"course_id": "c2", "title": "Biology"}]}),
            json!({"user_id": 1, "first_name": "Ada", "last_name": "Lovelace",
                   "email": "ada@example.edu",
                   "enrolled_courses": [{"course_id": "c1", "title": "Algebra"}]}),
        ]
    }

    fn courses() -> Vec<Value> {
        vec![
            json!({"course_id": "c1", "title": "Algebra", "term": "Fall",
                   "instructor": "Noether", "students": []}),
            json!({"course_id": "c2", "title": "Biology", "term": "Spring",
                   "instructor": "Franklin", "students": []}),
        ]
    }

    fn app_with(
        roster: Roster,
        rows: Vec<Value>,
        lookup: Arc<dyn DetailLookup<Value, Detail = Value>>,
    ) -> (App, UnboundedReceiver<DetailFetched<Value>>) {
        let (rx, spawner) = create_task_channel();
        let app = App::new(roster, rows, &Settings::default(), lookup, spawner).unwrap();
        (app, rx)
    }

    fn app(roster: Roster, rows: Vec<Value>) -> (App, UnboundedReceiver<DetailFetched<Value>>) {
        app_with(roster, rows, Arc::new(RowEcho))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.update(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_quit_on_q_key() {
        let (mut app, _rx) = app(Roster::Students, students());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_quit_on_ctrl_c() {
        let (mut app, _rx) = app(Roster::Students, students());
        app.update(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit());
    }

    #[test]
    fn test_quit_event() {
        let (mut app, _rx) = app(Roster::Students, students());
        app.update(Event::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_sort_key_cycles_focused_column() {
        let (mut app, _rx) = app(Roster::Students, students());
        press(&mut app, KeyCode::Char('s'));
        let ids: Vec<_> = app.engine().visible_rows().map(|(_, r)| r["user_id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2)]);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('s'));
        assert!(app.engine().sort_state().column().is_none());
    }

    #[test]
    fn test_typing_filter_narrows_rows() {
        let (mut app, _rx) = app(Roster::Students, students());
        for _ in 0..4 {
            press(&mut app, KeyCode::Right);
        }
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "alg");
        assert_eq!(app.engine().visible_len(), 1);

        press(&mut app, KeyCode::Enter);
        // Filter stays after editing ends
        assert_eq!(app.engine().visible_len(), 1);

        press(&mut app, KeyCode::Char('/'));
        app.update(Event::Key(KeyEvent::new(
            KeyCode::Char('u'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(app.engine().visible_len(), 2);
        assert!(app.engine().filters().is_empty());
    }

    #[test]
    fn test_paste_into_filter() {
        let (mut app, _rx) = app(Roster::Students, students());
        press(&mut app, KeyCode::Char('/'));
        app.update(Event::Paste("2".to_string()));
        assert_eq!(app.engine().visible_len(), 1);
    }

    #[test]
    fn test_toggling_filters_keeps_filter_state() {
        let (mut app, _rx) = app(Roster::Students, students());
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "1");
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('f'));
        assert!(!app.engine().filters_visible().is_on());
        assert_eq!(app.engine().visible_len(), 1);

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.toasts().len(), 1);
    }

    #[test]
    fn test_sorting_disabled_column_reports_error() {
        let rows = vec![json!({"enrollment_id": "e1", "status": "active"})];
        let (mut app, _rx) = app(Roster::Enrollments, rows);
        for _ in 0..4 {
            press(&mut app, KeyCode::Right);
        }
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.toasts().len(), 1);
        assert_eq!(
            app.toasts().iter().next().unwrap().kind,
            crate::ui::components::ToastKind::Error
        );
    }

    #[tokio::test]
    async fn test_space_expands_without_activating() {
        let (mut app, mut rx) = app(Roster::Students, students());
        for _ in 0..4 {
            press(&mut app, KeyCode::Right);
        }
        press(&mut app, KeyCode::Char(' '));

        let key = CellKey::new(crate::table::RowId(0), "Courses");
        assert!(app.engine().expand_state(&key) == crate::table::ExpandState::Expanded);
        assert!(!app.is_loading());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_enter_on_course_navigates_to_object_viewer() {
        let (mut app, mut rx) = app(Roster::Courses, courses());
        press(&mut app, KeyCode::Enter);
        assert!(app.is_loading());

        let message = rx.recv().await.unwrap();
        app.handle_detail(message);

        assert_eq!(app.page(), Page::ObjectViewer);
        assert_eq!(app.view_state().view_type(), Some("courses"));
        assert_eq!(app.view_state().object(), Some(&courses()[0]));
        assert!(!app.is_loading());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.page(), Page::Table);
    }

    #[tokio::test]
    async fn test_enter_on_last_column_does_nothing() {
        let (mut app, mut rx) = app(Roster::Courses, courses());
        press(&mut app, KeyCode::End);
        for _ in 0..4 {
            press(&mut app, KeyCode::Right);
        }
        press(&mut app, KeyCode::Enter);

        assert!(!app.is_loading());
        assert!(rx.try_recv().is_err());
        assert_eq!(app.page(), Page::Table);
    }

    #[tokio::test]
    async fn test_enter_on_student_stays_on_table() {
        let (mut app, mut rx) = app(Roster::Students, students());
        press(&mut app, KeyCode::Enter);
        let message = rx.recv().await.unwrap();
        app.handle_detail(message);

        assert_eq!(app.page(), Page::Table);
        assert!(app.view_state().object().is_none());
        assert_eq!(app.toasts().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_shows_error_toast() {
        let (mut app, mut rx) = app_with(Roster::Courses, courses(), Arc::new(FailingLookup));
        press(&mut app, KeyCode::Enter);
        let message = rx.recv().await.unwrap();
        app.handle_detail(message);

        assert_eq!(app.page(), Page::Table);
        let toast = app.toasts().iter().next().unwrap();
        assert!(toast.message.contains("HTTP 502"));
        assert!(!app.is_loading());
    }

    #[test]
    fn test_unknown_navigation_page_is_rejected() {
        let mut settings = Settings::default();
        settings.navigation.page = "Details".to_string();
        let (_rx, spawner) = create_task_channel();

        let result = App::new(Roster::Courses, courses(), &settings, Arc::new(RowEcho), spawner);
        match result {
            Err(AppError::Config(ConfigError::ValidationError(msg))) => {
                assert!(msg.contains("Details"));
            }
            Err(other) => panic!("Expected a validation error, got {:?}", other),
            Ok(_) => panic!("Expected App::new to reject the page"),
        }
    }

    #[tokio::test]
    async fn test_known_navigation_page_applies_fully() {
        let mut settings = Settings::default();
        settings.navigation.page = "Table".to_string();
        settings.navigation.view_type = "course".to_string();
        let (mut rx, spawner) = create_task_channel();
        let mut app =
            App::new(Roster::Courses, courses(), &settings, Arc::new(RowEcho), spawner).unwrap();

        press(&mut app, KeyCode::Enter);
        let message = rx.recv().await.unwrap();
        app.handle_detail(message);

        assert_eq!(app.page(), Page::Table);
        assert_eq!(app.view_state().view_type(), Some("course"));
        assert_eq!(app.view_state().object(), Some(&courses()[0]));
    }

    #[tokio::test]
    async fn test_spinner_counts_pending_lookups() {
        let (mut app, mut rx) = app(Roster::Courses, courses());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(app.is_loading());
        assert!(app.spinner.message().contains("2 pending"));

        let first = rx.recv().await.unwrap();
        app.handle_detail(first);
        assert!(app.is_loading());
        let second = rx.recv().await.unwrap();
        app.handle_detail(second);
        assert!(!app.is_loading());
    }

    #[test]
    fn test_unknown_page_is_ignored() {
        let mut view = ViewState::default();
        view.set_page("Nowhere");
        assert_eq!(view.page(), Page::Table);
        view.set_page("ObjectViewer");
        assert_eq!(view.page(), Page::ObjectViewer);
    }

    #[test]
    fn test_view_renders_table_page() {
        let (mut app, _rx) = app(Roster::Students, students());
        let mut terminal = Terminal::new(TestBackend::new(120, 12)).unwrap();
        terminal.draw(|f| app.view(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("rostergrid · Students"));
        assert!(text.contains("Lovelace"));
        assert!(text.contains("[Enter]"));
    }
}
