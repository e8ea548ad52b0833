//! Row activation: from a cell interaction to detail navigation.
//!
//! An interaction with a table cell may activate its row. Activation looks up
//! the row's detail object and, for navigable row types, switches the view to
//! it. Two rules decide whether an interaction activates at all:
//!
//! - interactions on interactive sub-elements (buttons, expand toggles,
//!   filter controls) never activate;
//! - the last column of a row never activates, whatever it contains. The rule
//!   is positional and holds even when that column is not an actions column.
//!
//! Lookups may be in flight concurrently. Their results are applied in the
//! order they settle, so the last lookup to resolve decides the final view.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::NavigationConfig;
use crate::lookup::DetailLookup;
use crate::table::RowId;
use crate::tasks::{DetailFetched, RequestId, TaskSpawner};

/// The three navigation setters, applied in this order on activation.
pub trait Navigator<D> {
    fn set_view_object(&mut self, object: D);
    fn set_view_type(&mut self, view_type: &str);
    fn set_page(&mut self, page: &str);
}

/// What an interaction landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionTarget {
    /// The cell body.
    Cell,
    /// A button inside the cell.
    Button,
    /// The toggle of an expandable list.
    ExpandToggle,
    /// A header filter control.
    FilterControl,
}

impl InteractionTarget {
    /// Whether the target absorbs the interaction.
    pub fn is_interactive(self) -> bool {
        !matches!(self, InteractionTarget::Cell)
    }
}

/// A user interaction with one cell of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    pub row: RowId,
    pub column_index: usize,
    pub column_count: usize,
    pub target: InteractionTarget,
}

impl Interaction {
    /// An interaction with the body of a cell.
    pub fn on_cell(row: RowId, column_index: usize, column_count: usize) -> Self {
        Self {
            row,
            column_index,
            column_count,
            target: InteractionTarget::Cell,
        }
    }

    pub fn with_target(mut self, target: InteractionTarget) -> Self {
        self.target = target;
        self
    }

    pub fn is_last_column(&self) -> bool {
        self.column_index + 1 == self.column_count
    }
}

/// Why an interaction did not activate its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The interaction was absorbed by an interactive sub-element.
    InteractiveTarget(InteractionTarget),
    /// The interaction hit the last column.
    LastColumn,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::InteractiveTarget(target) => write!(f, "handled by {:?}", target),
            IgnoreReason::LastColumn => write!(f, "last column"),
        }
    }
}

/// How an activation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Nothing was fetched.
    Ignored(IgnoreReason),
    /// The detail was fetched and navigation happened.
    Navigated { row_type: String },
    /// The detail was fetched; the row type does not navigate.
    Fetched { row_type: String },
    /// The lookup failed; nothing changed.
    Failed { row_type: String, message: String },
}

/// Row activation controller.
pub struct RowActivation<T, D> {
    lookup: Arc<dyn DetailLookup<T, Detail = D>>,
    navigation: NavigationConfig,
    next_request: u64,
    pending: HashSet<RequestId>,
}

impl<T, D> RowActivation<T, D>
where
    T: Send + Sync + 'static,
    D: Send + 'static,
{
    pub fn new(lookup: Arc<dyn DetailLookup<T, Detail = D>>, navigation: NavigationConfig) -> Self {
        Self {
            lookup,
            navigation,
            next_request: 0,
            pending: HashSet::new(),
        }
    }

    pub fn navigation(&self) -> &NavigationConfig {
        &self.navigation
    }

    /// Decide whether an interaction activates its row.
    ///
    /// Returns the reason when it does not.
    pub fn classify(&self, interaction: &Interaction) -> Option<IgnoreReason> {
        if interaction.target.is_interactive() {
            return Some(IgnoreReason::InteractiveTarget(interaction.target));
        }
        if interaction.is_last_column() {
            return Some(IgnoreReason::LastColumn);
        }
        None
    }

    /// Activate a row, awaiting the lookup inline.
    pub async fn activate<N>(
        &self,
        interaction: &Interaction,
        row: &T,
        row_type: &str,
        navigator: &mut N,
    ) -> ActivationOutcome
    where
        N: Navigator<D>,
    {
        if let Some(reason) = self.classify(interaction) {
            debug!(row = %interaction.row, %reason, "Interaction ignored");
            return ActivationOutcome::Ignored(reason);
        }
        let result = self
            .lookup
            .lookup_detail(row, row_type)
            .await
            .map_err(|e| e.to_string());
        self.resolve(row_type, result, navigator)
    }

    /// Activate a row, running the lookup as a background task.
    ///
    /// The result arrives on the spawner's channel and must be handed to
    /// [`complete`](Self::complete).
    pub fn dispatch(
        &mut self,
        interaction: &Interaction,
        row: T,
        row_type: impl Into<String>,
        spawner: &TaskSpawner<D>,
    ) -> Result<RequestId, IgnoreReason> {
        if let Some(reason) = self.classify(interaction) {
            debug!(row = %interaction.row, %reason, "Interaction ignored");
            return Err(reason);
        }
        let request = RequestId(self.next_request);
        self.next_request += 1;
        self.pending.insert(request);

        let row_type = row_type.into();
        debug!(%request, row = %interaction.row, row_type = %row_type, "Dispatching detail lookup");
        spawner.spawn_detail_lookup(request, Arc::clone(&self.lookup), row, row_type);
        Ok(request)
    }

    /// Apply a settled background lookup.
    pub fn complete<N>(&mut self, message: DetailFetched<D>, navigator: &mut N) -> ActivationOutcome
    where
        N: Navigator<D>,
    {
        self.pending.remove(&message.request);
        self.resolve(&message.row_type, message.result, navigator)
    }

    /// Whether any background lookup is still in flight.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn resolve<N>(&self, row_type: &str, result: Result<D, String>, navigator: &mut N) -> ActivationOutcome
    where
        N: Navigator<D>,
    {
        match result {
            Err(message) => {
                error!(row_type, error = %message, "Detail lookup failed");
                ActivationOutcome::Failed {
                    row_type: row_type.to_string(),
                    message,
                }
            }
            Ok(detail) if self.navigation.is_navigable(row_type) => {
                // Nothing fallible between the setters
                navigator.set_view_object(detail);
                navigator.set_view_type(&self.navigation.view_type);
                navigator.set_page(&self.navigation.page);
                info!(row_type, page = %self.navigation.page, "Navigated to detail");
                ActivationOutcome::Navigated {
                    row_type: row_type.to_string(),
                }
            }
            Ok(_) => {
                debug!(row_type, "Detail fetched for non-navigable row type");
                ActivationOutcome::Fetched {
                    row_type: row_type.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{error::Result as LookupResult, LookupError, RowEcho};
    use crate::tasks::create_task_channel;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every navigation call in order.
    #[derive(Debug, Default)]
    struct RecordingNavigator {
        calls: Vec<String>,
        view_object: Option<Value>,
        view_type: Option<String>,
        page: Option<String>,
    }

    impl Navigator<Value> for RecordingNavigator {
        fn set_view_object(&mut self, object: Value) {
            self.calls.push("set_view_object".to_string());
            self.view_object = Some(object);
        }

        fn set_view_type(&mut self, view_type: &str) {
            self.calls.push("set_view_type".to_string());
            self.view_type = Some(view_type.to_string());
        }

        fn set_page(&mut self, page: &str) {
            self.calls.push("set_page".to_string());
            self.page = Some(page.to_string());
        }
    }

    /// Returns a fixed detail object and counts lookups.
    #[derive(Default)]
    struct FixedLookup {
        detail: Value,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DetailLookup<Value> for FixedLookup {
        type Detail = Value;

        async fn lookup_detail(&self, _row: &Value, _row_type: &str) -> LookupResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.detail.clone())
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl DetailLookup<Value> for FailingLookup {
        type Detail = Value;

        async fn lookup_detail(&self, _row: &Value, _row_type: &str) -> LookupResult<Value> {
            Err(LookupError::NotFound("courses/c9".to_string()))
        }
    }

    fn fixed(detail: Value) -> Arc<FixedLookup> {
        Arc::new(FixedLookup {
            detail,
            calls: AtomicUsize::new(0),
        })
    }

    fn controller(lookup: Arc<dyn DetailLookup<Value, Detail = Value>>) -> RowActivation<Value, Value> {
        RowActivation::new(lookup, NavigationConfig::default())
    }

    fn row() -> Value {
        json!({"course_id": "c1", "title": "Algebra"})
    }

    #[tokio::test]
    async fn test_last_column_never_activates() {
        let lookup = fixed(json!({"detail": true}));
        let activation = controller(lookup.clone());
        let mut nav = RecordingNavigator::default();

        for row_type in ["courses", "enrollments", "users"] {
            let outcome = activation
                .activate(&Interaction::on_cell(RowId(0), 4, 5), &row(), row_type, &mut nav)
                .await;
            assert_eq!(outcome, ActivationOutcome::Ignored(IgnoreReason::LastColumn));
        }
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
        assert!(nav.calls.is_empty());
    }

    #[tokio::test]
    async fn test_interactive_targets_never_activate() {
        let lookup = fixed(json!({}));
        let activation = controller(lookup.clone());
        let mut nav = RecordingNavigator::default();

        for target in [
            InteractionTarget::Button,
            InteractionTarget::ExpandToggle,
            InteractionTarget::FilterControl,
        ] {
            let interaction = Interaction::on_cell(RowId(0), 0, 5).with_target(target);
            let outcome = activation.activate(&interaction, &row(), "courses", &mut nav).await;
            assert_eq!(
                outcome,
                ActivationOutcome::Ignored(IgnoreReason::InteractiveTarget(target))
            );
        }
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
        assert!(nav.calls.is_empty());
    }

    #[tokio::test]
    async fn test_courses_row_navigates_to_detail() {
        let detail = json!({"course_id": "c1", "students": []});
        let lookup = fixed(detail.clone());
        let activation = controller(lookup.clone());
        let mut nav = RecordingNavigator::default();

        let outcome = activation
            .activate(&Interaction::on_cell(RowId(0), 1, 5), &row(), "courses", &mut nav)
            .await;

        assert_eq!(
            outcome,
            ActivationOutcome::Navigated {
                row_type: "courses".to_string()
            }
        );
        assert_eq!(nav.view_object, Some(detail));
        assert_eq!(nav.view_type.as_deref(), Some("courses"));
        assert_eq!(nav.page.as_deref(), Some("ObjectViewer"));
        assert_eq!(nav.calls, vec!["set_view_object", "set_view_type", "set_page"]);
    }

    #[tokio::test]
    async fn test_enrollments_use_configured_view_type() {
        let activation = controller(fixed(json!({"enrollment_id": "e1"})));
        let mut nav = RecordingNavigator::default();
        activation
            .activate(&Interaction::on_cell(RowId(0), 0, 3), &row(), "enrollments", &mut nav)
            .await;
        assert_eq!(nav.view_type.as_deref(), Some("courses"));
    }

    #[tokio::test]
    async fn test_users_row_fetches_without_navigating() {
        let lookup = fixed(json!({"user_id": 1}));
        let activation = controller(lookup.clone());
        let mut nav = RecordingNavigator::default();

        let outcome = activation
            .activate(&Interaction::on_cell(RowId(0), 0, 5), &row(), "users", &mut nav)
            .await;

        assert_eq!(
            outcome,
            ActivationOutcome::Fetched {
                row_type: "users".to_string()
            }
        );
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert!(nav.calls.is_empty());
    }

    #[test]
    fn test_failed_lookup_leaves_view_untouched() {
        let activation = controller(Arc::new(FailingLookup));
        let mut nav = RecordingNavigator::default();

        let outcome = tokio_test::block_on(activation.activate(
            &Interaction::on_cell(RowId(0), 0, 5),
            &row(),
            "courses",
            &mut nav,
        ));

        match outcome {
            ActivationOutcome::Failed { row_type, message } => {
                assert_eq!(row_type, "courses");
                assert!(message.contains("courses/c9"));
            }
            other => panic!("Expected failure, got {:?}", other),
        }
        assert!(nav.calls.is_empty());
        assert!(nav.page.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_and_complete() {
        let detail = json!({"course_id": "c1"});
        let mut activation = controller(fixed(detail.clone()));
        let (mut rx, spawner) = create_task_channel::<Value>();
        let mut nav = RecordingNavigator::default();

        let request = activation
            .dispatch(&Interaction::on_cell(RowId(2), 0, 5), row(), "courses", &spawner)
            .unwrap();
        assert!(activation.has_pending());

        let message = rx.recv().await.unwrap();
        assert_eq!(message.request, request);
        let outcome = activation.complete(message, &mut nav);

        assert!(matches!(outcome, ActivationOutcome::Navigated { .. }));
        assert!(!activation.has_pending());
        assert_eq!(nav.view_object, Some(detail));
    }

    #[tokio::test]
    async fn test_dispatch_ignored_spawns_nothing() {
        let lookup = fixed(json!({}));
        let mut activation = controller(lookup.clone());
        let (mut rx, spawner) = create_task_channel::<Value>();

        let err = activation
            .dispatch(&Interaction::on_cell(RowId(0), 2, 3), row(), "courses", &spawner)
            .unwrap_err();
        assert_eq!(err, IgnoreReason::LastColumn);
        assert!(!activation.has_pending());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_concurrent_dispatches_last_resolved_wins() {
        let mut activation = controller(Arc::new(RowEcho));
        let (mut rx, spawner) = create_task_channel::<Value>();
        let mut nav = RecordingNavigator::default();

        let first = json!({"course_id": "c1"});
        let second = json!({"course_id": "c2"});
        let interaction = Interaction::on_cell(RowId(0), 0, 5);
        activation
            .dispatch(&interaction, first, "courses", &spawner)
            .unwrap();
        activation
            .dispatch(&interaction, second, "courses", &spawner)
            .unwrap();
        assert_eq!(activation.pending_count(), 2);

        let a = rx.recv().await.unwrap();
        let b = rx.recv().await.unwrap();
        let last = b.result.as_ref().unwrap().clone();
        activation.complete(a, &mut nav);
        activation.complete(b, &mut nav);

        assert_eq!(nav.view_object, Some(last));
        assert_eq!(nav.calls.len(), 6);
        assert!(!activation.has_pending());
    }
}
