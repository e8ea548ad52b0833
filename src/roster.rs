//! Entity tables: column sets for students, courses and enrollments, and
//! dataset loading.
//!
//! Datasets are JSON arrays of objects. Each table reads the fields it knows
//! and ignores the rest; missing fields render as empty cells.

use std::fmt;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::table::{CellContent, ColumnSpec, ExpandableList, ListContainsFilter};

/// Which entity a dataset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Roster {
    /// Users with their enrolled courses.
    #[default]
    Students,
    /// Courses with their students.
    Courses,
    /// One row per student/course pair.
    Enrollments,
}

impl Roster {
    /// Row type handed to row activation.
    pub fn row_type(self) -> &'static str {
        match self {
            Roster::Students => "users",
            Roster::Courses => "courses",
            Roster::Enrollments => "enrollments",
        }
    }

    /// Column set for this table.
    pub fn columns(self) -> Vec<ColumnSpec<Value>> {
        match self {
            Roster::Students => student_columns(),
            Roster::Courses => course_columns(),
            Roster::Enrollments => enrollment_columns(),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Roster::Students => "Students",
            Roster::Courses => "Courses",
            Roster::Enrollments => "Enrollments",
        }
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// A column holding a list of records, filtered by `label_field` and shown
/// as an expandable list.
fn list_column(
    header: &str,
    field: &str,
    label: &'static str,
    item_key: &'static str,
    item_label: &'static str,
) -> ColumnSpec<Value> {
    ColumnSpec::field(header, field)
        .with_filter(ListContainsFilter::new(item_label))
        .with_cell(move |args| {
            CellContent::List(ExpandableList::from_value(
                args.value, label, item_key, item_label,
            ))
        })
}

/// Students: identity columns plus the courses each is enrolled in.
pub fn student_columns() -> Vec<ColumnSpec<Value>> {
    vec![
        ColumnSpec::field("User ID", "user_id"),
        ColumnSpec::field("First Name", "first_name"),
        ColumnSpec::field("Last Name", "last_name"),
        ColumnSpec::field("Email", "email"),
        list_column("Courses", "enrolled_courses", "Courses", "course_id", "title"),
    ]
}

/// Courses with their enrolled students.
pub fn course_columns() -> Vec<ColumnSpec<Value>> {
    vec![
        ColumnSpec::field("Course ID", "course_id"),
        ColumnSpec::field("Title", "title"),
        ColumnSpec::field("Term", "term"),
        ColumnSpec::field("Instructor", "instructor"),
        list_column("Students", "students", "Students", "user_id", "email"),
    ]
}

/// Enrollments. The trailing status column is informational only.
pub fn enrollment_columns() -> Vec<ColumnSpec<Value>> {
    vec![
        ColumnSpec::field("Enrollment ID", "enrollment_id"),
        ColumnSpec::field("User ID", "user_id"),
        ColumnSpec::field("Course ID", "course_id"),
        ColumnSpec::field("Role", "role"),
        ColumnSpec::field("Status", "status").disable_sort(),
    ]
}

/// Parse a dataset from JSON text.
///
/// # Errors
///
/// Returns `AppError::Data` when the text is not JSON or not an array.
pub fn parse_rows(text: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(rows) => {
            debug!(rows = rows.len(), "Parsed dataset");
            Ok(rows)
        }
        other => Err(AppError::data(format!(
            "expected a JSON array of records, found {}",
            kind_name(&other)
        ))),
    }
}

/// Load a dataset file.
pub fn load_rows(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path)?;
    let rows = parse_rows(&text)?;
    info!(path = %path.display(), rows = rows.len(), "Loaded dataset");
    Ok(rows)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
