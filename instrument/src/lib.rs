//! Event recording for firm simulations.
//!
//! Every `info`-level `tracing` event is appended as a row to a table named
//! after the event's target. Columns are created on first sight of a field
//! and typed by the first value recorded for it, so the schema of each table
//! follows whatever the simulation emits.
//!
//! # Usage
//!
//! ```ignore
//! // In simulation code:
//! tracing::info!(target: "firm_day", day, firm_id, profits);
//!
//! // In a test:
//! let (report, recorder) = instrument::record(|| economy.run_day(&mut exchange, &mut stats));
//! let profits = recorder.table("firm_day").and_then(|t| t.f64s("profits"));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

// === COLUMNS ===

/// The values of one field across all rows of a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::U64(v) => v.len(),
            Values::I64(v) => v.len(),
            Values::F64(v) => v.len(),
            Values::Bool(v) => v.len(),
            Values::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extend with blanks until the column holds `rows` values.
    fn fill_to(&mut self, rows: usize) {
        let missing = rows.saturating_sub(self.len());
        if missing == 0 {
            return;
        }
        match self {
            Values::U64(v) => v.extend(std::iter::repeat_n(0, missing)),
            Values::I64(v) => v.extend(std::iter::repeat_n(0, missing)),
            Values::F64(v) => v.extend(std::iter::repeat_n(f64::NAN, missing)),
            Values::Bool(v) => v.extend(std::iter::repeat_n(false, missing)),
            Values::Str(v) => v.extend(std::iter::repeat_n(String::new(), missing)),
        }
    }

    fn to_column(&self, name: &str) -> Column {
        match self {
            Values::U64(v) => Column::new(name.into(), v),
            Values::I64(v) => Column::new(name.into(), v),
            Values::F64(v) => Column::new(name.into(), v),
            Values::Bool(v) => Column::new(name.into(), v),
            Values::Str(v) => Column::new(name.into(), v),
        }
    }
}

// === TABLES ===

/// All events recorded under one target.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: HashMap<String, Values>,
    pub rows: usize,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Values> {
        self.columns.get(name)
    }

    /// A float column. Fields whose first value was an integer are not converted.
    pub fn f64s(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name)? {
            Values::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn u64s(&self, name: &str) -> Option<&[u64]> {
        match self.columns.get(name)? {
            Values::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn bools(&self, name: &str) -> Option<&[bool]> {
        match self.columns.get(name)? {
            Values::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn close_row(&mut self) {
        self.rows += 1;
        for column in self.columns.values_mut() {
            column.fill_to(self.rows);
        }
    }

    /// Columns sorted by name, so frames built from the same events compare equal.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut names: Vec<_> = self.columns.keys().collect();
        names.sort();
        let columns = names
            .into_iter()
            .map(|name| self.columns[name].to_column(name))
            .collect();
        DataFrame::new(columns)
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: HashMap<String, Table>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Option<&Table> {
        self.tables.get(target)
    }

    /// Number of events recorded under `target`.
    pub fn rows(&self, target: &str) -> usize {
        self.tables.get(target).map_or(0, |t| t.rows)
    }

    pub fn to_dataframes(&self) -> PolarsResult<HashMap<String, DataFrame>> {
        self.tables
            .iter()
            .map(|(name, table)| Ok((name.clone(), table.to_dataframe()?)))
            .collect()
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

// === SUBSCRIBER ===

struct RowVisitor<'a> {
    table: &'a mut Table,
}

impl RowVisitor<'_> {
    /// The column for `field`, created with blanks for the rows before this one.
    fn column(&mut self, field: &Field, blank: impl FnOnce(usize) -> Values) -> &mut Values {
        let rows = self.table.rows;
        self.table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| blank(rows))
    }
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        match self.column(field, |n| Values::U64(vec![0; n])) {
            Values::U64(v) => v.push(value),
            // A later integer in a float column still belongs there.
            Values::F64(v) => v.push(value as f64),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match self.column(field, |n| Values::I64(vec![0; n])) {
            Values::I64(v) => v.push(value),
            Values::F64(v) => v.push(value as f64),
            _ => {}
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Values::F64(v) = self.column(field, |n| Values::F64(vec![f64::NAN; n])) {
            v.push(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if let Values::Bool(v) = self.column(field, |n| Values::Bool(vec![false; n])) {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if let Values::Str(v) = self.column(field, |n| Values::Str(vec![String::new(); n])) {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }
}

/// Appends each `info`-level event to the thread-local [`Recorder`].
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let target = event.metadata().target().to_string();
        RECORDER.with(|r| {
            let mut recorder = r.borrow_mut();
            let table = recorder.tables.entry(target).or_default();
            event.record(&mut RowVisitor { table: &mut *table });
            table.close_row();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install [`TableSubscriber`] as the global default. Later calls are no-ops.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(TableSubscriber);
}

/// Take everything recorded on this thread so far.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Run `f` with [`TableSubscriber`] as this thread's subscriber and return
/// its result together with the events it emitted.
///
/// Anything recorded on this thread before the call is discarded.
pub fn record<T>(f: impl FnOnce() -> T) -> (T, Recorder) {
    clear();
    let out = tracing::subscriber::with_default(TableSubscriber, f);
    (out, drain())
}
