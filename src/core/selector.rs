//! Searchable single-select currency list

use crate::core::record::CurrencyRecord;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyOption {
    pub code: String,
    pub name: String,
    pub icon: Option<PathBuf>,
    pub price: f64,
    pub date: String,
}

/// Resolves `<dir>/<CODE>.svg`; a missing file means no icon.
#[derive(Debug, Clone)]
pub struct IconResolver {
    dir: PathBuf,
}

impl IconResolver {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn resolve(&self, code: &str) -> Option<PathBuf> {
        let path = self.dir.join(format!("{code}.svg"));
        path.is_file().then_some(path)
    }
}

/// One option per currency code, first record wins, sorted by code.
pub fn unique_options(records: &[CurrencyRecord], icons: &IconResolver) -> Vec<CurrencyOption> {
    let mut seen = HashSet::new();
    let mut options: Vec<CurrencyOption> = records
        .iter()
        .filter(|record| seen.insert(record.currency.as_str()))
        .map(|record| CurrencyOption {
            code: record.currency.clone(),
            name: record.currency.clone(),
            icon: icons.resolve(&record.currency),
            price: record.price,
            date: record.date.clone(),
        })
        .collect();
    options.sort_by(|a, b| {
        a.code
            .to_lowercase()
            .cmp(&b.code.to_lowercase())
            .then_with(|| a.code.cmp(&b.code))
    });
    options
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub u32);

/// A pointer press somewhere in the widget. `target` is the control that
/// received it, or `None` for the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerDown {
    pub target: Option<ControlId>,
}

/// Fan-out of pointer presses to every attached control.
#[derive(Debug, Clone)]
pub struct BoundaryBus {
    tx: broadcast::Sender<PointerDown>,
}

impl BoundaryBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn pointer_down(&self, target: Option<ControlId>) {
        // No subscribers is fine: nothing is open to close.
        let _ = self.tx.send(PointerDown { target });
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn subscribe(&self) -> broadcast::Receiver<PointerDown> {
        self.tx.subscribe()
    }
}

impl Default for BoundaryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CurrencySelector {
    id: ControlId,
    label: String,
    options: Vec<CurrencyOption>,
    value: String,
    open: bool,
    search: String,
    boundary: Option<broadcast::Receiver<PointerDown>>,
}

impl CurrencySelector {
    pub fn new(id: ControlId, label: &str, options: Vec<CurrencyOption>, value: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            options,
            value: value.to_string(),
            open: false,
            search: String::new(),
            boundary: None,
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn options(&self) -> &[CurrencyOption] {
        &self.options
    }

    /// The option matching the current value, if the value is a known code.
    pub fn selected(&self) -> Option<&CurrencyOption> {
        self.options.iter().find(|o| o.code == self.value)
    }

    /// Mirrors the value held by the form.
    pub fn set_value(&mut self, code: &str) {
        self.value = code.to_string();
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closes the list and drops the search text.
    pub fn close(&mut self) {
        self.open = false;
        self.search.clear();
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    /// Options whose code or name contains the search text, ignoring case.
    pub fn filtered(&self) -> Vec<&CurrencyOption> {
        let needle = self.search.to_lowercase();
        self.options
            .iter()
            .filter(|o| {
                o.name.to_lowercase().contains(&needle) || o.code.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Picks a row. Closes the list and clears the search; returns the code
    /// to hand to the form, or `None` if `code` is not one of the options.
    pub fn select(&mut self, code: &str) -> Option<String> {
        let option = self.options.iter().find(|o| o.code == code)?;
        let code = option.code.clone();
        debug!(control = self.id.0, %code, "Currency selected");
        self.close();
        Some(code)
    }

    /// Starts listening for pointer presses. Replaces any earlier subscription.
    pub fn attach(&mut self, bus: &BoundaryBus) {
        self.boundary = Some(bus.subscribe());
    }

    pub fn detach(&mut self) {
        self.boundary = None;
    }

    pub fn is_attached(&self) -> bool {
        self.boundary.is_some()
    }

    /// Drains pending pointer presses. A press outside this control closes it
    /// without committing anything. Returns whether the list was closed.
    pub fn process_boundary_events(&mut self) -> bool {
        let Some(rx) = self.boundary.as_mut() else {
            return false;
        };

        let mut outside = false;
        loop {
            match rx.try_recv() {
                Ok(event) => outside |= event.target != Some(self.id),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Boundary events dropped");
                    outside = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if outside && self.open {
            debug!(control = self.id.0, "Pointer down outside, closing");
            self.close();
            return true;
        }
        false
    }
}
