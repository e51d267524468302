//! View state synchronizer.
//!
//! Owns the [`ViewParams`] of one grid view and keeps three surfaces in step:
//!
//! | Surface | Holds | Written |
//! |---------|-------|---------|
//! | In-memory state | everything | on every change |
//! | [`ParamStore`] | page, status, debounced search, sort | replace on each relevant change |
//! | [`SettingsStore`] | column visibility | on each visibility change |
//!
//! Observers subscribe through a `watch` channel and see every new
//! `ViewParams` value.
//!
//! # Page resets
//!
//! Changes that alter which records qualify (settled search text, status
//! filter, page size) reset the page index to 0. Sort and visibility changes
//! keep it.

use tokio::sync::watch;

use grid_model::{
    ColumnDescriptor, ColumnSet, ModelError, PageData, SortSpec, StatusFilter, ViewParams,
};

use crate::codec::{decode, encode, merge_into};
use crate::config::GridConfig;
use crate::debounce::Debouncer;
use crate::error::ViewError;
use crate::params::ParamStore;
use crate::settings::{SettingsStore, load_column_visibility, save_column_visibility};

/// Synchronizes view parameters with the external representation and the
/// settings store.
pub struct ViewStateSync<P, S> {
    columns: ColumnSet,
    params: ViewParams,
    search_input: String,
    param_store: P,
    settings: S,
    namespace: String,
    debouncer: Debouncer<String>,
    notifier: watch::Sender<ViewParams>,
}

impl<P: ParamStore, S: SettingsStore> ViewStateSync<P, S> {
    /// Initialize from the external representation and the settings store.
    ///
    /// A sort on an unknown or non-sortable column is dropped.
    pub fn new(columns: ColumnSet, param_store: P, settings: S, config: &GridConfig) -> Self {
        let mut params = decode(&param_store.read(), config.default_page_size.max(1));

        if let Some(sort) = &params.sort
            && !columns.get(&sort.field_key).is_some_and(|c| c.sortable)
        {
            tracing::warn!("Dropping sort on unsortable column '{}'", sort.field_key);
            params.sort = None;
        }

        params.column_visibility = load_column_visibility(&settings, &config.settings_namespace);
        tracing::debug!(
            page = params.page_index + 1,
            status = %params.status_filter,
            "Initialized view state"
        );

        let (notifier, _) = watch::channel(params.clone());
        Self {
            columns,
            search_input: params.search_text.clone(),
            params,
            param_store,
            settings,
            namespace: config.settings_namespace.clone(),
            debouncer: Debouncer::new(config.debounce()),
            notifier,
        }
    }

    /// Current view parameters.
    pub fn params(&self) -> &ViewParams {
        &self.params
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Raw search input, for binding the text box.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Subscribe to view parameter changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewParams> {
        self.notifier.subscribe()
    }

    pub fn param_store(&self) -> &P {
        &self.param_store
    }

    pub fn settings_store(&self) -> &S {
        &self.settings
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Record a keystroke. The value only reaches the view parameters once
    /// the debounce interval passes without further input.
    pub fn input_search(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        self.search_input.clone_from(&raw);
        self.debouncer.emit(raw);
    }

    /// Wait for the pending search input to settle and apply it.
    ///
    /// Returns whether the view parameters changed.
    pub async fn next_settled_search(&mut self) -> bool {
        match self.debouncer.recv().await {
            Some(value) => self.settle_search(value),
            None => false,
        }
    }

    /// Apply a settled search value. Resets the page when the text changed.
    pub fn settle_search(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value == self.params.search_text {
            return false;
        }
        tracing::debug!("Search settled");
        self.params.search_text = value;
        self.params.page_index = 0;
        self.commit();
        true
    }

    // =========================================================================
    // FILTER & PAGINATION
    // =========================================================================

    /// Change the status filter. Resets the page.
    pub fn set_status_filter(&mut self, filter: StatusFilter) -> bool {
        if filter == self.params.status_filter {
            return false;
        }
        self.params.status_filter = filter;
        self.params.page_index = 0;
        self.commit();
        true
    }

    /// Jump to a 0-based page.
    pub fn set_page(&mut self, page_index: usize) -> bool {
        if page_index == self.params.page_index {
            return false;
        }
        self.params.page_index = page_index;
        self.commit();
        true
    }

    /// Advance one page if `data` says there is one.
    pub fn next_page(&mut self, data: &PageData) -> bool {
        let last = data.page_count(self.params.page_size) - 1;
        if self.params.page_index >= last {
            return false;
        }
        self.set_page(self.params.page_index + 1)
    }

    /// Go back one page.
    pub fn previous_page(&mut self) -> bool {
        match self.params.page_index.checked_sub(1) {
            Some(previous) => self.set_page(previous),
            None => false,
        }
    }

    /// Change the page size. Resets the page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<bool, ViewError> {
        if page_size == 0 {
            return Err(ModelError::InvalidPageSize { page_size }.into());
        }
        if page_size == self.params.page_size {
            return Ok(false);
        }
        self.params.page_size = page_size;
        self.params.page_index = 0;
        self.commit();
        Ok(true)
    }

    // =========================================================================
    // SORT
    // =========================================================================

    /// Set or clear the sort. The page index is kept.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) -> Result<bool, ViewError> {
        if let Some(spec) = &sort {
            self.sortable_column(&spec.field_key)?;
        }
        if sort == self.params.sort {
            return Ok(false);
        }
        self.params.sort = sort;
        self.commit();
        Ok(true)
    }

    /// Cycle the sort on a column: ascending, descending, none.
    ///
    /// Returns the new sort.
    pub fn toggle_sort(&mut self, key: &str) -> Result<Option<SortSpec>, ViewError> {
        self.sortable_column(key)?;
        let next = match &self.params.sort {
            Some(current) if current.field_key == key && !current.descending => {
                Some(SortSpec::descending(key))
            }
            Some(current) if current.field_key == key => None,
            _ => Some(SortSpec::ascending(key)),
        };
        self.set_sort(next.clone())?;
        Ok(next)
    }

    fn sortable_column(&self, key: &str) -> Result<&ColumnDescriptor, ViewError> {
        let column = self.column(key)?;
        if column.sortable {
            Ok(column)
        } else {
            Err(ViewError::NotSortable {
                key: key.to_string(),
            })
        }
    }

    // =========================================================================
    // COLUMN VISIBILITY
    // =========================================================================

    /// Show or hide a column and persist the choice.
    ///
    /// On a persistence failure the in-memory change is kept and
    /// [`ViewError::Store`] is returned.
    pub fn set_column_visible(&mut self, key: &str, visible: bool) -> Result<bool, ViewError> {
        let column = self.column(key)?;
        if column.pinned && !visible {
            return Err(ViewError::ColumnPinned {
                key: key.to_string(),
            });
        }
        if self.params.is_column_visible(key) == visible {
            return Ok(false);
        }
        self.params
            .column_visibility
            .insert(key.to_string(), visible);
        self.notify();
        self.persist_visibility()?;
        Ok(true)
    }

    /// Make every column visible again.
    pub fn reset_column_visibility(&mut self) -> Result<bool, ViewError> {
        if self.params.column_visibility.values().all(|visible| *visible) {
            return Ok(false);
        }
        self.params.column_visibility.clear();
        self.notify();
        self.persist_visibility()?;
        Ok(true)
    }

    /// Visible columns in declaration order. Pinned columns are always visible.
    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|column| column.pinned || self.params.is_column_visible(&column.key))
            .collect()
    }

    fn column(&self, key: &str) -> Result<&ColumnDescriptor, ViewError> {
        self.columns.get(key).ok_or_else(|| ViewError::UnknownColumn {
            key: key.to_string(),
        })
    }

    fn persist_visibility(&mut self) -> Result<(), ViewError> {
        save_column_visibility(
            &mut self.settings,
            &self.namespace,
            &self.params.column_visibility,
        )
        .map_err(|e| {
            tracing::warn!("Failed to persist column visibility: {e}");
            ViewError::Store(e)
        })
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Cancel pending search input, including input that already settled but
    /// was not applied. Nothing settles after teardown.
    pub fn teardown(&mut self) {
        self.debouncer.close();
    }

    /// Write the external representation and notify observers.
    fn commit(&mut self) {
        let merged = merge_into(&self.param_store.read(), encode(&self.params));
        self.param_store.replace(merged);
        self.notify();
    }

    fn notify(&self) {
        self.notifier.send_replace(self.params.clone());
    }
}
