//! Command implementations shared by the binary and its tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;

use grid_model::{ColumnSet, PageData, Record, RecordId, SortSpec, StatusFilter};
use grid_query::{MemoryDataSource, QueryCache};
use grid_view::{
    FileSettingsStore, GridConfig, MemoryParamStore, ParamStore, ViewStateSync, to_query_string,
};

use crate::sample;
use crate::table::{page_footer, page_table};

/// View state backed by an in-memory query string and on-disk settings.
pub type View = ViewStateSync<MemoryParamStore, FileSettingsStore>;

/// Explicit view adjustments applied on top of the prior query string.
#[derive(Debug, Clone, Default)]
pub struct ViewOverrides {
    pub query: String,
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    /// 1-based.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub sort: Option<SortSpec>,
}

/// Where the grid reads its inputs from.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub config: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
    pub settings_dir: Option<PathBuf>,
}

/// Column visibility change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
    Hide(String),
    Show(String),
    Reset,
}

/// Loaded configuration, columns and data.
pub struct App {
    config: GridConfig,
    columns: ColumnSet,
    settings_dir: PathBuf,
    cache: QueryCache<MemoryDataSource>,
}

impl App {
    pub fn load(options: &AppOptions) -> Result<Self> {
        let config = match &options.config {
            Some(path) => GridConfig::load_from(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => GridConfig::default(),
        };
        config.validate().context("validate config")?;

        let columns = match &options.metadata {
            Some(path) => load_columns(path)?,
            None => sample::columns().context("built-in columns")?,
        };
        let records = match &options.data {
            Some(path) => load_records(path)?,
            None => sample::records(),
        };
        debug!(
            columns = columns.len(),
            records = records.len(),
            "Loaded grid inputs"
        );

        let settings_dir = options
            .settings_dir
            .clone()
            .or_else(|| config.settings_dir.clone())
            .unwrap_or_else(|| FileSettingsStore::default_location().dir().to_path_buf());

        let source = Arc::new(MemoryDataSource::new(records));
        let cache = QueryCache::with_capacity(source, sample::FAMILY, config.cache_capacity);

        Ok(Self {
            config,
            columns,
            settings_dir,
            cache,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache<MemoryDataSource> {
        &self.cache
    }

    /// Restore the view from `overrides.query`, then apply explicit overrides.
    pub fn view(&self, overrides: &ViewOverrides) -> Result<View> {
        let mut view = ViewStateSync::new(
            self.columns.clone(),
            MemoryParamStore::from_query_string(&overrides.query),
            FileSettingsStore::new(&self.settings_dir),
            &self.config,
        );

        if let Some(size) = overrides.page_size {
            view.set_page_size(size)?;
        }
        if let Some(status) = overrides.status {
            view.set_status_filter(status);
        }
        if let Some(search) = &overrides.search {
            view.settle_search(search.clone());
        }
        if let Some(sort) = &overrides.sort {
            view.set_sort(Some(sort.clone()))?;
        }
        if let Some(page) = overrides.page {
            view.set_page(page.saturating_sub(1));
        }
        Ok(view)
    }

    /// Fetch the current page of `view`.
    pub async fn page(&self, view: &View) -> Result<PageData> {
        self.cache
            .get(view.params())
            .await
            .map_err(|error| anyhow!(error.user_message()))
    }

    /// Render the page, its position and the query string that restores it.
    pub async fn list(&self, overrides: &ViewOverrides) -> Result<String> {
        let view = self.view(overrides)?;
        let data = self.page(&view).await?;
        Ok(self.render(&view, &data))
    }

    /// Flip the status of `id` and render the page afterwards.
    pub async fn toggle(&self, id: &str, overrides: &ViewOverrides) -> Result<String> {
        let view = self.view(overrides)?;
        let data = self.page(&view).await?;
        let id = RecordId::new(id);
        let record = data
            .record(&id)
            .cloned()
            .or_else(|| self.cache.source().record(&id))
            .ok_or_else(|| anyhow!("Record {id} not found"))?;

        let outcome = self.cache.toggle_status(&record).await;
        let data = self.page(&view).await?;
        let rendered = self.render(&view, &data);
        match outcome {
            Ok(ack) => Ok(format!("{}\n{rendered}", ack.message)),
            Err(error) => Err(anyhow!(error.user_message())),
        }
    }

    /// Apply a visibility change and list the columns.
    pub fn columns(&self, change: Option<&ColumnChange>) -> Result<String> {
        let mut view = self.view(&ViewOverrides::default())?;
        match change {
            Some(ColumnChange::Hide(key)) => {
                view.set_column_visible(key, false)?;
            }
            Some(ColumnChange::Show(key)) => {
                view.set_column_visible(key, true)?;
            }
            Some(ColumnChange::Reset) => {
                view.reset_column_visibility()?;
            }
            None => {}
        }

        let lines: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let mark = if column.pinned {
                    "pinned"
                } else if view.params().is_column_visible(&column.key) {
                    "visible"
                } else {
                    "hidden"
                };
                format!(
                    "{:<12} {:<14} {:<9} {mark}",
                    column.key,
                    column.header,
                    column.column_type.as_str()
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn render(&self, view: &View, data: &PageData) -> String {
        let table = page_table(data, view.columns(), view.params());
        let query = to_query_string(&view.param_store().read());
        format!(
            "{table}\n{}\nView: ?{query}",
            page_footer(data, view.params())
        )
    }
}

fn load_columns(path: &Path) -> Result<ColumnSet> {
    let json =
        fs::read_to_string(path).with_context(|| format!("read columns {}", path.display()))?;
    ColumnSet::from_json(&json).with_context(|| format!("parse columns {}", path.display()))
}

fn load_records(path: &Path) -> Result<Vec<Record>> {
    let json =
        fs::read_to_string(path).with_context(|| format!("read records {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&json)
        .with_context(|| format!("parse records {}", path.display()))?;
    if records.is_empty() {
        bail!("{} contains no records", path.display());
    }
    Ok(records)
}
