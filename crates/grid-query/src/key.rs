//! Cache keys.

use std::fmt;

use grid_model::{PageRequest, SortSpec, StatusFilter, ViewParams};

/// Cache key of one list page.
///
/// Built from every [`ViewParams`] field except column visibility, scoped to
/// a family (the logical record collection). Two equal parameter sets always
/// produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    family: String,
    search_text: String,
    status_filter: StatusFilter,
    page_index: usize,
    page_size: usize,
    sort: Option<SortSpec>,
}

impl QueryKey {
    /// Key of the list page described by `params`.
    pub fn list(family: impl Into<String>, params: &ViewParams) -> Self {
        Self {
            family: family.into(),
            search_text: params.search_text.clone(),
            status_filter: params.status_filter,
            page_index: params.page_index,
            page_size: params.page_size,
            sort: params.sort.clone(),
        }
    }

    /// Family this key belongs to.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn in_family(&self, family: &str) -> bool {
        self.family == family
    }

    /// Data-source request for this key.
    pub fn request(&self) -> PageRequest {
        PageRequest {
            page: self.page_index + 1,
            page_size: self.page_size,
            query: self.search_text.clone(),
            status: self.status_filter.status(),
            sort: self.sort.clone(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[page={} size={} status={} search={:?}",
            self.family,
            self.page_index + 1,
            self.page_size,
            self.status_filter,
            self.search_text
        )?;
        if let Some(sort) = &self.sort {
            write!(f, " sort={}:{}", sort.field_key, sort.direction())?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_does_not_affect_key() {
        let mut a = ViewParams::default();
        let mut b = ViewParams::default();
        a.column_visibility.insert("email".to_string(), false);
        b.column_visibility.insert("groups".to_string(), true);
        assert_eq!(QueryKey::list("users", &a), QueryKey::list("users", &b));
    }

    #[test]
    fn test_every_request_field_affects_key() {
        let base = ViewParams::default();
        let key = QueryKey::list("users", &base);

        let variants = [
            ViewParams {
                search_text: "x".into(),
                ..base.clone()
            },
            ViewParams {
                status_filter: StatusFilter::Active,
                ..base.clone()
            },
            ViewParams {
                page_index: 1,
                ..base.clone()
            },
            ViewParams {
                page_size: 50,
                ..base.clone()
            },
            ViewParams {
                sort: Some(SortSpec::ascending("name")),
                ..base.clone()
            },
        ];
        for params in &variants {
            assert_ne!(QueryKey::list("users", params), key);
        }
        assert_ne!(QueryKey::list("groups", &base), key);
    }

    #[test]
    fn test_request_matches_view_params() {
        let params = ViewParams {
            page_index: 4,
            search_text: "ada".into(),
            ..Default::default()
        };
        assert_eq!(QueryKey::list("users", &params).request(), params.page_request());
    }
}
