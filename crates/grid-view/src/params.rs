//! External parameter representation (URL-style query parameters).

use crate::codec::{QueryParams, parse_query_string, to_query_string};

/// Read/replace access to the external parameter representation.
///
/// `replace` swaps the current mapping in place; it never adds a history
/// entry.
pub trait ParamStore {
    /// Current parameters.
    fn read(&self) -> QueryParams;

    /// Replace the current parameters.
    fn replace(&mut self, params: QueryParams);
}

/// In-memory parameter store.
#[derive(Debug, Clone, Default)]
pub struct MemoryParamStore {
    params: QueryParams,
    replacements: usize,
}

impl MemoryParamStore {
    pub fn new(params: QueryParams) -> Self {
        Self {
            params,
            replacements: 0,
        }
    }

    /// Start from a `key=value&...` string.
    pub fn from_query_string(raw: &str) -> Self {
        Self::new(parse_query_string(raw))
    }

    /// Current parameters as a query string.
    pub fn query_string(&self) -> String {
        to_query_string(&self.params)
    }

    /// Number of `replace` calls so far.
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl ParamStore for MemoryParamStore {
    fn read(&self) -> QueryParams {
        self.params.clone()
    }

    fn replace(&mut self, params: QueryParams) {
        self.params = params;
        self.replacements += 1;
    }
}
