//! External parameter encoding.
//!
//! # Keys
//!
//! | Key | Encoded when | Decoded default |
//! |-----|--------------|-----------------|
//! | `page` | always (1-based) | page 1 |
//! | `status` | filter is not `all` | `all` |
//! | `search` | settled search text is non-empty | empty |
//! | `sort` | a sort is applied | no sort |
//! | `order` | a sort is applied (`asc`/`desc`) | `asc` |
//!
//! Column visibility and page size are never encoded. For any map produced by
//! [`encode`], `encode(&decode(&m, n)) == m`.

use std::collections::BTreeMap;

use grid_model::{SortSpec, StatusFilter, ViewParams};

pub const PAGE_KEY: &str = "page";
pub const STATUS_KEY: &str = "status";
pub const SEARCH_KEY: &str = "search";
pub const SORT_KEY: &str = "sort";
pub const ORDER_KEY: &str = "order";

/// Every key owned by the view-state encoder, in canonical order.
pub const VIEW_KEYS: [&str; 5] = [PAGE_KEY, STATUS_KEY, SEARCH_KEY, SORT_KEY, ORDER_KEY];

/// Flat string mapping of the external representation.
pub type QueryParams = BTreeMap<String, String>;

/// Encode the persisted subset of the view parameters.
pub fn encode(params: &ViewParams) -> QueryParams {
    let mut query = QueryParams::new();
    query.insert(PAGE_KEY.to_string(), (params.page_index + 1).to_string());

    if params.status_filter != StatusFilter::All {
        query.insert(
            STATUS_KEY.to_string(),
            params.status_filter.as_str().to_string(),
        );
    }

    if !params.search_text.is_empty() {
        query.insert(SEARCH_KEY.to_string(), params.search_text.clone());
    }

    if let Some(sort) = params.sort.as_ref().filter(|s| !s.field_key.is_empty()) {
        query.insert(SORT_KEY.to_string(), sort.field_key.clone());
        query.insert(ORDER_KEY.to_string(), sort.direction().to_string());
    }

    query
}

/// Decode view parameters, falling back to defaults for absent or invalid keys.
///
/// Column visibility is left empty; it lives in the settings store.
pub fn decode(query: &QueryParams, page_size: usize) -> ViewParams {
    let page_index = query
        .get(PAGE_KEY)
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|page| *page >= 1)
        .map_or(0, |page| page - 1);

    let status_filter = query
        .get(STATUS_KEY)
        .and_then(|raw| raw.parse::<StatusFilter>().ok())
        .unwrap_or_default();

    let search_text = query.get(SEARCH_KEY).cloned().unwrap_or_default();

    let sort = query
        .get(SORT_KEY)
        .filter(|field| !field.is_empty())
        .map(|field| SortSpec {
            field_key: field.clone(),
            descending: query
                .get(ORDER_KEY)
                .is_some_and(|order| order.eq_ignore_ascii_case("desc")),
        });

    ViewParams {
        search_text,
        status_filter,
        page_index,
        page_size,
        sort,
        ..Default::default()
    }
}

/// Replace the view-owned keys of `current` with `encoded`, keeping foreign keys.
pub fn merge_into(current: &QueryParams, encoded: QueryParams) -> QueryParams {
    let mut merged: QueryParams = current
        .iter()
        .filter(|(key, _)| !VIEW_KEYS.contains(&key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    merged.extend(encoded);
    merged
}

// =============================================================================
// QUERY STRING
// =============================================================================

/// Render parameters as `key=value&...`, view keys first in canonical order.
pub fn to_query_string(query: &QueryParams) -> String {
    let canonical = VIEW_KEYS
        .iter()
        .filter_map(|key| query.get_key_value(*key));
    let foreign = query
        .iter()
        .filter(|(key, _)| !VIEW_KEYS.contains(&key.as_str()));

    canonical
        .chain(foreign)
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a `key=value&...` string. A leading `?` is ignored; later duplicates win.
pub fn parse_query_string(raw: &str) -> QueryParams {
    raw.trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (percent_decode(key), percent_decode(value)),
            None => (percent_decode(pair), String::new()),
        })
        .collect()
}

/// Decode a query component. `+` is a space; invalid UTF-8 is replaced.
fn percent_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_encode_only_page() {
        let encoded = encode(&ViewParams::default());
        assert_eq!(encoded, query(&[("page", "1")]));
    }

    #[test]
    fn test_absent_keys_decode_to_defaults() {
        let params = decode(&QueryParams::new(), 10);
        assert_eq!(params, ViewParams::default());
    }

    #[test]
    fn test_full_encode() {
        let params = ViewParams {
            search_text: "ada lovelace".to_string(),
            status_filter: StatusFilter::Inactive,
            page_index: 3,
            sort: Some(SortSpec::descending("name")),
            ..Default::default()
        };
        let encoded = encode(&params);
        assert_eq!(
            encoded,
            query(&[
                ("page", "4"),
                ("status", "inactive"),
                ("search", "ada lovelace"),
                ("sort", "name"),
                ("order", "desc"),
            ])
        );
        assert_eq!(decode(&encoded, 10), params);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let params = decode(
            &query(&[("page", "0"), ("status", "archived"), ("sort", "")]),
            10,
        );
        assert_eq!(params.page_index, 0);
        assert_eq!(params.status_filter, StatusFilter::All);
        assert_eq!(params.sort, None);

        let params = decode(&query(&[("page", "-2"), ("sort", "name")]), 10);
        assert_eq!(params.page_index, 0);
        assert_eq!(params.sort, Some(SortSpec::ascending("name")));
    }

    #[test]
    fn test_merge_keeps_foreign_keys() {
        let current = query(&[("tab", "users"), ("page", "3"), ("search", "old")]);
        let merged = merge_into(&current, query(&[("page", "1")]));
        assert_eq!(merged, query(&[("tab", "users"), ("page", "1")]));
    }

    #[test]
    fn test_query_string_round_trip() {
        let params = query(&[("page", "2"), ("search", "a&b=c d%"), ("tab", "x")]);
        let rendered = to_query_string(&params);
        assert_eq!(rendered, "page=2&search=a%26b%3Dc%20d%25&tab=x");
        assert_eq!(parse_query_string(&rendered), params);
        assert_eq!(
            parse_query_string("?page=2&search=a+b"),
            query(&[("page", "2"), ("search", "a b")])
        );
    }

    #[test]
    fn test_malformed_percent_sequences_are_kept() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_decode("a%2Bb+c"), "a+b c");
        assert_eq!(percent_decode("%FF"), "\u{FFFD}");
    }
}
