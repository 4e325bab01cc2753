//! Filtering, search and pagination over the in-memory record set

use crate::record::{NAME_FIELD, Record, RecordSet};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 20;

/// A filterable column: the query parameter that targets it and the key its
/// distinct values are published under.
#[derive(Clone, Copy, Debug)]
pub struct FilterField {
    pub param: &'static str,
    pub column: &'static str,
    pub facet: &'static str,
}

pub const FILTER_FIELDS: [FilterField; 11] = [
    FilterField { param: "difficulty", column: "Difficulty Level", facet: "difficulties" },
    FilterField { param: "muscle", column: "Target Muscle Group", facet: "muscles" },
    FilterField { param: "equipment", column: "Primary Equipment", facet: "equipment" },
    FilterField { param: "posture", column: "Posture", facet: "postures" },
    FilterField { param: "bodyRegion", column: "Body Region", facet: "bodyRegions" },
    FilterField { param: "mechanics", column: "Mechanics", facet: "mechanics" },
    FilterField { param: "forceType", column: "Force Type", facet: "forceTypes" },
    FilterField { param: "laterality", column: "Laterality", facet: "laterality" },
    FilterField {
        param: "classification",
        column: "Primary Exercise Classification",
        facet: "classifications",
    },
    FilterField { param: "movementPattern", column: "Movement Pattern #1", facet: "movementPatterns" },
    FilterField { param: "planeOfMotion", column: "Plane Of Motion #1", facet: "planesOfMotion" },
];

/// A parsed `list` request
#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    /// `(column, needle)` pairs, AND-combined
    pub filters: Vec<(String, String)>,
    pub search: Option<String>,
    pub page: usize,
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            filters: Vec::new(),
            search: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    /// Build a query from raw query-string pairs.
    ///
    /// Unknown parameters are ignored, empty values switch a filter off and
    /// anything that is not a positive integer falls back to the default
    /// page or limit.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let filters = FILTER_FIELDS
            .iter()
            .filter_map(|field| {
                params
                    .get(field.param)
                    .filter(|v| !v.is_empty())
                    .map(|v| (field.column.to_string(), v.clone()))
            })
            .collect();

        ListQuery {
            filters,
            search: params.get("search").filter(|s| !s.is_empty()).cloned(),
            page: positive_or(params.get("page"), DEFAULT_PAGE),
            limit: positive_or(params.get("limit"), DEFAULT_LIMIT),
        }
    }
}

fn positive_or(raw: Option<&String>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// One page of results
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    match haystack {
        Some(h) if !h.is_empty() => h.to_lowercase().contains(&needle.to_lowercase()),
        _ => false,
    }
}

/// True when `record` passes every filter and the name search
pub fn matches(record: &Record, query: &ListQuery) -> bool {
    let filtered = query
        .filters
        .iter()
        .all(|(column, needle)| contains_ignore_case(record.get(column), needle));

    filtered
        && query
            .search
            .as_deref()
            .is_none_or(|needle| contains_ignore_case(record.get(NAME_FIELD), needle))
}

/// Filter, then slice out the requested page.
///
/// A page past the end is empty but still reports the real totals.
pub fn list<'a>(set: &'a RecordSet, query: &ListQuery) -> Page<&'a Record> {
    let limit = query.limit.max(1);
    let page = query.page.max(1);

    let matched: Vec<&Record> = set.records.iter().filter(|r| matches(r, query)).collect();
    let total = matched.len();
    let start = (page - 1).saturating_mul(limit);

    Page {
        items: matched.into_iter().skip(start).take(limit).collect(),
        total,
        page,
        total_pages: total.div_ceil(limit),
    }
}

/// Non-empty values of `column` in first-seen order. Case-sensitive.
pub fn distinct_values(set: &RecordSet, column: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    set.records
        .iter()
        .filter_map(|r| r.get(column))
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Distinct values for every filterable column, keyed by facet name
pub fn facets(set: &RecordSet) -> BTreeMap<&'static str, Vec<String>> {
    FILTER_FIELDS
        .iter()
        .map(|field| (field.facet, distinct_values(set, field.column)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: usize, name: &str, difficulty: &str, muscle: &str) -> Record {
        let mut r = Record::new(id);
        r.set("Exercise", name);
        r.set("Difficulty Level", difficulty);
        r.set("Target Muscle Group", muscle);
        r
    }

    fn sample() -> RecordSet {
        RecordSet::new(
            vec![
                "Exercise".into(),
                "Difficulty Level".into(),
                "Target Muscle Group".into(),
            ],
            vec![
                record(1, "Push-up", "Beginner", "Chest"),
                record(2, "Pull-up", "Intermediate", "Back"),
                record(3, "Dip", "Intermediate", "Chest"),
                record(4, "Pistol Squat", "Advanced", "Quadriceps"),
                record(5, "Lunge", "Intermediate", ""),
            ],
        )
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn filter_then_paginate() {
        let set = sample();
        let query = ListQuery::from_params(&params(&[
            ("difficulty", "Inter"),
            ("page", "2"),
            ("limit", "1"),
        ]));
        let page = list(&set, &query);

        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, 3);
    }

    #[test]
    fn filters_combine_with_and() {
        let set = sample();
        let query = ListQuery::from_params(&params(&[("difficulty", "intermediate"), ("muscle", "CHEST")]));
        let ids: Vec<usize> = list(&set, &query).items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn empty_field_fails_active_filter() {
        let set = sample();
        let query = ListQuery::from_params(&params(&[("muscle", "")]));
        assert_eq!(list(&set, &query).total, 5);

        let query = ListQuery {
            filters: vec![("Target Muscle Group".into(), "e".into())],
            ..ListQuery::default()
        };
        assert!(list(&set, &query).items.iter().all(|r| r.id != 5));
    }

    #[test]
    fn search_only_looks_at_name() {
        let set = sample();
        let query = ListQuery::from_params(&params(&[("search", "UP")]));
        let ids: Vec<usize> = list(&set, &query).items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let query = ListQuery::from_params(&params(&[("search", "Chest")]));
        assert_eq!(list(&set, &query).total, 0);
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let set = sample();
        let query = ListQuery::from_params(&params(&[("page", "9"), ("limit", "2")]));
        let page = list(&set, &query);

        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn bad_pagination_falls_back_to_defaults() {
        for (p, l) in [("abc", "xyz"), ("0", "0"), ("-2", "-5"), ("", "")] {
            let query = ListQuery::from_params(&params(&[("page", p), ("limit", l)]));
            assert_eq!(query.page, DEFAULT_PAGE);
            assert_eq!(query.limit, DEFAULT_LIMIT);
        }
    }

    #[test]
    fn empty_set_has_zero_pages() {
        let set = RecordSet::default();
        let page = list(&set, &ListQuery::default());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let set = sample();
        assert_eq!(
            distinct_values(&set, "Difficulty Level"),
            vec!["Beginner", "Intermediate", "Advanced"]
        );
        assert_eq!(distinct_values(&set, "Target Muscle Group"), vec!["Chest", "Back", "Quadriceps"]);
        assert!(distinct_values(&set, "Posture").is_empty());
    }

    #[test]
    fn distinct_values_are_case_sensitive() {
        let set = RecordSet::new(
            vec!["Primary Equipment".into()],
            vec![
                {
                    let mut r = Record::new(1);
                    r.set("Primary Equipment", "Barbell");
                    r
                },
                {
                    let mut r = Record::new(2);
                    r.set("Primary Equipment", "barbell");
                    r
                },
            ],
        );
        assert_eq!(distinct_values(&set, "Primary Equipment"), vec!["Barbell", "barbell"]);
    }

    #[test]
    fn facets_cover_every_filter() {
        let facets = facets(&sample());
        assert_eq!(facets.len(), FILTER_FIELDS.len());
        assert_eq!(facets["muscles"], vec!["Chest", "Back", "Quadriceps"]);
        assert!(facets["planesOfMotion"].is_empty());
    }
}
