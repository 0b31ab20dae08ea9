//! Canonical query string for `GET /todos`.
//!
//! Grammar:
//! `?page=<int>[&sortBy=f1:asc,f2:desc][&text=..][&priority=LOW|MEDIUM|HIGH][&done=true|false]`

use std::fmt::Write;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::types::{FilterSpec, SortSpec};

/// Everything but unreserved characters is escaped in values. Also used
/// for item ids in paths.
pub(crate) const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Sort tokens keep `:` and `,` literal since they are the grammar's own
/// separators; field names never contain them.
const SORT_VALUE: &AsciiSet = &QUERY_VALUE.remove(b':').remove(b',');

/// Build the query string (leading `?` included) for a list request.
pub fn build_query(page: u32, sort_by: &SortSpec, filter_by: Option<&FilterSpec>) -> String {
    let mut query = format!("?page={page}");

    if !sort_by.is_empty() {
        let tokens: Vec<String> = sort_by
            .fields()
            .iter()
            .map(|s| format!("{}:{}", s.field, if s.ascending { "asc" } else { "desc" }))
            .collect();
        let joined = tokens.join(",");
        let _ = write!(query, "&sortBy={}", utf8_percent_encode(&joined, SORT_VALUE));
    }

    if let Some(filter) = filter_by {
        if let Some(text) = &filter.text {
            let _ = write!(query, "&text={}", utf8_percent_encode(text, QUERY_VALUE));
        }
        if let Some(priority) = filter.priority {
            let _ = write!(query, "&priority={priority}");
        }
        if let Some(done) = filter.done {
            let _ = write!(query, "&done={done}");
        }
    }

    query
}

#[cfg(test)]
mod tests {
    use percent_encoding::percent_decode_str;

    use super::*;
    use crate::types::{Priority, SortField};

    /// Reference parser for the grammar above.
    fn parse(query: &str) -> (u32, SortSpec, Option<FilterSpec>) {
        let mut page = None;
        let mut sort = SortSpec::new();
        let mut filter = FilterSpec::default();
        for pair in query.trim_start_matches('?').split('&') {
            let (key, raw) = pair.split_once('=').unwrap();
            let value = percent_decode_str(raw).decode_utf8().unwrap().into_owned();
            match key {
                "page" => page = Some(value.parse().unwrap()),
                "sortBy" => {
                    sort = value
                        .split(',')
                        .map(|token| {
                            let (field, dir) = token.split_once(':').unwrap();
                            SortField { field: field.to_string(), ascending: dir == "asc" }
                        })
                        .collect()
                }
                "text" => filter.text = Some(value),
                "priority" => filter.priority = Some(value.parse().unwrap()),
                "done" => filter.done = Some(value.parse().unwrap()),
                other => panic!("unexpected key {other}"),
            }
        }
        let filter = (!filter.is_empty()).then_some(filter);
        (page.unwrap(), sort, filter)
    }

    fn sort_of(fields: &[(&str, bool)]) -> SortSpec {
        fields
            .iter()
            .map(|(f, asc)| SortField { field: f.to_string(), ascending: *asc })
            .collect()
    }

    #[test]
    fn page_only() {
        assert_eq!(build_query(0, &SortSpec::new(), None), "?page=0");
    }

    #[test]
    fn sort_tokens_are_comma_joined_in_order() {
        let sort = sort_of(&[("priority", true), ("dueDate", false)]);
        assert_eq!(
            build_query(3, &sort, None),
            "?page=3&sortBy=priority:asc,dueDate:desc"
        );
    }

    #[test]
    fn filter_fields_follow_sort() {
        let sort = sort_of(&[("dueDate", true)]);
        let filter = FilterSpec {
            text: Some("milk".into()),
            priority: Some(Priority::High),
            done: Some(false),
        };
        assert_eq!(
            build_query(1, &sort, Some(&filter)),
            "?page=1&sortBy=dueDate:asc&text=milk&priority=HIGH&done=false"
        );
    }

    #[test]
    fn null_filter_fields_are_omitted() {
        let filter = FilterSpec { done: Some(true), ..Default::default() };
        assert_eq!(build_query(0, &SortSpec::new(), Some(&filter)), "?page=0&done=true");
        assert_eq!(
            build_query(0, &SortSpec::new(), Some(&FilterSpec::default())),
            "?page=0"
        );
    }

    #[test]
    fn text_with_reserved_characters_is_escaped() {
        let filter = FilterSpec { text: Some("a&b=c d".into()), ..Default::default() };
        assert_eq!(
            build_query(0, &SortSpec::new(), Some(&filter)),
            "?page=0&text=a%26b%3Dc%20d"
        );
    }

    #[test]
    fn reference_parser_reconstructs_inputs() {
        let cases = vec![
            (0, sort_of(&[]), None),
            (2, sort_of(&[("priority", false)]), None),
            (
                7,
                sort_of(&[("dueDate", true), ("priority", false)]),
                Some(FilterSpec {
                    text: Some("pay rent & bills, 100%".into()),
                    priority: Some(Priority::Low),
                    done: None,
                }),
            ),
            (
                1,
                sort_of(&[]),
                Some(FilterSpec { text: None, priority: None, done: Some(true) }),
            ),
            (4, sort_of(&[]), Some(FilterSpec { text: Some("ñandú ✓".into()), ..Default::default() })),
        ];
        for (page, sort, filter) in cases {
            let query = build_query(page, &sort, filter.as_ref());
            let (p, s, f) = parse(&query);
            assert_eq!(p, page, "{query}");
            assert_eq!(s, sort, "{query}");
            assert_eq!(f, filter, "{query}");
        }
    }
}
