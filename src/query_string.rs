// URL query string <-> search state
// Repeated keys (e.g. `date=...&date=...`) carry the check-in/check-out pair.

use crate::search_params::{normalize, SearchParams};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query decode error: {0}")]
    DecodeError(String),

    #[error("Query encode error: {0}")]
    EncodeError(String),
}

// Every recognised key, collecting repeated occurrences
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawQuery {
    uid: Vec<String>,
    term: Vec<String>,
    date: Vec<String>,
    guests: Vec<String>,
    rooms: Vec<String>,
    page: Vec<String>,
}

// Decodes a query string into the untyped record the normalizer expects.
// A key seen once becomes a string, a key seen more than once becomes an
// array. Empty `date` values stand for an unset date and become `null`.
pub fn parse_query(query: &str) -> Result<Value, QueryError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let raw: RawQuery =
        serde_html_form::from_str(query).map_err(|e| QueryError::DecodeError(e.to_string()))?;

    let mut record = Map::new();
    insert_values(&mut record, "uid", raw.uid, false);
    insert_values(&mut record, "term", raw.term, false);
    insert_values(&mut record, "date", raw.date, true);
    insert_values(&mut record, "guests", raw.guests, false);
    insert_values(&mut record, "rooms", raw.rooms, false);
    insert_values(&mut record, "page", raw.page, false);

    Ok(Value::Object(record))
}

fn insert_values(record: &mut Map<String, Value>, key: &str, values: Vec<String>, empty_is_null: bool) {
    let to_value = |s: String| {
        if empty_is_null && s.is_empty() {
            Value::Null
        } else {
            Value::String(s)
        }
    };

    let mut values: Vec<Value> = values.into_iter().map(to_value).collect();
    match values.len() {
        0 => {}
        1 => {
            record.insert(key.to_string(), values.remove(0));
        }
        _ => {
            record.insert(key.to_string(), Value::Array(values));
        }
    }
}

// Key order: uid, term, date, date, guests, rooms, page
pub fn to_query(params: &SearchParams) -> Result<String, QueryError> {
    let pairs: Vec<(&str, String)> = vec![
        ("uid", params.uid.clone()),
        ("term", params.term.clone()),
        ("date", params.date.checkin().unwrap_or_default().to_string()),
        ("date", params.date.checkout().unwrap_or_default().to_string()),
        ("guests", params.guests.to_string()),
        ("rooms", params.rooms.to_string()),
        ("page", params.page.to_string()),
    ];

    serde_html_form::to_string(&pairs).map_err(|e| QueryError::EncodeError(e.to_string()))
}

impl SearchParams {
    // Never fails: an undecodable query normalizes as empty input
    pub fn from_query(query: &str) -> SearchParams {
        match parse_query(query) {
            Ok(raw) => normalize(&raw),
            Err(e) => {
                warn!(error = %e, "discarding undecodable search query");
                normalize(&Value::Null)
            }
        }
    }

    pub fn to_query(&self) -> Result<String, QueryError> {
        to_query(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_params::{DateRange, SearchParamsNormalizer, DEFAULT_UID};
    use chrono::NaiveDate;
    use serde_json::json;

    const FULL_QUERY: &str =
        "uid=user1&term=Paris%2C+France&date=2025-12-01&date=2025-12-05&guests=4&rooms=2&page=3";

    #[test]
    fn test_parse_full_query() {
        let raw = parse_query(FULL_QUERY).unwrap();
        assert_eq!(
            raw,
            json!({
                "uid": "user1",
                "term": "Paris, France",
                "date": ["2025-12-01", "2025-12-05"],
                "guests": "4",
                "rooms": "2",
                "page": "3",
            })
        );
    }

    #[test]
    fn test_from_query_normalizes() {
        let params = SearchParams::from_query(&format!("?{}", FULL_QUERY));
        assert_eq!(params.uid, "user1");
        assert_eq!(params.term, "Paris, France");
        assert_eq!(
            params.date,
            DateRange(Some("2025-12-01".to_string()), Some("2025-12-05".to_string()))
        );
        assert_eq!((params.guests, params.rooms, params.page), (4, 2, 3));
    }

    #[test]
    fn test_empty_date_value_becomes_null() {
        let raw = parse_query("date=&date=2025-12-05").unwrap();
        assert_eq!(raw, json!({ "date": [null, "2025-12-05"] }));
    }

    #[test]
    fn test_single_date_is_not_a_pair() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let normalizer = SearchParamsNormalizer::default();

        let raw = parse_query("date=2025-12-01&guests=abc").unwrap();
        let params = normalizer.normalize_at(&raw, today);
        assert_eq!(params.date, normalizer.default_dates(today));
        assert_eq!(params.guests, 1);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let raw = parse_query("utm_source=mail&uid=abcd").unwrap();
        assert_eq!(raw, json!({ "uid": "abcd" }));
    }

    #[test]
    fn test_repeated_uid_falls_back() {
        let params = SearchParams::from_query("uid=a&uid=b");
        assert_eq!(params.uid, DEFAULT_UID);
    }

    #[test]
    fn test_to_query_preserves_state() -> anyhow::Result<()> {
        let params = SearchParams::from_query(FULL_QUERY);
        let query = params.to_query()?;
        assert_eq!(query, FULL_QUERY);
        assert_eq!(SearchParams::from_query(&query), params);
        Ok(())
    }

    #[test]
    fn test_to_query_writes_unset_dates_as_empty() -> anyhow::Result<()> {
        let params = SearchParams::from_query("uid=abcd&term=x&date=&date=2025-12-05");
        let query = params.to_query()?;
        assert!(query.contains("date=&date=2025-12-05"));
        assert_eq!(SearchParams::from_query(&query).date, params.date);
        Ok(())
    }
}
