// Search parameter normalization
// Turns untyped, user-editable query state into a canonical SearchParams value.
// Each field falls back to its own default; nothing here ever fails.

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

// ISO calendar date as carried in the query string
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Fallback destination; uid and term must stay paired
pub const DEFAULT_UID: &str = "RsBU";
pub const DEFAULT_TERM: &str = "Singapore, Singapore";

// Default for guests, rooms and page
pub const DEFAULT_COUNT: u32 = 1;

pub const DEFAULT_MAX_ROOMS: u32 = 10;

// Normalizer configuration
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    pub default_uid: String,
    pub default_term: String,
    pub checkin_offset_days: u64,
    pub stay_nights: u64,
    // Larger room counts fall back to the default
    pub max_rooms: u32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_uid: DEFAULT_UID.to_string(),
            default_term: DEFAULT_TERM.to_string(),
            checkin_offset_days: 3,
            stay_nights: 1,
            max_rooms: DEFAULT_MAX_ROOMS,
        }
    }
}

// Check-in and check-out dates, either of which may be unset.
// Serializes as a two-element array, `null` standing in for an unset date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange(pub Option<String>, pub Option<String>);

impl DateRange {
    pub fn from_dates(checkin: NaiveDate, checkout: NaiveDate) -> Self {
        Self(
            Some(checkin.format(DATE_FORMAT).to_string()),
            Some(checkout.format(DATE_FORMAT).to_string()),
        )
    }

    pub fn checkin(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn checkout(&self) -> Option<&str> {
        self.1.as_deref()
    }
}

// Canonical search state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub uid: String,
    pub term: String,
    pub date: DateRange,
    pub guests: u32,
    pub rooms: u32,
    pub page: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        normalize(&Value::Null)
    }
}

impl SearchParams {
    // Untyped form accepted back by the normalizer
    pub fn to_value(&self) -> Value {
        json!({
            "uid": self.uid,
            "term": self.term,
            "date": [self.date.0, self.date.1],
            "guests": self.guests,
            "rooms": self.rooms,
            "page": self.page,
        })
    }

    // Overlay `patch` on this value and re-validate
    pub fn merge(&self, patch: &Value) -> SearchParams {
        SearchParamsNormalizer::default().merge(self, patch)
    }
}

pub struct SearchParamsNormalizer {
    config: NormalizerConfig,
}

impl Default for SearchParamsNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl SearchParamsNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, raw: &Value) -> SearchParams {
        self.normalize_at(raw, Local::now().date_naive())
    }

    // `today` anchors the default date range
    pub fn normalize_at(&self, raw: &Value, today: NaiveDate) -> SearchParams {
        let field = |key: &str| raw.get(key);

        let uid = non_empty_string(field("uid")).unwrap_or_else(|| {
            debug!(field = "uid", "falling back to default destination id");
            self.config.default_uid.clone()
        });

        let term = string(field("term")).unwrap_or_else(|| {
            debug!(field = "term", "falling back to default destination term");
            self.config.default_term.clone()
        });

        let date = date_range(field("date")).unwrap_or_else(|| {
            debug!(field = "date", "falling back to default date range");
            self.default_dates(today)
        });

        SearchParams {
            uid,
            term,
            date,
            guests: count_or_default("guests", field("guests")),
            rooms: self.room_count(field("rooms")),
            page: count_or_default("page", field("page")),
        }
    }

    fn room_count(&self, value: Option<&Value>) -> u32 {
        match value.and_then(coerce_count) {
            Some(rooms) if rooms <= self.config.max_rooms => rooms,
            _ => {
                debug!(field = "rooms", max_rooms = self.config.max_rooms, "falling back to default count");
                DEFAULT_COUNT
            }
        }
    }

    pub fn merge(&self, current: &SearchParams, patch: &Value) -> SearchParams {
        self.merge_at(current, patch, Local::now().date_naive())
    }

    pub fn merge_at(&self, current: &SearchParams, patch: &Value, today: NaiveDate) -> SearchParams {
        let mut merged = match current.to_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Some(patch) = patch.as_object() {
            for (key, value) in patch {
                merged.insert(key.clone(), value.clone());
            }
        }

        self.normalize_at(&Value::Object(merged), today)
    }

    // [today + offset, today + offset + nights]
    pub fn default_dates(&self, today: NaiveDate) -> DateRange {
        let checkin = today
            .checked_add_days(Days::new(self.config.checkin_offset_days))
            .unwrap_or(today);
        let checkout = checkin
            .checked_add_days(Days::new(self.config.stay_nights))
            .unwrap_or(checkin);

        DateRange::from_dates(checkin, checkout)
    }
}

pub fn normalize(raw: &Value) -> SearchParams {
    SearchParamsNormalizer::default().normalize(raw)
}

// Strict YYYY-MM-DD: the string must be exactly what the date formats back to
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == value).then_some(date)
}

fn string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    string(value).filter(|s| !s.is_empty())
}

// Exactly two elements, each an ISO date string or null
fn date_range(value: Option<&Value>) -> Option<DateRange> {
    let items = value?.as_array()?;
    if items.len() != 2 {
        return None;
    }

    let element = |item: &Value| -> Option<Option<String>> {
        match item {
            Value::Null => Some(None),
            Value::String(s) => parse_date(s).map(|_| Some(s.clone())),
            _ => None,
        }
    };

    Some(DateRange(element(&items[0])?, element(&items[1])?))
}

fn count_or_default(name: &str, value: Option<&Value>) -> u32 {
    value.and_then(coerce_count).unwrap_or_else(|| {
        debug!(field = name, "falling back to default count");
        DEFAULT_COUNT
    })
}

// Positive integer from a JSON number or a numeric string
fn coerce_count(value: &Value) -> Option<u32> {
    let count = match value {
        Value::Number(n) => match n.as_u64() {
            Some(n) => n,
            None => integral(n.as_f64()?)?,
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(n) => n,
                Err(_) => integral(s.parse::<f64>().ok()?)?,
            }
        }
        _ => return None,
    };

    u32::try_from(count).ok().filter(|n| *n > 0)
}

fn integral(n: f64) -> Option<u64> {
    if n.is_finite() && n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64 {
        Some(n as u64)
    } else {
        None
    }
}
