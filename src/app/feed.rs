use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::domain::notification::{NotificationRecord, RawRow};
use crate::error::WidgetError;

/// Supplies raw spreadsheet rows.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, WidgetError>;
}

#[derive(Clone)]
pub struct FeedService {
    source: Arc<dyn FeedSource>,
    max_notifications: usize,
}

impl FeedService {
    pub fn new(source: Arc<dyn FeedSource>, max_notifications: usize) -> Self {
        Self {
            source,
            max_notifications,
        }
    }

    /// Load the notifications to display. Falls back to the built-in sample
    /// list when the feed fails or has no valid rows.
    pub async fn load(&self) -> Vec<NotificationRecord> {
        let mut records = match self.source.fetch_rows().await {
            Ok(rows) => {
                let total = rows.len();
                let records = records_from_rows(rows);
                tracing::debug!(rows = total, valid = records.len(), "feed loaded");
                if records.is_empty() {
                    tracing::warn!("no valid notifications in feed, using fallback list");
                    fallback_notifications(OffsetDateTime::now_utc())
                } else {
                    records
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load feed, using fallback list");
                fallback_notifications(OffsetDateTime::now_utc())
            }
        };

        records.truncate(self.max_notifications);
        records
    }
}

/// Keep rows that have a name, location and product, in feed order.
pub fn records_from_rows(rows: Vec<RawRow>) -> Vec<NotificationRecord> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match NotificationRecord::from_row(row) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::debug!(row = index, error = %err, "dropping feed row");
                None
            }
        })
        .collect()
}

/// Sample notifications shown when the feed is unavailable.
pub fn fallback_notifications(now: OffsetDateTime) -> Vec<NotificationRecord> {
    let minutes_ago = |minutes: i64| {
        (now - Duration::minutes(minutes))
            .format(&Rfc3339)
            .unwrap_or_default()
    };

    vec![
        NotificationRecord::new("Tyler", "La Jolla", "SaaStember")
            .with_action("is enjoying")
            .with_timestamp(minutes_ago(2))
            .with_email("tyler@example.com"),
        NotificationRecord::new("Randy", "the US", "HLPT")
            .with_action("just purchased")
            .with_timestamp(minutes_ago(5))
            .with_email("randy@example.com"),
        NotificationRecord::new("Sarah Johnson", "Los Angeles", "SaaStember")
            .with_action("signed up for")
            .with_timestamp(minutes_ago(8))
            .with_picture("🧑"),
        NotificationRecord::new("Michael Brown", "Chicago", "HLPT")
            .with_action("upgraded to")
            .with_timestamp(minutes_ago(12))
            .with_picture("👨"),
    ]
}

/// Parse CSV export text. The first record is the header; header names are
/// lowercased and trimmed, cell values trimmed, blank lines skipped. Quoted
/// cells may contain commas, newlines and doubled quotes.
pub fn parse_csv(text: &str) -> Vec<RawRow> {
    let mut records = split_csv(text).into_iter();
    let headers: Vec<String> = match records.next() {
        Some(header) => header
            .into_iter()
            .map(|name| name.trim().to_lowercase())
            .collect(),
        None => return Vec::new(),
    };

    records
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter(|(header, cell)| !header.is_empty() && !cell.trim().is_empty())
                .map(|(header, cell)| (header.clone(), cell.trim().to_string()))
                .collect::<RawRow>()
        })
        .collect()
}

fn split_csv(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => record.push(std::mem::take(&mut cell)),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                record.push(std::mem::take(&mut cell));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => cell.push(ch),
        }
    }

    record.push(cell);
    push_record(&mut records, record);
    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    if record.iter().any(|cell| !cell.trim().is_empty()) {
        records.push(record);
    }
}

#[derive(Debug, Deserialize)]
struct GvizResponse {
    #[serde(default)]
    status: Option<String>,
    table: Option<GvizTable>,
}

#[derive(Debug, Deserialize)]
struct GvizTable {
    #[serde(default)]
    cols: Vec<GvizColumn>,
    #[serde(default)]
    rows: Vec<GvizRow>,
}

#[derive(Debug, Deserialize)]
struct GvizColumn {
    #[serde(default)]
    label: String,
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct GvizRow {
    #[serde(default)]
    c: Vec<Option<GvizCell>>,
}

#[derive(Debug, Deserialize)]
struct GvizCell {
    #[serde(default)]
    v: Value,
    #[serde(default)]
    f: Option<String>,
}

/// Parse a gviz `out:json` response, with or without its
/// `google.visualization.Query.setResponse(...)` wrapper.
pub fn parse_gviz(text: &str) -> Result<Vec<RawRow>, WidgetError> {
    let body = strip_jsonp(text);
    let response: GvizResponse = serde_json::from_str(body)
        .map_err(|err| WidgetError::feed(format!("invalid gviz payload: {}", err)))?;

    if let Some(status) = response.status.as_deref().filter(|status| *status == "error") {
        return Err(WidgetError::feed(format!("gviz status {}", status)));
    }

    let table = response
        .table
        .ok_or_else(|| WidgetError::feed("gviz payload has no table"))?;

    let headers: Vec<String> = table
        .cols
        .iter()
        .map(|col| {
            let name = if col.label.trim().is_empty() {
                &col.id
            } else {
                &col.label
            };
            name.trim().to_lowercase()
        })
        .collect();

    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            headers
                .iter()
                .zip(row.c)
                .filter_map(|(header, cell)| {
                    let value = cell.and_then(cell_text)?;
                    (!header.is_empty() && !value.is_empty()).then(|| (header.clone(), value))
                })
                .collect::<RawRow>()
        })
        .collect();

    Ok(rows)
}

fn strip_jsonp(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if open < close => &trimmed[open + 1..close],
        _ => trimmed,
    }
}

fn cell_text(cell: GvizCell) -> Option<String> {
    // Dates arrive as "Date(2024,0,15)" in `v`; keep that over `f`.
    let raw = match cell.v {
        Value::String(value) => Some(value),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    };
    let text = match raw {
        Some(value) if value.starts_with("Date(") => value,
        raw => cell.f.or(raw)?,
    };
    Some(text.trim().to_string())
}
