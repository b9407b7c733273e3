//! Event loading from tabular exports
//!
//! The loader is the boundary with the upstream data provider. Column names
//! are configuration ([`LoaderConfig`]); the default names match the
//! arkhamdb deck export (`investigator_name`, `date_creation`, `name`).
//!
//! Rows with an unparseable timestamp or an empty entity name fail the load
//! by default. With [`MalformedPolicy::Skip`] they are dropped, but every
//! dropped row is logged at `warn` and counted in [`LoadedEvents`].

use crate::event::{Event, Timestamp};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading events
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input has no header row")]
    MissingHeader,

    #[error("Missing column '{0}' in header")]
    MissingColumn(String),

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

/// What to do with a row that cannot be turned into an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Abort the whole load (default)
    #[default]
    Fail,
    /// Drop the row with a warning
    Skip,
}

/// Column mapping and validation policy for CSV input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Column holding the entity (investigator) name
    #[serde(default = "default_entity_column")]
    pub entity_column: String,

    /// Column holding the creation timestamp
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,

    /// Optional column with the deck title; ignored if absent from the header
    #[serde(default = "default_deck_column")]
    pub deck_column: Option<String>,

    /// Malformed row handling
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

fn default_entity_column() -> String {
    "investigator_name".to_string()
}

fn default_timestamp_column() -> String {
    "date_creation".to_string()
}

fn default_deck_column() -> Option<String> {
    Some("name".to_string())
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            entity_column: default_entity_column(),
            timestamp_column: default_timestamp_column(),
            deck_column: default_deck_column(),
            on_malformed: MalformedPolicy::default(),
        }
    }
}

impl LoaderConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.entity_column.trim().is_empty() {
            return Err("entity_column must not be empty".to_string());
        }
        if self.timestamp_column.trim().is_empty() {
            return Err("timestamp_column must not be empty".to_string());
        }
        if self.entity_column == self.timestamp_column {
            return Err(format!(
                "entity_column and timestamp_column must differ, both are '{}'",
                self.entity_column
            ));
        }
        Ok(())
    }
}

/// Events read from a source, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedEvents {
    pub events: Vec<Event>,
    /// Data rows seen (header and blank lines excluded)
    pub rows_read: usize,
    /// Rows dropped under [`MalformedPolicy::Skip`]
    pub rows_skipped: usize,
}

/// Anything that can supply the raw event sequence
pub trait EventSource {
    fn load(&mut self) -> Result<LoadedEvents, LoadError>;
}

impl EventSource for Vec<Event> {
    fn load(&mut self) -> Result<LoadedEvents, LoadError> {
        let events = std::mem::take(self);
        Ok(LoadedEvents {
            rows_read: events.len(),
            rows_skipped: 0,
            events,
        })
    }
}

/// CSV-backed event source
pub struct CsvEventSource<R> {
    reader: R,
    config: LoaderConfig,
}

impl<R: Read> CsvEventSource<R> {
    pub fn new(reader: R, config: LoaderConfig) -> Self {
        Self { reader, config }
    }
}

impl CsvEventSource<File> {
    /// Open a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P, config: LoaderConfig) -> Result<Self, LoadError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file, config))
    }
}

impl<R: Read> EventSource for CsvEventSource<R> {
    fn load(&mut self) -> Result<LoadedEvents, LoadError> {
        let mut content = String::new();
        self.reader.read_to_string(&mut content)?;
        parse_events(&content, &self.config)
    }
}

/// A CSV record and the 1-based line it starts on
#[derive(Debug, PartialEq)]
struct CsvRecord {
    line: usize,
    fields: Vec<String>,
    /// First quoting violation seen in the record
    error: Option<String>,
}

/// Split CSV text into records (RFC 4180 quoting, blank lines skipped)
///
/// A quote inside an unquoted field, or text between a closing quote and
/// the next separator, marks the record as malformed. Only an unterminated
/// quote fails the whole split, since record boundaries are lost after it.
fn split_records(content: &str) -> Result<Vec<CsvRecord>, LoadError> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut error: Option<String> = None;
    let mut in_quotes = false;
    let mut after_quote = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    let mut finish_record =
        |fields: &mut Vec<String>, field: &mut String, error: &mut Option<String>, start: usize| {
            fields.push(std::mem::take(field));
            let record = std::mem::take(fields);
            let error = error.take();
            let blank = record.len() == 1 && record[0].trim().is_empty() && error.is_none();
            if !blank {
                records.push(CsvRecord {
                    line: start,
                    fields: record,
                    error,
                });
            }
        };

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => {
                    in_quotes = false;
                    after_quote = true;
                }
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            ',' => {
                fields.push(std::mem::take(&mut field));
                after_quote = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                finish_record(&mut fields, &mut field, &mut error, record_line);
                after_quote = false;
                line += 1;
                record_line = line;
            }
            _ if after_quote => {
                if error.is_none() {
                    error = Some(format!("unexpected '{}' after closing quote", c));
                }
                field.push(c);
            }
            '"' if field.is_empty() => in_quotes = true,
            '"' => {
                if error.is_none() {
                    error = Some("unexpected quote in unquoted field".to_string());
                }
                field.push(c);
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(LoadError::MalformedRow {
            line: record_line,
            reason: "unterminated quoted field".to_string(),
        });
    }
    if !fields.is_empty() || !field.is_empty() || error.is_some() {
        finish_record(&mut fields, &mut field, &mut error, record_line);
    }

    Ok(records)
}

/// Column positions resolved from the header
struct Columns {
    entity: usize,
    timestamp: usize,
    deck: Option<usize>,
    width: usize,
}

impl Columns {
    fn resolve(header: &[String], config: &LoaderConfig) -> Result<Self, LoadError> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);

        let entity = find(&config.entity_column)
            .ok_or_else(|| LoadError::MissingColumn(config.entity_column.clone()))?;
        let timestamp = find(&config.timestamp_column)
            .ok_or_else(|| LoadError::MissingColumn(config.timestamp_column.clone()))?;
        let deck = config.deck_column.as_deref().and_then(find);

        Ok(Self {
            entity,
            timestamp,
            deck,
            width: header.len(),
        })
    }

    fn to_event(&self, fields: &[String]) -> Result<Event, String> {
        if fields.len() != self.width {
            return Err(format!(
                "expected {} fields, found {}",
                self.width,
                fields.len()
            ));
        }

        let entity = fields[self.entity].as_str();
        if entity.trim().is_empty() {
            return Err("missing entity name".to_string());
        }

        let created_at = Timestamp::parse(&fields[self.timestamp])?;
        let mut event = Event::new(entity, created_at);
        if let Some(deck) = self.deck.map(|i| &fields[i]) {
            if !deck.is_empty() {
                event = event.with_deck_name(deck.as_str());
            }
        }
        Ok(event)
    }
}

/// Parse CSV text into events according to `config`
pub fn parse_events(content: &str, config: &LoaderConfig) -> Result<LoadedEvents, LoadError> {
    // Spreadsheet exports often lead with a byte order mark
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut records = split_records(content)?.into_iter();
    let header = records.next().ok_or(LoadError::MissingHeader)?;
    if let Some(reason) = header.error {
        return Err(LoadError::MalformedRow {
            line: header.line,
            reason,
        });
    }
    let columns = Columns::resolve(&header.fields, config)?;

    let mut loaded = LoadedEvents::default();
    for record in records {
        loaded.rows_read += 1;
        let parsed = match record.error {
            Some(reason) => Err(reason),
            None => columns.to_event(&record.fields),
        };
        match parsed {
            Ok(event) => loaded.events.push(event),
            Err(reason) => match config.on_malformed {
                MalformedPolicy::Fail => {
                    return Err(LoadError::MalformedRow {
                        line: record.line,
                        reason,
                    });
                }
                MalformedPolicy::Skip => {
                    tracing::warn!(
                        "Skipping malformed row at line {}: {}",
                        record.line,
                        reason
                    );
                    loaded.rows_skipped += 1;
                }
            },
        }
    }

    tracing::info!(
        "Loaded {} events from {} rows ({} skipped)",
        loaded.events.len(),
        loaded.rows_read,
        loaded.rows_skipped
    );

    Ok(loaded)
}
