use crate::error::MagnetError;
use crate::query::{QueryData, QueryValue, indexed_key, parse_query};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{debug, trace};
use url::Url;

pub const MAGNET_SCHEME: &str = "magnet";
pub const XT_DELIMITER: char = ':';

pub const FIELD_EXACT_TOPIC: &str = "xt";
pub const FIELD_DISPLAY_NAME: &str = "dn";
pub const FIELD_EXACT_LENGTH: &str = "xl";
pub const FIELD_TRACKER: &str = "tr";
pub const FIELD_ACCEPTABLE_SOURCE: &str = "xs";

/// One file described by a magnet link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    pub display_name: Option<String>,
    /// Raw `xl` value; not checked to be numeric.
    pub data_size: Option<String>,
    /// URN namespace parts joined by a space, e.g. `btih` or `tree tiger`.
    pub hash_type: Option<String>,
    pub hash: Option<String>,
}

impl FileEntry {
    /// True if at least one field is present.
    pub fn has_data(&self) -> bool {
        self.display_name.is_some()
            || self.data_size.is_some()
            || self.hash_type.is_some()
            || self.hash.is_some()
    }
}

#[derive(Debug, Clone)]
struct Parsed {
    data: QueryData,
    error: Option<MagnetError>,
}

/// A magnet URI and the query data decoded from it.
///
/// The raw string is kept verbatim. It is parsed on first access and the
/// result is cached, so a link can be shared between threads. Input that is
/// not a magnet URI is not an error for the accessors: they return empty
/// results. Use [`MagnetLink::validate`] to find out why.
///
/// Parsing follows the WHATWG URL rules of the `url` crate. An authority
/// with a bad port (`magnet://host:port/?xt=...`) makes the whole link
/// invalid, and ASCII tabs and newlines are removed before decoding, so
/// `urn:btih:A\tBC` yields the hash `ABC`.
#[derive(Debug, Clone)]
pub struct MagnetLink {
    raw: String,
    parsed: OnceLock<Parsed>,
}

impl MagnetLink {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            parsed: OnceLock::new(),
        }
    }

    /// The URI exactly as it was given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// All decoded query parameters. Empty for links that failed to parse.
    pub fn query_data(&self) -> &QueryData {
        &self.parsed().data
    }

    /// Reports why the link degrades to empty data, if it does.
    pub fn validate(&self) -> Result<(), MagnetError> {
        match &self.parsed().error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Looks up `field`, or `field.index` for a non-zero index.
    pub fn data_index(&self, field: &str, index: Option<usize>) -> Option<&QueryValue> {
        self.query_data().get(&indexed_key(field, index))
    }

    /// Tracker URLs (`tr`) in order of appearance.
    pub fn trackers(&self) -> Vec<String> {
        self.values(FIELD_TRACKER)
    }

    /// Fallback download URLs (`xs`) in order of appearance.
    pub fn acceptable_sources(&self) -> Vec<String> {
        self.values(FIELD_ACCEPTABLE_SOURCE)
    }

    /// Files described by the link, starting with the unindexed fields.
    ///
    /// Entries are read at indices 0, 1, 2, ... until the first index with no
    /// fields at all. Anything after that gap is ignored, so `xt.2` without an
    /// `xt.1` (or `dn.1`, `xl.1`) never shows up.
    pub fn files(&self) -> Vec<FileEntry> {
        (0..)
            .map(|index| self.file_entry(index))
            .take_while(FileEntry::has_data)
            .collect()
    }

    fn file_entry(&self, index: usize) -> FileEntry {
        let (hash_type, hash) = self
            .first_at(FIELD_EXACT_TOPIC, index)
            .map(split_exact_topic)
            .unwrap_or_default();

        FileEntry {
            display_name: self.first_at(FIELD_DISPLAY_NAME, index).map(str::to_string),
            data_size: self.first_at(FIELD_EXACT_LENGTH, index).map(str::to_string),
            hash_type,
            hash,
        }
    }

    // A repeated per-file key resolves to its first occurrence.
    fn first_at(&self, field: &str, index: usize) -> Option<&str> {
        self.data_index(field, Some(index))
            .and_then(QueryValue::first)
    }

    fn values(&self, field: &str) -> Vec<String> {
        self.data_index(field, None)
            .map(QueryValue::to_vec)
            .unwrap_or_default()
    }

    fn parsed(&self) -> &Parsed {
        self.parsed.get_or_init(|| match parse(&self.raw) {
            Ok(data) => Parsed { data, error: None },
            Err(err) => {
                debug!(error = %err, "magnet link has no usable data");
                Parsed {
                    data: QueryData::new(),
                    error: Some(err),
                }
            }
        })
    }
}

#[tracing::instrument(skip(raw), fields(input_len = raw.len()))]
fn parse(raw: &str) -> Result<QueryData, MagnetError> {
    let uri = Url::parse(raw)?;
    if uri.scheme() != MAGNET_SCHEME {
        return Err(MagnetError::SchemeMismatch(uri.scheme().to_string()));
    }

    // Some inputs leave the parameters in the path, e.g. `magnet:/xt=...`.
    let query = match uri.query() {
        Some(query) if !query.is_empty() => query,
        _ => {
            let path = uri.path();
            path.strip_prefix(['?', '/']).unwrap_or(path)
        }
    };

    let data = parse_query(query);
    trace!(keys = data.len(), "decoded magnet query");
    Ok(data)
}

/// Splits an `xt` URN into (hash type, hash).
///
/// `urn:tree:tiger:H` gives `("tree tiger", "H")`, `urn:btih:H` gives
/// `("btih", "H")` and `urn:H` gives `("", "H")`. A value with no delimiter
/// has no room for a trailing hash, so both parts are absent.
fn split_exact_topic(xt: &str) -> (Option<String>, Option<String>) {
    if xt.is_empty() {
        return (None, None);
    }
    let parts: Vec<&str> = xt.split(XT_DELIMITER).collect();
    match parts.as_slice() {
        [_, middle @ .., hash] => (Some(middle.join(" ")), Some(hash.to_string())),
        [_] | [] => (None, None),
    }
}

impl fmt::Display for MagnetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for MagnetLink {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for MagnetLink {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl FromStr for MagnetLink {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}
