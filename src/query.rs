use std::collections::HashMap;

/// The value(s) stored under one query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    /// The key was repeated; values are in order of appearance.
    Multiple(Vec<String>),
}

impl QueryValue {
    /// The first value seen for the key.
    pub fn first(&self) -> Option<&str> {
        match self {
            QueryValue::Single(value) => Some(value),
            QueryValue::Multiple(values) => values.first().map(String::as_str),
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        match self {
            QueryValue::Single(value) => vec![value.clone()],
            QueryValue::Multiple(values) => values.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryValue::Single(_) => 1,
            QueryValue::Multiple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decoded query parameters keyed by name.
pub type QueryData = HashMap<String, QueryValue>;

/// Maps a field name and optional index to its query key.
///
/// Index 0 and no index both name the unindexed key, so `("xt", Some(0))`
/// is `"xt"` and `("xt", Some(2))` is `"xt.2"`.
pub fn indexed_key(field: &str, index: Option<usize>) -> String {
    match index {
        None | Some(0) => field.to_string(),
        Some(i) => format!("{field}.{i}"),
    }
}

/// Decodes a form-urlencoded query string.
///
/// Pairs are split on `&` and `;`. Pairs with no `=` or an empty value are
/// dropped. A key seen once maps to `Single`, a repeated key to `Multiple`.
pub fn parse_query(query: &str) -> QueryData {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();

    for pair in query.split(['&', ';']) {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let key = form_decode(key);
        let value = form_decode(value);
        let values = grouped.entry(key.clone()).or_default();
        if values.is_empty() {
            order.push(key);
        }
        values.push(value);
    }

    let mut data = QueryData::with_capacity(grouped.len());
    for key in order {
        let Some(mut values) = grouped.remove(&key) else {
            continue;
        };
        let value = match values.len() {
            0 => continue,
            1 => QueryValue::Single(values.remove(0)),
            _ => QueryValue::Multiple(values),
        };
        data.insert(key, value);
    }
    data
}

fn form_decode(s: &str) -> String {
    // `+` is a space in form encoding; urlencoding only handles `%XX`.
    let with_spaces = s.replace('+', " ");
    let bytes = urlencoding::decode_binary(with_spaces.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}
