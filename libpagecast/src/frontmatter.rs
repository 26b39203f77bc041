//! Front-matter codec for post records
//!
//! Post files carry a `---`-delimited header of flat `key: value` lines
//! followed by a free-form body. Values are either plain strings or bracketed
//! string lists (`[facebook, x]`). The codec preserves field order so that a
//! patched record diffs cleanly in version control.

/// A parsed front-matter value
///
/// Field values are either a plain string or an ordered list of strings.
/// There is no deeper nesting in this format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    List(Vec<String>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::Text(_) => None,
            Value::List(items) => Some(items),
        }
    }

    fn render(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::List(items) => format!("[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// An ordered set of front-matter fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: Vec<(String, Value)>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document into its front matter and body.
    ///
    /// A document without an opening `---` line has no fields and the whole
    /// text is the body. This is never an error.
    pub fn parse(text: &str) -> (FrontMatter, String) {
        let lines: Vec<&str> = text.split('\n').collect();

        if lines.first().map(|l| l.trim()) != Some("---") {
            return (FrontMatter::new(), text.to_string());
        }

        let mut fields = Vec::new();
        let mut end = lines.len();
        for (i, line) in lines.iter().enumerate().skip(1) {
            if line.trim() == "---" {
                end = i;
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some(idx) = line.find(':') else {
                continue;
            };
            let key = line[..idx].trim().to_string();
            let raw = line[idx + 1..].trim();
            fields.push((key, parse_value(raw)));
        }

        let body = if end < lines.len() {
            lines[end + 1..].join("\n")
        } else {
            // Header never closed; nothing left for a body.
            String::new()
        };

        (FrontMatter { fields }, body)
    }

    /// Render the fields and body back into a document.
    ///
    /// `parse(render(fields, body))` reproduces the fields and body exactly
    /// for plain-string and string-list values.
    pub fn render(&self, body: &str) -> String {
        if self.fields.is_empty() {
            return body.to_string();
        }

        let mut out = String::from("---\n");
        for (key, value) in &self.fields {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&value.render());
            out.push('\n');
        }
        out.push_str("---\n");
        out.push_str(body);
        out
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Get a field as text. List values are not coerced.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    /// Get a field as a list. A plain string counts as a one-element list.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::List(items)) => items.clone(),
            Some(Value::Text(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Set a field, overwriting an existing key in place or appending a new
    /// one at the end. Unrelated fields keep their positions.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    /// Remove a field. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|(k, _)| k != key);
        self.fields.len() != before
    }

    /// Remove every field whose key satisfies the predicate. Returns the
    /// number of fields removed.
    pub fn remove_matching(&mut self, mut pred: impl FnMut(&str) -> bool) -> usize {
        let before = self.fields.len();
        self.fields.retain(|(k, _)| !pred(k));
        before - self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

fn parse_value(raw: &str) -> Value {
    if raw.starts_with('[') && raw.ends_with(']') && raw.len() >= 2 {
        let items: Vec<String> = raw[1..raw.len() - 1]
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(strip_quotes)
            .collect();
        return Value::List(items);
    }
    Value::Text(strip_quotes(raw))
}

/// Strip one layer of matching surrounding quotes; anything else stays raw.
fn strip_quotes(s: &str) -> String {
    let bytes = s.as_bytes();
    if s.len() >= 2 {
        let first = bytes[0];
        let last = bytes[s.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}
