use serde_json::{Map, Value};

use crate::error::FieldError;

/// Citation metadata for one publication, as parsed from a CSL-JSON style document.
///
/// Every key is optional. Lookups report absence as [`FieldError::Missing`] so callers can decide
/// per field whether that is fatal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

/// One contributor from the `author` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub family: Option<String>,
    pub given: Option<String>,
}

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Record { fields }
    }

    /// Parse a JSON document; anything other than a top-level object is rejected.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Map<String, Value>>(body).map(Record::new)
    }

    /// Raw value under `key`. `null` counts as absent.
    pub fn get(&self, key: &str) -> Result<&Value, FieldError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Err(FieldError::missing(key)),
            Some(v) => Ok(v),
        }
    }

    /// Value under `key` rendered as plain text.
    pub fn text(&self, key: &str) -> Result<String, FieldError> {
        render(key, self.get(key)?)
    }

    pub fn authors(&self) -> Result<Vec<Author>, FieldError> {
        let list = match self.get("author")? {
            Value::Array(list) => list,
            other => {
                return Err(FieldError::NotText {
                    field: "author".into(),
                    found: kind(other),
                });
            }
        };
        if list.is_empty() {
            return Err(FieldError::missing("author[0]"));
        }
        list.iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(map) => Ok(Author {
                    family: string_of(map, "family"),
                    given: string_of(map, "given"),
                }),
                other => Err(FieldError::NotText {
                    field: format!("author[{i}]"),
                    found: kind(other),
                }),
            })
            .collect()
    }

    /// Family name of the first listed author.
    pub fn first_family(&self) -> Result<String, FieldError> {
        self.authors()?
            .into_iter()
            .next()
            .and_then(|a| a.family)
            .ok_or_else(|| FieldError::missing("author[0].family"))
    }

    /// Publication year: the first element of the first `issued.date-parts` entry.
    pub fn year(&self) -> Result<String, FieldError> {
        let issued = self.get("issued")?;
        let parts = issued
            .get("date-parts")
            .filter(|v| !v.is_null())
            .ok_or_else(|| FieldError::missing("issued.date-parts"))?;
        let first = parts
            .get(0)
            .ok_or_else(|| FieldError::missing("issued.date-parts[0]"))?;
        let path = "issued.date-parts[0][0]";
        match first.get(0) {
            None | Some(Value::Null) => Err(FieldError::missing(path)),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(FieldError::NotText {
                field: path.into(),
                found: kind(other),
            }),
        }
    }
}

impl Author {
    /// `Family, Given` for the author at `index` in the list. Both parts are required.
    pub fn display_name(&self, index: usize) -> Result<String, FieldError> {
        let family = self
            .family
            .as_deref()
            .ok_or_else(|| FieldError::missing(format!("author[{index}].family")))?;
        let given = self
            .given
            .as_deref()
            .ok_or_else(|| FieldError::missing(format!("author[{index}].given")))?;
        Ok(format!("{family}, {given}"))
    }
}

fn string_of(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn render(field: &str, value: &Value) -> Result<String, FieldError> {
    match value {
        Value::Null => Err(FieldError::missing(field)),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        // CSL-JSON services often wrap ISSN and container-title in arrays.
        Value::Array(items) => {
            let parts = items
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    other => Err(FieldError::NotText {
                        field: field.into(),
                        found: kind(other),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if parts.is_empty() {
                Err(FieldError::missing(field))
            } else {
                Ok(parts.join(", "))
            }
        }
        other => Err(FieldError::NotText {
            field: field.into(),
            found: kind(other),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
