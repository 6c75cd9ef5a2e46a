use crate::{error::FieldError, record::Record};

type ExtractFn = fn(&Record) -> Result<String, FieldError>;

/// A BibTeX field and how to pull its value out of a [`Record`].
#[derive(Clone, Copy)]
pub struct FieldSpec {
    /// Lower-case BibTeX key emitted in the entry.
    pub key: &'static str,
    extract: ExtractFn,
}

/// Fields of an `@article` entry, in emission order.
///
/// NOTE: Ordering is significant. The assembler walks this table front to back, and absent
/// fields are dropped without reordering the rest.
pub static FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "author",
        extract: authors,
    },
    FieldSpec {
        key: "title",
        extract: |r| r.text("title"),
    },
    FieldSpec {
        key: "journal",
        extract: |r| r.text("container-title"),
    },
    FieldSpec {
        key: "publisher",
        extract: |r| r.text("publisher"),
    },
    FieldSpec {
        key: "volume",
        extract: |r| r.text("volume"),
    },
    FieldSpec {
        key: "number",
        extract: |r| r.text("issue"),
    },
    FieldSpec {
        key: "pages",
        extract: |r| r.text("page"),
    },
    FieldSpec {
        key: "year",
        extract: Record::year,
    },
    FieldSpec {
        key: "issn",
        extract: |r| r.text("ISSN"),
    },
];

impl FieldSpec {
    /// Look up a field by its BibTeX key.
    pub fn by_key(key: &str) -> Option<&'static FieldSpec> {
        FIELDS.iter().find(|f| f.key.eq_ignore_ascii_case(key))
    }

    pub fn value(&self, record: &Record) -> Result<String, FieldError> {
        (self.extract)(record)
    }

    /// Render `key = {value},\n` for this field.
    pub fn format(&self, record: &Record) -> Result<String, FieldError> {
        let value = self.value(record)?;
        Ok(format!("{} = {{{}}},\n", self.key, value))
    }
}

/// Format one field by BibTeX key. Unknown keys are reported as missing.
pub fn format_field(record: &Record, key: &str) -> Result<String, FieldError> {
    FieldSpec::by_key(key)
        .ok_or_else(|| FieldError::missing(key))?
        .format(record)
}

/// All authors as `Family, Given` joined by ` and `, in input order.
fn authors(record: &Record) -> Result<String, FieldError> {
    record
        .authors()?
        .iter()
        .enumerate()
        .map(|(i, a)| a.display_name(i))
        .collect::<Result<Vec<_>, _>>()
        .map(|names| names.join(" and "))
}
