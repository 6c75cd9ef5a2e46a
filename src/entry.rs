use crate::{
    error::{EntryError, FieldError},
    field::{FIELDS, FieldSpec},
    record::Record,
};

/// A finished `@article` block, terminated by `}\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    label: String,
    text: String,
}

impl Entry {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Accumulates field lines for one entry until [`EntryBuilder::finish`].
#[derive(Debug)]
pub struct EntryBuilder {
    label: String,
    buf: String,
    keys: Vec<&'static str>,
}

impl EntryBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let buf = format!("@article{{{label},\n");
        EntryBuilder {
            label,
            buf,
            keys: Vec::with_capacity(FIELDS.len()),
        }
    }

    /// Try to render `field`; returns whether a line was added.
    ///
    /// Missing fields are skipped silently. Fields that are present but unrenderable are skipped
    /// with a warning.
    pub fn push(&mut self, field: &FieldSpec, record: &Record) -> bool {
        match field.format(record) {
            Ok(line) => {
                self.buf.push('\t');
                self.buf.push_str(&line);
                self.keys.push(field.key);
                true
            }
            Err(FieldError::Missing(path)) => {
                tracing::trace!(label = %self.label, field = field.key, %path, "field absent");
                false
            }
            Err(e) => {
                tracing::warn!(label = %self.label, field = field.key, "skipping field: {e}");
                false
            }
        }
    }

    /// Keys of the lines added so far, in order.
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    pub fn finish(mut self) -> Entry {
        self.buf.push_str("}\n");
        Entry {
            label: self.label,
            text: self.buf,
        }
    }
}

/// Citation label: first author's family name, publication year, then `a`.
pub fn label(record: &Record) -> Result<String, EntryError> {
    let family = record.first_family().map_err(EntryError::Label)?;
    let year = record.year().map_err(EntryError::Label)?;
    Ok(format!("{family}{year}a"))
}

/// Render one record as a BibTeX `@article` entry.
///
/// Fails only when the label cannot be built; every other field is optional.
pub fn assemble(record: &Record) -> Result<Entry, EntryError> {
    let mut builder = EntryBuilder::new(label(record)?);
    for field in FIELDS {
        builder.push(field, record);
    }
    tracing::trace!(label = %builder.label, fields = ?builder.keys(), "entry assembled");
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn record(v: Value) -> Record {
        match v {
            Value::Object(map) => Record::new(map),
            _ => panic!("test record must be an object"),
        }
    }

    fn full() -> Value {
        json!({
            "author": [
                { "family": "Smith", "given": "J" },
                { "family": "Doe", "given": "Jane" },
            ],
            "title": "A study",
            "container-title": "Journal of Things",
            "publisher": "Acme",
            "volume": "12",
            "issue": "3",
            "page": "100-110",
            "issued": { "date-parts": [[2020, 1, 15]] },
            "ISSN": "1234-5678",
        })
    }

    #[test]
    fn single_author_record() {
        let r = record(json!({
            "author": [{ "family": "Smith", "given": "J" }],
            "issued": { "date-parts": [[2020]] },
            "title": "X",
        }));
        let entry = assemble(&r).unwrap();
        assert_eq!(entry.label(), "Smith2020a");
        assert_eq!(
            entry.as_str(),
            "@article{Smith2020a,\n\tauthor = {Smith, J},\n\ttitle = {X},\n\tyear = {2020},\n}\n"
        );
        assert!(!entry.as_str().contains("journal ="));
    }

    #[test]
    fn full_record_in_fixed_order() {
        let entry = assemble(&record(full())).unwrap();
        assert_eq!(
            entry.as_str(),
            "@article{Smith2020a,\n\
             \tauthor = {Smith, J and Doe, Jane},\n\
             \ttitle = {A study},\n\
             \tjournal = {Journal of Things},\n\
             \tpublisher = {Acme},\n\
             \tvolume = {12},\n\
             \tnumber = {3},\n\
             \tpages = {100-110},\n\
             \tyear = {2020},\n\
             \tissn = {1234-5678},\n\
             }\n"
        );
    }

    #[test]
    fn missing_author_fails_label() {
        let r = record(json!({ "issued": { "date-parts": [[2020]] }, "title": "X" }));
        assert_eq!(
            assemble(&r),
            Err(EntryError::Label(FieldError::missing("author")))
        );
    }

    #[test]
    fn missing_year_fails_label() {
        let r = record(json!({ "author": [{ "family": "Smith", "given": "J" }] }));
        assert_eq!(
            assemble(&r),
            Err(EntryError::Label(FieldError::missing("issued")))
        );
    }

    #[test]
    fn incomplete_coauthor_drops_author_line_but_keeps_label() {
        let r = record(json!({
            "author": [{ "family": "Smith", "given": "J" }, { "family": "Roe" }],
            "issued": { "date-parts": [[2020]] },
            "title": "X",
        }));
        let entry = assemble(&r).unwrap();
        assert_eq!(
            entry.as_str(),
            "@article{Smith2020a,\n\ttitle = {X},\n\tyear = {2020},\n}\n"
        );
    }

    #[test]
    fn label_uses_first_author_and_first_date() {
        let r = record(json!({
            "author": [{ "family": "Zed", "given": "A" }, { "family": "Abel", "given": "B" }],
            "issued": { "date-parts": [[1999], [2005]] },
        }));
        assert_eq!(label(&r).unwrap(), "Zed1999a");
    }

    #[test]
    fn unrenderable_field_is_skipped() {
        let mut v = full();
        v["title"] = json!({ "nested": true });
        let entry = assemble(&record(v)).unwrap();
        assert!(!entry.as_str().contains("title ="));
        assert!(entry.as_str().contains("\tjournal = {Journal of Things},\n"));
    }

    #[test]
    fn builder_tracks_added_keys() {
        let r = record(json!({ "title": "X", "page": "1" }));
        let mut builder = EntryBuilder::new("Key");
        for field in FIELDS {
            builder.push(field, &r);
        }
        assert_eq!(builder.keys(), ["title", "pages"]);
        assert_eq!(
            builder.finish().as_str(),
            "@article{Key,\n\ttitle = {X},\n\tpages = {1},\n}\n"
        );
    }

    const OPTIONAL: [(&str, &str); 7] = [
        ("title", "title"),
        ("container-title", "journal"),
        ("publisher", "publisher"),
        ("volume", "volume"),
        ("issue", "number"),
        ("page", "pages"),
        ("ISSN", "issn"),
    ];

    #[test]
    fn dropping_optional_fields_keeps_order() {
        proptest::proptest!(|(mask in proptest::collection::vec(proptest::bool::ANY, OPTIONAL.len()))| {
            let mut v = full();
            let mut expected = vec!["author"];
            for ((source, key), keep) in OPTIONAL.iter().zip(&mask) {
                if *keep {
                    expected.push(*key);
                } else if let Some(obj) = v.as_object_mut() {
                    obj.remove(*source);
                }
            }
            expected.push("year");
            let order: Vec<&str> = FIELDS.iter().map(|f| f.key).collect();
            expected.sort_by_key(|k| order.iter().position(|o| o == k));

            let entry = assemble(&record(v)).unwrap();
            let text = entry.as_str();
            let opens_with_label = text.starts_with("@article{Smith2020a,\n");
            let closes_block = text.ends_with("}\n");
            proptest::prop_assert!(opens_with_label);
            proptest::prop_assert!(closes_block);
            let keys: Vec<&str> = text
                .lines()
                .filter_map(|l| l.strip_prefix('\t'))
                .filter_map(|l| l.split_once(" = ").map(|(k, _)| k))
                .collect();
            proptest::prop_assert_eq!(keys, expected);
        })
    }

    #[test]
    fn assembling_is_idempotent() {
        let r = record(full());
        assert_eq!(assemble(&r).unwrap(), assemble(&r).unwrap());
    }

    #[test]
    fn output_parses_as_bibtex() {
        let entry = assemble(&record(full())).unwrap();
        let bib = biblatex::Bibliography::parse(entry.as_str()).unwrap();
        assert_eq!(bib.len(), 1);
        assert!(bib.get("Smith2020a").is_some());
    }
}
