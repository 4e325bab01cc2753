use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Column holding the exercise name; the only field `search` looks at
pub const NAME_FIELD: &str = "Exercise";

/// One exercise row: a synthetic id plus the sheet's columns in header order.
///
/// Column sets differ between uploaded sheets, so fields are kept as ordered
/// `(column, value)` pairs rather than a fixed struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: usize,
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(id: usize) -> Self {
        Record {
            id,
            fields: Vec::new(),
        }
    }

    /// Set a field. An existing column keeps its position and takes the new value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Values in `columns` order; absent columns come back empty
    pub fn values_for(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.get(c).unwrap_or_default().to_string())
            .collect()
    }
}

/// `{"id": 1, "<column>": "<value>", ...}` with columns in header order.
///
/// A sheet column literally called `id` never shadows the synthetic id in
/// JSON output; it is still reachable through [`Record::get`].
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        for (name, value) in self.fields.iter().filter(|(name, _)| name != "id") {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Every record parsed from one upload, plus the column list they share
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    /// RFC 3339 time the set was built; `None` for the empty start-up set
    pub loaded_at: Option<String>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        RecordSet {
            columns,
            records,
            loaded_at: Some(chrono::Local::now().to_rfc3339()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
