//! FILENAME: core/engine/src/record.rs
//! PURPOSE: The flat, immutable record handed to the report pipeline.
//! CONTEXT: A record keeps its fields in ingestion order. Field lookups are a
//! linear scan over a handful of entries, which beats hashing for the narrow
//! order/request rows this dashboard deals with.

use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::Value;

/// Shared handle to an ingested record. Records never change after ingestion,
/// so pipeline stages pass these around instead of cloning field data.
pub type RecordRef = Arc<Record>;

static NULL_VALUE: Value = Value::Null;

/// One flat row of input data: field name -> primitive value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    /// Builds a record from (name, value) pairs. A repeated name overwrites the
    /// earlier value but keeps its original position.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Record::new();
        for (k, v) in pairs {
            record.insert(k.into(), v.into());
        }
        record
    }

    fn insert(&mut self, name: String, value: Value) {
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns the value for a field, if the record has it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Returns the value for a field, treating a missing field as null.
    pub fn value(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&NULL_VALUE)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn from_json_object(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut record = Record::new();
        for (k, v) in map {
            record.insert(k.clone(), Value::from(v));
        }
        record
    }
}

/// Parses a JSON array of flat objects into shared records.
pub fn records_from_json(json: &str) -> Result<Vec<RecordRef>, serde_json::Error> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Arc::new).collect())
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a flat object of primitive values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let mut record = Record::new();
        while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
            record.insert(key, Value::from(&value));
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}
