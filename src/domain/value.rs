use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::schema::FieldKind;

/// Shape of a value held by a field, derived from its [`FieldKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Number,
    Bool,
    StringList,
    File,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Number => write!(f, "number"),
            ValueType::Bool => write!(f, "boolean"),
            ValueType::StringList => write!(f, "string list"),
            ValueType::File => write!(f, "file"),
        }
    }
}

/// Reference to a file picked by the user. The engine never reads the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: u64,
}

impl FileRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            size: 0,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

/// Concrete value of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Option<f64>),
    Bool(bool),
    List(Vec<String>),
    File(Option<FileRef>),
}

impl FieldValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            FieldValue::Text(_) => ValueType::String,
            FieldValue::Number(_) => ValueType::Number,
            FieldValue::Bool(_) => ValueType::Bool,
            FieldValue::List(_) => ValueType::StringList,
            FieldValue::File(_) => ValueType::File,
        }
    }

    /// Whether the value counts as "missing" for the required check.
    ///
    /// An unchecked checkbox is empty. With `blank_is_empty`, whitespace-only
    /// text is empty as well.
    pub fn is_empty(&self, blank_is_empty: bool) -> bool {
        match self {
            FieldValue::Text(text) if blank_is_empty => text.trim().is_empty(),
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Number(number) => number.is_none(),
            FieldValue::Bool(flag) => !flag,
            FieldValue::List(items) => items.is_empty(),
            FieldValue::File(file) => file.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => *number,
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            FieldValue::File(file) => file.as_ref(),
            _ => None,
        }
    }

    /// Coerce a JSON value into the shape dictated by `kind`.
    ///
    /// `null` maps to the kind's empty value. Returns `None` when the JSON
    /// value cannot represent the kind.
    pub fn from_json(kind: FieldKind, value: &Value) -> Option<FieldValue> {
        if value.is_null() {
            return Some(kind.empty_value());
        }
        match kind.value_type() {
            ValueType::String => value.as_str().map(|text| FieldValue::Text(text.to_string())),
            ValueType::Number => value.as_f64().map(|number| FieldValue::Number(Some(number))),
            ValueType::Bool => value.as_bool().map(FieldValue::Bool),
            ValueType::StringList => value.as_array().and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(FieldValue::List)
            }),
            ValueType::File => serde_json::from_value::<FileRef>(value.clone())
                .ok()
                .map(|file| FieldValue::File(Some(file))),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Number(Some(number)) => serde_json::Number::from_f64(*number)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Number(None) | FieldValue::File(None) => Value::Null,
            FieldValue::Bool(flag) => Value::Bool(*flag),
            FieldValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::File(Some(file)) => serde_json::to_value(file).unwrap_or(Value::Null),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(text) => serializer.serialize_str(text),
            FieldValue::Number(Some(number)) => serializer.serialize_f64(*number),
            FieldValue::Number(None) | FieldValue::File(None) => serializer.serialize_none(),
            FieldValue::Bool(flag) => serializer.serialize_bool(*flag),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::File(Some(file)) => file.serialize(serializer),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(Some(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(Some(f64::from(value)))
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        FieldValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<FileRef> for FieldValue {
    fn from(value: FileRef) -> Self {
        FieldValue::File(Some(value))
    }
}

/// Field key → value mapping, in schema declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormValues {
    entries: IndexMap<String, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_number)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FieldValue::as_bool)
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(FieldValue::as_list)
    }

    pub fn file(&self, key: &str) -> Option<&FileRef> {
        self.get(key).and_then(FieldValue::as_file)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the values as a nested JSON object; dotted keys such as
    /// `address.street` expand into nested objects.
    pub fn to_json(&self) -> Value {
        let mut root = Value::Object(Map::new());
        for (key, value) in &self.entries {
            let path = key.split('.').map(str::to_string).collect::<Vec<_>>();
            insert_path(&mut root, &path, value.to_json());
        }
        root
    }

    /// Deserialize the nested JSON rendering of the values into `T`.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = FormValues::new();
        for (key, value) in iter {
            values.insert(key, value);
        }
        values
    }
}

impl<'a> IntoIterator for &'a FormValues {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn insert_path(root: &mut Value, path: &[String], value: Value) {
    if path.is_empty() {
        *root = value;
        return;
    }

    if !root.is_object() {
        *root = Value::Object(Map::new());
    }

    if let Value::Object(obj) = root {
        if path.len() == 1 {
            obj.insert(path[0].clone(), value);
            return;
        }

        let entry = obj
            .entry(path[0].clone())
            .or_insert_with(|| Value::Object(Map::new()));
        insert_path(entry, &path[1..], value);
    }
}

/// Look up a dotted key in a JSON document, first as a flat key and then as
/// a nested path.
pub(crate) fn value_at_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(flat) = value.as_object().and_then(|map| map.get(key)) {
        return Some(flat);
    }
    let mut current = value;
    for segment in key.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(segment)?;
            }
            _ => return None,
        }
    }
    Some(current)
}
