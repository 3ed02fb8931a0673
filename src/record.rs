//! Field-name views of the fixed-layout records.
//!
//! Every record shared with the SDK can be turned into an ordered
//! [`Mapping`] of its native field names and built back from one. Byte-string
//! fields come out either as raw bytes or decoded text.

use crate::error::RadarError;
use crate::Result;

/// One field value of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
    F32(f32),
    Bytes(Vec<u8>),
    Text(String),
    /// A nested record.
    Record(Mapping),
}

/// Ordered field-name/value pairs of a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, FieldValue)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Typed lookup used when rebuilding a record.
    pub fn field<T: Field>(&self, key: &str) -> Result<T> {
        let value = self
            .get(key)
            .ok_or_else(|| RadarError::MissingField(key.to_string()))?;
        T::from_value(value).ok_or_else(|| RadarError::FieldType {
            field: key.to_string(),
            expected: T::TYPE_NAME,
        })
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// A Rust type that can sit in a record field.
pub trait Field: Sized {
    const TYPE_NAME: &'static str;
    fn to_value(&self, decode_text: bool) -> FieldValue;
    fn from_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! scalar_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Field for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn to_value(&self, _decode_text: bool) -> FieldValue {
                    FieldValue::$variant(*self)
                }

                fn from_value(value: &FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

scalar_field! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i32 => I32,
    f32 => F32,
}

/// Byte string copied out of native memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteString(pub Vec<u8>);

impl ByteString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lossy text decoding.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl std::fmt::Display for ByteString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl Field for ByteString {
    const TYPE_NAME: &'static str = "bytes or text";

    fn to_value(&self, decode_text: bool) -> FieldValue {
        if decode_text {
            FieldValue::Text(self.to_text())
        } else {
            FieldValue::Bytes(self.0.clone())
        }
    }

    fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bytes(b) => Some(Self(b.clone())),
            FieldValue::Text(s) => Some(Self(s.as_bytes().to_vec())),
            _ => None,
        }
    }
}

/// A record with a declared, ordered field list.
pub trait Record: Sized {
    /// Native field names in declaration order.
    const FIELDS: &'static [&'static str];

    fn to_mapping(&self, decode_text: bool) -> Mapping;

    /// Every field in [`FIELDS`](Self::FIELDS) must be present with a matching type.
    /// Extra keys are ignored.
    fn from_mapping(mapping: &Mapping) -> Result<Self>;
}

/// Implement [`Record`] for a struct, pairing each Rust field with its native name.
macro_rules! impl_record {
    ($ty:ty { $($field:ident => $key:literal),* $(,)? }) => {
        impl $crate::record::Record for $ty {
            const FIELDS: &'static [&'static str] = &[$($key),*];

            fn to_mapping(&self, decode_text: bool) -> $crate::record::Mapping {
                let mut mapping = $crate::record::Mapping::new();
                $(
                    mapping.insert(
                        $key,
                        $crate::record::Field::to_value(&self.$field, decode_text),
                    );
                )*
                mapping
            }

            fn from_mapping(mapping: &$crate::record::Mapping) -> $crate::Result<Self> {
                Ok(Self {
                    $( $field: mapping.field($key)?, )*
                })
            }
        }
    };
}

/// Let records appear as fields of other records, stored as a nested [`Mapping`].
macro_rules! nested_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::record::Field for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn to_value(&self, decode_text: bool) -> $crate::record::FieldValue {
                    $crate::record::FieldValue::Record($crate::record::Record::to_mapping(self, decode_text))
                }

                fn from_value(value: &$crate::record::FieldValue) -> Option<Self> {
                    match value {
                        $crate::record::FieldValue::Record(m) => $crate::record::Record::from_mapping(m).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

pub(crate) use impl_record;
pub(crate) use nested_record;
