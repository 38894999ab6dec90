use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Field, FieldValue, LensError, QueryKind};

static UNKNOWN: FieldValue = FieldValue::Unknown;

/// Provider-independent result of one lookup.
///
/// A record always carries the full field set of its kind; values that could
/// not be determined hold [`FieldValue::Unknown`] rather than being absent, so
/// consumers never branch on presence.
///
/// Deserialization rebuilds the record from its kind: omitted fields read as
/// `Unknown` and fields foreign to the kind are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordRepr")]
pub struct NormalizedRecord {
    kind: QueryKind,
    fields: BTreeMap<Field, FieldValue>,
}

#[derive(Deserialize)]
struct RecordRepr {
    kind: QueryKind,
    #[serde(default)]
    fields: BTreeMap<Field, FieldValue>,
}

impl TryFrom<RecordRepr> for NormalizedRecord {
    type Error = LensError;

    fn try_from(repr: RecordRepr) -> Result<Self, Self::Error> {
        let mut record = Self::unknown(repr.kind);
        for (field, value) in repr.fields {
            record.set(field, value)?;
        }
        Ok(record)
    }
}

impl NormalizedRecord {
    /// The default record for `kind`: every field `Unknown`.
    #[must_use]
    pub fn unknown(kind: QueryKind) -> Self {
        Self {
            kind,
            fields: kind
                .fields()
                .iter()
                .map(|f| (*f, FieldValue::Unknown))
                .collect(),
        }
    }

    /// Kind of lookup this record answers.
    #[must_use]
    pub const fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Value of `field`; fields foreign to this kind read as `Unknown`.
    #[must_use]
    pub fn get(&self, field: Field) -> &FieldValue {
        self.fields.get(&field).unwrap_or(&UNKNOWN)
    }

    /// Set `field` to `value`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `field` does not belong to this record's kind.
    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) -> Result<(), LensError> {
        match self.fields.get_mut(&field) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(LensError::InvalidArg(format!(
                "field {field} does not belong to {} records",
                self.kind
            ))),
        }
    }

    /// Builder-style [`set`](Self::set).
    ///
    /// # Errors
    /// Returns `InvalidArg` if `field` does not belong to this record's kind.
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Result<Self, LensError> {
        self.set(field, value)?;
        Ok(self)
    }

    /// True when at least one field holds a determined value.
    #[must_use]
    pub fn is_informative(&self) -> bool {
        self.fields.values().any(FieldValue::is_known)
    }

    /// Number of fields holding a determined value.
    #[must_use]
    pub fn known_count(&self) -> usize {
        self.fields.values().filter(|v| v.is_known()).count()
    }

    /// Fill this record's `Unknown` fields from `other`; known values are kept.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the two records are of different kinds.
    pub fn merge_from(&mut self, other: &Self) -> Result<(), LensError> {
        if self.kind != other.kind {
            return Err(LensError::InvalidArg(format!(
                "cannot merge {} record into {} record",
                other.kind, self.kind
            )));
        }
        for (field, value) in &mut self.fields {
            if value.is_unknown() {
                value.clone_from(other.get(*field));
            }
        }
        Ok(())
    }

    /// Iterate fields in their canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }
}
