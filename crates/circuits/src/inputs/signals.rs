//! Reading and writing circuit signal objects.
//!
//! Witness generators take a flat JSON object keyed by signal name. Scalars
//! are decimal strings (negative values keep their sign and circom reduces
//! them), `pathElements` is an array of decimal strings and `pathIndices` an
//! array of numbers.

use std::fmt::Display;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::InputError;
use crate::field::FieldElement;
use crate::kind::CircuitKind;
use crate::merkle::MerkleProof;

pub(crate) const PATH_ELEMENTS: &str = "pathElements";
pub(crate) const PATH_INDICES: &str = "pathIndices";

/// One circuit's input schema.
pub(crate) trait CircuitSignals: Sized {
    const KIND: CircuitKind;
    /// Every signal the circuit declares as an input, in declaration order
    const SIGNALS: &'static [&'static str];

    fn write_signals(&self, out: &mut SignalWriter);
    fn read_signals(reader: &SignalReader<'_>) -> Result<Self, InputError>;
}

#[derive(Default)]
pub(crate) struct SignalWriter {
    map: Map<String, Value>,
}

impl SignalWriter {
    pub fn field(&mut self, name: &str, value: &FieldElement) -> &mut Self {
        self.map.insert(name.to_string(), Value::String(value.to_string()));
        self
    }

    /// Any integer, signed or not, rendered as a decimal string.
    pub fn int<T: Display>(&mut self, name: &str, value: T) -> &mut Self {
        self.map.insert(name.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn flag(&mut self, name: &str, value: bool) -> &mut Self {
        let bit = if value { "1" } else { "0" };
        self.map.insert(name.to_string(), Value::String(bit.to_string()));
        self
    }

    pub fn path(&mut self, proof: &MerkleProof) -> &mut Self {
        let elements = proof
            .path_elements
            .iter()
            .map(|e| Value::String(e.to_string()))
            .collect();
        let indices = proof
            .path_indices
            .iter()
            .map(|&bit| Value::from(bit))
            .collect();
        self.map.insert(PATH_ELEMENTS.to_string(), Value::Array(elements));
        self.map.insert(PATH_INDICES.to_string(), Value::Array(indices));
        self
    }

    pub fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

pub(crate) struct SignalReader<'a> {
    circuit: CircuitKind,
    map: &'a Map<String, Value>,
}

impl<'a> SignalReader<'a> {
    pub fn new(circuit: CircuitKind, value: &'a Value) -> Result<Self, InputError> {
        match value {
            Value::Object(map) => Ok(Self { circuit, map }),
            _ => Err(InputError::NotAnObject { circuit }),
        }
    }

    fn get(&self, name: &'static str) -> Result<&'a Value, InputError> {
        match self.map.get(name) {
            Some(Value::Null) | None => Err(InputError::MissingField {
                circuit: self.circuit,
                field: name,
            }),
            Some(value) => Ok(value),
        }
    }

    fn invalid(&self, field: &str, reason: impl Display) -> InputError {
        InputError::InvalidValue {
            circuit: self.circuit,
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// String or JSON number, as text.
    fn text(&self, name: &'static str, value: &Value) -> Result<String, InputError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(self.invalid(name, format!("expected a number or string, got {other}"))),
        }
    }

    pub fn field(&self, name: &'static str) -> Result<FieldElement, InputError> {
        let text = self.text(name, self.get(name)?)?;
        text.parse().map_err(|e| self.invalid(name, e))
    }

    pub fn int<T>(&self, name: &'static str) -> Result<T, InputError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let text = self.text(name, self.get(name)?)?;
        text.trim().parse().map_err(|e| self.invalid(name, e))
    }

    pub fn flag(&self, name: &'static str) -> Result<bool, InputError> {
        match self.get(name)? {
            Value::Bool(b) => Ok(*b),
            value => match self.text(name, value)?.trim() {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(self.invalid(name, format!("expected 0 or 1, got {other:?}"))),
            },
        }
    }

    pub fn path(&self) -> Result<MerkleProof, InputError> {
        let elements = self.array(PATH_ELEMENTS)?;
        let indices = self.array(PATH_INDICES)?;
        if elements.len() != indices.len() {
            return Err(self.invalid(
                PATH_INDICES,
                format!(
                    "{} path elements but {} path indices",
                    elements.len(),
                    indices.len()
                ),
            ));
        }

        let path_elements = elements
            .iter()
            .map(|value| {
                self.text(PATH_ELEMENTS, value)?
                    .parse::<FieldElement>()
                    .map_err(|e| self.invalid(PATH_ELEMENTS, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let path_indices = indices
            .iter()
            .map(|value| match self.text(PATH_INDICES, value)?.trim() {
                "0" => Ok(0u8),
                "1" => Ok(1u8),
                other => Err(self.invalid(PATH_INDICES, format!("index bit {other:?}"))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MerkleProof {
            path_elements,
            path_indices,
        })
    }

    fn array(&self, name: &'static str) -> Result<&'a Vec<Value>, InputError> {
        match self.get(name)? {
            Value::Array(items) => Ok(items),
            other => Err(self.invalid(name, format!("expected an array, got {other}"))),
        }
    }
}
