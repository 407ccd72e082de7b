//! Sequence and mapping decoders.
//!
//! Sequences are repeatable: each occurrence of the option in the raw input
//! decodes one element and appends it. An aligned token (`--list=a,b,c`)
//! carries a whole run of elements and is split on the element separator,
//! except for sequences of mappings, where the aligned token is one mapping.
//!
//! Mappings consume one token per occurrence, split it into pairs and each
//! pair into exactly one key and one value. Keys and values decode through
//! the same [`FlagValue`] contract, so `map<K, list<V>>` and
//! `list<map<K, V>>` need no extra code.
//!
//! Map keys must be `Eq + Hash` (`HashMap`) or `Ord` (`BTreeMap`). Floats
//! are neither, so float-keyed maps are not available; use integer or
//! string keys instead.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde_json::{Map, Value};

use super::{FlagValue, Separators, Shape, json_key};
use crate::cursor::Cursor;
use crate::error::ValueError;

impl<T: FlagValue> FlagValue for Vec<T> {
    fn shape() -> Shape {
        Shape::Seq(Box::new(T::shape()))
    }

    fn zero() -> Self {
        Vec::new()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn decode(&mut self, input: &mut Cursor<'_>, separators: &Separators) -> Result<(), ValueError> {
        if !input.is_aligned() {
            let mut elem = T::zero();
            elem.decode(input, separators)?;
            self.push(elem);
            return Ok(());
        }

        let token = input.value()?;
        if T::shape().is_map() {
            let mut elem = T::zero();
            elem.decode(&mut Cursor::single(token), separators)?;
            self.push(elem);
            return Ok(());
        }

        for piece in token.split(separators.element.as_str()) {
            let mut elem = T::zero();
            elem.decode(&mut Cursor::aligned(piece), separators)?;
            self.push(elem);
        }
        Ok(())
    }

    fn flag_string(&self) -> String {
        self.to_json().to_string()
    }

    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(FlagValue::to_json).collect())
    }

    fn absorb(&mut self, other: Self) {
        self.extend(other);
    }
}

/// Splits one mapping token into decoded key/value pairs.
fn decode_pairs<K, V>(
    token: &str,
    separators: &Separators,
    mut put: impl FnMut(K, V),
) -> Result<(), ValueError>
where
    K: FlagValue,
    V: FlagValue,
{
    if token.is_empty() {
        return Ok(());
    }

    for pair in token.split(separators.element.as_str()) {
        let parts: Vec<&str> = pair.split(separators.key_value.as_str()).collect();
        let [key_text, value_text] = parts.as_slice() else {
            return Err(ValueError::KeyValue {
                pair: pair.to_string(),
                separator: separators.key_value.clone(),
                parts: parts.len(),
            });
        };

        let mut key = K::zero();
        key.decode(&mut Cursor::aligned(key_text), separators)?;
        let mut value = V::zero();
        value.decode(&mut Cursor::aligned(value_text), separators)?;
        put(key, value);
    }
    Ok(())
}

fn map_json<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> Value
where
    K: FlagValue,
    V: FlagValue,
{
    let object: Map<String, Value> = entries
        .map(|(key, value)| (json_key(key), value.to_json()))
        .collect();
    Value::Object(object)
}

impl<K, V> FlagValue for HashMap<K, V>
where
    K: FlagValue + Eq + Hash,
    V: FlagValue,
{
    fn shape() -> Shape {
        Shape::Map(Box::new(K::shape()), Box::new(V::shape()))
    }

    fn zero() -> Self {
        HashMap::new()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn decode(&mut self, input: &mut Cursor<'_>, separators: &Separators) -> Result<(), ValueError> {
        let token = input.value()?;
        decode_pairs(token, separators, |key: K, value: V| {
            match self.get_mut(&key) {
                Some(existing) => existing.absorb(value),
                None => {
                    self.insert(key, value);
                }
            }
        })
    }

    fn flag_string(&self) -> String {
        self.to_json().to_string()
    }

    fn to_json(&self) -> Value {
        map_json(self.iter())
    }

    fn absorb(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<K, V> FlagValue for BTreeMap<K, V>
where
    K: FlagValue + Ord,
    V: FlagValue,
{
    fn shape() -> Shape {
        Shape::Map(Box::new(K::shape()), Box::new(V::shape()))
    }

    fn zero() -> Self {
        BTreeMap::new()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn decode(&mut self, input: &mut Cursor<'_>, separators: &Separators) -> Result<(), ValueError> {
        let token = input.value()?;
        decode_pairs(token, separators, |key: K, value: V| {
            match self.get_mut(&key) {
                Some(existing) => existing.absorb(value),
                None => {
                    self.insert(key, value);
                }
            }
        })
    }

    fn flag_string(&self) -> String {
        self.to_json().to_string()
    }

    fn to_json(&self) -> Value {
        map_json(self.iter())
    }

    fn absorb(&mut self, other: Self) {
        self.extend(other);
    }
}
