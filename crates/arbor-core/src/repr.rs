//! Object representation of views as JSON values.
//!
//! - uint8 through uint64 are numbers, uint128 and uint256 decimal strings
//! - booleans are booleans
//! - byte strings (`List[uint8, N]`, `Vector[uint8, N]`) are `0x` hex
//! - other Lists and Vectors are arrays, Containers are objects in
//!   declared field order

use crate::error::{Error, Result};
use crate::types::{BasicKind, TypeKind, TypeRef};
use crate::view::{BasicView, ContainerView, ListView, VectorView, View};
use alloy_primitives::U256;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

impl View {
    pub fn to_obj(&self) -> Result<Value> {
        match self {
            View::Basic(basic) => Ok(basic_to_obj(basic)),
            View::List(_) | View::Vector(_) if self.type_def().is_byte_string() => {
                Ok(Value::String(format!("0x{}", hex::encode(self.encode_bytes()?))))
            }
            View::List(list) => list.iter().map(|item| item?.to_obj()).collect(),
            View::Vector(vector) => vector.iter().map(|item| item?.to_obj()).collect(),
            View::Container(container) => {
                let mut map = Map::new();
                for field in container.fields() {
                    let (name, value) = field?;
                    map.insert(name.to_string(), value.to_obj()?);
                }
                Ok(Value::Object(map))
            }
        }
    }

    /// Build a view of type `ty` from its object representation.
    pub fn from_obj(ty: &TypeRef, obj: &Value) -> Result<View> {
        match ty.kind() {
            TypeKind::Basic(kind) => Ok(View::Basic(basic_from_obj(ty, *kind, obj)?)),
            TypeKind::List { .. } if ty.is_byte_string() => {
                Ok(View::List(ListView::from_bytes(ty, &hex_from_obj(ty, obj)?)?))
            }
            TypeKind::Vector { length, .. } if ty.is_byte_string() => {
                let bytes = hex_from_obj(ty, obj)?;
                if bytes.len() as u64 != *length {
                    return Err(Error::parse(format!(
                        "{} takes {} bytes, got {}",
                        ty,
                        length,
                        bytes.len()
                    )));
                }
                Ok(View::Vector(VectorView::from_bytes(ty, &bytes)?))
            }
            TypeKind::List { .. } => {
                let items = expect_array(ty, obj)?;
                Ok(View::List(ListView::new(ty, items)?))
            }
            TypeKind::Vector { length, .. } => {
                let items = expect_array(ty, obj)?;
                if items.len() as u64 != *length {
                    return Err(Error::parse(format!(
                        "{} takes {} elements, got an array of {}",
                        ty,
                        length,
                        items.len()
                    )));
                }
                Ok(View::Vector(VectorView::new(ty, items)?))
            }
            TypeKind::Container(def) => {
                let map = obj
                    .as_object()
                    .ok_or_else(|| Error::parse(format!("{} expects an object, got {}", ty, obj)))?;
                if let Some(unknown) = map.keys().find(|key| def.field_index(key).is_none()) {
                    return Err(Error::parse(format!("{} has no field {}", ty, unknown)));
                }
                let mut builder = ContainerView::builder(ty)?;
                for (name, value) in map {
                    builder = builder.field(name, value)?;
                }
                Ok(View::Container(builder.build()?))
            }
        }
    }
}

impl Serialize for View {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let obj = self.to_obj().map_err(serde::ser::Error::custom)?;
        obj.serialize(serializer)
    }
}

fn basic_to_obj(basic: &BasicView) -> Value {
    let value = basic.to_u256();
    match basic.kind() {
        BasicKind::Boolean => Value::Bool(!value.is_zero()),
        BasicKind::Uint128 | BasicKind::Uint256 => Value::String(value.to_string()),
        // uint8 through uint64 sit entirely in the lowest limb.
        _ => Value::from(value.as_limbs()[0]),
    }
}

fn basic_from_obj(ty: &TypeRef, kind: BasicKind, obj: &Value) -> Result<BasicView> {
    let value = match (kind, obj) {
        (BasicKind::Boolean, Value::Bool(b)) => U256::from(*b as u8),
        (BasicKind::Boolean, _) => {
            return Err(Error::parse(format!("boolean expected, got {}", obj)));
        }
        (_, Value::Number(n)) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| Error::parse(format!("{} is not an unsigned integer", n)))?,
        (_, Value::String(s)) => s
            .parse::<U256>()
            .map_err(|err| Error::parse(format!("{:?} is not a {}: {}", s, kind, err)))?,
        _ => return Err(Error::parse(format!("{} expected, got {}", kind, obj))),
    };
    BasicView::from_u256(ty, value).map_err(|_| Error::parse(format!("{} does not fit in {}", value, kind)))
}

fn hex_from_obj(ty: &TypeRef, obj: &Value) -> Result<Vec<u8>> {
    let text = obj
        .as_str()
        .ok_or_else(|| Error::parse(format!("{} expects a hex string, got {}", ty, obj)))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|err| Error::parse(format!("bad hex for {}: {}", ty, err)))
}

fn expect_array<'a>(ty: &TypeRef, obj: &'a Value) -> Result<&'a Vec<Value>> {
    obj.as_array()
        .ok_or_else(|| Error::parse(format!("{} expects an array, got {}", ty, obj)))
}
