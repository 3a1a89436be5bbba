use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::rc::Rc;

use crate::ast::{Block, Identifier};
use crate::environment::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    tag: HashKeyTag,
    digest: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum HashKeyTag {
    Integer,
    Boolean,
    String,
}

// Only Integer, Boolean, and String can produce a HashKey.
pub trait Hashable {
    fn hash_key(&self) -> HashKey;
}

pub type BuiltinFn = fn(&Rc<RefCell<Environment>>, &[Value]) -> Result<Value, Value>;

#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    String(Vec<u8>),
    Array(Vec<Value>),
    Hash(HashMap<HashKey, HashPair>),
    Function {
        params: Vec<Identifier>,
        body: Block,
        captured: Rc<RefCell<Environment>>,
    },
    Builtin(Builtin),
    Null,
    Error {
        message: String,
        sub_errors: Vec<Value>,
    },
}

impl Value {
    pub fn error(message: impl Into<String>) -> Value {
        Value::Error {
            message: message.into(),
            sub_errors: vec![],
        }
    }

    pub fn wrap_error(context: impl Into<String>, cause: Value) -> Value {
        Value::Error {
            message: context.into(),
            sub_errors: vec![cause],
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Boolean(_) => "Boolean",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Hash(_) => "Hash",
            Value::Function { .. } => "Function",
            Value::Builtin(_) => "Builtin",
            Value::Null => "Null",
            Value::Error { .. } => "Error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error { .. })
    }

    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(value) => Some(value.hash_key()),
            Value::Boolean(value) => Some(value.hash_key()),
            Value::String(bytes) => Some(bytes.hash_key()),
            _ => None,
        }
    }
}

impl Hashable for i64 {
    fn hash_key(&self) -> HashKey {
        HashKey {
            tag: HashKeyTag::Integer,
            digest: *self as u64,
        }
    }
}

impl Hashable for bool {
    fn hash_key(&self) -> HashKey {
        HashKey {
            tag: HashKeyTag::Boolean,
            digest: if *self { 1 } else { 0 },
        }
    }
}

impl Hashable for Vec<u8> {
    fn hash_key(&self) -> HashKey {
        HashKey {
            tag: HashKeyTag::String,
            digest: fnv1a_64(self),
        }
    }
}

// FNV-1a 64-bit.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::String(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Value::Null => f.write_str("null"),
            Value::Array(elements) => {
                f.write_str("[")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Value::Hash(pairs) => {
                f.write_str("{")?;
                for (index, pair) in pairs.values().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                f.write_str("}")
            }
            Value::Function { params, .. } => {
                let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
                write!(f, "fn({})", names.join(", "))
            }
            Value::Builtin(_) => f.write_str("builtin function"),
            Value::Error { message, sub_errors } => {
                writeln!(f, "Error: {message}")?;
                for sub_error in sub_errors {
                    writeln!(f, "\t{sub_error}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_display_has_no_leading_zeros_and_negative_uses_minus() {
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Integer(-7).to_string(), "-7");
    }

    #[test]
    fn array_display_is_bracketed_and_comma_separated() {
        let array = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(array.to_string(), "[1, 2]");
    }

    #[test]
    fn only_integer_boolean_string_are_hashable() {
        assert!(Value::Integer(1).hash_key().is_some());
        assert!(Value::Boolean(true).hash_key().is_some());
        assert!(Value::String(b"x".to_vec()).hash_key().is_some());
        assert!(Value::Null.hash_key().is_none());
        assert!(Value::Array(vec![]).hash_key().is_none());
    }

    #[test]
    fn integer_hash_key_is_stable_across_equal_values() {
        assert_eq!(Value::Integer(7).hash_key(), Value::Integer(7).hash_key());
        assert_ne!(Value::Integer(7).hash_key(), Value::Integer(8).hash_key());
    }
}
