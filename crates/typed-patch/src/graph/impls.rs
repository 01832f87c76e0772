//! Graph implementations for std collections, primitives and `serde_json`.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{Dictionary, Graph, Node, NodeMut, NodeRef, Sequence};
use crate::coerce::{expect_object, Coerce, Coercion};
use crate::error::PatchError;

// ── Leaves ────────────────────────────────────────────────────────────────

macro_rules! leaf {
    ($($ty:ty),* $(,)?) => {$(
        impl Node for $ty {
            fn node(&self) -> NodeRef<'_> {
                NodeRef::Leaf
            }

            fn node_mut(&mut self) -> NodeMut<'_> {
                NodeMut::Leaf
            }

            fn to_value(&self) -> Value {
                Value::from(self.clone())
            }
        }
    )*};
}

leaf!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, String);

// ── Wrappers ──────────────────────────────────────────────────────────────

impl<T: Node> Node for Option<T> {
    fn node(&self) -> NodeRef<'_> {
        match self {
            Some(inner) => inner.node(),
            None => NodeRef::Leaf,
        }
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        match self {
            Some(inner) => inner.node_mut(),
            None => NodeMut::Leaf,
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Node::to_value)
    }
}

impl<T: Node> Node for Box<T> {
    fn node(&self) -> NodeRef<'_> {
        (**self).node()
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        (**self).node_mut()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

// ── Sequences ─────────────────────────────────────────────────────────────

impl<T: Graph + Coerce> Node for Vec<T> {
    fn node(&self) -> NodeRef<'_> {
        NodeRef::Sequence(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Sequence(self)
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Node::to_value).collect())
    }
}

impl<T: Graph + Coerce> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<&dyn Graph> {
        self.get(index).map(|e| e as &dyn Graph)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Graph> {
        self.get_mut(index).map(|e| e as &mut dyn Graph)
    }

    fn insert(&mut self, index: usize, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        let element = T::coerce(value, coercion)?;
        Vec::insert(self, index, element);
        Ok(())
    }

    fn admits(&self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
        T::coerce(value, coercion).map(drop)
    }

    fn remove(&mut self, index: usize) -> Option<Value> {
        (index < Vec::len(self)).then(|| Vec::remove(self, index).to_value())
    }
}

// ── Maps ──────────────────────────────────────────────────────────────────

macro_rules! dictionary {
    ($map:ident, $remove:ident) => {
        impl<T: Graph + Coerce> Node for $map<String, T> {
            fn node(&self) -> NodeRef<'_> {
                NodeRef::Map(self)
            }

            fn node_mut(&mut self) -> NodeMut<'_> {
                NodeMut::Map(self)
            }

            fn to_value(&self) -> Value {
                Value::Object(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
            }
        }

        impl<T: Graph + Coerce> Dictionary for $map<String, T> {
            fn entry(&self, key: &str) -> Option<&dyn Graph> {
                self.get(key).map(|v| v as &dyn Graph)
            }

            fn entry_mut(&mut self, key: &str) -> Option<&mut dyn Graph> {
                self.get_mut(key).map(|v| v as &mut dyn Graph)
            }

            fn insert(&mut self, key: &str, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
                let entry = T::coerce(value, coercion)?;
                $map::insert(self, key.to_string(), entry);
                Ok(())
            }

            fn admits(&self, value: &Value, coercion: &Coercion) -> Result<(), PatchError> {
                T::coerce(value, coercion).map(drop)
            }

            fn remove(&mut self, key: &str) -> Option<Value> {
                $map::$remove(self, key).map(|v| v.to_value())
            }
        }

        impl<T: Coerce> Coerce for $map<String, T> {
            fn coerce(value: &Value, coercion: &Coercion) -> Result<Self, PatchError> {
                expect_object(value, "map")?
                    .iter()
                    .map(|(k, v)| T::coerce(v, coercion).map(|v| (k.clone(), v)))
                    .collect()
            }

            fn coerced_eq(&self, value: &Value, coercion: &Coercion) -> Result<bool, PatchError> {
                Self::coerce(value, coercion)?;
                let object = expect_object(value, "map")?;
                if object.len() != self.len() {
                    return Ok(false);
                }
                for (key, raw) in object {
                    let Some(current) = self.get(key.as_str()) else {
                        return Ok(false);
                    };
                    if !current.coerced_eq(raw, coercion)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    };
}

dictionary!(HashMap, remove);
dictionary!(BTreeMap, remove);
dictionary!(IndexMap, shift_remove);

// ── serde_json ────────────────────────────────────────────────────────────

impl Node for Map<String, Value> {
    fn node(&self) -> NodeRef<'_> {
        NodeRef::Map(self)
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Map(self)
    }

    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl Dictionary for Map<String, Value> {
    fn entry(&self, key: &str) -> Option<&dyn Graph> {
        self.get(key).map(|v| v as &dyn Graph)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut dyn Graph> {
        self.get_mut(key).map(|v| v as &mut dyn Graph)
    }

    fn insert(&mut self, key: &str, value: &Value, _: &Coercion) -> Result<(), PatchError> {
        Map::insert(self, key.to_string(), value.clone());
        Ok(())
    }

    fn admits(&self, _: &Value, _: &Coercion) -> Result<(), PatchError> {
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        Map::shift_remove(self, key)
    }
}

impl Coerce for Map<String, Value> {
    fn coerce(value: &Value, _: &Coercion) -> Result<Self, PatchError> {
        expect_object(value, "object").cloned()
    }
}

/// A dynamic slot: objects behave as maps, arrays as sequences, everything
/// else is a leaf. Writes into a `Value` accept any input unchanged.
impl Node for Value {
    fn node(&self) -> NodeRef<'_> {
        match self {
            Value::Object(map) => map.node(),
            Value::Array(items) => items.node(),
            _ => NodeRef::Leaf,
        }
    }

    fn node_mut(&mut self) -> NodeMut<'_> {
        match self {
            Value::Object(map) => map.node_mut(),
            Value::Array(items) => items.node_mut(),
            _ => NodeMut::Leaf,
        }
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coercion() -> Coercion {
        Coercion::strict()
    }

    #[test]
    fn leaves_snapshot_their_value() {
        assert_eq!(7u8.to_value(), json!(7));
        assert_eq!(1.5f32.to_value(), json!(1.5));
        assert_eq!("hi".to_string().to_value(), json!("hi"));
        assert!(true.node().is_leaf());
        assert_eq!(f64::NAN.to_value(), Value::Null);
    }

    #[test]
    fn option_delegates_to_inner_shape() {
        let mut some: Option<Vec<i32>> = Some(vec![1]);
        assert!(matches!(some.node(), NodeRef::Sequence(_)));
        assert!(matches!(some.node_mut(), NodeMut::Sequence(_)));
        let none: Option<Vec<i32>> = None;
        assert!(none.node().is_leaf());
        assert_eq!(none.to_value(), Value::Null);
    }

    #[test]
    fn vec_inserts_coerced_elements() {
        let mut items = vec![1i32, 3];
        Sequence::insert(&mut items, 1, &json!("2"), &coercion()).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        let err = Sequence::insert(&mut items, 0, &json!("x"), &coercion()).unwrap_err();
        assert!(matches!(err, PatchError::TypeMismatch(_)));
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(Sequence::remove(&mut items, 0), Some(json!(1)));
        assert_eq!(Sequence::remove(&mut items, 5), None);
    }

    #[test]
    fn index_map_remove_keeps_order() {
        let mut map: IndexMap<String, u32> =
            [("a", 1), ("b", 2), ("c", 3)].into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        assert_eq!(Dictionary::remove(&mut map, "a"), Some(json!(1)));
        assert_eq!(map.to_value(), json!({"b": 2, "c": 3}));
    }

    #[test]
    fn maps_coerce_every_entry() {
        let map = BTreeMap::<String, i64>::coerce(&json!({"x": 1, "y": "2"}), &coercion()).unwrap();
        assert_eq!(map.get("y"), Some(&2));
        assert!(HashMap::<String, i64>::coerce(&json!({"x": true}), &coercion()).is_err());
        assert!(HashMap::<String, i64>::coerce(&json!([1]), &coercion()).is_err());
    }

    #[test]
    fn json_value_dispatches_on_content() {
        assert!(matches!(json!({"a": 1}).node(), NodeRef::Map(_)));
        assert!(matches!(json!([1]).node(), NodeRef::Sequence(_)));
        assert!(json!("s").node().is_leaf());
        let mut v = json!(1);
        v.assign(&json!({"any": "thing"}), &coercion()).unwrap();
        assert_eq!(v, json!({"any": "thing"}));
    }

    #[test]
    fn typed_comparison_normalizes_input() {
        assert_eq!(3i32.matches(&json!(3.0), &coercion()), Ok(true));
        assert_eq!(3i32.matches(&json!("3"), &coercion()), Ok(true));
        assert_eq!(3i32.matches(&json!(4), &coercion()), Ok(false));
        assert!(3i32.matches(&json!("three"), &coercion()).is_err());
    }
}
