//! The `record!` macro: named-member containers from plain structs.

/// Implements [`Node`](crate::Node), [`Record`](crate::Record) and
/// [`Coerce`](crate::Coerce) for a struct.
///
/// Each entry maps a case-sensitive member name to a struct field. Members in
/// the optional `readonly` block can be read and traversed but never written.
/// The struct must implement `Default`: removing a member resets it to the
/// default's value, and structural coercion from an object starts from the
/// default and overwrites the writable members the object names. Keys naming
/// read-only members are accepted and ignored. Overwriting an existing record
/// keeps its read-only members.
///
/// ```
/// use typed_patch::{record, PatchDocument};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct DownDoc {
///     integers: Vec<i32>,
/// }
///
/// #[derive(Debug, Default, PartialEq)]
/// struct UpDoc {
///     down_docs: Vec<DownDoc>,
///     revision: u32,
/// }
///
/// record!(DownDoc { "Integers" => integers });
/// record! {
///     UpDoc { "DownDocs" => down_docs }
///     readonly { "Revision" => revision }
/// }
///
/// let mut doc = UpDoc {
///     down_docs: vec![DownDoc { integers: vec![1] }],
///     revision: 4,
/// };
/// PatchDocument::new()
///     .replace("DownDocs/0/Integers/0", 3)
///     .apply_to(&mut doc)
///     .unwrap();
/// assert_eq!(doc.down_docs[0].integers, vec![3]);
/// ```
#[macro_export]
macro_rules! record {
    (
        $ty:ty {
            $( $name:literal => $field:ident ),* $(,)?
        }
        $( readonly {
            $( $ro_name:literal => $ro_field:ident ),* $(,)?
        } )?
    ) => {
        impl $crate::Node for $ty {
            fn node(&self) -> $crate::NodeRef<'_> {
                $crate::NodeRef::Record(self)
            }

            fn node_mut(&mut self) -> $crate::NodeMut<'_> {
                $crate::NodeMut::Record(self)
            }

            fn to_value(&self) -> $crate::serde_json::Value {
                let mut map = $crate::serde_json::Map::new();
                $( map.insert(::std::string::String::from($name), $crate::Node::to_value(&self.$field)); )*
                $($( map.insert(::std::string::String::from($ro_name), $crate::Node::to_value(&self.$ro_field)); )*)?
                $crate::serde_json::Value::Object(map)
            }
        }

        impl $crate::Record for $ty {
            fn type_name(&self) -> &'static str {
                stringify!($ty)
            }

            fn members(&self) -> &'static [$crate::Member] {
                const MEMBERS: &[$crate::Member] = &[
                    $( $crate::Member::writable($name), )*
                    $($( $crate::Member::read_only($ro_name), )*)?
                ];
                MEMBERS
            }

            fn member(&self, name: &str) -> ::std::option::Option<&dyn $crate::Graph> {
                match name {
                    $( $name => ::std::option::Option::Some(&self.$field as &dyn $crate::Graph), )*
                    $($( $ro_name => ::std::option::Option::Some(&self.$ro_field as &dyn $crate::Graph), )*)?
                    _ => ::std::option::Option::None,
                }
            }

            fn member_mut(&mut self, name: &str) -> ::std::option::Option<&mut dyn $crate::Graph> {
                match name {
                    $( $name => ::std::option::Option::Some(&mut self.$field as &mut dyn $crate::Graph), )*
                    $($( $ro_name => ::std::option::Option::Some(&mut self.$ro_field as &mut dyn $crate::Graph), )*)?
                    _ => ::std::option::Option::None,
                }
            }

            fn reset_member(&mut self, name: &str) -> bool {
                match name {
                    $( $name => {
                        self.$field = <$ty as ::std::default::Default>::default().$field;
                        true
                    } )*
                    _ => false,
                }
            }
        }

        impl $crate::Coerce for $ty {
            fn coerce(
                value: &$crate::serde_json::Value,
                coercion: &$crate::Coercion,
            ) -> ::std::result::Result<Self, $crate::PatchError> {
                let object = $crate::coerce::expect_object(value, stringify!($ty))?;
                #[allow(unused_mut)]
                let mut out = <$ty as ::std::default::Default>::default();
                for (key, raw) in object {
                    match key.as_str() {
                        $( $name => out.$field = $crate::Coerce::coerce(raw, coercion)?, )*
                        $($( $ro_name => {} )*)?
                        other => coercion.unmapped_key(stringify!($ty), other)?,
                    }
                }
                ::std::result::Result::Ok(out)
            }

            #[allow(unused_mut, unused_variables)]
            fn coerce_in_place(
                &mut self,
                value: &$crate::serde_json::Value,
                coercion: &$crate::Coercion,
            ) -> ::std::result::Result<(), $crate::PatchError> {
                let mut fresh = <Self as $crate::Coerce>::coerce(value, coercion)?;
                let object = $crate::coerce::expect_object(value, stringify!($ty))?;
                $(
                    match object.get($name) {
                        ::std::option::Option::Some(raw) => {
                            $crate::Coerce::coerce_in_place(&mut self.$field, raw, coercion)?
                        }
                        ::std::option::Option::None => {
                            ::std::mem::swap(&mut self.$field, &mut fresh.$field)
                        }
                    }
                )*
                ::std::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn coerced_eq(
                &self,
                value: &$crate::serde_json::Value,
                coercion: &$crate::Coercion,
            ) -> ::std::result::Result<bool, $crate::PatchError> {
                let fresh = <Self as $crate::Coerce>::coerce(value, coercion)?;
                let object = $crate::coerce::expect_object(value, stringify!($ty))?;
                $(
                    let same = match object.get($name) {
                        ::std::option::Option::Some(raw) => {
                            $crate::Coerce::coerced_eq(&self.$field, raw, coercion)?
                        }
                        ::std::option::Option::None => {
                            $crate::Node::to_value(&fresh.$field) == $crate::Node::to_value(&self.$field)
                        }
                    };
                    if !same {
                        return ::std::result::Result::Ok(false);
                    }
                )*
                $($(
                    if let ::std::option::Option::Some(raw) = object.get($ro_name) {
                        if !$crate::Coerce::coerced_eq(&self.$ro_field, raw, coercion)? {
                            return ::std::result::Result::Ok(false);
                        }
                    }
                )*)?
                ::std::result::Result::Ok(true)
            }
        }
    };
}
