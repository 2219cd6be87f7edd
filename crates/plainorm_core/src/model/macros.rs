//! `entity!`: declares a struct together with its `Entity` implementation.
//!
//! Field markers, in any order and combination:
//! - `#[id]` identifier (generated key) field.
//! - `#[transient]` excluded from persistence; no accessors are generated,
//!   so the field type needs no `FieldValue` impl.
//! - `#[column = "name"]` column name differing from the field name.
//!
//! Every other field attribute (doc comments, `#[serde(..)]`, ...) is kept
//! on the generated struct. `#[table = "..."]` may only be preceded by doc
//! comments; ordinary attributes follow it:
//!
//! ```text
//! plainorm_core::entity! {
//!     /// Stock item.
//!     #[table = "widgets"]
//!     #[derive(Debug, Clone, Default, PartialEq)]
//!     pub struct Widget {
//!         /// Generated key.
//!         #[id]
//!         pub id: Option<i64>,
//!         pub name: String,
//!         #[column = "unit_price"]
//!         pub price: i64,
//!         #[transient]
//!         pub label: Option<String>,
//!     }
//! }
//! ```
//!
//! Markers are not validated here. Registration with an entity manager
//! rejects schemas with zero or several `#[id]` fields.

#[macro_export]
macro_rules! entity {
    (
        $(#[doc = $doc:literal])*
        #[table = $table:literal]
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::__entity_fields! {
            head { [$(#[doc = $doc])* $(#[$meta])*] $vis $name $table }
            done {}
            attrs {}
            markers {}
            rest { $($body)* }
        }
    };
}

/// Splits each field's attributes into markers (`FieldDef` builder calls)
/// and pass-through attributes, then emits the struct and its impl.
#[doc(hidden)]
#[macro_export]
macro_rules! __entity_fields {
    (
        head $head:tt
        done $done:tt
        attrs { $($attr:tt)* }
        markers { $($marker:tt)* }
        rest { #[id] $($rest:tt)* }
    ) => {
        $crate::__entity_fields! {
            head $head
            done $done
            attrs { $($attr)* }
            markers { $($marker)* .id() }
            rest { $($rest)* }
        }
    };
    (
        head $head:tt
        done $done:tt
        attrs { $($attr:tt)* }
        markers { $($marker:tt)* }
        rest { #[transient] $($rest:tt)* }
    ) => {
        $crate::__entity_fields! {
            head $head
            done $done
            attrs { $($attr)* }
            markers { $($marker)* .transient() }
            rest { $($rest)* }
        }
    };
    (
        head $head:tt
        done $done:tt
        attrs { $($attr:tt)* }
        markers { $($marker:tt)* }
        rest { #[column = $column:literal] $($rest:tt)* }
    ) => {
        $crate::__entity_fields! {
            head $head
            done $done
            attrs { $($attr)* }
            markers { $($marker)* .column($column) }
            rest { $($rest)* }
        }
    };
    (
        head $head:tt
        done $done:tt
        attrs { $($attr:tt)* }
        markers { $($marker:tt)* }
        rest { #[$($other:tt)*] $($rest:tt)* }
    ) => {
        $crate::__entity_fields! {
            head $head
            done $done
            attrs { $($attr)* #[$($other)*] }
            markers { $($marker)* }
            rest { $($rest)* }
        }
    };
    (
        head $head:tt
        done { $($done:tt)* }
        attrs { $($attr:tt)* }
        markers { $($marker:tt)* }
        rest { $field_vis:vis $field:ident : $ty:ty , $($rest:tt)* }
    ) => {
        $crate::__entity_fields! {
            head $head
            done { $($done)* { [$($attr)*] [$($marker)*] $field_vis $field $ty } }
            attrs {}
            markers {}
            rest { $($rest)* }
        }
    };
    (
        head $head:tt
        done { $($done:tt)* }
        attrs { $($attr:tt)* }
        markers { $($marker:tt)* }
        rest { $field_vis:vis $field:ident : $ty:ty }
    ) => {
        $crate::__entity_fields! {
            head $head
            done { $($done)* { [$($attr)*] [$($marker)*] $field_vis $field $ty } }
            attrs {}
            markers {}
            rest {}
        }
    };
    (
        head { [$($struct_attr:tt)*] $vis:vis $name:ident $table:literal }
        done {
            $({ [$($field_attr:tt)*] [$($marker:tt)*] $field_vis:vis $field:ident $ty:ty })*
        }
        attrs {}
        markers {}
        rest {}
    ) => {
        $($struct_attr)*
        $vis struct $name {
            $($($field_attr)* $field_vis $field: $ty,)*
        }

        impl $crate::Entity for $name {
            fn schema() -> &'static $crate::EntitySchema {
                static SCHEMA: $crate::EntitySchema = $crate::EntitySchema {
                    table: $table,
                    fields: &[
                        $($crate::FieldDef::new(stringify!($field)) $($marker)*,)*
                    ],
                };
                &SCHEMA
            }

            fn read_field(
                &self,
                field: &str,
            ) -> ::std::result::Result<$crate::Value, $crate::AccessError> {
                $($crate::__entity_read_field!(self, field, [$($marker)*] $field);)*
                ::std::result::Result::Err($crate::AccessError::UnknownField {
                    entity: ::std::any::type_name::<Self>(),
                    field: ::std::string::ToString::to_string(field),
                })
            }

            fn write_field(
                &mut self,
                field: &str,
                value: $crate::Value,
            ) -> ::std::result::Result<(), $crate::AccessError> {
                $($crate::__entity_write_field!(self, field, value, [$($marker)*] $field: $ty);)*
                ::std::result::Result::Err($crate::AccessError::UnknownField {
                    entity: ::std::any::type_name::<Self>(),
                    field: ::std::string::ToString::to_string(field),
                })
            }
        }
    };
}

/// Emits the read arm of one field unless its markers contain `.transient()`.
#[doc(hidden)]
#[macro_export]
macro_rules! __entity_read_field {
    ($this:ident, $requested:ident, [. transient () $($rest:tt)*] $field:ident) => {};
    ($this:ident, $requested:ident, [$skip:tt $($rest:tt)*] $field:ident) => {
        $crate::__entity_read_field!($this, $requested, [$($rest)*] $field);
    };
    ($this:ident, $requested:ident, [] $field:ident) => {
        if $requested == stringify!($field) {
            return ::std::result::Result::Ok($crate::FieldValue::to_value(&$this.$field));
        }
    };
}

/// Emits the write arm of one field unless its markers contain `.transient()`.
#[doc(hidden)]
#[macro_export]
macro_rules! __entity_write_field {
    (
        $this:ident,
        $requested:ident,
        $value:ident,
        [. transient () $($rest:tt)*]
        $field:ident: $ty:ty
    ) => {};
    (
        $this:ident,
        $requested:ident,
        $value:ident,
        [$skip:tt $($rest:tt)*]
        $field:ident: $ty:ty
    ) => {
        $crate::__entity_write_field!($this, $requested, $value, [$($rest)*] $field: $ty);
    };
    (
        $this:ident,
        $requested:ident,
        $value:ident,
        []
        $field:ident: $ty:ty
    ) => {
        if $requested == stringify!($field) {
            $this.$field = <$ty as $crate::FieldValue>::from_value($value).map_err(|source| {
                $crate::AccessError::Incompatible {
                    entity: ::std::any::type_name::<Self>(),
                    field: stringify!($field),
                    source,
                }
            })?;
            return ::std::result::Result::Ok(());
        }
    };
}
