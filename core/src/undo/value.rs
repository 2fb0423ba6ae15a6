//! Snapshot values stored in action records.
//!
//! [`Value`] is a single sum type covering every shape of state the editor
//! snapshots: transforms, colors, names, flags, per-key vector tables and a
//! handful of list shapes. A record layer maps each object handle to exactly
//! one `Value`.

use std::collections::BTreeMap;
use std::fmt;

use crate::handle::ObjectHandle;
use crate::math::{Mat4, Quat, Vec2, Vec3, Vec4};

/// One snapshotted piece of editor state.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Matrix(Mat4),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Quat(Quat),
    String(String),
    Bool(bool),
    Int(i32),
    Float(f32),
    /// Per-key table of vectors, e.g. spline control points by index.
    Vec3Map(BTreeMap<i32, Vec3>),
    StringList(Vec<String>),
    Vec2List(Vec<Vec2>),
    FloatList(Vec<f32>),
    BoolList(Vec<bool>),
    /// Association with another object, e.g. a previous parent.
    Handle(ObjectHandle),
    /// Ordered set of objects touched by the action.
    HandleList(Vec<ObjectHandle>),
}

/// Fieldless tag naming the shape of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Matrix,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    String,
    Bool,
    Int,
    Float,
    Vec3Map,
    StringList,
    Vec2List,
    FloatList,
    BoolList,
    Handle,
    HandleList,
}

impl ValueKind {
    /// Every kind, in declaration order.
    pub const ALL: [ValueKind; 16] = [
        ValueKind::Matrix,
        ValueKind::Vec2,
        ValueKind::Vec3,
        ValueKind::Vec4,
        ValueKind::Quat,
        ValueKind::String,
        ValueKind::Bool,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::Vec3Map,
        ValueKind::StringList,
        ValueKind::Vec2List,
        ValueKind::FloatList,
        ValueKind::BoolList,
        ValueKind::Handle,
        ValueKind::HandleList,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Quat => "quat",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec3Map => "vec3 map",
            Self::StringList => "string list",
            Self::Vec2List => "vec2 list",
            Self::FloatList => "float list",
            Self::BoolList => "bool list",
            Self::Handle => "handle",
            Self::HandleList => "handle list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Matrix(_) => ValueKind::Matrix,
            Self::Vec2(_) => ValueKind::Vec2,
            Self::Vec3(_) => ValueKind::Vec3,
            Self::Vec4(_) => ValueKind::Vec4,
            Self::Quat(_) => ValueKind::Quat,
            Self::String(_) => ValueKind::String,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Vec3Map(_) => ValueKind::Vec3Map,
            Self::StringList(_) => ValueKind::StringList,
            Self::Vec2List(_) => ValueKind::Vec2List,
            Self::FloatList(_) => ValueKind::FloatList,
            Self::BoolList(_) => ValueKind::BoolList,
            Self::Handle(_) => ValueKind::Handle,
            Self::HandleList(_) => ValueKind::HandleList,
        }
    }

    /// Returns `true` if this value embeds `handle`.
    ///
    /// Only the handle-carrying shapes can match; `NULL` never does.
    pub fn references(&self, handle: ObjectHandle) -> bool {
        if handle.is_null() {
            return false;
        }
        match self {
            Self::Handle(h) => *h == handle,
            Self::HandleList(list) => list.contains(&handle),
            Self::Matrix(_)
            | Self::Vec2(_)
            | Self::Vec3(_)
            | Self::Vec4(_)
            | Self::Quat(_)
            | Self::String(_)
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::Vec3Map(_)
            | Self::StringList(_)
            | Self::Vec2List(_)
            | Self::FloatList(_)
            | Self::BoolList(_) => false,
        }
    }
}

/// Typed extraction from a [`Value`].
///
/// Used by [`RecordData::get_as`](super::RecordData::get_as) so replay code
/// can read a snapshot with `?` instead of matching by hand.
pub trait FromValue: Sized {
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! value_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

value_conversions! {
    Matrix => Mat4,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Quat => Quat,
    String => String,
    Bool => bool,
    Int => i32,
    Float => f32,
    Vec3Map => BTreeMap<i32, Vec3>,
    StringList => Vec<String>,
    Vec2List => Vec<Vec2>,
    FloatList => Vec<f32>,
    BoolList => Vec<bool>,
    Handle => ObjectHandle,
    HandleList => Vec<ObjectHandle>,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}
