//! Host object model: types, members and dynamic values

pub mod json;
pub mod member;
pub mod types;
pub mod value;

pub use json::from_json;
pub use member::{
    find_member, get_members, Member, MemberDef, MemberFilter, MemberGetter, MemberKey,
    MemberKind, MemberSet, Visibility,
};
pub use types::{builtin, EnumVariant, Interface, PrimitiveKind, TypeBuilder, TypeDescriptor, TypeKind, TypeRef};
pub use value::{Array, EnumValue, Map, Object, Sequence, Value};
