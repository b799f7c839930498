//! Semantic type handles and the host type-mapping seam.
//!
//! The scope chain never interprets types. It stores a `TypeId` per slot and
//! hands it back on resolution; the type system owns the meaning.

use std::fmt;

/// Handle to a semantic type owned by the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ANY: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const INT: TypeId = TypeId(3);
    pub const FLOAT: TypeId = TypeId(4);
    pub const STRING: TypeId = TypeId(5);
    pub const OBJECT: TypeId = TypeId(6);
    pub const FUNCTION: TypeId = TypeId(7);

    /// First id available for types registered by the type system.
    pub const FIRST_USER: TypeId = TypeId(64);

    const BUILTIN_NAMES: [&'static str; 8] =
        ["Any", "Void", "Bool", "Int", "Float", "String", "Object", "Function"];

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn builtin_name(self) -> Option<&'static str> {
        Self::BUILTIN_NAMES.get(self.index()).copied()
    }

    /// Look up a builtin type by its source spelling.
    pub fn from_builtin_name(name: &str) -> Option<TypeId> {
        Self::BUILTIN_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|idx| TypeId(idx as u32))
    }
}

impl Default for TypeId {
    fn default() -> Self {
        TypeId::ANY
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "#{}", self.0),
        }
    }
}

/// Maps a host (native) class name to a semantic type.
///
/// Injected when a scope is seeded with host-provided bindings.
pub trait TypeMapper {
    fn type_of(&self, native_class: &str) -> TypeId;
}

impl<F> TypeMapper for F
where
    F: Fn(&str) -> TypeId,
{
    fn type_of(&self, native_class: &str) -> TypeId {
        self(native_class)
    }
}

/// Maps the common host class spellings onto the builtin types and
/// everything else onto `Object`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypeMapper;

impl TypeMapper for BuiltinTypeMapper {
    fn type_of(&self, native_class: &str) -> TypeId {
        if let Some(builtin) = TypeId::from_builtin_name(native_class) {
            return builtin;
        }
        match native_class {
            "void" => TypeId::VOID,
            "boolean" | "bool" | "java.lang.Boolean" => TypeId::BOOL,
            "int" | "long" | "short" | "byte" | "java.lang.Integer" | "java.lang.Long" => TypeId::INT,
            "float" | "double" | "java.lang.Float" | "java.lang.Double" => TypeId::FLOAT,
            "java.lang.String" | "str" => TypeId::STRING,
            "java.lang.Object" => TypeId::ANY,
            _ => TypeId::OBJECT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_round_trip() {
        assert_eq!(TypeId::from_builtin_name("Int"), Some(TypeId::INT));
        assert_eq!(TypeId::INT.to_string(), "Int");
        assert_eq!(TypeId(99).to_string(), "#99");
        assert_eq!(TypeId::from_builtin_name("Widget"), None);
    }

    #[test]
    fn test_builtin_mapper() {
        let mapper = BuiltinTypeMapper;
        assert_eq!(mapper.type_of("java.lang.Integer"), TypeId::INT);
        assert_eq!(mapper.type_of("double"), TypeId::FLOAT);
        assert_eq!(mapper.type_of("javax.swing.JFrame"), TypeId::OBJECT);
    }

    #[test]
    fn test_closure_mapper() {
        let mapper = |_: &str| TypeId(70);
        assert_eq!(mapper.type_of("anything"), TypeId(70));
    }
}
