//! Value type masks used by signatures and declared parameter types.

use bitflags::bitflags;

use crate::Name;

bitflags! {
    /// Set of value kinds a parameter or return value accepts.
    ///
    /// The low bits name kinds; the two high bits are modifiers.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ValueMask: u32 {
        const NULL = 1 << 0;
        const LOGICAL = 1 << 1;
        const INT = 1 << 2;
        const FLOAT = 1 << 3;
        const STRING = 1 << 4;
        const OBJECT = 1 << 5;

        /// Value must have exactly one element.
        const SINGLETON = 1 << 30;
        /// Parameter may be omitted at the call site.
        const OPTIONAL = 1 << 31;

        const NUMERIC = Self::INT.bits() | Self::FLOAT.bits();
        const ANY_BASE = Self::NULL.bits()
            | Self::LOGICAL.bits()
            | Self::INT.bits()
            | Self::FLOAT.bits()
            | Self::STRING.bits();
        const ANY = Self::ANY_BASE.bits() | Self::OBJECT.bits();
    }
}

impl ValueMask {
    /// The kind bits with the modifiers stripped.
    #[inline]
    #[must_use]
    pub fn kinds(self) -> ValueMask {
        self & ValueMask::ANY
    }

    #[inline]
    pub fn is_optional(self) -> bool {
        self.contains(ValueMask::OPTIONAL)
    }

    #[inline]
    pub fn requires_singleton(self) -> bool {
        self.contains(ValueMask::SINGLETON)
    }

    /// Render in signature notation, e.g. `[integer$ n]` or `Nif<Mutation> x`.
    ///
    /// `class` is the object element class name, printed only when the mask
    /// admits objects; `name` may be empty for return types.
    pub fn describe(self, class: Option<&str>, name: &str) -> String {
        let kinds = self.kinds();
        let mut out = String::new();

        if self.is_optional() {
            out.push('[');
        }

        if kinds.is_empty() {
            out.push('?');
        } else if kinds == ValueMask::ANY {
            out.push('*');
        } else if kinds == ValueMask::ANY_BASE {
            out.push('+');
        } else if kinds == ValueMask::NULL {
            out.push_str("void");
        } else if kinds == ValueMask::LOGICAL {
            out.push_str("logical");
        } else if kinds == ValueMask::STRING {
            out.push_str("string");
        } else if kinds == ValueMask::INT {
            out.push_str("integer");
        } else if kinds == ValueMask::FLOAT {
            out.push_str("float");
        } else if kinds == ValueMask::OBJECT {
            out.push_str("object");
        } else if kinds == ValueMask::NUMERIC {
            out.push_str("numeric");
        } else {
            for (bit, code) in [
                (ValueMask::NULL, 'N'),
                (ValueMask::LOGICAL, 'l'),
                (ValueMask::INT, 'i'),
                (ValueMask::FLOAT, 'f'),
                (ValueMask::STRING, 's'),
                (ValueMask::OBJECT, 'o'),
            ] {
                if kinds.contains(bit) {
                    out.push(code);
                }
            }
        }

        if let Some(class) = class {
            if kinds.contains(ValueMask::OBJECT) {
                out.push('<');
                out.push_str(class);
                out.push('>');
            }
        }

        if self.requires_singleton() {
            out.push('$');
        }

        if !name.is_empty() {
            out.push(' ');
            out.push_str(name);
        }

        if self.is_optional() {
            out.push(']');
        }

        out
    }
}

/// A declared type in a function header: a mask plus an optional object
/// element class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct TypeSpec {
    pub mask: ValueMask,
    pub class: Option<Name>,
}

impl TypeSpec {
    pub const fn new(mask: ValueMask) -> Self {
        TypeSpec { mask, class: None }
    }

    pub const fn object(mask: ValueMask, class: Name) -> Self {
        TypeSpec {
            mask,
            class: Some(class),
        }
    }

    /// The `void` return type.
    pub const fn void() -> Self {
        TypeSpec::new(ValueMask::NULL)
    }

    /// The `*` type.
    pub const fn any() -> Self {
        TypeSpec::new(ValueMask::ANY)
    }
}
