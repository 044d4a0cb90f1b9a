//! Type masks for signature checking.
//!
//! A `TypeMask` names the set of value types a parameter accepts or a
//! callable may return, plus a cardinality bit: `SINGLETON` restricts the
//! value to exactly one element.
//!
//! Masks render in the compact notation used by signature listings:
//! `integer$`, `numeric`, `+` (any non-object), `*` (anything), or a
//! letter set such as `Nis` for mixed masks.

use std::fmt;

use bitflags::bitflags;

use crate::ValueType;

bitflags! {
    /// Accepted value types and cardinality of a parameter or return value.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeMask: u32 {
        const NULL = 1 << 0;
        const LOGICAL = 1 << 1;
        const INT = 1 << 2;
        const FLOAT = 1 << 3;
        const STRING = 1 << 4;
        const OBJECT = 1 << 5;

        /// Value must have exactly one element.
        const SINGLETON = 1 << 16;
    }
}

impl TypeMask {
    /// Integer or float.
    pub const NUMERIC: Self = Self::INT.union(Self::FLOAT);
    /// Any type that coerces to logical.
    pub const LOGICAL_EQUIV: Self = Self::LOGICAL.union(Self::NUMERIC);
    /// Any non-object type, NULL included.
    pub const ANY_BASE: Self = Self::NULL.union(Self::LOGICAL_EQUIV).union(Self::STRING);
    /// Any type at all.
    pub const ANY: Self = Self::ANY_BASE.union(Self::OBJECT);

    /// The type bits, without cardinality.
    #[inline]
    pub const fn types(self) -> Self {
        self.difference(Self::SINGLETON)
    }

    /// This mask restricted to singletons.
    #[inline]
    #[must_use]
    pub const fn singleton(self) -> Self {
        self.union(Self::SINGLETON)
    }

    #[inline]
    pub const fn is_singleton(self) -> bool {
        self.contains(Self::SINGLETON)
    }

    /// The single-type mask for a value type.
    pub const fn for_type(ty: ValueType) -> Self {
        match ty {
            ValueType::Null => Self::NULL,
            ValueType::Logical => Self::LOGICAL,
            ValueType::Int => Self::INT,
            ValueType::Float => Self::FLOAT,
            ValueType::String => Self::STRING,
            ValueType::Object => Self::OBJECT,
        }
    }

    /// Whether values of `ty` are within this mask's type bits.
    #[inline]
    pub const fn accepts(self, ty: ValueType) -> bool {
        self.intersects(Self::for_type(ty))
    }
}

impl fmt::Display for TypeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types = self.types();
        let name = if types == Self::ANY {
            "*"
        } else if types == Self::ANY_BASE {
            "+"
        } else if types == Self::NULL {
            "void"
        } else if types == Self::LOGICAL {
            "logical"
        } else if types == Self::INT {
            "integer"
        } else if types == Self::FLOAT {
            "float"
        } else if types == Self::STRING {
            "string"
        } else if types == Self::OBJECT {
            "object"
        } else if types == Self::NUMERIC {
            "numeric"
        } else {
            ""
        };

        if name.is_empty() {
            for (flag, letter) in [
                (Self::NULL, 'N'),
                (Self::LOGICAL, 'l'),
                (Self::INT, 'i'),
                (Self::FLOAT, 'f'),
                (Self::STRING, 's'),
                (Self::OBJECT, 'o'),
            ] {
                if types.contains(flag) {
                    write!(f, "{letter}")?;
                }
            }
        } else {
            f.write_str(name)?;
        }

        if self.is_singleton() {
            f.write_str("$")?;
        }
        Ok(())
    }
}
