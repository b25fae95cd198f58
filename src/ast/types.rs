use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use crate::error::Span;

use super::{AstNode, ObjectName};

/// A SQL data type, as written in casts and column definitions.
///
/// Size and precision arguments are optional wherever the grammar allows
/// omitting them; an unrecognised type name is preserved as [DataType::Custom].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum DataType {
    Boolean,
    SmallInt,
    Int,
    BigInt,
    Real,
    Float(Option<u64>),
    Double,
    Decimal(Option<u64>, Option<u64>),
    Char(Option<u64>),
    Varchar(Option<u64>),
    Uuid,
    Date,
    Time {
        with_time_zone: bool,
    },
    Timestamp {
        with_time_zone: bool,
    },
    Regclass,
    Text,
    Bytea,
    /// A base type followed by `[]`, e.g. `TEXT[]`
    Array(Box<DataType>),
    Custom(ObjectName),
}

impl AstNode for DataType {
    fn span(&self) -> Option<Span> {
        match self {
            DataType::Custom(name) => name.span(),
            DataType::Array(inner) => inner.span(),
            _ => None,
        }
    }
}
