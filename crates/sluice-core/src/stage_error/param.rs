use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Shared, thread-safe handle to an underlying failure.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// A single message parameter.
///
/// Parameters are opaque to the carrier: they are only ever displayed. A
/// [`Param::Cause`] in last position is additionally recognized as the
/// underlying failure of a [`StageError`](crate::StageError).
#[derive(Clone)]
pub enum Param {
    Value(Value),
    Cause(Cause),
}

impl Param {
    /// Wrap any error as a cause parameter.
    pub fn cause<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Param::Cause(Arc::new(err))
    }

    pub fn is_cause(&self) -> bool {
        matches!(self, Param::Cause(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Param::Value(v) => Some(v),
            Param::Cause(_) => None,
        }
    }

    pub fn as_cause(&self) -> Option<&Cause> {
        match self {
            Param::Cause(c) => Some(c),
            Param::Value(_) => None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(Value::String(s)) => f.write_str(s),
            Param::Value(Value::Null) => f.write_str("null"),
            Param::Value(other) => write!(f, "{}", other),
            Param::Cause(cause) => write!(f, "{}", cause),
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(v) => write!(f, "{:?}", v),
            Param::Cause(c) => f.debug_tuple("Cause").field(&c.to_string()).finish(),
        }
    }
}

/// Values compare by value, causes by identity.
impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Param::Value(a), Param::Value(b)) => a == b,
            (Param::Cause(a), Param::Cause(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Value(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Value(Value::String(value))
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Param::Value(Value::String(value.clone()))
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Value(Value::Bool(value))
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Value(Value::from(value))
    }
}

impl From<Cause> for Param {
    fn from(cause: Cause) -> Self {
        Param::Cause(cause)
    }
}

macro_rules! param_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Param {
                fn from(value: $t) -> Self {
                    Param::Value(Value::from(value))
                }
            }
        )*
    };
}

param_from_int!(i32, i64, u32, u64, usize);
