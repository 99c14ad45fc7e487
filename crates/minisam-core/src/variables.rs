use std::collections::BTreeMap;
use std::fmt;

use minisam_lie::{SE2, SE3, SO2, SO3};

use crate::{key_string, Key, VariableError};

/// A single optimization variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    SO2(SO2),
    SE2(SE2),
    SO3(SO3),
    SE3(SE3),
    /// Plain Euclidean vector of any size.
    Vector(Vec<f64>),
}

impl Variable {
    /// Dimension of the tangent space.
    pub fn dim(&self) -> usize {
        match self {
            Variable::SO2(_) => 1,
            Variable::SE2(_) | Variable::SO3(_) => 3,
            Variable::SE3(_) => 6,
            Variable::Vector(v) => v.len(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Variable::SO2(_) => "SO2",
            Variable::SE2(_) => "SE2",
            Variable::SO3(_) => "SO3",
            Variable::SE3(_) => "SE3",
            Variable::Vector(_) => "Vector",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::SO2(v) => fmt::Display::fmt(v, f),
            Variable::SE2(v) => fmt::Display::fmt(v, f),
            Variable::SO3(v) => fmt::Display::fmt(v, f),
            Variable::SE3(v) => fmt::Display::fmt(v, f),
            Variable::Vector(v) => write!(f, "Vector({v:?})"),
        }
    }
}

macro_rules! impl_variable_conversions {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Variable {
                fn from(value: $ty) -> Self {
                    Variable::$ty(value)
                }
            }

            impl TryFrom<&Variable> for $ty {
                type Error = &'static str;

                /// Fails with the stored type name on mismatch.
                fn try_from(value: &Variable) -> Result<Self, Self::Error> {
                    match value {
                        Variable::$ty(v) => Ok(*v),
                        other => Err(other.type_name()),
                    }
                }
            }
        )*
    };
}

impl_variable_conversions!(SO2, SE2, SO3, SE3);

impl From<Vec<f64>> for Variable {
    fn from(value: Vec<f64>) -> Self {
        Variable::Vector(value)
    }
}

/// Ordered `Key -> Variable` map, the state of a factor graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: BTreeMap<Key, Variable>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new variable, failing if `key` is already present.
    pub fn add(&mut self, key: Key, value: impl Into<Variable>) -> Result<(), VariableError> {
        if self.values.contains_key(&key) {
            return Err(VariableError::key_exists(key));
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    /// Replace an existing variable with a value of the same type.
    pub fn update(&mut self, key: Key, value: impl Into<Variable>) -> Result<(), VariableError> {
        let value = value.into();
        let slot = self
            .values
            .get_mut(&key)
            .ok_or_else(|| VariableError::key_not_found(key))?;
        if slot.type_name() != value.type_name() {
            return Err(VariableError::TypeMismatch {
                key: key_string(key),
                expected: slot.type_name(),
                found: value.type_name(),
            });
        }
        log::trace!("update {}: {} -> {}", key_string(key), slot, value);
        *slot = value;
        Ok(())
    }

    pub fn at(&self, key: Key) -> Result<&Variable, VariableError> {
        self.values
            .get(&key)
            .ok_or_else(|| VariableError::key_not_found(key))
    }

    /// Typed access, e.g. `variables.at_as::<SE2>(key)`.
    pub fn at_as<T>(&self, key: Key) -> Result<T, VariableError>
    where
        T: for<'a> TryFrom<&'a Variable, Error = &'static str>,
    {
        let variable = self.at(key)?;
        T::try_from(variable).map_err(|found| VariableError::TypeMismatch {
            key: key_string(key),
            expected: std::any::type_name::<T>()
                .rsplit("::")
                .next()
                .unwrap_or("unknown"),
            found,
        })
    }

    pub fn exists(&self, key: Key) -> bool {
        self.values.contains_key(&key)
    }

    /// Remove a variable, returning it.
    pub fn erase(&mut self, key: Key) -> Result<Variable, VariableError> {
        self.values
            .remove(&key)
            .ok_or_else(|| VariableError::key_not_found(key))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of the tangent dimensions of all variables.
    pub fn dim(&self) -> usize {
        self.values.values().map(Variable::dim).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, &Variable)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

impl fmt::Display for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variables # = {}", self.len())?;
        for (key, value) in self.iter() {
            writeln!(f, "{} : {}", key_string(key), value)?;
        }
        Ok(())
    }
}
