//! Source-literal rendering of JSON test inputs.
//!
//! Dynamic targets (Python, JavaScript) embed values as-is. Typed targets
//! (Java, C++) need one element type per parameter, inferred across every
//! test case, before any literal can be written.

use serde_json::{Number, Value};

/// Element type of a parameter in a statically typed target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Long,
    Double,
    Bool,
    Str,
    Array(Box<ValueType>),
    /// Element type of an empty array, settled later by unification
    Unknown,
}

impl ValueType {
    /// Infer the type of a single JSON value
    pub fn infer(value: &Value) -> Result<ValueType, String> {
        match value {
            Value::Null => Err("null values have no typed literal".to_string()),
            Value::Object(_) => Err("objects have no typed literal".to_string()),
            Value::Bool(_) => Ok(ValueType::Bool),
            Value::String(_) => Ok(ValueType::Str),
            Value::Number(n) => Ok(number_type(n)),
            Value::Array(items) => {
                let mut element = ValueType::Unknown;
                for item in items {
                    let item_type = ValueType::infer(item)?;
                    element = element
                        .unify(&item_type)
                        .ok_or_else(|| "array elements have mixed types".to_string())?;
                }
                Ok(ValueType::Array(Box::new(element)))
            }
        }
    }

    /// Infer one type covering every value of a parameter
    pub fn infer_all<'a>(values: impl IntoIterator<Item = &'a Value>) -> Result<ValueType, String> {
        let mut column = ValueType::Unknown;
        for value in values {
            let value_type = ValueType::infer(value)?;
            column = column
                .unify(&value_type)
                .ok_or_else(|| "values differ in type between test cases".to_string())?;
        }
        Ok(column.settle())
    }

    /// Widest type compatible with both sides, if any
    pub fn unify(&self, other: &ValueType) -> Option<ValueType> {
        use ValueType::*;

        match (self, other) {
            (Unknown, t) | (t, Unknown) => Some(t.clone()),
            (a, b) if a == b => Some(a.clone()),
            (Int, Long) | (Long, Int) => Some(Long),
            (Int | Long, Double) | (Double, Int | Long) => Some(Double),
            (Array(a), Array(b)) => a.unify(b).map(|t| Array(Box::new(t))),
            _ => None,
        }
    }

    /// Replace unresolved element types with int
    fn settle(self) -> ValueType {
        match self {
            ValueType::Unknown => ValueType::Int,
            ValueType::Array(inner) => ValueType::Array(Box::new(inner.settle())),
            other => other,
        }
    }
}

fn number_type(n: &Number) -> ValueType {
    match n.as_i64() {
        Some(v) if i32::try_from(v).is_ok() => ValueType::Int,
        Some(_) => ValueType::Long,
        None => ValueType::Double,
    }
}

/// Literal syntax of Java and C++
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedDialect {
    Java,
    Cpp,
}

impl TypedDialect {
    pub fn type_name(&self, value_type: &ValueType) -> String {
        match (self, value_type) {
            (_, ValueType::Int | ValueType::Unknown) => "int".to_string(),
            (_, ValueType::Double) => "double".to_string(),
            (TypedDialect::Java, ValueType::Long) => "long".to_string(),
            (TypedDialect::Java, ValueType::Bool) => "boolean".to_string(),
            (TypedDialect::Java, ValueType::Str) => "String".to_string(),
            (TypedDialect::Java, ValueType::Array(inner)) => format!("{}[]", self.type_name(inner)),
            (TypedDialect::Cpp, ValueType::Long) => "long long".to_string(),
            (TypedDialect::Cpp, ValueType::Bool) => "bool".to_string(),
            (TypedDialect::Cpp, ValueType::Str) => "std::string".to_string(),
            (TypedDialect::Cpp, ValueType::Array(inner)) => {
                format!("std::vector<{}>", self.type_name(inner))
            }
        }
    }

    /// Render `value` as a literal of `value_type`.
    /// Callers pass a type obtained from [`ValueType::infer_all`] over the same value.
    pub fn render(&self, value: &Value, value_type: &ValueType) -> String {
        match (value, value_type) {
            (Value::Array(items), ValueType::Array(inner)) => {
                let rendered: Vec<String> =
                    items.iter().map(|item| self.render(item, inner)).collect();
                format!("{{{}}}", rendered.join(", "))
            }
            (Value::Number(n), ValueType::Long) => format!("{}{}", n, self.long_suffix()),
            (Value::Number(n), ValueType::Double) => double_literal(n),
            (Value::String(s), _) => quote(s),
            (other, _) => other.to_string(),
        }
    }

    fn long_suffix(&self) -> &'static str {
        match self {
            TypedDialect::Java => "L",
            TypedDialect::Cpp => "LL",
        }
    }
}

fn double_literal(n: &Number) -> String {
    match n.as_f64() {
        Some(v) => format!("{:?}", v),
        None => n.to_string(),
    }
}

/// Literal syntax of Python and JavaScript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicDialect {
    Python,
    Javascript,
}

impl DynamicDialect {
    pub fn render(&self, value: &Value) -> String {
        match value {
            Value::Null => self.keyword("null").to_string(),
            Value::Bool(true) => self.keyword("true").to_string(),
            Value::Bool(false) => self.keyword("false").to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => quote(s),
            Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(|item| self.render(item)).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Object(fields) => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(key, item)| format!("{}: {}", quote(key), self.render(item)))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
        }
    }

    /// Argument pack for a call with several parameters, spread at the call site
    pub fn argument_pack(&self, args: &[String]) -> String {
        match self {
            DynamicDialect::Python if args.len() == 1 => format!("({},)", args[0]),
            DynamicDialect::Python => format!("({})", args.join(", ")),
            DynamicDialect::Javascript => format!("[{}]", args.join(", ")),
        }
    }

    fn keyword(&self, json: &'static str) -> &'static str {
        match (self, json) {
            (DynamicDialect::Python, "null") => "None",
            (DynamicDialect::Python, "true") => "True",
            (DynamicDialect::Python, "false") => "False",
            _ => json,
        }
    }
}

fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Human-readable form used in failure snapshots: `[1, 2]`, `"abc"`, `true`
pub fn display(value: &Value) -> String {
    DynamicDialect::Javascript.render(value)
}
