//! Values flowing through arguments, expressions and observations

use crate::convert::tables;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric literal value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Real(r) => r,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            // Debug formatting keeps the trailing `.0` on whole reals
            Number::Real(r) => write!(f, "{r:?}"),
        }
    }
}

/// Dynamic payload of arguments, expressions and inline observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(Number),
    Boolean(bool),
    Text(String),
    Reference(VariableReference),
    Array(ArrayValue),
    Call(FunctionCall),
}

impl Value {
    pub fn integer(i: i64) -> Self {
        Value::Number(Number::Integer(i))
    }

    pub fn real(r: f64) -> Self {
        Value::Number(Number::Real(r))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Value::Reference(VariableReference::new(name))
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&VariableReference> {
        match self {
            Value::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&FunctionCall> {
        match self {
            Value::Call(c) => Some(c),
            _ => None,
        }
    }

    /// Text of a `sequence(str = "...")` call, if this is one
    pub fn sequence_text(&self) -> Option<&str> {
        let call = self.as_call()?;
        if call.name != "sequence" {
            return None;
        }
        call.argument("str")?.value.as_text()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Reference(r) => write!(f, "{r}"),
            Value::Array(a) => write!(f, "{a}"),
            Value::Call(c) => write!(f, "{c}"),
        }
    }
}

/// Reference to a variable by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableReference {
    pub name: String,
}

impl VariableReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for VariableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Ordered array literal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub elements: Vec<Value>,
}

impl ArrayValue {
    pub fn new(elements: Vec<Value>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    /// Names referenced by the array's own elements
    pub fn direct_references(&self) -> impl Iterator<Item = &str> {
        self.elements
            .iter()
            .filter_map(Value::as_reference)
            .map(|r| r.name.as_str())
    }

    /// Names referenced anywhere in the array, through nested arrays
    pub fn variable_references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        collect_references(&self.elements, &mut refs);
        refs
    }
}

fn collect_references<'a>(elements: &'a [Value], refs: &mut Vec<&'a str>) {
    for element in elements {
        match element {
            Value::Reference(r) => refs.push(&r.name),
            Value::Array(inner) => collect_references(&inner.elements, refs),
            _ => {}
        }
    }
}

impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{element}")?;
        }
        f.write_str("]")
    }
}

/// Call argument; unnamed arguments are positional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Value,
}

impl Argument {
    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    pub fn positional(value: Value) -> Self {
        Self { name: None, value }
    }
}

/// Shared argument access for function calls and distributions
pub trait Callable {
    fn name(&self) -> &str;
    fn arguments(&self) -> &[Argument];

    /// First argument with the given name
    fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments()
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
    }

    fn argument_at(&self, position: usize) -> Option<&Argument> {
        self.arguments().get(position)
    }

    fn has_argument(&self, name: &str) -> bool {
        self.argument(name).is_some()
    }

    /// Named arguments in call order
    fn named_arguments(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.arguments()
            .iter()
            .filter_map(|arg| arg.name.as_deref().map(|name| (name, &arg.value)))
    }

    /// Names referenced directly by an argument
    fn variable_references(&self) -> Vec<&str> {
        self.arguments()
            .iter()
            .filter_map(|arg| arg.value.as_reference())
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Argument references, looking one level into array arguments.
    ///
    /// References inside nested calls are not included.
    fn dependencies(&self) -> Vec<String> {
        let mut deps = Vec::new();
        for arg in self.arguments() {
            match &arg.value {
                Value::Reference(r) => deps.push(r.name.clone()),
                Value::Array(array) => {
                    deps.extend(array.direct_references().map(str::to_string));
                }
                _ => {}
            }
        }
        deps
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, arguments: &[Argument]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, arg) in arguments.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if let Some(name) = &arg.name {
            write!(f, "{name}=")?;
        }
        write!(f, "{}", arg.value)?;
    }
    f.write_str(")")
}

/// Function call such as `HKY(kappa=kappa)` or `mrca(taxa=[a, b])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

impl Callable for FunctionCall {
    fn name(&self) -> &str {
        &self.name
    }

    fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, &self.name, &self.arguments)
    }
}

/// Probability distribution such as `LogNormal(mean=1.0, sigma=0.5)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Distribution {
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Interchange type name; unknown distributions keep their own name
    pub fn canonical_type(&self) -> &str {
        tables::canonical_distribution(&self.name).unwrap_or(self.name.as_str())
    }

    /// Value kind produced when the owning variable's type says nothing
    pub fn default_generates(&self) -> &'static str {
        tables::distribution_generates(&self.name)
    }
}

impl Callable for Distribution {
    fn name(&self) -> &str {
        &self.name
    }

    fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, &self.name, &self.arguments)
    }
}
