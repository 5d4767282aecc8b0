//! The expression tree produced by parsing and consumed by serializing
//!
//! An [`Expression`] is a MathJSON value:
//! - [`Number`][Expression::Number] - a numeric literal kept as text so no precision is lost
//! - [`String`][Expression::String] - a string literal
//! - [`Symbol`][Expression::Symbol] - an identifier
//! - [`Function`][Expression::Function] - a head name applied to ordered operands
//! - [`Dictionary`][Expression::Dictionary] - a table of keyed expressions
//! - [`Annotated`][Expression::Annotated] - any of the above along with the markup it came from
//!
//! Parse errors are ordinary function nodes headed by `Error`, see [`Expression::error`].
//!
//! Expressions serialize to and from the MathJSON wire format with `serde`:
//!
//! ```
//! use mathjson_notation::tree::Expression;
//!
//! let expr = Expression::function("Add", ["x", "y"]);
//! assert_eq!(expr.to_string(), r#"["Add","x","y"]"#);
//! let back: Expression = serde_json::from_str(r#"["Add", "x", "y"]"#).unwrap();
//! assert_eq!(back, expr);
//! ```
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// A MathJSON expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// A numeric literal like `12.5`, `-3e8` or `NaN`
    Number(String),
    /// A string literal
    String(String),
    /// A symbol like `x` or `Pi`
    Symbol(String),
    /// A function application
    Function {
        /// The name of the function
        head: String,
        /// The function operands
        ops: Vec<Expression>,
    },
    /// A table of expressions
    Dictionary(Vec<(String, Expression)>),
    /// An expression along with the markup it was parsed from
    Annotated {
        /// The source markup
        latex: String,
        /// The annotated expression
        expr: Box<Expression>,
    },
}

/// The codes of parse error nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An operand is missing, e.g. the right side of `x+`
    Missing,
    /// Markup that can't be interpreted
    SyntaxError,
    /// An identifier where an operator was expected
    UnexpectedIdentifier,
    /// An open delimiter that is never closed
    UnexpectedOpenDelimiter,
    /// A close delimiter that was never opened
    ExpectedOpenDelimiter,
    /// A group that ran out of input before closing
    ExpectedClosingDelimiter,
    /// A token with no meaning at its position
    UnexpectedToken,
    /// A command that isn't in the dictionary
    UnexpectedCommand,
}

impl ErrorCode {
    /// The wire spelling of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Missing => "missing",
            ErrorCode::SyntaxError => "syntax-error",
            ErrorCode::UnexpectedIdentifier => "unexpected-identifier",
            ErrorCode::UnexpectedOpenDelimiter => "unexpected-open-delimiter",
            ErrorCode::ExpectedOpenDelimiter => "expected-open-delimiter",
            ErrorCode::ExpectedClosingDelimiter => "expected-closing-delimiter",
            ErrorCode::UnexpectedToken => "unexpected-token",
            ErrorCode::UnexpectedCommand => "unexpected-command",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Expression {
    /// Create a symbol
    pub fn symbol<S: Into<String>>(name: S) -> Self {
        Expression::Symbol(name.into())
    }

    /// Create a number from its textual representation
    pub fn number<S: Into<String>>(value: S) -> Self {
        Expression::Number(value.into())
    }

    /// Create a string literal
    pub fn string<S: Into<String>>(value: S) -> Self {
        Expression::String(value.into())
    }

    /// Create a function application
    ///
    /// ```
    /// use mathjson_notation::tree::Expression;
    ///
    /// let expr = Expression::function("Power", [Expression::symbol("x"), Expression::from(2)]);
    /// assert_eq!(expr.nops(), 2);
    /// ```
    pub fn function<H, T, E>(head: H, ops: T) -> Self
    where
        H: Into<String>,
        T: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        Expression::Function {
            head: head.into(),
            ops: ops.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a `Sequence` of expressions
    pub fn sequence<T>(ops: T) -> Self
    where
        T: IntoIterator<Item = Expression>,
    {
        Expression::function("Sequence", ops)
    }

    /// Create a parse error node
    ///
    /// The node has shape `["Error", code, ["Latex", source]]` where the code is a bare string, or
    /// `["ErrorCode", code, arg]` when an argument like the offending command is given. The
    /// `Latex` context is omitted for empty source.
    pub fn error(code: ErrorCode, arg: Option<&str>, latex: &str) -> Self {
        let code = match arg {
            Some(arg) => Expression::function(
                "ErrorCode",
                [Expression::string(code.as_str()), Expression::string(arg)],
            ),
            None => Expression::string(code.as_str()),
        };
        let mut ops = vec![code];
        if !latex.is_empty() {
            ops.push(Expression::function("Latex", [Expression::string(latex)]));
        }
        Expression::Function {
            head: "Error".into(),
            ops,
        }
    }

    /// Wrap with the markup it came from
    pub fn annotate<S: Into<String>>(self, latex: S) -> Self {
        Expression::Annotated {
            latex: latex.into(),
            expr: Box::new(self.into_stripped()),
        }
    }

    /// The expression without any annotation
    pub fn strip(&self) -> &Expression {
        match self {
            Expression::Annotated { expr, .. } => expr.strip(),
            expr => expr,
        }
    }

    /// Consume the annotation
    pub fn into_stripped(self) -> Expression {
        match self {
            Expression::Annotated { expr, .. } => expr.into_stripped(),
            expr => expr,
        }
    }

    /// The source markup, if annotated
    pub fn latex(&self) -> Option<&str> {
        match self {
            Expression::Annotated { latex, .. } => Some(latex),
            _ => None,
        }
    }

    /// The head of a function
    pub fn head(&self) -> Option<&str> {
        match self.strip() {
            Expression::Function { head, .. } => Some(head),
            _ => None,
        }
    }

    /// The operands of a function, or nothing
    pub fn ops(&self) -> &[Expression] {
        match self.strip() {
            Expression::Function { ops, .. } => ops,
            _ => &[],
        }
    }

    /// The number of operands
    pub fn nops(&self) -> usize {
        self.ops().len()
    }

    /// The `n`th operand, counting from 1
    pub fn op(&self, n: usize) -> Option<&Expression> {
        n.checked_sub(1).and_then(|idx| self.ops().get(idx))
    }

    /// The name of a symbol
    pub fn symbol_name(&self) -> Option<&str> {
        match self.strip() {
            Expression::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// The text of a number
    pub fn number_value(&self) -> Option<&str> {
        match self.strip() {
            Expression::Number(value) => Some(value),
            _ => None,
        }
    }

    /// The value of a string literal
    pub fn string_value(&self) -> Option<&str> {
        match self.strip() {
            Expression::String(value) => Some(value),
            _ => None,
        }
    }

    /// The entries of a dictionary
    pub fn dictionary(&self) -> Option<&[(String, Expression)]> {
        match self.strip() {
            Expression::Dictionary(entries) => Some(entries),
            _ => None,
        }
    }

    /// True for numbers, strings and symbols
    pub fn is_atom(&self) -> bool {
        matches!(
            self.strip(),
            Expression::Number(_) | Expression::String(_) | Expression::Symbol(_)
        )
    }

    /// True if this is a function with the given head
    pub fn is_function(&self, name: &str) -> bool {
        self.head() == Some(name)
    }

    /// True if any node of the expression is a parse error
    pub fn has_errors(&self) -> bool {
        match self.strip() {
            Expression::Function { head, ops } => {
                head == "Error" || ops.iter().any(Expression::has_errors)
            }
            Expression::Dictionary(entries) => entries.iter().any(|(_, val)| val.has_errors()),
            _ => false,
        }
    }

    /// Convert to the MathJSON wire format
    pub fn to_json(&self) -> Value {
        match self {
            Expression::Number(value) => number_to_json(value),
            Expression::String(value) => Value::String(format!("'{value}'")),
            Expression::Symbol(name) => Value::String(name.clone()),
            Expression::Function { head, ops } => Value::Array(
                std::iter::once(Value::String(head.clone()))
                    .chain(ops.iter().map(Expression::to_json))
                    .collect(),
            ),
            Expression::Dictionary(entries) => {
                let mut obj = Map::new();
                obj.insert("dict".into(), dictionary_to_json(entries));
                Value::Object(obj)
            }
            Expression::Annotated { latex, expr } => {
                let (key, value) = match expr.strip() {
                    Expression::Number(value) => ("num", Value::String(value.clone())),
                    Expression::String(value) => ("str", Value::String(value.clone())),
                    Expression::Symbol(name) => ("sym", Value::String(name.clone())),
                    Expression::Dictionary(entries) => ("dict", dictionary_to_json(entries)),
                    func => ("fn", func.to_json()),
                };
                let mut obj = Map::new();
                obj.insert(key.into(), value);
                obj.insert("latex".into(), Value::String(latex.clone()));
                Value::Object(obj)
            }
        }
    }

    /// Read from the MathJSON wire format
    pub fn from_json(value: &Value) -> Result<Self, WireError> {
        match value {
            Value::Number(num) => Ok(Expression::Number(num.to_string())),
            Value::String(text) => string_from_json(text),
            Value::Array(items) => function_from_json(items),
            Value::Object(obj) => object_from_json(obj),
            Value::Null => Err(WireError::Unexpected("null")),
            Value::Bool(_) => Err(WireError::Unexpected("a boolean")),
        }
    }
}

fn number_to_json(value: &str) -> Value {
    if let Ok(int) = value.parse::<i64>() {
        if int.to_string() == value {
            return Value::from(int);
        }
    }
    if let Ok(float) = value.parse::<f64>() {
        if float.is_finite() && float.to_string() == value {
            return Value::from(float);
        }
    }
    let mut obj = Map::new();
    obj.insert("num".into(), Value::String(value.into()));
    Value::Object(obj)
}

fn dictionary_to_json(entries: &[(String, Expression)]) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(key, val)| (key.clone(), val.to_json()))
            .collect(),
    )
}

fn string_from_json(text: &str) -> Result<Expression, WireError> {
    match text.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(inner) => Ok(Expression::String(inner.into())),
        None if text.is_empty() => Err(WireError::EmptySymbol),
        None => Ok(Expression::Symbol(text.into())),
    }
}

fn function_from_json(items: &[Value]) -> Result<Expression, WireError> {
    let (first, rest) = items.split_first().ok_or(WireError::EmptyFunction)?;
    let head = match first {
        Value::String(head) => match string_from_json(head)? {
            Expression::Symbol(name) => Some(name),
            _ => None,
        },
        _ => None,
    };
    match head {
        Some(head) => Ok(Expression::Function {
            head,
            ops: rest
                .iter()
                .map(Expression::from_json)
                .collect::<Result<_, _>>()?,
        }),
        None => Ok(Expression::Function {
            head: "Apply".into(),
            ops: items
                .iter()
                .map(Expression::from_json)
                .collect::<Result<_, _>>()?,
        }),
    }
}

fn object_from_json(obj: &Map<String, Value>) -> Result<Expression, WireError> {
    let expr = if let Some(num) = obj.get("num") {
        match num {
            Value::String(text) => Expression::Number(text.clone()),
            Value::Number(num) => Expression::Number(num.to_string()),
            _ => return Err(WireError::InvalidField("num")),
        }
    } else if let Some(text) = obj.get("str") {
        Expression::String(text.as_str().ok_or(WireError::InvalidField("str"))?.into())
    } else if let Some(name) = obj.get("sym") {
        match name.as_str() {
            Some("") => return Err(WireError::EmptySymbol),
            Some(name) => Expression::Symbol(name.into()),
            None => return Err(WireError::InvalidField("sym")),
        }
    } else if let Some(func) = obj.get("fn") {
        match func {
            Value::Array(items) => function_from_json(items)?,
            _ => return Err(WireError::InvalidField("fn")),
        }
    } else if let Some(dict) = obj.get("dict") {
        match dict {
            Value::Object(entries) => Expression::Dictionary(
                entries
                    .iter()
                    .map(|(key, val)| Ok((key.clone(), Expression::from_json(val)?)))
                    .collect::<Result<_, WireError>>()?,
            ),
            _ => return Err(WireError::InvalidField("dict")),
        }
    } else {
        return Err(WireError::UnknownObject);
    };
    match obj.get("latex") {
        Some(Value::String(latex)) => Ok(expr.annotate(latex.clone())),
        Some(_) => Err(WireError::InvalidField("latex")),
        None => Ok(expr),
    }
}

/// A value that isn't valid MathJSON
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// A JSON value with no MathJSON meaning
    #[error("unexpected {0} in expression")]
    Unexpected(&'static str),
    /// A function with no head
    #[error("function expression is an empty array")]
    EmptyFunction,
    /// A symbol with no name
    #[error("symbol name is empty")]
    EmptySymbol,
    /// A field of an object expression with the wrong type
    #[error("field `{0}` has the wrong type")]
    InvalidField(&'static str),
    /// An object without any of the expression fields
    #[error("object has none of `num`, `str`, `sym`, `fn` or `dict`")]
    UnknownObject,
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Expression::from_json(&value).map_err(D::Error::custom)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<&str> for Expression {
    fn from(name: &str) -> Self {
        Expression::Symbol(name.into())
    }
}

impl From<String> for Expression {
    fn from(name: String) -> Self {
        Expression::Symbol(name)
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::Number(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, Expression, WireError};
    use serde_json::json;

    #[test]
    fn wire_format() {
        let expr = Expression::function(
            "Add",
            [
                Expression::from(1),
                Expression::number("1.5"),
                Expression::number("1e400"),
                Expression::string("hi"),
                Expression::symbol("x"),
            ],
        );
        assert_eq!(
            expr.to_json(),
            json!(["Add", 1, 1.5, {"num": "1e400"}, "'hi'", "x"])
        );
    }

    #[test]
    fn annotated_wire_format() {
        let expr = Expression::symbol("x").annotate("x");
        assert_eq!(expr.to_json(), json!({"sym": "x", "latex": "x"}));
        let back = Expression::from_json(&expr.to_json()).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn non_symbol_heads_apply() {
        let expr = Expression::from_json(&json!([["Derivative", "f"], "x"])).unwrap();
        assert_eq!(expr.head(), Some("Apply"));
        assert_eq!(expr.nops(), 2);
        assert_eq!(expr.op(1).and_then(Expression::head), Some("Derivative"));
    }

    #[test]
    fn invalid_wire_values() {
        assert_eq!(
            Expression::from_json(&json!([])),
            Err(WireError::EmptyFunction)
        );
        assert_eq!(
            Expression::from_json(&json!({"foo": 1})),
            Err(WireError::UnknownObject)
        );
        assert!(serde_json::from_str::<Expression>("null").is_err());
    }

    #[test]
    fn error_nodes() {
        let err = Expression::error(ErrorCode::UnexpectedCommand, Some(r"\foo"), r"\foo y");
        assert_eq!(
            err.to_json(),
            json!([
                "Error",
                ["ErrorCode", "'unexpected-command'", r"'\foo'"],
                ["Latex", r"'\foo y'"]
            ])
        );
        let missing = Expression::error(ErrorCode::Missing, None, "");
        assert_eq!(missing.to_json(), json!(["Error", "'missing'"]));
        assert!(Expression::sequence([Expression::symbol("x"), missing]).has_errors());
    }

    #[test]
    fn accessors_see_through_annotations() {
        let expr = Expression::function("Negate", ["x"]).annotate("-x");
        assert_eq!(expr.head(), Some("Negate"));
        assert_eq!(expr.latex(), Some("-x"));
        assert_eq!(expr.op(1).and_then(Expression::symbol_name), Some("x"));
        assert_eq!(expr.op(0), None);
    }
}
