//! Structural entries: sequences, delimiters, lists, subscripts, errors and matrices
use super::{Entry, Kind, Precedence};
use crate::parse::{splat, Parser};
use crate::serialize::Serializer;
use crate::tree::Expression;
use crate::warning::Warning;

const SUBSCRIPT: Precedence = 720;

/// An infix routine that extends a left operand with the same head instead of nesting it
pub(super) fn flatten(
    head: &'static str,
) -> impl Fn(&mut Parser<'_>, Option<&Expression>, Precedence) -> Option<Expression> + Send + Sync + 'static
{
    move |parser, lhs, precedence| {
        let rhs = parser
            .parse_expression(precedence)
            .unwrap_or_else(Parser::missing);
        let mut ops = match lhs {
            Some(lhs) if lhs.is_function(head) => lhs.ops().to_vec(),
            Some(lhs) => vec![lhs.clone()],
            None => Vec::new(),
        };
        ops.push(rhs);
        Some(Expression::function(head, ops))
    }
}

/// Parentheses only group, unless they hold nothing or a list
fn group(_: &mut Parser<'_>, body: Option<&Expression>, _: Precedence) -> Option<Expression> {
    Some(match body {
        Some(body) if !body.is_function("Sequence") => body.clone(),
        body => Expression::function("Delimiter", splat(body.cloned())),
    })
}

fn delimiter(serializer: &Serializer<'_>, expr: &Expression, level: usize) -> Result<String, Warning> {
    let style = (serializer.options().group_style)(expr, level);
    Ok(serializer.wrap_string(&serializer.serialize_ops(expr, level), style, None))
}

fn sequence(serializer: &Serializer<'_>, expr: &Expression, level: usize) -> Result<String, Warning> {
    let ops: Vec<_> = expr
        .ops()
        .iter()
        .map(|op| serializer.wrap(op, Some(21), level + 1))
        .collect();
    Ok(ops.join(", "))
}

fn subscript(parser: &mut Parser<'_>, lhs: Option<&Expression>, _: Precedence) -> Option<Expression> {
    let sub = parser.parse_argument().unwrap_or_else(Parser::missing);
    Some(Expression::function("Subscript", [lhs?.clone(), sub]))
}

fn subscript_latex(serializer: &Serializer<'_>, expr: &Expression, level: usize) -> Result<String, Warning> {
    let base = expr
        .op(1)
        .map_or_else(|| serializer.missing(), |base| serializer.wrap_base(base, SUBSCRIPT, level + 1));
    let sub = expr
        .op(2)
        .map_or_else(|| serializer.missing(), |sub| serializer.serialize_at(sub, level + 1));
    Ok(format!("{base}_{{{sub}}}"))
}

fn error_latex(serializer: &Serializer<'_>, expr: &Expression, _: usize) -> Result<String, Warning> {
    if expr.op(1).and_then(Expression::string_value) == Some("missing") {
        return Ok(serializer.missing());
    }
    let source = expr
        .ops()
        .iter()
        .find(|op| op.is_function("Latex"))
        .and_then(|latex| latex.op(1))
        .and_then(Expression::string_value);
    Ok(match source {
        Some(source) => format!(r"\textcolor{{red}}{{{source}}}"),
        None => serializer.missing(),
    })
}

pub(super) fn entries() -> Vec<Entry> {
    vec![
        Entry::infix(",", 20)
            .named("Sequence")
            .parse_with(flatten("Sequence"))
            .serialize_with(sequence),
        Entry::matchfix("(", ")")
            .named("Delimiter")
            .parse_with(group)
            .serialize_with(delimiter),
        Entry::matchfix(r"\left(", r"\right)").parse_with(group),
        Entry::matchfix(r"\Bigl(", r"\Bigr)").parse_with(group),
        Entry::matchfix("[", "]").parse_as("List"),
        Entry::matchfix(r"\lbrack", r"\rbrack").named("List"),
        Entry::matchfix(r"\vert", r"\vert").parse_as("Abs"),
        Entry::matchfix(r"\lvert", r"\rvert").parse_as("Abs"),
        Entry::matchfix("|", "|").named("Abs"),
        Entry::infix("_", SUBSCRIPT)
            .named("Subscript")
            .parse_with(subscript)
            .serialize_with(subscript_latex),
        Entry::new(Kind::Function)
            .named("Error")
            .serialize_with(error_latex),
        Entry::environment("matrix").parse_as("Matrix"),
        Entry::environment("bmatrix").parse_as("Matrix"),
        Entry::environment("pmatrix").named("Matrix"),
    ]
}
