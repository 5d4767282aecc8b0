//! Numeric operators, and the mapping operators of the algebra category
use super::common::flatten;
use super::{Entry, Kind, Precedence};
use crate::options::{FractionStyle, PowerStyle, RootStyle};
use crate::parse::Parser;
use crate::serialize::{replace_latex, Serializer};
use crate::tokenizer::join_latex;
use crate::tree::Expression;
use crate::warning::Warning;

const ADD: Precedence = 275;
const MULTIPLY: Precedence = 390;
pub(super) const POWER: Precedence = 720;

/// The operands of an operator that takes exactly `N`
pub(super) fn operands<'e, const N: usize>(
    expr: &'e Expression,
    head: &str,
) -> Result<&'e [Expression; N], Warning> {
    expr.ops().try_into().map_err(|_| Warning::OperandCount {
        head: head.to_owned(),
        expected: N,
        actual: expr.nops(),
    })
}

/// `-2` is a number rather than a negation
fn negate(parser: &mut Parser<'_>, _: Option<&Expression>, precedence: Precedence) -> Option<Expression> {
    let operand = parser
        .parse_expression(precedence)
        .unwrap_or_else(Parser::missing);
    Some(match operand {
        Expression::Number(text) if !text.starts_with('-') => Expression::Number(format!("-{text}")),
        operand => Expression::function("Negate", [operand]),
    })
}

fn is_integer(expr: &Expression) -> bool {
    expr.number_value()
        .map_or(false, |text| text.bytes().all(|b| b.is_ascii_digit()))
}

fn is_numeric_fraction(expr: &Expression) -> bool {
    expr.is_function("Divide") && expr.ops().iter().all(is_integer)
}

fn add(serializer: &Serializer<'_>, expr: &Expression, level: usize) -> Result<String, Warning> {
    let invisible = &serializer.options().invisible_plus;
    let mut ops = expr.ops().iter();
    let Some(first) = ops.next() else {
        return Ok("0".into());
    };
    let mut latex = serializer.wrap(first, Some(ADD), level + 1);
    let mut prev = first;
    for op in ops {
        let rhs = serializer.wrap(op, Some(ADD + 1), level + 1);
        latex = if !invisible.is_empty() && is_integer(prev) && is_numeric_fraction(op) {
            replace_latex(invisible, &[latex, rhs])
        } else {
            format!("{latex}+{rhs}")
        };
        prev = op;
    }
    Ok(latex)
}

fn multiply(serializer: &Serializer<'_>, expr: &Expression, level: usize) -> Result<String, Warning> {
    let options = serializer.options();
    let mut ops = expr.ops().iter();
    let Some(first) = ops.next() else {
        return Ok("1".into());
    };
    let mut latex = serializer.wrap(first, Some(MULTIPLY), level + 1);
    let mut prev = first;
    for op in ops {
        let rhs = serializer.wrap(op, Some(MULTIPLY + 1), level + 1);
        let invisible = !options.invisible_multiply.is_empty()
            && prev.number_value().is_some()
            && op.symbol_name().is_some();
        latex = if invisible {
            replace_latex(&options.invisible_multiply, &[latex, rhs])
        } else {
            join_latex([latex.as_str(), options.multiply.as_str(), rhs.as_str()])
        };
        prev = op;
    }
    Ok(latex)
}

fn frac(parser: &mut Parser<'_>, _: Option<&Expression>, _: Precedence) -> Option<Expression> {
    let numer = parser.parse_argument().unwrap_or_else(Parser::missing);
    let denom = parser.parse_argument().unwrap_or_else(Parser::missing);
    Some(Expression::function("Divide", [numer, denom]))
}

fn divide(serializer: &Serializer<'_>, expr: &Expression, level: usize) -> Result<String, Warning> {
    let [numer, denom] = operands::<2>(expr, "Divide")?;
    let args = match (serializer.options().fraction_style)(expr, level) {
        FractionStyle::Quotient | FractionStyle::NiceSolidus | FractionStyle::Factor => [
            serializer.serialize_at(numer, level + 1),
            serializer.serialize_at(denom, level + 1),
        ],
        FractionStyle::InlineSolidus | FractionStyle::Reciprocal => [
            serializer.wrap_short(numer, level + 1),
            serializer.wrap_short(denom, level + 1),
        ],
    };
    let template = match (serializer.options().fraction_style)(expr, level) {
        FractionStyle::Quotient => r"\frac{#1}{#2}",
        FractionStyle::InlineSolidus => "#1/#2",
        FractionStyle::NiceSolidus => r"^{#1}\!\!/\!_{#2}",
        FractionStyle::Reciprocal => r"#1\cdot#2^{-1}",
        FractionStyle::Factor => r"\frac{1}{#2}#1",
    };
    Ok(replace_latex(template, &args))
}

fn power(parser: &mut Parser<'_>, lhs: Option<&Expression>, _: Precedence) -> Option<Expression> {
    let exponent = parser.parse_argument().unwrap_or_else(Parser::missing);
    Some(Expression::function("Power", [lhs?.clone(), exponent]))
}

/// `n` when the expression is `1/n`
fn reciprocal(expr: &Expression) -> Option<&Expression> {
    match expr.ops() {
        [numer, denom] if expr.is_function("Divide") && numer.number_value() == Some("1") => Some(denom),
        _ => None,
    }
}

fn radical(serializer: &Serializer<'_>, radicand: &Expression, index: Option<&Expression>, level: usize) -> String {
    let radicand = serializer.serialize_at(radicand, level + 1);
    match index {
        Some(index) => format!(r"\sqrt[{}]{{{radicand}}}", serializer.serialize_at(index, level + 1)),
        None => format!(r"\sqrt{{{radicand}}}"),
    }
}

fn power_latex(serializer: &Serializer<'_>, expr: &Expression, level: usize) -> Result<String, Warning> {
    let [base, exponent] = operands::<2>(expr, "Power")?;
    let style = (serializer.options().power_style)(expr, level);
    if style == PowerStyle::Root {
        if let Some(index) = reciprocal(exponent) {
            let index = (index.number_value() != Some("2")).then_some(index);
            return Ok(radical(serializer, base, index, level));
        }
    }
    if exponent.number_value() == Some("-1") {
        match style {
            PowerStyle::Reciprocal => {
                return Ok(format!(r"\frac{{1}}{{{}}}", serializer.serialize_at(base, level + 1)))
            }
            PowerStyle::Solidus => return Ok(format!("1/{}", serializer.wrap_short(base, level + 1))),
            PowerStyle::Root | PowerStyle::Quotient => {}
        }
    }
    let base = serializer.wrap_base(base, POWER, level + 1);
    Ok(format!("{base}^{{{}}}", serializer.serialize_at(exponent, level + 1)))
}

fn sqrt(parser: &mut Parser<'_>, _: Option<&Expression>, _: Precedence) -> Option<Expression> {
    let index = parser.parse_optional_argument();
    let radicand = parser.parse_argument().unwrap_or_else(Parser::missing);
    Some(match index {
        Some(index) => Expression::function("Root", [radicand, index]),
        None => Expression::function("Sqrt", [radicand]),
    })
}

fn root_latex(serializer: &Serializer<'_>, radicand: &Expression, index: Option<&Expression>, level: usize, style: RootStyle) -> String {
    let exponent = || match index {
        Some(index) => serializer.serialize_at(index, level + 1),
        None => "2".to_owned(),
    };
    match style {
        RootStyle::Radical => radical(serializer, radicand, index, level),
        RootStyle::Quotient => format!(
            r"{}^{{\frac{{1}}{{{}}}}}",
            serializer.wrap_short(radicand, level + 1),
            exponent()
        ),
        RootStyle::Solidus => format!(
            "{}^{{1/{}}}",
            serializer.wrap_short(radicand, level + 1),
            exponent()
        ),
    }
}

pub(super) fn entries() -> Vec<Entry> {
    vec![
        Entry::infix("+", ADD)
            .named("Add")
            .parse_with(flatten("Add"))
            .serialize_with(add),
        Entry::infix("-", ADD).named("Subtract"),
        Entry::prefix("-", ADD).named("Negate").parse_with(negate),
        Entry::infix(r"\pm", ADD).named("PlusMinus"),
        Entry::infix("*", MULTIPLY).parse_with(flatten("Multiply")),
        Entry::infix(r"\cdot", MULTIPLY).parse_with(flatten("Multiply")),
        Entry::infix(r"\times", MULTIPLY)
            .named("Multiply")
            .parse_with(flatten("Multiply"))
            .serialize_with(multiply),
        Entry::infix("/", 600).parse_as("Divide"),
        Entry::infix(r"\div", 600).parse_as("Divide"),
        Entry::function(r"\frac")
            .named("Divide")
            .parse_with(frac)
            .serialize_with(divide),
        Entry::infix("^", POWER)
            .named("Power")
            .right()
            .parse_with(power)
            .serialize_with(power_latex),
        Entry::function(r"\sqrt")
            .named("Sqrt")
            .parse_with(sqrt)
            .serialize_with(|serializer, expr, level| {
                let [radicand] = operands::<1>(expr, "Sqrt")?;
                let style = (serializer.options().root_style)(expr, level);
                Ok(root_latex(serializer, radicand, None, level, style))
            }),
        Entry::new(Kind::Function)
            .named("Root")
            .serialize_with(|serializer, expr, level| {
                let [radicand, index] = operands::<2>(expr, "Root")?;
                let style = (serializer.options().root_style)(expr, level);
                Ok(root_latex(serializer, radicand, Some(index), level, style))
            }),
        Entry::postfix("!", 810).named("Factorial"),
    ]
}

pub(super) fn algebra_entries() -> Vec<Entry> {
    vec![
        Entry::infix(r"\to", 270).named("To"),
        Entry::infix(r"\mapsto", 270).named("MapsTo"),
    ]
}
