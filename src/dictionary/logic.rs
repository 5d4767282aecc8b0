//! Boolean connectives and constants
use super::common::flatten;
use super::{Entry, Precedence};
use crate::options::LogicStyle;
use crate::serialize::Serializer;
use crate::tokenizer::join_latex;
use crate::tree::Expression;
use crate::warning::Warning;

/// Spellings of a connective for each logic style
struct Spellings {
    boolean: &'static str,
    word: &'static str,
    uppercase: &'static str,
    punctuation: &'static str,
}

impl Spellings {
    fn get(&self, style: LogicStyle) -> &'static str {
        match style {
            LogicStyle::Boolean => self.boolean,
            LogicStyle::Word => self.word,
            LogicStyle::UppercaseWord => self.uppercase,
            LogicStyle::Punctuation => self.punctuation,
        }
    }
}

const AND: Spellings = Spellings {
    boolean: r"\land",
    word: r"\;\operatorname{and}\;",
    uppercase: r"\;\operatorname{AND}\;",
    punctuation: ",",
};

const OR: Spellings = Spellings {
    boolean: r"\lor",
    word: r"\;\operatorname{or}\;",
    uppercase: r"\;\operatorname{OR}\;",
    punctuation: ";",
};

const NOT: Spellings = Spellings {
    boolean: r"\lnot",
    word: r"\operatorname{not}\;",
    uppercase: r"\operatorname{NOT}\;",
    punctuation: "!",
};

fn connective(
    spellings: &'static Spellings,
    precedence: Precedence,
) -> impl Fn(&Serializer<'_>, &Expression, usize) -> Result<String, Warning> + Send + Sync + 'static {
    move |serializer, expr, level| {
        let op = spellings.get((serializer.options().logic_style)(expr, level));
        let ops: Vec<_> = expr
            .ops()
            .iter()
            .enumerate()
            .map(|(idx, operand)| {
                let required = if idx == 0 { precedence } else { precedence + 1 };
                serializer.wrap(operand, Some(required), level + 1)
            })
            .collect();
        Ok(ops.iter().fold(String::new(), |acc, operand| {
            if acc.is_empty() {
                operand.clone()
            } else {
                join_latex([acc.as_str(), op, operand.as_str()])
            }
        }))
    }
}

fn not(serializer: &Serializer<'_>, expr: &Expression, level: usize) -> Result<String, Warning> {
    let op = NOT.get((serializer.options().logic_style)(expr, level));
    let operand = match expr.ops() {
        [operand] => serializer.wrap(operand, Some(881), level + 1),
        ops => {
            return Err(Warning::OperandCount {
                head: "Not".into(),
                expected: 1,
                actual: ops.len(),
            })
        }
    };
    Ok(join_latex([op, operand.as_str()]))
}

pub(super) fn entries() -> Vec<Entry> {
    vec![
        Entry::infix(r"\wedge", 235).parse_with(flatten("And")),
        Entry::infix(r"\land", 235)
            .named("And")
            .parse_with(flatten("And"))
            .serialize_with(connective(&AND, 235)),
        Entry::infix(r"\vee", 230).parse_with(flatten("Or")),
        Entry::infix(r"\lor", 230)
            .named("Or")
            .parse_with(flatten("Or"))
            .serialize_with(connective(&OR, 230)),
        Entry::prefix(r"\neg", 880).parse_as("Not"),
        Entry::prefix(r"\lnot", 880).named("Not").serialize_with(not),
        Entry::infix(r"\Rightarrow", 220).parse_as("Implies").right(),
        Entry::infix(r"\implies", 220).named("Implies").right(),
        Entry::infix(r"\Leftrightarrow", 219).parse_as("Equivalent").right(),
        Entry::infix(r"\iff", 219).named("Equivalent").right(),
        Entry::identifier(r"\top").parse_as("True"),
        Entry::identifier(r"\mathrm{True}").named("True"),
        Entry::identifier(r"\bot").parse_as("False"),
        Entry::identifier(r"\mathrm{False}").named("False"),
    ]
}

#[cfg(test)]
mod tests {
    use crate::options::{constant, LogicStyle, Options};
    use crate::{parse, LatexSyntax};
    use serde_json::json;

    #[test]
    fn connectives() {
        assert_eq!(
            parse(r"a\land b\wedge c\lor\lnot d").to_json(),
            json!(["Or", ["And", "a", "b", "c"], ["Not", "d"]])
        );
        assert_eq!(
            parse(r"p\implies q\iff r").to_json(),
            json!(["Equivalent", ["Implies", "p", "q"], "r"])
        );
        assert_eq!(parse(r"\top").to_json(), json!("True"));
        assert_eq!(parse(r"\mathrm{False}").to_json(), json!("False"));
    }

    #[test]
    fn styles() {
        let expr = parse(r"(a\lor b)\land\lnot c");
        assert_eq!(LatexSyntax::new().serialize(&expr), r"(a\lor b)\land\lnot c");
        let options = Options {
            logic_style: constant(LogicStyle::Word),
            ..Options::default()
        };
        assert_eq!(
            LatexSyntax::new().with_options(options).serialize(&expr),
            r"(a\;\operatorname{or}\;b)\;\operatorname{and}\;\operatorname{not}\;c"
        );
    }
}
