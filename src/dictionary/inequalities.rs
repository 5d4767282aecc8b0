//! Relational operators
//!
//! Every relation groups to the right, so `a<b<c` parses as `a<(b<c)`.
use super::Entry;

fn relation(trigger: &str, precedence: u16, name: &str) -> Entry {
    Entry::infix(trigger, precedence).named(name).right()
}

fn alias(trigger: &str, precedence: u16, name: &str) -> Entry {
    Entry::infix(trigger, precedence).parse_as(name).right()
}

pub(super) fn entries() -> Vec<Entry> {
    vec![
        relation("=", 260, "Equal"),
        alias(r"\eq", 260, "Equal"),
        alias("!=", 260, "NotEqual"),
        alias(r"\neq", 260, "NotEqual"),
        relation(r"\ne", 260, "NotEqual"),
        alias(r"\coloneq", 260, "Assign"),
        relation(":=", 260, "Assign"),
        alias(r"\lt", 245, "Less"),
        relation("<", 245, "Less"),
        alias("<=", 241, "LessEqual"),
        alias(r"\leq", 241, "LessEqual"),
        alias(r"\leqq", 241, "LessEqual"),
        relation(r"\le", 241, "LessEqual"),
        alias(r"\gt", 245, "Greater"),
        relation(">", 245, "Greater"),
        alias(">=", 242, "GreaterEqual"),
        alias(r"\geq", 242, "GreaterEqual"),
        alias(r"\geqq", 242, "GreaterEqual"),
        relation(r"\ge", 242, "GreaterEqual"),
        relation(r"\nless", 246, "NotLess"),
        relation(r"\ngtr", 246, "NotGreater"),
        relation(r"\ll", 246, "MuchLess"),
        relation(r"\gg", 246, "MuchGreater"),
        alias(r"\thickapprox", 247, "Approx"),
        relation(r"\approx", 247, "Approx"),
        relation(r"\approxeq", 247, "ApproxEqual"),
        relation(r"\sim", 247, "Similar"),
        relation(r"\cong", 247, "Congruent"),
        relation(r"\propto", 247, "Proportional"),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{parse, LatexSyntax};
    use serde_json::json;

    #[test]
    fn alias_groups() {
        for latex in ["a<=b", r"a\le b", r"a\leq b", r"a\leqq b"] {
            assert_eq!(parse(latex).to_json(), json!(["LessEqual", "a", "b"]), "{latex}");
        }
        for latex in ["a!=b", r"a\ne b", r"a\neq b"] {
            assert_eq!(parse(latex).to_json(), json!(["NotEqual", "a", "b"]), "{latex}");
        }
        assert_eq!(parse("x:=1").to_json(), json!(["Assign", "x", 1]));
        assert_eq!(parse(r"a\approx b").to_json(), json!(["Approx", "a", "b"]));
    }

    #[test]
    fn relations_group_right() {
        assert_eq!(
            parse("a<b<c").to_json(),
            json!(["Less", "a", ["Less", "b", "c"]])
        );
        assert_eq!(
            parse("a+1=b").to_json(),
            json!(["Equal", ["Add", "a", 1], "b"])
        );
        let syntax = LatexSyntax::new();
        assert_eq!(syntax.serialize(&parse("a<b<c")), "a<b<c");
        assert_eq!(syntax.serialize(&parse("(a<b)<c")), "(a<b)<c");
        assert_eq!(syntax.serialize(&parse("a>=b")), r"a\ge b");
    }
}
