//! Numeric sets and set operators
use super::Entry;
use crate::options::NumericSetStyle;

/// Name, compact spelling and regular spelling of the numeric sets
const NUMERIC_SETS: [(&str, &str, &str); 5] = [
    ("NonNegativeIntegers", r"\mathbb{N}", r"\N"),
    ("Integers", r"\mathbb{Z}", r"\Z"),
    ("RationalNumbers", r"\mathbb{Q}", r"\Q"),
    ("RealNumbers", r"\mathbb{R}", r"\R"),
    ("ComplexNumbers", r"\mathbb{C}", r"\C"),
];

fn numeric_set(name: &'static str, compact: &'static str, regular: &'static str) -> [Entry; 2] {
    [
        Entry::identifier(regular).parse_as(name),
        Entry::identifier(compact)
            .named(name)
            .serialize_with(move |serializer, expr, level| {
                Ok(match (serializer.options().numeric_set_style)(expr, level) {
                    NumericSetStyle::Compact => compact.to_owned(),
                    NumericSetStyle::Regular => regular.to_owned(),
                    NumericSetStyle::Interval if name == "RealNumbers" => {
                        r"\lbrack-\infty, \infty\rbrack".to_owned()
                    }
                    NumericSetStyle::Interval => compact.to_owned(),
                    NumericSetStyle::SetBuilder => format!(r"\lbrace x\in{compact}\rbrace"),
                })
            }),
    ]
}

pub(super) fn entries() -> Vec<Entry> {
    let mut entries: Vec<_> = NUMERIC_SETS
        .into_iter()
        .flat_map(|(name, compact, regular)| numeric_set(name, compact, regular))
        .collect();
    entries.extend([
        Entry::identifier(r"\varnothing").parse_as("EmptySet"),
        Entry::identifier(r"\emptyset").named("EmptySet"),
        Entry::infix(r"\in", 240).named("Element"),
        Entry::infix(r"\notin", 240).named("NotElement"),
        Entry::infix(r"\subset", 240).named("Subset"),
        Entry::infix(r"\subseteq", 240).named("SubsetEqual"),
        Entry::infix(r"\supset", 240).named("Superset"),
        Entry::infix(r"\supseteq", 240).named("SupersetEqual"),
        Entry::infix(r"\cup", 350).named("Union"),
        Entry::infix(r"\cap", 350).named("Intersection"),
        Entry::infix(r"\setminus", 650).named("SetMinus"),
    ]);
    entries
}
