//! Elementary functions and constants
use super::Entry;

const FUNCTIONS: [(&str, &str); 20] = [
    (r"\sin", "Sin"),
    (r"\cos", "Cos"),
    (r"\tan", "Tan"),
    (r"\cot", "Cot"),
    (r"\sec", "Sec"),
    (r"\csc", "Csc"),
    (r"\arcsin", "Arcsin"),
    (r"\arccos", "Arccos"),
    (r"\arctan", "Arctan"),
    (r"\sinh", "Sinh"),
    (r"\cosh", "Cosh"),
    (r"\tanh", "Tanh"),
    (r"\ln", "Ln"),
    (r"\log", "Log"),
    (r"\lg", "Lg"),
    (r"\exp", "Exp"),
    (r"\max", "Max"),
    (r"\min", "Min"),
    (r"\gcd", "Gcd"),
    (r"\det", "Det"),
];

pub(super) fn entries() -> Vec<Entry> {
    let mut entries: Vec<_> = FUNCTIONS
        .into_iter()
        .map(|(trigger, name)| Entry::function(trigger).named(name))
        .collect();
    entries.extend([
        Entry::identifier(r"\pi").named("Pi"),
        Entry::identifier(r"\infty").named("PositiveInfinity"),
        Entry::identifier(r"\exponentialE").parse_as("ExponentialE"),
        Entry::identifier(r"\mathrm{e}").named("ExponentialE"),
        Entry::identifier(r"\imaginaryI").parse_as("ImaginaryUnit"),
        Entry::identifier(r"\mathrm{i}").named("ImaginaryUnit"),
    ]);
    entries
}
