//! Static tables of the names the identifier codec knows
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Named letters and symbols with their command and code point
pub(crate) const SYMBOLS: &[(&str, &str, char)] = &[
    ("alpha", r"\alpha", '\u{03b1}'),
    ("beta", r"\beta", '\u{03b2}'),
    ("gamma", r"\gamma", '\u{03b3}'),
    ("delta", r"\delta", '\u{03b4}'),
    ("epsilon", r"\epsilon", '\u{03f5}'),
    ("varepsilon", r"\varepsilon", '\u{03b5}'),
    ("zeta", r"\zeta", '\u{03b6}'),
    ("eta", r"\eta", '\u{03b7}'),
    ("theta", r"\theta", '\u{03b8}'),
    ("vartheta", r"\vartheta", '\u{03d1}'),
    ("iota", r"\iota", '\u{03b9}'),
    ("kappa", r"\kappa", '\u{03ba}'),
    ("varkappa", r"\varkappa", '\u{03f0}'),
    ("lambda", r"\lambda", '\u{03bb}'),
    ("mu", r"\mu", '\u{03bc}'),
    ("nu", r"\nu", '\u{03bd}'),
    ("xi", r"\xi", '\u{03be}'),
    ("omicron", r"\omicron", '\u{03bf}'),
    ("pi", r"\pi", '\u{03c0}'),
    ("varpi", r"\varpi", '\u{03d6}'),
    ("rho", r"\rho", '\u{03c1}'),
    ("varrho", r"\varrho", '\u{03f1}'),
    ("sigma", r"\sigma", '\u{03c3}'),
    ("varsigma", r"\varsigma", '\u{03c2}'),
    ("tau", r"\tau", '\u{03c4}'),
    ("upsilon", r"\upsilon", '\u{03c5}'),
    ("phi", r"\phi", '\u{03d5}'),
    ("varphi", r"\varphi", '\u{03c6}'),
    ("chi", r"\chi", '\u{03c7}'),
    ("psi", r"\psi", '\u{03c8}'),
    ("omega", r"\omega", '\u{03c9}'),
    ("digamma", r"\digamma", '\u{03dd}'),
    ("Gamma", r"\Gamma", '\u{0393}'),
    ("Delta", r"\Delta", '\u{0394}'),
    ("Theta", r"\Theta", '\u{0398}'),
    ("Lambda", r"\Lambda", '\u{039b}'),
    ("Xi", r"\Xi", '\u{039e}'),
    ("Pi", r"\Pi", '\u{03a0}'),
    ("Sigma", r"\Sigma", '\u{03a3}'),
    ("Upsilon", r"\Upsilon", '\u{03a5}'),
    ("Phi", r"\Phi", '\u{03a6}'),
    ("Psi", r"\Psi", '\u{03a8}'),
    ("Omega", r"\Omega", '\u{03a9}'),
    ("Digamma", r"\Digamma", '\u{03dc}'),
    ("aleph", r"\aleph", '\u{2135}'),
    ("beth", r"\beth", '\u{2136}'),
    ("gimel", r"\gimel", '\u{2137}'),
    ("daleth", r"\daleth", '\u{2138}'),
    ("hbar", r"\hbar", '\u{210f}'),
    ("ell", r"\ell", '\u{2113}'),
    ("wp", r"\wp", '\u{2118}'),
    ("nabla", r"\nabla", '\u{2207}'),
    ("partial", r"\partial", '\u{2202}'),
    ("emptyset", r"\emptyset", '\u{2205}'),
];

/// Spelled out digits, for names like `one_doublestruck`
pub(crate) const DIGITS: &[(&str, &str)] = &[
    ("zero", "0"),
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
    ("seven", "7"),
    ("eight", "8"),
    ("nine", "9"),
    ("ten", "10"),
];

/// Spelled out operator-like symbols
pub(crate) const EXTRA_SYMBOLS: &[(&str, &str)] = &[
    ("plus", "+"),
    ("minus", "-"),
    ("pm", r"\pm"),
    ("ast", r"\ast"),
    ("dag", r"\dag"),
    ("ddag", r"\ddag"),
    ("hash", r"\#"),
    ("bottom", r"\bot"),
    ("top", r"\top"),
    ("bullet", r"\bullet"),
    ("circle", r"\circ"),
    ("diamond", r"\diamond"),
    ("times", r"\times"),
    ("square", r"\square"),
    ("star", r"\star"),
];

/// Where an accent goes relative to its base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// `\hat{x}`
    Wrap,
    /// `x\degree`
    After,
}

/// Accent modifiers, in the order they're applied
pub(crate) const ACCENTS: &[(&str, &str, Placement)] = &[
    ("deg", r"\degree", Placement::After),
    ("prime", r"^{\prime}", Placement::After),
    ("dprime", r"^{\doubleprime}", Placement::After),
    ("ring", r"\mathring", Placement::Wrap),
    ("hat", r"\hat", Placement::Wrap),
    ("tilde", r"\tilde", Placement::Wrap),
    ("vec", r"\vec", Placement::Wrap),
    ("bar", r"\overline", Placement::Wrap),
    ("underbar", r"\underline", Placement::Wrap),
    ("dot", r"\dot", Placement::Wrap),
    ("ddot", r"\ddot", Placement::Wrap),
    ("tdot", r"\dddot", Placement::Wrap),
    ("qdot", r"\ddddot", Placement::Wrap),
    ("acute", r"\acute", Placement::Wrap),
    ("grave", r"\grave", Placement::Wrap),
    ("breve", r"\breve", Placement::Wrap),
    ("check", r"\check", Placement::Wrap),
];

/// Style modifiers; the first spelling of a command is the one decoding produces
pub(crate) const STYLES: &[(&str, &str)] = &[
    ("upright", r"\mathrm"),
    ("italic", r"\mathit"),
    ("bold", r"\mathbf"),
    ("script", r"\mathscr"),
    ("fraktur", r"\mathfrak"),
    ("doublestruck", r"\mathbb"),
    ("blackboard", r"\mathbb"),
    ("calligraphic", r"\mathcal"),
    ("gothic", r"\mathfrak"),
    ("sansSerif", r"\mathsf"),
    ("monospace", r"\mathtt"),
];

/// Characters escaped with a backslash inside upright names
pub(crate) const ESCAPED: &[char] = &['_', '{', '}', '#', '&', '%', '$', ' '];

lazy_static! {
    pub(crate) static ref SYMBOL_BY_NAME: HashMap<&'static str, &'static str> =
        SYMBOLS.iter().map(|&(name, latex, _)| (name, latex)).collect();
    pub(crate) static ref SYMBOL_BY_LATEX: HashMap<&'static str, &'static str> =
        SYMBOLS.iter().map(|&(name, latex, _)| (latex, name)).collect();
    pub(crate) static ref SYMBOL_BY_CHAR: HashMap<char, (&'static str, &'static str)> =
        SYMBOLS.iter().map(|&(name, latex, chr)| (chr, (name, latex))).collect();
    pub(crate) static ref ACCENT_BY_NAME: HashMap<&'static str, (&'static str, Placement)> =
        ACCENTS
            .iter()
            .map(|&(name, latex, placement)| (name, (latex, placement)))
            .collect();
    pub(crate) static ref ACCENT_BY_COMMAND: HashMap<&'static str, &'static str> = ACCENTS
        .iter()
        .filter(|(_, _, placement)| *placement == Placement::Wrap)
        .map(|&(name, latex, _)| (latex, name))
        .collect();
    pub(crate) static ref STYLE_BY_NAME: HashMap<&'static str, &'static str> =
        STYLES.iter().copied().collect();
    pub(crate) static ref STYLE_BY_COMMAND: HashMap<&'static str, &'static str> = {
        let mut styles = HashMap::new();
        for &(name, latex) in STYLES {
            styles.entry(latex).or_insert(name);
        }
        styles
    };
}

#[cfg(test)]
mod tests {
    use super::{ACCENT_BY_COMMAND, STYLE_BY_COMMAND, SYMBOLS, SYMBOL_BY_CHAR, SYMBOL_BY_LATEX};

    #[test]
    fn tables_are_invertible() {
        assert_eq!(SYMBOL_BY_LATEX.len(), SYMBOLS.len());
        assert_eq!(SYMBOL_BY_CHAR.len(), SYMBOLS.len());
        assert_eq!(STYLE_BY_COMMAND.get(r"\mathbb"), Some(&"doublestruck"));
        assert_eq!(STYLE_BY_COMMAND.get(r"\mathfrak"), Some(&"fraktur"));
        assert_eq!(ACCENT_BY_COMMAND.get(r"\overline"), Some(&"bar"));
        assert_eq!(ACCENT_BY_COMMAND.get(r"\degree"), None);
    }
}
