//! Conversion between symbol names and decorated markup
//!
//! A symbol name is a base followed by `_`-separated modifiers: accents like `hat` or `vec`,
//! then styles like `bold` or `doublestruck`, then superscripts introduced by `__` and
//! subscripts introduced by `_`. Bases can be spelled out Greek letters and other named symbols.
//!
//! ```
//! use mathjson_notation::{decode, encode, IdentifierStyle};
//!
//! assert_eq!(encode("alpha_hat", IdentifierStyle::Auto), r"\hat{\alpha}");
//! assert_eq!(encode("x_bold__2", IdentifierStyle::Auto), r"\mathbf{x^{2}}");
//! assert_eq!(encode("speed", IdentifierStyle::Auto), r"\mathrm{speed}");
//! assert_eq!(decode(r"\mathbb{R}").as_deref(), Some("R_doublestruck"));
//! ```
use crate::symbols::{
    Placement, ACCENT_BY_COMMAND, ACCENT_BY_NAME, DIGITS, ESCAPED, EXTRA_SYMBOLS,
    STYLE_BY_COMMAND, STYLE_BY_NAME, SYMBOL_BY_CHAR, SYMBOL_BY_LATEX, SYMBOL_BY_NAME,
};
use crate::tokenizer::{count_tokens, count_units, Token, Tokenizer};

/// The wrapping applied to a multi-character name without an explicit style
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierStyle {
    /// `\mathrm` if the rendering has more than one lexical unit
    #[default]
    Auto,
    /// Always `\mathrm`
    Upright,
    /// Always `\mathit`
    Italic,
    /// Always `\operatorname`
    Operator,
    /// Never wrapped
    None,
}

fn is_verbatim(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_ascii() && !c.is_alphanumeric() && !SYMBOL_BY_CHAR.contains_key(&c))
}

fn escape(name: &str) -> String {
    let mut res = String::with_capacity(name.len());
    for chr in name.chars() {
        if ESCAPED.contains(&chr) {
            res.push('\\');
        }
        res.push(chr);
    }
    res
}

/// The rendering of a named symbol, and whether it's a spelled out digit
fn special_name(segment: &str) -> Option<(String, bool)> {
    if let Some(latex) = SYMBOL_BY_NAME.get(segment) {
        return Some((latex.to_string(), false));
    }
    if let Some((_, digit)) = DIGITS.iter().find(|(word, _)| *word == segment) {
        return Some((digit.to_string(), true));
    }
    let mut chars = segment.chars();
    if let (Some(chr), None) = (chars.next(), chars.next()) {
        if let Some((_, latex)) = SYMBOL_BY_CHAR.get(&chr) {
            return Some((latex.to_string(), false));
        }
    }
    EXTRA_SYMBOLS
        .iter()
        .find(|(word, _)| *word == segment)
        .map(|(_, latex)| (latex.to_string(), false))
}

fn split_digits(segment: &str) -> (&str, &str) {
    let start = segment.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if start == 0 {
        (segment, "")
    } else {
        segment.split_at(start)
    }
}

fn modifier(rest: &str) -> Option<(&str, &str)> {
    let after = rest.strip_prefix('_')?;
    let len = after
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(after.len());
    (len > 0).then(|| after.split_at(len))
}

fn encode_body(name: &str, top: bool, style: IdentifierStyle) -> Option<(String, &str)> {
    let (segment, mut rest) = name.split_at(name.find('_').unwrap_or(name.len()));
    let (letters, digits) = if top {
        split_digits(segment)
    } else {
        (segment, "")
    };

    let mut accents = Vec::new();
    while let Some((word, after)) = modifier(rest) {
        match ACCENT_BY_NAME.get(word) {
            Some(&accent) => {
                accents.push(accent);
                rest = after;
            }
            None => break,
        }
    }
    let mut styles = Vec::new();
    while let Some((word, after)) = modifier(rest) {
        match STYLE_BY_NAME.get(word) {
            Some(&command) => {
                styles.push(command);
                rest = after;
            }
            None => break,
        }
    }

    let mut body = match special_name(letters) {
        Some((latex, false)) => latex,
        Some((latex, true)) if !styles.is_empty() => latex,
        _ if letters.chars().all(char::is_alphanumeric) => letters.to_owned(),
        _ => return None,
    };
    for (latex, placement) in accents {
        body = match placement {
            Placement::Wrap => format!("{latex}{{{body}}}"),
            Placement::After => format!("{body}{latex}"),
        };
    }

    if top {
        let mut sups = Vec::new();
        let mut subs = Vec::new();
        if !digits.is_empty() {
            subs.push(digits.to_owned());
        }
        loop {
            if let Some(after) = rest.strip_prefix("__") {
                let (sup, remaining) = encode_body(after, false, IdentifierStyle::None)?;
                sups.push(sup);
                rest = remaining;
            } else if let Some(after) = rest.strip_prefix('_') {
                let (sub, remaining) = encode_body(after, false, IdentifierStyle::None)?;
                subs.push(sub);
                rest = remaining;
            } else {
                break;
            }
        }
        if !sups.is_empty() {
            body = format!("{body}^{{{}}}", sups.join(","));
        }
        if !subs.is_empty() {
            body = format!("{body}_{{{}}}", subs.join(","));
        }
    }

    for command in &styles {
        body = format!("{command}{{{body}}}");
    }
    if styles.is_empty() {
        body = match style {
            IdentifierStyle::Auto if count_tokens(&body) > 1 => format!(r"\mathrm{{{body}}}"),
            IdentifierStyle::Auto | IdentifierStyle::None => body,
            IdentifierStyle::Upright => format!(r"\mathrm{{{body}}}"),
            IdentifierStyle::Italic => format!(r"\mathit{{{body}}}"),
            IdentifierStyle::Operator => format!(r"\operatorname{{{body}}}"),
        };
    }
    Some((body, rest))
}

/// Render a symbol name as markup
///
/// Names that can't be decomposed into a base and modifiers are rendered upright verbatim, with
/// characters special to the markup escaped, so every name has a rendering that decodes back to
/// it.
pub fn encode(name: &str, style: IdentifierStyle) -> String {
    if is_verbatim(name) {
        return name.to_owned();
    }
    let tail = name.trim_start_matches('_');
    let wildcards = name.len() - tail.len();
    if wildcards > 0 {
        return match encode_body(tail, true, IdentifierStyle::None) {
            Some((body, "")) => format!(r"\mathrm{{{}{body}}}", r"\_".repeat(wildcards)),
            _ => format!(r"\mathrm{{{}}}", escape(name)),
        };
    }
    match encode_body(name, true, style) {
        Some((body, "")) => body,
        _ => format!(r"\mathrm{{{}}}", escape(name)),
    }
}

type Tokens<'t> = [(&'t str, Token)];

#[derive(Debug, Default)]
struct Parts {
    base: String,
    accents: Vec<&'static str>,
    styles: Vec<&'static str>,
    sups: Vec<String>,
    subs: Vec<String>,
}

impl Parts {
    fn is_plain(&self) -> bool {
        self.accents.is_empty() && self.styles.is_empty() && self.sups.is_empty() && self.subs.is_empty()
    }

    fn push_base(&mut self, text: &str) -> Option<()> {
        self.is_plain().then(|| self.base.push_str(text))
    }

    fn merge(&mut self, other: Parts) -> Option<()> {
        if self.base.is_empty() && self.is_plain() {
            *self = other;
            Some(())
        } else if other.is_plain() {
            self.push_base(&other.base)
        } else {
            None
        }
    }

    fn name(self) -> String {
        let mut name = self.base;
        for modifier in self.accents.into_iter().chain(self.styles) {
            name.push('_');
            name.push_str(modifier);
        }
        for sup in self.sups {
            name.push_str("__");
            name.push_str(&sup);
        }
        for sub in self.subs {
            name.push('_');
            name.push_str(&sub);
        }
        name
    }
}

fn unescape(command: &str) -> Option<char> {
    let mut chars = command.strip_prefix('\\')?.chars();
    match (chars.next(), chars.next()) {
        (Some(chr), None) if ESCAPED.contains(&chr) => Some(chr),
        _ => None,
    }
}

/// The contents of a braced group starting at `pos` and the position after it
fn group<'a, 't>(tokens: &'a Tokens<'t>, pos: usize) -> Option<(&'a Tokens<'t>, usize)> {
    if tokens.get(pos)?.1 != Token::OpenGroup {
        return None;
    }
    let mut depth = 0usize;
    for (idx, &(_, token)) in tokens.iter().enumerate().skip(pos) {
        match token {
            Token::OpenGroup => depth += 1,
            Token::CloseGroup if depth == 1 => return Some((&tokens[pos + 1..idx], idx + 1)),
            Token::CloseGroup => depth -= 1,
            _ => {}
        }
    }
    None
}

/// A braced group or a single token
fn argument<'a, 't>(tokens: &'a Tokens<'t>, pos: usize) -> Option<(&'a Tokens<'t>, usize)> {
    match tokens.get(pos)?.1 {
        Token::OpenGroup => group(tokens, pos),
        Token::CloseGroup => None,
        _ => Some((&tokens[pos..pos + 1], pos + 1)),
    }
}

fn split_commas<'a, 't>(tokens: &'a Tokens<'t>) -> Vec<&'a Tokens<'t>> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, &(raw, token)) in tokens.iter().enumerate() {
        match token {
            Token::OpenGroup => depth += 1,
            Token::CloseGroup => depth = depth.saturating_sub(1),
            Token::Char if depth == 0 && raw == "," => {
                pieces.push(&tokens[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    pieces.push(&tokens[start..]);
    pieces
}

fn scripts(tokens: &Tokens<'_>) -> Option<Vec<String>> {
    split_commas(tokens)
        .into_iter()
        .map(|piece| body(piece).map(Parts::name))
        .collect()
}

fn body(tokens: &Tokens<'_>) -> Option<Parts> {
    let mut parts = Parts::default();
    let mut pos = 0;
    while let Some(&(raw, token)) = tokens.get(pos) {
        match token {
            Token::Char if raw == "_" => {
                let (inner, next) = argument(tokens, pos + 1)?;
                parts.subs.extend(scripts(inner)?);
                pos = next;
            }
            Token::Char if raw == "^" => {
                let (inner, next) = argument(tokens, pos + 1)?;
                match inner {
                    [(r"\prime", _)] => parts.accents.push("prime"),
                    [(r"\doubleprime", _)] => parts.accents.push("dprime"),
                    _ => parts.sups.extend(scripts(inner)?),
                }
                pos = next;
            }
            Token::Command if raw == r"\degree" => {
                parts.accents.push("deg");
                pos += 1;
            }
            Token::Command => {
                if let Some(&accent) = ACCENT_BY_COMMAND.get(raw) {
                    let (inner, next) = argument(tokens, pos + 1)?;
                    let mut accented = body(inner)?;
                    accented.accents.push(accent);
                    parts.merge(accented)?;
                    pos = next;
                } else if raw == r"\operatorname" || STYLE_BY_COMMAND.contains_key(raw) {
                    let (inner, next) = group(tokens, pos + 1)?;
                    parts.merge(styled(raw, inner)?)?;
                    pos = next;
                } else if let Some(name) = SYMBOL_BY_LATEX.get(raw) {
                    parts.push_base(name)?;
                    pos += 1;
                } else {
                    let chr = unescape(raw)?;
                    parts.push_base(chr.encode_utf8(&mut [0; 4]))?;
                    pos += 1;
                }
            }
            Token::OpenGroup => {
                let (inner, next) = group(tokens, pos)?;
                parts.merge(body(inner)?)?;
                pos = next;
            }
            Token::CloseGroup => return None,
            _ => {
                parts.push_base(raw)?;
                pos += 1;
            }
        }
    }
    Some(parts)
}

fn verbatim(tokens: &Tokens<'_>) -> Option<Parts> {
    let mut base = String::new();
    for &(raw, token) in tokens {
        match token {
            Token::Command => base.push(unescape(raw)?),
            _ => base.push_str(raw),
        }
    }
    Some(Parts {
        base,
        ..Parts::default()
    })
}

fn styled(command: &str, inner: &Tokens<'_>) -> Option<Parts> {
    let upright = command == r"\mathrm" || command == r"\operatorname";
    let mut parts = match body(inner) {
        Some(parts) => parts,
        None if upright => verbatim(inner)?,
        None => return None,
    };
    let style = match STYLE_BY_COMMAND.get(command) {
        Some(&"upright") if count_units(inner) > 1 || parts.base.starts_with('_') => return Some(parts),
        Some(&style) => style,
        None => return Some(parts),
    };
    if parts.is_plain() {
        if let Some((word, _)) = DIGITS.iter().find(|(_, digit)| *digit == parts.base) {
            parts.base = word.to_string();
        }
    }
    parts.styles.push(style);
    Some(parts)
}

/// Read a symbol name from the start of some tokens
///
/// This accepts a single letter, a named symbol like `\alpha`, or an accent or style command
/// with its argument, and returns the name along with how many tokens it spans. Plain letters
/// aren't joined, so `ab` is read as `a`.
pub fn parse_identifier(tokens: &[(&str, Token)]) -> Option<(String, usize)> {
    let &(raw, token) = tokens.first()?;
    match token {
        Token::Char => {
            let chr = raw.chars().next()?;
            if chr.is_ascii_alphabetic() {
                Some((raw.to_owned(), 1))
            } else if !chr.is_ascii() && (chr.is_alphabetic() || is_verbatim(raw)) {
                let name = SYMBOL_BY_CHAR.get(&chr).map_or(raw, |&(name, _)| name);
                Some((name.to_owned(), 1))
            } else {
                None
            }
        }
        Token::Command => {
            if let Some(name) = SYMBOL_BY_LATEX.get(raw) {
                Some((name.to_string(), 1))
            } else if let Some(&accent) = ACCENT_BY_COMMAND.get(raw) {
                let (inner, next) = argument(tokens, 1)?;
                let mut parts = body(inner)?;
                parts.accents.push(accent);
                Some((parts.name(), next))
            } else if raw == r"\operatorname" || STYLE_BY_COMMAND.contains_key(raw) {
                let (inner, next) = group(tokens, 1)?;
                Some((styled(raw, inner)?.name(), next))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Read a symbol name from markup, the inverse of [`encode`]
pub fn decode(latex: &str) -> Option<String> {
    let tokens: Vec<_> = Tokenizer::new(latex).collect();
    match parse_identifier(&tokens) {
        Some((name, len)) if len == tokens.len() => Some(name),
        _ => body(&tokens).map(Parts::name).filter(|name| !name.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, parse_identifier, IdentifierStyle};
    use crate::tokenizer::Tokenizer;

    fn auto(name: &str) -> String {
        encode(name, IdentifierStyle::Auto)
    }

    #[test]
    fn encodes_names() {
        assert_eq!(auto("x"), "x");
        assert_eq!(auto("alpha"), r"\alpha");
        assert_eq!(auto("speed"), r"\mathrm{speed}");
        assert_eq!(auto("x_hat_dot"), r"\dot{\hat{x}}");
        assert_eq!(auto("x_prime"), r"\mathrm{x^{\prime}}");
        assert_eq!(auto("R_doublestruck"), r"\mathbb{R}");
        assert_eq!(auto("one_doublestruck"), r"\mathbb{1}");
        assert_eq!(auto("one"), r"\mathrm{one}");
        assert_eq!(auto("x0"), r"\mathrm{x_{0}}");
        assert_eq!(auto("alpha0"), r"\mathrm{\alpha_{0}}");
        assert_eq!(auto("x_a_b"), r"\mathrm{x_{a,b}}");
        assert_eq!(auto("x__2"), r"\mathrm{x^{2}}");
        assert_eq!(auto("α"), r"\alpha");
        assert_eq!(auto("plus_bold"), r"\mathbf{+}");
    }

    #[test]
    fn encodes_with_style() {
        assert_eq!(encode("f", IdentifierStyle::Upright), r"\mathrm{f}");
        assert_eq!(encode("f", IdentifierStyle::Operator), r"\operatorname{f}");
        assert_eq!(encode("fx", IdentifierStyle::Italic), r"\mathit{fx}");
        assert_eq!(encode("fx", IdentifierStyle::None), "fx");
        assert_eq!(encode("x_bold", IdentifierStyle::Upright), r"\mathbf{x}");
    }

    #[test]
    fn falls_back_to_upright() {
        assert_eq!(auto("_"), r"\mathrm{\_}");
        assert_eq!(auto("_a"), r"\mathrm{\_a}");
        assert_eq!(auto("a-b"), r"\mathrm{a-b}");
        assert_eq!(auto("x_hat2"), r"\mathrm{x\_hat2}");
        assert_eq!(auto("💖"), "💖");
    }

    #[test]
    fn decodes_markup() {
        assert_eq!(decode(r"\hat{\alpha}").as_deref(), Some("alpha_hat"));
        assert_eq!(decode(r"\mathrm{x}").as_deref(), Some("x_upright"));
        assert_eq!(decode(r"\mathrm{speed}").as_deref(), Some("speed"));
        assert_eq!(decode(r"\mathfrak{g}").as_deref(), Some("g_fraktur"));
        assert_eq!(decode(r"\mathbb{1}").as_deref(), Some("one_doublestruck"));
        assert_eq!(decode(r"\mathrm{x^{\prime}}").as_deref(), Some("x_prime"));
        assert_eq!(decode(r"x\degree").as_deref(), Some("x_deg"));
        assert_eq!(decode(r"\mathrm{x_{a,b}}").as_deref(), Some("x_a_b"));
        assert_eq!(decode(r"\mathrm{\_a}").as_deref(), Some("_a"));
        assert_eq!(decode(r"\mathrm{a-b}").as_deref(), Some("a-b"));
        assert_eq!(decode(r"\hat{x}y"), None);
    }

    #[test]
    fn decodes_what_it_encodes() {
        for name in [
            "alpha_hat",
            "x_vec_bold",
            "speed",
            "speed_max",
            "x_upright",
            "Omega_tilde_calligraphic",
            "x_bar",
            "x__alpha_beta",
            "two_doublestruck",
            "_",
            "__x",
            "a-b",
            "x_hat2",
            "theta_ddot",
        ] {
            assert_eq!(decode(&auto(name)).as_deref(), Some(name), "{name}");
        }
    }

    #[test]
    fn reads_single_identifiers() {
        let tokens: Vec<_> = Tokenizer::new(r"ab").collect();
        assert_eq!(parse_identifier(&tokens), Some(("a".to_owned(), 1)));
        let tokens: Vec<_> = Tokenizer::new(r"\mathbf{v}+1").collect();
        assert_eq!(parse_identifier(&tokens), Some(("v_bold".to_owned(), 4)));
        let tokens: Vec<_> = Tokenizer::new(r"\vec x").collect();
        assert_eq!(parse_identifier(&tokens), Some(("x_vec".to_owned(), 2)));
        for markup in [r"\foo", "+", "2", r"\\", "&", "{x}"] {
            let tokens: Vec<_> = Tokenizer::new(markup).collect();
            assert_eq!(parse_identifier(&tokens), None, "{markup}");
        }
    }
}
