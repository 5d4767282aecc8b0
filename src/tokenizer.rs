use std::iter::FusedIterator;

/// A lexical token label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// A control word like `\alpha` or a control symbol like `\{`
    Command,
    /// A run of digits with at most one decimal point
    Number,
    /// Verbatim text from the argument of a text mode command, whitespace included
    Text,
    /// An opening brace `{`
    OpenGroup,
    /// A closing brace `}`
    CloseGroup,
    /// Any other single character
    Char,
}

/// Commands whose braced argument is tokenized as verbatim text
pub const TEXT_COMMANDS: [&str; 3] = ["\\text", "\\textrm", "\\mbox"];

fn strip_number(inp: &str) -> Option<(&str, &str)> {
    let mut seen_decimal = false;
    let len = inp
        .char_indices()
        .find(|(_, c)| match c {
            '.' if !seen_decimal => {
                seen_decimal = true;
                false
            }
            '0'..='9' => false,
            _ => true,
        })
        .map(|(i, _)| i)
        .unwrap_or(inp.len());
    // a lone or trailing decimal point is punctuation, not part of the number
    let len = if seen_decimal && inp[..len].ends_with('.') {
        len - 1
    } else {
        len
    };
    if len > 0 && inp[..len].bytes().any(|b| b.is_ascii_digit()) {
        Some((&inp[..len], &inp[len..]))
    } else {
        None
    }
}

fn strip_command(inp: &str) -> Option<(&str, &str)> {
    let rest = inp.strip_prefix('\\')?;
    let word = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let len = if word > 0 {
        word
    } else {
        // control symbol, or a trailing backslash
        rest.chars().next().map(char::len_utf8).unwrap_or(0)
    };
    Some(inp.split_at(len + 1))
}

/// Length of a verbatim run that ends before the brace closing the current group
fn text_run_len(inp: &str) -> usize {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in inp.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' if depth == 0 => return i,
            '}' => depth -= 1,
            _ => {}
        }
    }
    inp.len()
}

fn skip_ignored(mut inp: &str) -> &str {
    loop {
        inp = inp.trim_start();
        match inp.strip_prefix('%') {
            Some(comment) => inp = comment.find('\n').map_or("", |end| &comment[end..]),
            None => return inp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Math,
    TextArgument,
    Text,
}

/// A tokenizer for LaTeX math mode markup
///
/// Whitespace and comments are dropped, except inside the argument of a text mode command where
/// the whole argument is produced as a single [`Text`][Token::Text] token. Characters that have
/// no special meaning become individual [`Char`][Token::Char] tokens, so tokenizing never fails.
///
/// # Example
/// ```
/// use mathjson_notation::{Tokenizer, Token};
/// let res: Vec<_> = Tokenizer::new(r"\alpha<=2").collect();
/// assert_eq!(
///     res,
///     [
///         (r"\alpha", Token::Command),
///         ("<", Token::Char),
///         ("=", Token::Char),
///         ("2", Token::Number),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenizer<'a> {
    remaining: &'a str,
    mode: Mode,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer over some markup
    pub fn new(inp: &'a str) -> Self {
        Tokenizer {
            remaining: inp,
            mode: Mode::Math,
        }
    }

    fn split(&mut self, len: usize, token: Token) -> (&'a str, Token) {
        let (pref, rem) = self.remaining.split_at(len);
        self.remaining = rem;
        (pref, token)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = (&'a str, Token);

    fn next(&mut self) -> Option<Self::Item> {
        if self.mode == Mode::Text {
            self.mode = Mode::Math;
            let len = text_run_len(self.remaining);
            if len > 0 {
                return Some(self.split(len, Token::Text));
            }
        }
        self.remaining = skip_ignored(self.remaining);
        let expecting_text = std::mem::replace(&mut self.mode, Mode::Math) == Mode::TextArgument;
        if let Some((command, rem)) = strip_command(self.remaining) {
            self.remaining = rem;
            if TEXT_COMMANDS.contains(&command) {
                self.mode = Mode::TextArgument;
            }
            return Some((command, Token::Command));
        }
        if let Some((num, rem)) = strip_number(self.remaining) {
            self.remaining = rem;
            return Some((num, Token::Number));
        }
        let chr = self.remaining.chars().next()?;
        Some(match chr {
            '{' => {
                if expecting_text {
                    self.mode = Mode::Text;
                }
                self.split(1, Token::OpenGroup)
            }
            '}' => self.split(1, Token::CloseGroup),
            _ => self.split(chr.len_utf8(), Token::Char),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining.len()))
    }
}

impl<'a> FusedIterator for Tokenizer<'a> {}

pub(crate) fn ends_with_control_word(src: &str) -> bool {
    match src.rfind('\\') {
        Some(pos) => {
            let word = &src[pos + 1..];
            let word = word.strip_suffix('*').unwrap_or(word);
            !word.is_empty() && word.bytes().all(|b| b.is_ascii_alphabetic())
        }
        None => false,
    }
}

/// Append `s` to `src`, inserting a space if a control word would otherwise absorb it
pub fn append_latex(src: &mut String, s: &str) {
    if s.is_empty() {
        return;
    }
    let starts_with_letter = s
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '*');
    if starts_with_letter && ends_with_control_word(src) {
        src.push(' ');
    }
    src.push_str(s);
}

/// Join fragments of markup with [`append_latex`]
pub fn join_latex<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut res = String::new();
    for frag in fragments {
        append_latex(&mut res, frag.as_ref());
    }
    res
}

/// Turn tokens back into markup
pub fn tokens_to_string<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a (&'a str, Token)>,
{
    join_latex(tokens.into_iter().map(|(raw, _)| *raw))
}

/// Count the top level lexical units of some tokens
///
/// A command, `_` or `^` together with the braced groups immediately following it counts as one
/// unit, as does any other braced group.
pub(crate) fn count_units(tokens: &[(&str, Token)]) -> usize {
    let mut count = 0;
    let mut depth = 0usize;
    let mut absorb = false;
    for &(raw, token) in tokens {
        match token {
            Token::OpenGroup => {
                if depth == 0 && !absorb {
                    count += 1;
                }
                depth += 1;
            }
            Token::CloseGroup => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            Token::Command => {
                count += 1;
                absorb = true;
                continue;
            }
            Token::Char if raw == "_" || raw == "^" => {
                count += 1;
                absorb = true;
                continue;
            }
            _ => count += 1,
        }
        if depth == 0 && token != Token::CloseGroup {
            absorb = false;
        }
    }
    count
}

/// Count the top level lexical units of some markup
///
/// # Example
/// ```
/// use mathjson_notation::count_tokens;
/// assert_eq!(count_tokens(r"\hat{\alpha}"), 1);
/// assert_eq!(count_tokens("x_{0}"), 2);
/// assert_eq!(count_tokens("speed"), 5);
/// ```
pub fn count_tokens(latex: &str) -> usize {
    let tokens: Vec<_> = Tokenizer::new(latex).collect();
    count_units(&tokens)
}

#[cfg(test)]
mod tests {
    use super::{count_tokens, join_latex, Token, Tokenizer};

    #[test]
    fn math_tokenizer() {
        let tokens: Vec<_> = Tokenizer::new(r"\frac{x}{12.5} + \{a\} \\ % ignored").collect();
        assert_eq!(
            *tokens,
            [
                (r"\frac", Token::Command),
                ("{", Token::OpenGroup),
                ("x", Token::Char),
                ("}", Token::CloseGroup),
                ("{", Token::OpenGroup),
                ("12.5", Token::Number),
                ("}", Token::CloseGroup),
                ("+", Token::Char),
                (r"\{", Token::Command),
                ("a", Token::Char),
                (r"\}", Token::Command),
                (r"\\", Token::Command),
            ]
        );
    }

    #[test]
    fn text_preserves_whitespace() {
        let tokens: Vec<_> = Tokenizer::new(r"a\text{ and {so} on }b").collect();
        assert_eq!(
            *tokens,
            [
                ("a", Token::Char),
                (r"\text", Token::Command),
                ("{", Token::OpenGroup),
                (" and {so} on ", Token::Text),
                ("}", Token::CloseGroup),
                ("b", Token::Char),
            ]
        );
    }

    #[test]
    fn empty_text() {
        let tokens: Vec<_> = Tokenizer::new(r"\text{}").collect();
        assert_eq!(
            *tokens,
            [
                (r"\text", Token::Command),
                ("{", Token::OpenGroup),
                ("}", Token::CloseGroup),
            ]
        );
    }

    #[test]
    fn commands_end_at_non_letters() {
        let tokens: Vec<_> = Tokenizer::new(r"\alpha2\beta_\, \").collect();
        assert_eq!(
            *tokens,
            [
                (r"\alpha", Token::Command),
                ("2", Token::Number),
                (r"\beta", Token::Command),
                ("_", Token::Char),
                (r"\,", Token::Command),
                (r"\", Token::Command),
            ]
        );
    }

    #[test]
    fn unknown_characters() {
        let tokens: Vec<_> = Tokenizer::new("α . 💖").collect();
        assert_eq!(
            *tokens,
            [("α", Token::Char), (".", Token::Char), ("💖", Token::Char)]
        );
    }

    #[test]
    fn joins_commands_and_letters() {
        assert_eq!(join_latex([r"\times", "b"]), r"\times b");
        assert_eq!(join_latex([r"\times", "2"]), r"\times2");
        assert_eq!(join_latex(["a", r"\le", "{", "b"]), r"a\le{b");
    }

    #[test]
    fn counts_units() {
        assert_eq!(count_tokens("x"), 1);
        assert_eq!(count_tokens(r"\mathbf{x}"), 1);
        assert_eq!(count_tokens(r"\alpha^{\beta}_{0}"), 3);
        assert_eq!(count_tokens(r"\hat{x}_{0}"), 2);
        assert_eq!(count_tokens("ab"), 2);
    }
}
