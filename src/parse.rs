use crate::dictionary::{
    Associativity, IndexedDictionary, IndexedEntry, Kind, Precedence, Role, DEFAULT_INDEX,
};
use crate::identifier::parse_identifier;
use crate::tokenizer::{tokens_to_string, Token, Tokenizer, TEXT_COMMANDS};
use crate::tree::{ErrorCode, Expression};
use crate::warning::{log_warnings, Warning};
use std::cmp::Reverse;
use tracing::trace;

/// Spacing commands, which carry no meaning for the parsed expression
const SPACING: [&str; 9] = [
    r"\,", r"\;", r"\:", r"\!", r"\ ", r"\quad", r"\qquad", r"\enspace", "~",
];

/// The precedence arguments of functions like `\sin x` are parsed at, tighter than products
const FUNCTION_ARGUMENT: Precedence = 391;

/// How deeply expressions may nest before the rest of the input is given up on
const MAX_DEPTH: usize = 256;

/// A `Sequence` ending in an error, which later errors are appended to
fn is_errored_sequence(expr: &Expression) -> bool {
    expr.is_function("Sequence") && expr.ops().last().map_or(false, |op| op.is_function("Error"))
}

fn append_error(lhs: Option<Expression>, err: Expression) -> Expression {
    match lhs {
        Some(mut lhs) if is_errored_sequence(&lhs) => {
            if let Expression::Function { ops, .. } = &mut lhs {
                ops.push(err);
            }
            lhs
        }
        Some(lhs) => Expression::sequence([lhs, err]),
        None => err,
    }
}

/// Undo the escapes of special characters in verbatim text
fn unescape_text(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('\\') {
        res.push_str(&rest[..pos]);
        let command = &rest[pos..];
        if let Some(after) = command.strip_prefix(r"\textbackslash") {
            res.push('\\');
            rest = after.strip_prefix("{}").unwrap_or(after);
        } else {
            match command[1..].chars().next() {
                Some(c @ ('{' | '}' | '_' | '%' | '$' | '#' | '&')) => {
                    res.push(c);
                    rest = &command[1 + c.len_utf8()..];
                }
                _ => {
                    res.push('\\');
                    rest = &command[1..];
                }
            }
        }
    }
    res.push_str(rest);
    res
}

/// The operands a body contributes, splatting a `Sequence`
pub(crate) fn splat(body: Option<Expression>) -> Vec<Expression> {
    match body.map(Expression::into_stripped) {
        Some(Expression::Function { head, ops }) if head == "Sequence" => ops,
        Some(expr) => vec![expr],
        None => Vec::new(),
    }
}

/// A precedence climbing parser driven by an [`IndexedDictionary`]
///
/// The parser works on a buffer of tokens with a cursor. Custom parse handlers get mutable access
/// to it, so they can consume further tokens with the `parse_*` and `match_*` methods, and save
/// and restore the cursor with [`index`][Parser::index] and [`set_index`][Parser::set_index].
///
/// # Example
/// ```
/// use mathjson_notation::dictionary::DEFAULT_INDEX;
/// use mathjson_notation::{Parser, Tokenizer};
///
/// let mut parser = Parser::new(Tokenizer::new("a+b) c"), &DEFAULT_INDEX);
/// let sum = parser.parse_expression(0).unwrap();
/// assert_eq!(sum.head(), Some("Add"));
/// assert_eq!(parser.peek().map(|(raw, _)| raw), Some(")"));
/// ```
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Vec<(&'a str, Token)>,
    index: usize,
    dictionary: &'a IndexedDictionary,
    warnings: Vec<Warning>,
    depth: usize,
    too_deep: bool,
}

impl<'a> Parser<'a> {
    /// Create a parser over some tokens
    ///
    /// Spacing commands are dropped, except for thin spaces between digits which group them.
    pub fn new<I>(tokens: I, dictionary: &'a IndexedDictionary) -> Self
    where
        I: IntoIterator<Item = (&'a str, Token)>,
    {
        let all: Vec<_> = tokens.into_iter().collect();
        let mut kept: Vec<(&'a str, Token)> = Vec::with_capacity(all.len());
        for (idx, &(raw, token)) in all.iter().enumerate() {
            if SPACING.contains(&raw) {
                let groups_digits = raw == r"\,"
                    && matches!(kept.last(), Some((_, Token::Number)))
                    && matches!(all.get(idx + 1), Some((_, Token::Number)));
                if !groups_digits {
                    continue;
                }
            }
            kept.push((raw, token));
        }
        Parser {
            tokens: kept,
            index: 0,
            dictionary,
            warnings: Vec::new(),
            depth: 0,
            too_deep: false,
        }
    }

    /// The dictionary driving the parse
    pub fn dictionary(&self) -> &'a IndexedDictionary {
        self.dictionary
    }

    /// The cursor position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move the cursor, usually to rewind after a failed attempt
    pub fn set_index(&mut self, index: usize) {
        self.index = index.min(self.tokens.len());
    }

    /// True if every token was consumed
    pub fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    /// The next token without consuming it
    pub fn peek(&self) -> Option<(&'a str, Token)> {
        self.tokens.get(self.index).copied()
    }

    fn peek_raw(&self) -> Option<&'a str> {
        self.peek().map(|(raw, _)| raw)
    }

    fn upcoming(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens[self.index..].iter().map(|&(raw, _)| raw)
    }

    /// Consume the next token
    pub fn next_token(&mut self) -> Option<(&'a str, Token)> {
        let next = self.peek()?;
        self.index += 1;
        Some(next)
    }

    /// Consume the next token if it is `raw`
    pub fn match_token(&mut self, raw: &str) -> bool {
        if self.peek_raw() == Some(raw) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Consume the next tokens if they are `raws`
    pub fn match_tokens<S: AsRef<str>>(&mut self, raws: &[S]) -> bool {
        let matches = raws.len() <= self.tokens.len() - self.index
            && raws
                .iter()
                .zip(self.upcoming())
                .all(|(expected, raw)| expected.as_ref() == raw);
        if matches {
            self.index += raws.len();
        }
        matches
    }

    /// The markup of the tokens between two positions
    pub fn latex(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        tokens_to_string(&self.tokens[start.min(end)..end])
    }

    /// Report a warning
    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Take the warnings reported so far
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// An error node covering the tokens from `start` to the cursor
    pub fn error(&self, code: ErrorCode, arg: Option<&str>, start: usize) -> Expression {
        Expression::error(code, arg, &self.latex(start, self.index))
    }

    /// The placeholder for a missing operand
    pub fn missing() -> Expression {
        Expression::error(ErrorCode::Missing, None, "")
    }

    /// Parse a `{..}` group, or return `None` if the next token doesn't open one
    ///
    /// An empty group is an empty `Sequence`. Tokens left in the group after its expression
    /// become an error, as does a group that's never closed.
    pub fn parse_group(&mut self) -> Option<Expression> {
        match self.peek() {
            Some((_, Token::OpenGroup)) => Some(self.parse_brace_group()),
            _ => None,
        }
    }

    fn parse_brace_group(&mut self) -> Expression {
        let start = self.index;
        self.index += 1;
        if self.match_close_group() {
            return Expression::sequence([]);
        }
        let body = self.parse_expression(0);
        if self.match_close_group() {
            return body.unwrap_or_else(|| Expression::sequence([]));
        }
        let junk = self.index;
        let mut depth = 0usize;
        let mut closed = false;
        while let Some((_, token)) = self.next_token() {
            match token {
                Token::OpenGroup => depth += 1,
                Token::CloseGroup if depth == 0 => {
                    closed = true;
                    break;
                }
                Token::CloseGroup => depth -= 1,
                _ => {}
            }
        }
        let err = if closed {
            let latex = self.latex(junk, self.index - 1);
            Expression::error(ErrorCode::UnexpectedToken, None, &latex)
        } else {
            self.error(ErrorCode::ExpectedClosingDelimiter, None, start)
        };
        append_error(body, err)
    }

    fn match_close_group(&mut self) -> bool {
        if let Some((_, Token::CloseGroup)) = self.peek() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Parse the argument of a command like `\frac`
    ///
    /// This is a braced group, a single digit of a number, so `\frac12` is one half, or a
    /// single primary expression.
    pub fn parse_argument(&mut self) -> Option<Expression> {
        match self.peek()? {
            (_, Token::OpenGroup) => Some(self.parse_brace_group()),
            (raw, Token::Number) if raw.len() > 1 && raw.bytes().all(|b| b.is_ascii_digit()) => {
                let (first, rest) = raw.split_at(1);
                self.tokens[self.index] = (first, Token::Number);
                self.tokens.insert(self.index + 1, (rest, Token::Number));
                self.index += 1;
                Some(Expression::number(first))
            }
            _ => self.parse_primary(Precedence::MAX),
        }
    }

    /// Parse an optional `[..]` argument, rewinding if there isn't a complete one
    pub fn parse_optional_argument(&mut self) -> Option<Expression> {
        let start = self.index;
        if !self.match_token("[") {
            return None;
        }
        let body = self.parse_expression(0);
        if self.match_token("]") {
            body
        } else {
            self.index = start; // rewind
            None
        }
    }

    /// Parse a parenthesized, comma separated argument list
    pub fn parse_argument_list(&mut self) -> Option<Vec<Expression>> {
        let start = self.index;
        if !self.match_token("(") {
            return None;
        }
        if self.match_token(")") {
            return Some(Vec::new());
        }
        let body = self.parse_expression(0);
        if self.match_token(")") {
            Some(splat(body))
        } else {
            self.index = start; // rewind
            None
        }
    }

    /// Parse an expression whose operators all bind at least as tight as `min_precedence`
    ///
    /// Returns `None` without consuming anything if no expression starts at the cursor.
    pub fn parse_expression(&mut self, min_precedence: Precedence) -> Option<Expression> {
        self.nested(|parser| {
            let lhs = parser.parse_primary(min_precedence)?;
            Some(parser.parse_suffixes(lhs, min_precedence))
        })
    }

    fn parse_suffixes(&mut self, mut lhs: Expression, min_precedence: Precedence) -> Expression {
        loop {
            let dictionary = self.dictionary;
            let mut candidates: Vec<_> = dictionary
                .lookup(Kind::Postfix, self.upcoming())
                .into_iter()
                .chain(dictionary.lookup(Kind::Infix, self.upcoming()))
                .collect();
            if candidates.is_empty() {
                match self.juxtapose(&lhs, min_precedence) {
                    Some(product) => {
                        lhs = product;
                        continue;
                    }
                    None => return lhs,
                }
            }
            // stable, so postfix entries stay ahead of infix entries of the same length
            candidates.sort_by_key(|&(len, _)| Reverse(len));
            match candidates.first().and_then(|(_, entry)| entry.precedence()) {
                Some(precedence) if precedence >= min_precedence => {}
                _ => return lhs,
            }
            let start = self.index;
            let mut applied = None;
            for (len, entry) in candidates {
                match entry.precedence() {
                    Some(precedence) if precedence >= min_precedence => {
                        self.index = start + len;
                        applied = self.apply_operator(entry, &lhs, precedence);
                        if applied.is_some() {
                            break;
                        }
                        self.index = start; // rewind
                    }
                    _ => {}
                }
            }
            match applied {
                Some(expr) => lhs = expr,
                None => return lhs,
            }
        }
    }

    /// An operand directly following another multiplies it, as in `2x`
    ///
    /// This binds like the dictionary's `Multiply`, and isn't available without one.
    fn juxtapose(&mut self, lhs: &Expression, min_precedence: Precedence) -> Option<Expression> {
        let precedence = self.dictionary.by_name("Multiply")?.precedence()?;
        if precedence < min_precedence || self.at_end() {
            return None;
        }
        let start = self.index;
        let Some(rhs) = self.parse_expression(precedence.saturating_add(1)) else {
            self.index = start; // rewind
            return None;
        };
        let mut ops = match lhs {
            Expression::Function { head, ops } if head == "Multiply" => ops.clone(),
            lhs => vec![lhs.clone()],
        };
        ops.push(rhs);
        Some(Expression::function("Multiply", ops))
    }

    fn apply_operator(
        &mut self,
        entry: &IndexedEntry,
        lhs: &Expression,
        precedence: Precedence,
    ) -> Option<Expression> {
        match &entry.role {
            Role::Postfix { .. } => match &entry.parse {
                Some(handler) => handler(self, Some(lhs), precedence),
                None => {
                    let head = entry.head();
                    let ops = splat(Some(lhs.clone()));
                    if ops.len() != 1 {
                        self.warn(Warning::OperandCount {
                            head: head.clone(),
                            expected: 1,
                            actual: ops.len(),
                        });
                    }
                    Some(Expression::function(head, ops))
                }
            },
            Role::Infix { associativity, .. } => {
                let rhs_precedence = match associativity {
                    Associativity::Right => precedence,
                    Associativity::Left => precedence.saturating_add(1),
                };
                match &entry.parse {
                    Some(handler) => handler(self, Some(lhs), rhs_precedence),
                    None => Some(self.infix(entry, lhs.clone(), rhs_precedence)),
                }
            }
            _ => None,
        }
    }

    fn infix(
        &mut self,
        entry: &IndexedEntry,
        lhs: Expression,
        rhs_precedence: Precedence,
    ) -> Expression {
        let rhs = self
            .parse_expression(rhs_precedence)
            .unwrap_or_else(Parser::missing);
        Expression::function(entry.head(), [lhs, rhs])
    }

    /// Run a recursive step, unless the input is nested too deeply to continue
    fn nested<F>(&mut self, step: F) -> Option<Expression>
    where
        F: FnOnce(&mut Self) -> Option<Expression>,
    {
        if self.too_deep {
            return None;
        }
        if self.depth >= MAX_DEPTH {
            trace!(depth = self.depth, "giving up on deeply nested input");
            self.too_deep = true;
            return None;
        }
        self.depth += 1;
        let expr = step(self);
        self.depth -= 1;
        expr
    }

    fn parse_primary(&mut self, min_precedence: Precedence) -> Option<Expression> {
        self.nested(|parser| parser.parse_nested_primary(min_precedence))
    }

    fn parse_nested_primary(&mut self, min_precedence: Precedence) -> Option<Expression> {
        let (raw, token) = self.peek()?;
        match token {
            Token::Number => return Some(self.parse_number()),
            Token::OpenGroup => return Some(self.parse_brace_group()),
            Token::CloseGroup => return None,
            Token::Command if TEXT_COMMANDS.contains(&raw) => return Some(self.parse_text()),
            _ => {}
        }
        if let Some(expr) = self.parse_matchfix() {
            return Some(expr);
        }
        if raw == r"\begin" {
            if let Some(expr) = self.parse_environment() {
                return Some(expr);
            }
        }
        if let Some(expr) = self.parse_prefix(min_precedence) {
            return Some(expr);
        }
        self.parse_symbol()
    }

    fn parse_number(&mut self) -> Expression {
        let mut text = String::new();
        while let Some((digits, Token::Number)) = self.peek() {
            self.index += 1;
            text.push_str(digits);
            // thin spaces between digit groups are the only ones left after filtering
            if !self.match_token(r"\,") {
                break;
            }
        }
        if text.starts_with('.') {
            text.insert(0, '0');
        }
        // a repeating part like `0.\overline{3}`, whose point the tokenizer leaves trailing
        let start = self.index;
        let dotted = text.contains('.') || self.match_token(".");
        if dotted && self.match_token(r"\overline") && self.match_token("{") {
            match (self.next_token(), self.next_token()) {
                (Some((digits, Token::Number)), Some((_, Token::CloseGroup)))
                    if digits.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    if !text.contains('.') {
                        text.push('.');
                    }
                    text.push_str(&format!("({digits})"));
                }
                _ => self.index = start, // rewind
            }
        } else {
            self.index = start; // rewind
        }
        Expression::Number(text)
    }

    fn parse_text(&mut self) -> Expression {
        self.index += 1;
        let start = self.index;
        if !self.match_token("{") {
            return Expression::string("");
        }
        let text = match self.peek() {
            Some((text, Token::Text)) => {
                self.index += 1;
                text
            }
            _ => "",
        };
        if self.match_close_group() {
            Expression::string(unescape_text(text))
        } else {
            self.error(ErrorCode::ExpectedClosingDelimiter, None, start)
        }
    }

    fn parse_matchfix(&mut self) -> Option<Expression> {
        let start = self.index;
        let dictionary = self.dictionary;
        for (len, entry) in dictionary.lookup(Kind::Matchfix, self.upcoming()) {
            let Role::Matchfix { close } = &entry.role else {
                continue;
            };
            self.index = start + len;
            let body = if self.match_tokens(close) {
                None
            } else {
                let body = self.parse_expression(0);
                if !self.match_tokens(close) {
                    self.index = start; // rewind
                    continue;
                }
                body
            };
            let expr = match &entry.parse {
                Some(handler) => handler(self, body.as_ref(), 0),
                None => Some(Expression::function(entry.head(), splat(body))),
            };
            match expr {
                Some(expr) => return Some(expr),
                None => self.index = start, // rewind
            }
        }
        None
    }

    fn parse_environment_name(&mut self) -> Option<String> {
        if !self.match_token("{") {
            return None;
        }
        let mut name = String::new();
        loop {
            match self.next_token()? {
                (_, Token::CloseGroup) => return Some(name),
                (_, Token::OpenGroup) => return None,
                (raw, _) => name.push_str(raw),
            }
        }
    }

    fn parse_environment(&mut self) -> Option<Expression> {
        let start = self.index;
        self.index += 1;
        let name = self.parse_environment_name();
        let entries = name
            .as_deref()
            .map(|name| self.dictionary.environment(name))
            .unwrap_or_default();
        if entries.is_empty() {
            self.index = start; // rewind
            return None;
        }
        let table = self.parse_tabular();
        let body = self.index;
        for entry in entries {
            let expr = match &entry.parse {
                Some(handler) => handler(self, Some(&table), 0),
                None => Some(Expression::function(entry.head(), [table.clone()])),
            };
            if expr.is_some() {
                return expr;
            }
            self.index = body; // rewind
        }
        self.index = start; // rewind
        None
    }

    /// Cells separated by `&` and rows by `\\`, up to and including `\end{..}`
    fn parse_tabular(&mut self) -> Expression {
        let mut rows: Vec<Vec<Option<Expression>>> = Vec::new();
        let mut row = Vec::new();
        let mut cell: Option<Expression> = None;
        loop {
            match self.peek() {
                None => break,
                Some(("&", Token::Char)) => {
                    self.index += 1;
                    row.push(cell.take());
                }
                Some((r"\\", Token::Command)) => {
                    self.index += 1;
                    row.push(cell.take());
                    rows.push(std::mem::take(&mut row));
                }
                Some((r"\end", Token::Command)) => {
                    self.index += 1;
                    self.parse_environment_name();
                    break;
                }
                Some(_) => {
                    let start = self.index;
                    let parsed = if cell.is_none() {
                        self.parse_expression(0)
                    } else {
                        None
                    };
                    cell = match parsed {
                        Some(expr) => Some(expr),
                        None => {
                            self.index += 1;
                            let err = self.error(ErrorCode::UnexpectedToken, None, start);
                            Some(append_error(cell.take(), err))
                        }
                    };
                }
            }
        }
        row.push(cell);
        rows.push(row);
        if matches!(rows.last().map(Vec::as_slice), Some([None])) {
            rows.pop();
        }
        Expression::function(
            "List",
            rows.into_iter().map(|row| {
                Expression::function(
                    "List",
                    row.into_iter()
                        .map(|cell| cell.unwrap_or_else(|| Expression::sequence([]))),
                )
            }),
        )
    }

    fn parse_prefix(&mut self, min_precedence: Precedence) -> Option<Expression> {
        let start = self.index;
        let dictionary = self.dictionary;
        for (len, entry) in dictionary.lookup(Kind::Prefix, self.upcoming()) {
            let Some(precedence) = entry.precedence() else {
                continue;
            };
            self.index = start + len;
            let operand_precedence = precedence.saturating_add(1).max(min_precedence);
            let expr = match &entry.parse {
                Some(handler) => handler(self, None, operand_precedence),
                None => {
                    let operand = self
                        .parse_expression(operand_precedence)
                        .unwrap_or_else(Parser::missing);
                    Some(Expression::function(entry.head(), [operand]))
                }
            };
            match expr {
                Some(expr) => return Some(expr),
                None => self.index = start, // rewind
            }
        }
        None
    }

    fn parse_symbol(&mut self) -> Option<Expression> {
        let start = self.index;
        let dictionary = self.dictionary;
        for (len, entry) in dictionary.lookup(Kind::Identifier, self.upcoming()) {
            self.index = start + len;
            let expr = match (&entry.parse, &entry.role) {
                (Some(handler), _) => handler(self, None, 0),
                (None, Role::Function) => Some(self.parse_function_arguments(entry.head())),
                (None, _) => Some(Expression::symbol(entry.head())),
            };
            match expr {
                Some(expr) => return Some(expr),
                None => self.index = start, // rewind
            }
        }

        let (name, len) = parse_identifier(&self.tokens[start..])?;
        self.index = start + len;
        let upright = matches!(self.tokens[start].0, r"\mathrm" | r"\operatorname");
        if upright && self.peek_raw() == Some("(") {
            if let Some(args) = self.parse_argument_list() {
                let head = name.strip_suffix("_upright").unwrap_or(&name);
                return Some(Expression::function(head, args));
            }
        }
        Some(Expression::symbol(name))
    }

    /// Arguments of a function entry: a parenthesized list, a single tight-binding argument, or
    /// nothing for the bare function name
    fn parse_function_arguments(&mut self, head: String) -> Expression {
        if let Some(args) = self.parse_argument_list() {
            Expression::function(head, args)
        } else if let Some(arg) = self.parse_expression(FUNCTION_ARGUMENT) {
            Expression::function(head, [arg])
        } else {
            Expression::symbol(head)
        }
    }

    /// Parse every token, recovering from anything that can't be parsed
    pub(crate) fn parse_all(&mut self) -> Expression {
        let mut result = self.parse_expression(0);
        while !self.at_end() && !self.too_deep {
            result = Some(self.recover(result));
        }
        if self.too_deep {
            let start = self.index;
            self.index = self.tokens.len();
            let err = self.error(ErrorCode::SyntaxError, None, start);
            return append_error(result, err);
        }
        result.unwrap_or_else(|| Expression::sequence([]))
    }

    /// Consume at least one token that stopped the parse, folding an error into the result
    fn recover(&mut self, lhs: Option<Expression>) -> Expression {
        let start = self.index;
        let dictionary = self.dictionary;

        // an infix operator missing its left operand
        if let Some(&(len, entry)) = dictionary.lookup(Kind::Infix, self.upcoming()).first() {
            trace!(operator = %entry.head(), "recovering from a dangling infix operator");
            let (errors, left) = match lhs {
                Some(lhs) if !is_errored_sequence(&lhs) => (None, lhs),
                lhs => (lhs, Parser::missing()),
            };
            self.index = start + len;
            let precedence = entry.precedence().unwrap_or(0);
            let combined = match self.apply_operator(entry, &left, precedence) {
                Some(expr) => expr,
                None => {
                    self.index = start + len; // rewind
                    let rhs_precedence = precedence.saturating_add(1);
                    self.infix(entry, left, rhs_precedence)
                }
            };
            let combined = self.parse_suffixes(combined, 0);
            return match errors {
                Some(Expression::Function { head, mut ops }) => {
                    ops.push(combined);
                    Expression::Function { head, ops }
                }
                Some(errors) => Expression::sequence([errors, combined]),
                None => combined,
            };
        }

        let symbol_len = dictionary
            .lookup(Kind::Identifier, self.upcoming())
            .first()
            .map(|&(len, _)| len)
            .or_else(|| parse_identifier(&self.tokens[start..]).map(|(_, len)| len));
        if let Some(len) = symbol_len {
            trace!("recovering from an unexpected identifier");
            self.index = start + len;
            let err = self.error(ErrorCode::UnexpectedIdentifier, None, start);
            return append_error(lhs, err);
        }

        let close = match dictionary.lookup(Kind::Matchfix, self.upcoming()).first() {
            Some((len, IndexedEntry { role: Role::Matchfix { close }, .. })) => {
                Some((*len, close.clone()))
            }
            _ => match self.peek() {
                Some((_, Token::OpenGroup)) => Some((1, vec!["}".to_owned()])),
                _ => None,
            },
        };
        if let Some((len, close)) = close {
            trace!("recovering from an unclosed delimiter");
            self.index = start + len;
            self.parse_expression(0);
            self.match_tokens(&close);
            let err = self.error(ErrorCode::UnexpectedOpenDelimiter, None, start);
            return append_error(lhs, err);
        }

        let close_len = match self.peek() {
            Some((_, Token::CloseGroup)) => Some(1),
            _ => dictionary.match_close(self.upcoming()),
        };
        if let Some(len) = close_len {
            trace!("recovering from an unopened delimiter");
            self.index = start + len;
            let err = self.error(ErrorCode::ExpectedOpenDelimiter, None, start);
            return append_error(lhs, err);
        }

        self.index = self.tokens.len();
        let err = match self.tokens.get(start) {
            Some(&(raw, Token::Command)) => {
                trace!(command = raw, "discarding input after an unexpected command");
                self.error(ErrorCode::UnexpectedCommand, Some(raw), start)
            }
            _ => {
                trace!("discarding input after an unexpected token");
                self.error(ErrorCode::UnexpectedToken, None, start)
            }
        };
        append_error(lhs, err)
    }
}

/// Parse tokens with a dictionary
///
/// Parsing never fails: anything that can't be parsed is embedded in the result as an `Error`
/// node. Warnings are reported through [`log_warnings`].
///
/// # Example
/// ```
/// use mathjson_notation::dictionary::DEFAULT_INDEX;
/// use mathjson_notation::{parse_tokens, Tokenizer};
///
/// let expr = parse_tokens(Tokenizer::new("x^2"), &DEFAULT_INDEX);
/// assert_eq!(expr.to_string(), r#"["Power","x",2]"#);
/// ```
pub fn parse_tokens<'a, I>(tokens: I, dictionary: &'a IndexedDictionary) -> Expression
where
    I: IntoIterator<Item = (&'a str, Token)>,
{
    let mut parser = Parser::new(tokens, dictionary);
    let expr = parser.parse_all();
    let warnings = parser.take_warnings();
    if !warnings.is_empty() {
        log_warnings()(&warnings);
    }
    expr
}

/// Parse markup with the default dictionary
///
/// # Example
/// ```
/// use mathjson_notation::parse;
///
/// let expr = parse(r"\frac{a}{b} \le c");
/// assert_eq!(expr.to_string(), r#"["LessEqual",["Divide","a","b"],"c"]"#);
/// ```
pub fn parse(latex: &str) -> Expression {
    parse_tokens(Tokenizer::new(latex), &DEFAULT_INDEX)
}

#[cfg(test)]
mod tests {
    use super::{parse, Parser};
    use crate::dictionary::{default_dictionary, index, Entry, DEFAULT_INDEX};
    use crate::tokenizer::Tokenizer;
    use crate::tree::Expression;
    use crate::warning::{ignore_warnings, Warning};
    use serde_json::{json, Value};

    fn json(latex: &str) -> Value {
        parse(latex).to_json()
    }

    #[test]
    fn precedence() {
        assert_eq!(json("a+b*c"), json!(["Add", "a", ["Multiply", "b", "c"]]));
        assert_eq!(json("a-b-c"), json!(["Subtract", ["Subtract", "a", "b"], "c"]));
        assert_eq!(json("a+b+c"), json!(["Add", "a", "b", "c"]));
        assert_eq!(json("a^b^c"), json!(["Power", ["Power", "a", "b"], "c"]));
        assert_eq!(json("-x^2"), json!(["Negate", ["Power", "x", 2]]));
        assert_eq!(json("(a+b)c"), json!(["Multiply", ["Add", "a", "b"], "c"]));
    }

    #[test]
    fn juxtaposition_multiplies() {
        assert_eq!(json("2x"), json!(["Multiply", 2, "x"]));
        assert_eq!(json("2xy"), json!(["Multiply", 2, "x", "y"]));
        assert_eq!(json(r"\frac{a}{b}c"), json!(["Multiply", ["Divide", "a", "b"], "c"]));
        assert_eq!(json("2x^2+1"), json!(["Add", ["Multiply", 2, ["Power", "x", 2]], 1]));
        assert_eq!(json(r"\sin x y"), json!(["Multiply", ["Sin", "x"], "y"]));
        assert_eq!(json(r"a\text{ and }b"), json!(["Multiply", "a", "' and '", "b"]));
        // nothing to multiply by without a `Multiply` entry
        let core = index(&crate::dictionary::LibraryCategory::Core.entries(), &ignore_warnings());
        let expr = Parser::new(Tokenizer::new("a b"), &core).parse_all().to_json();
        assert_eq!(expr, json!(["Sequence", "a", ["Error", "'unexpected-identifier'", ["Latex", "'b'"]]]));
    }

    #[test]
    fn deep_nesting_gives_up() {
        let latex = format!("{}x{}", "(".repeat(1500), ")".repeat(1500));
        let expr = parse(&latex);
        assert_eq!(expr.head(), Some("Error"));
        assert_eq!(expr.op(1).and_then(Expression::string_value), Some("syntax-error"));
        let nested = format!("{}x{}", "(".repeat(40), ")".repeat(40));
        assert_eq!(json(&nested), json!("x"));
        let chain = vec!["a"; 2000].join("=");
        assert!(parse(&chain).has_errors());
    }

    #[test]
    fn longest_trigger_wins() {
        assert_eq!(json("a<=b"), json!(["LessEqual", "a", "b"]));
        assert_eq!(json(r"a\le b"), json!(["LessEqual", "a", "b"]));
        assert_eq!(json("a<b"), json!(["Less", "a", "b"]));
        assert_eq!(json(":="), json!(["Assign", ["Error", "'missing'"], ["Error", "'missing'"]]));
    }

    #[test]
    fn numbers() {
        assert_eq!(json(r"1\,234.5"), json!(1234.5));
        assert_eq!(json(".5"), json!(0.5));
        assert_eq!(json("-2"), json!(-2));
        assert_eq!(json(r"0.\overline{3}"), json!({"num": "0.(3)"}));
        assert_eq!(json(r"\frac12"), json!(["Divide", 1, 2]));
    }

    #[test]
    fn groups_and_delimiters() {
        assert_eq!(json("{}"), json!(["Sequence"]));
        assert_eq!(json("(a)"), json!("a"));
        assert_eq!(json("(a, b)"), json!(["Delimiter", "a", "b"]));
        assert_eq!(json(r"\left(a\right)"), json!("a"));
        assert_eq!(json("|x|"), json!(["Abs", "x"]));
        assert_eq!(json(r"\lbrack 1, 2\rbrack"), json!(["List", 1, 2]));
        assert_eq!(json(r"\text{ hi }"), json!("' hi '"));
        assert_eq!(
            json(r"\text{a\}b\{c\textbackslash{}d}"),
            json!(r"'a}b{c\d'")
        );
    }

    #[test]
    fn functions() {
        assert_eq!(json(r"\sin x"), json!(["Sin", "x"]));
        assert_eq!(json(r"\sin(x, y)"), json!(["Sin", "x", "y"]));
        assert_eq!(json(r"\sin x+1"), json!(["Add", ["Sin", "x"], 1]));
        assert_eq!(json(r"\mathrm{f}(x)"), json!(["f", "x"]));
        assert_eq!(json(r"\operatorname{foo}(x)"), json!(["foo", "x"]));
        assert_eq!(json(r"\sqrt[3]{x}"), json!(["Root", "x", 3]));
    }

    #[test]
    fn identifiers() {
        assert_eq!(json(r"\alpha"), json!("alpha"));
        assert_eq!(json(r"\pi"), json!("Pi"));
        assert_eq!(json(r"\mathbf{v}"), json!("v_bold"));
        assert_eq!(json(r"\mathrm{e}"), json!("ExponentialE"));
        assert_eq!(json("x_0"), json!(["Subscript", "x", 0]));
    }

    #[test]
    fn environments() {
        assert_eq!(
            json(r"\begin{pmatrix}a & b\\c & d\\\end{pmatrix}"),
            json!(["Matrix", ["List", ["List", "a", "b"], ["List", "c", "d"]]])
        );
        assert_eq!(
            json(r"\begin{foo}x\end{foo}"),
            json!(["Error", ["ErrorCode", "'unexpected-command'", r"'\begin'"], ["Latex", r"'\begin{foo}x\end{foo}'"]])
        );
    }

    #[test]
    fn recovers_from_errors() {
        assert_eq!(
            json(r"x \foo y"),
            json!(["Sequence", "x", ["Error", ["ErrorCode", "'unexpected-command'", r"'\foo'"], ["Latex", r"'\foo y'"]]])
        );
        assert_eq!(json("x+"), json!(["Add", "x", ["Error", "'missing'"]]));
        assert_eq!(json("=x"), json!(["Equal", ["Error", "'missing'"], "x"]));
        assert_eq!(
            json("x)"),
            json!(["Sequence", "x", ["Error", "'expected-open-delimiter'", ["Latex", "')'"]]])
        );
        assert_eq!(
            json("x(y"),
            json!(["Sequence", "x", ["Error", "'unexpected-open-delimiter'", ["Latex", "'(y'"]]])
        );
        assert_eq!(
            json("x))"),
            json!([
                "Sequence",
                "x",
                ["Error", "'expected-open-delimiter'", ["Latex", "')'"]],
                ["Error", "'expected-open-delimiter'", ["Latex", "')'"]]
            ])
        );
        assert_eq!(
            json("{a #}"),
            json!(["Sequence", "a", ["Error", "'unexpected-token'", ["Latex", "'#'"]]])
        );
        assert_eq!(
            json("{a"),
            json!(["Sequence", "a", ["Error", "'expected-closing-delimiter'", ["Latex", "'{a'"]]])
        );
        assert_eq!(json(""), json!(["Sequence"]));
        assert_eq!(json("#"), json!(["Error", "'unexpected-token'", ["Latex", "'#'"]]));
    }

    #[test]
    fn postfix_operand_count() {
        let mut parser = Parser::new(Tokenizer::new("{a, b}!"), &DEFAULT_INDEX);
        let expr = parser.parse_all();
        assert_eq!(expr, Expression::function("Factorial", ["a", "b"]));
        assert_eq!(
            parser.take_warnings(),
            [Warning::OperandCount {
                head: "Factorial".into(),
                expected: 1,
                actual: 2
            }]
        );
    }

    #[test]
    fn custom_entries() {
        let mut entries = default_dictionary();
        entries.push(Entry::infix(r"\oplus", 275).named("DirectSum"));
        entries.push(Entry::infix("*", 390).named("Star"));
        entries.push(
            Entry::prefix(r"\nabla", 740)
                .named("Grad")
                .parse_with(|parser, _, precedence| {
                    let operand = parser.parse_expression(precedence)?;
                    Some(Expression::function("Grad", [operand]))
                }),
        );
        let dict = index(&entries, &ignore_warnings());
        let custom = |latex: &str| Parser::new(Tokenizer::new(latex), &dict).parse_all().to_json();
        assert_eq!(custom(r"a\oplus b"), json!(["DirectSum", "a", "b"]));
        assert_eq!(custom("a*b"), json!(["Star", "a", "b"]));
        assert_eq!(custom(r"\nabla f"), json!(["Grad", "f"]));
        // the handler declines, so the symbol is read instead
        assert_eq!(custom(r"\nabla"), json!("nabla"));
    }
}
