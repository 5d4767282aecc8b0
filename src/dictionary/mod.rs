//! The operator dictionary that drives both parsing and serializing
//!
//! A dictionary is an ordered list of [`Entry`] records, each binding a trigger (a sequence of
//! tokens like `<` `=`) or a canonical name (like `LessEqual`) to a syntactic [`Kind`], a
//! precedence, and optional custom parse and serialize routines. Nothing about individual
//! operators is hard-coded in the parser or serializer, so entries can be added or overridden at
//! runtime by building a new dictionary and re-[`index`]ing it.
//!
//! ```
//! use mathjson_notation::dictionary::{default_dictionary, index, Entry};
//! use mathjson_notation::{log_warnings, parse_tokens, Tokenizer};
//!
//! let mut entries = default_dictionary();
//! entries.push(Entry::infix(r"\oplus", 275).named("DirectSum"));
//! let dict = index(&entries, &log_warnings());
//! let expr = parse_tokens(Tokenizer::new(r"a\oplus b"), &dict);
//! assert_eq!(expr.head(), Some("DirectSum"));
//! ```
mod arithmetic;
mod common;
mod functions;
mod index;
mod inequalities;
mod logic;
mod sets;

use crate::parse::Parser;
use crate::serialize::Serializer;
use crate::tokenizer::{join_latex, Tokenizer};
use crate::tree::Expression;
use crate::warning::{log_warnings, Warning};
use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

pub use index::{index, IndexedDictionary, IndexedEntry, Role};

/// Binding strength of an operator, higher binds tighter
pub type Precedence = u16;

/// A custom parse routine
///
/// It's called with the parser positioned after the trigger. Infix and postfix routines get the
/// left operand, matchfix routines get the enclosed body and environment routines get the parsed
/// table of cells. Returning `None` rewinds the parser and lets the next candidate entry try.
pub type ParseHandler =
    Arc<dyn Fn(&mut Parser<'_>, Option<&Expression>, Precedence) -> Option<Expression> + Send + Sync>;

/// A custom serialize routine, called with the expression and its nesting level
pub type SerializeHandler =
    Arc<dyn Fn(&Serializer<'_>, &Expression, usize) -> Result<String, Warning> + Send + Sync>;

/// The syntactic role of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A symbol like `\pi`
    Identifier,
    /// A function like `\sin`, possibly taking arguments
    Function,
    /// An operator before its operand like `-x`
    Prefix,
    /// An operator between its operands like `a+b`
    Infix,
    /// An operator after its operand like `n!`
    Postfix,
    /// A pair of delimiters around an expression like `|x|`
    Matchfix,
    /// A `\begin{..}..\end{..}` block
    Environment,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Identifier => "identifier",
            Kind::Function => "function",
            Kind::Prefix => "prefix",
            Kind::Infix => "infix",
            Kind::Postfix => "postfix",
            Kind::Matchfix => "matchfix",
            Kind::Environment => "environment",
        })
    }
}

/// Which side repeated operators group on
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    /// `a-b-c` is `(a-b)-c`
    #[default]
    Left,
    /// `a^b^c` is `a^(b^c)`
    Right,
}

/// How an entry's trigger becomes an expression
#[derive(Clone)]
pub enum ParseRule {
    /// Parse as the entry with this canonical name
    Alias(String),
    /// Parse with a custom routine
    Custom(ParseHandler),
}

impl fmt::Debug for ParseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseRule::Alias(name) => f.debug_tuple("Alias").field(name).finish(),
            ParseRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How an expression named by an entry becomes markup
#[derive(Clone)]
pub enum SerializeRule {
    /// A template where `#1`, `#2` are replaced by the operands
    Template(String),
    /// A custom routine
    Custom(SerializeHandler),
}

impl fmt::Debug for SerializeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeRule::Template(template) => f.debug_tuple("Template").field(template).finish(),
            SerializeRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A declarative dictionary rule
///
/// Entries are usually created with one of the kind constructors, which take the trigger as
/// markup and tokenize it, and then refined with the builder methods.
///
/// ```
/// use mathjson_notation::dictionary::{Entry, Kind};
///
/// let entry = Entry::infix("<=", 241).parse_as("LessEqual").right();
/// assert_eq!(entry.kind, Kind::Infix);
/// assert_eq!(entry.trigger, ["<", "="]);
/// ```
#[derive(Debug, Clone)]
pub struct Entry {
    /// The canonical name this entry parses to and serializes from
    pub name: Option<String>,
    /// The syntactic role
    pub kind: Kind,
    /// The tokens that activate the entry, the open delimiter for matchfix entries, and the
    /// environment name for environments
    pub trigger: Vec<String>,
    /// The close delimiter of a matchfix entry
    pub close_trigger: Vec<String>,
    /// Required for prefix, infix and postfix entries
    pub precedence: Option<Precedence>,
    /// How repeated infix operators group
    pub associativity: Associativity,
    /// An alias or custom parse routine
    pub parse: Option<ParseRule>,
    /// A template or custom serialize routine
    pub serialize: Option<SerializeRule>,
}

fn tokenize(latex: &str) -> Vec<String> {
    Tokenizer::new(latex)
        .map(|(raw, _)| raw.to_owned())
        .collect()
}

impl Entry {
    /// An entry with no trigger, name or precedence
    pub fn new(kind: Kind) -> Self {
        Entry {
            name: None,
            kind,
            trigger: Vec::new(),
            close_trigger: Vec::new(),
            precedence: None,
            associativity: Associativity::Left,
            parse: None,
            serialize: None,
        }
    }

    fn triggered(kind: Kind, trigger: &str, precedence: Option<Precedence>) -> Self {
        Entry {
            trigger: tokenize(trigger),
            precedence,
            ..Entry::new(kind)
        }
    }

    /// A symbol triggered by some markup
    pub fn identifier(trigger: &str) -> Self {
        Entry::triggered(Kind::Identifier, trigger, None)
    }

    /// A function triggered by some markup
    pub fn function(trigger: &str) -> Self {
        Entry::triggered(Kind::Function, trigger, None)
    }

    /// A prefix operator
    pub fn prefix(trigger: &str, precedence: Precedence) -> Self {
        Entry::triggered(Kind::Prefix, trigger, Some(precedence))
    }

    /// An infix operator, left associative unless changed with [`right`][Entry::right]
    pub fn infix(trigger: &str, precedence: Precedence) -> Self {
        Entry::triggered(Kind::Infix, trigger, Some(precedence))
    }

    /// A postfix operator
    pub fn postfix(trigger: &str, precedence: Precedence) -> Self {
        Entry::triggered(Kind::Postfix, trigger, Some(precedence))
    }

    /// A pair of delimiters
    pub fn matchfix(open: &str, close: &str) -> Self {
        Entry {
            close_trigger: tokenize(close),
            ..Entry::triggered(Kind::Matchfix, open, None)
        }
    }

    /// A `\begin{name}..\end{name}` environment
    pub fn environment(name: &str) -> Self {
        Entry {
            trigger: vec![name.to_owned()],
            ..Entry::new(Kind::Environment)
        }
    }

    /// Set the canonical name
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    /// Parse as the entry with another canonical name
    pub fn parse_as(mut self, alias: &str) -> Self {
        self.parse = Some(ParseRule::Alias(alias.to_owned()));
        self
    }

    /// Parse with a custom routine
    pub fn parse_with<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Parser<'_>, Option<&Expression>, Precedence) -> Option<Expression>
            + Send
            + Sync
            + 'static,
    {
        self.parse = Some(ParseRule::Custom(Arc::new(handler)));
        self
    }

    /// Make an infix operator right associative
    pub fn right(mut self) -> Self {
        self.associativity = Associativity::Right;
        self
    }

    /// Serialize with a template
    pub fn serialize_as(mut self, template: &str) -> Self {
        self.serialize = Some(SerializeRule::Template(template.to_owned()));
        self
    }

    /// Serialize with a custom routine
    pub fn serialize_with<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Serializer<'_>, &Expression, usize) -> Result<String, Warning>
            + Send
            + Sync
            + 'static,
    {
        self.serialize = Some(SerializeRule::Custom(Arc::new(handler)));
        self
    }

    /// A human readable label for messages, the name or else the trigger
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => join_latex(&self.trigger),
        }
    }
}

/// The groups the default dictionary is organised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryCategory {
    /// Sequences, delimiters, lists, subscripts, errors and matrices
    Core,
    /// Numeric operators
    Arithmetic,
    /// Mappings
    Algebra,
    /// Relational operators
    Inequalities,
    /// Boolean operators and constants
    Logic,
    /// Numeric sets and set operators
    Sets,
    /// Elementary functions and constants
    Functions,
}

impl LibraryCategory {
    /// Every category, in the order the default dictionary registers them
    pub const ALL: [LibraryCategory; 7] = [
        LibraryCategory::Core,
        LibraryCategory::Arithmetic,
        LibraryCategory::Algebra,
        LibraryCategory::Inequalities,
        LibraryCategory::Logic,
        LibraryCategory::Sets,
        LibraryCategory::Functions,
    ];

    /// The entries of this category
    pub fn entries(self) -> Vec<Entry> {
        match self {
            LibraryCategory::Core => common::entries(),
            LibraryCategory::Arithmetic => arithmetic::entries(),
            LibraryCategory::Algebra => arithmetic::algebra_entries(),
            LibraryCategory::Inequalities => inequalities::entries(),
            LibraryCategory::Logic => logic::entries(),
            LibraryCategory::Sets => sets::entries(),
            LibraryCategory::Functions => functions::entries(),
        }
    }
}

/// The entries of every category concatenated
pub fn default_dictionary() -> Vec<Entry> {
    LibraryCategory::ALL
        .into_iter()
        .flat_map(LibraryCategory::entries)
        .collect()
}

lazy_static! {
    /// The default entries, indexed once and shared
    pub static ref DEFAULT_INDEX: Arc<IndexedDictionary> =
        Arc::new(index(&default_dictionary(), &log_warnings()));
}
