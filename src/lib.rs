//! An extensible LaTeX parser and serializer for MathJSON expressions
//!
//! This crate transcodes between LaTeX style math markup and
//! [`Expression`][tree::Expression] trees, the in memory form of
//! [MathJSON](https://cortexjs.io/math-json/): numbers, strings, symbols and function
//! applications, optionally annotated with the markup they came from.
//!
//! ## Usage
//!
//! ```sh
//! cargo add mathjson-notation
//! ```
//!
//! then
//!
//! ```
//! let expr = mathjson_notation::parse(r"\frac{x}{2} \le y");
//! assert_eq!(expr.to_string(), r#"["LessEqual",["Divide","x",2],"y"]"#);
//! ```
//!
//! Rendering goes through a [`LatexSyntax`], which bundles a dictionary, rendering
//! [`Options`][options::Options] and a destination for [`Warning`]s.
//!
//! ```
//! use mathjson_notation::LatexSyntax;
//! use mathjson_notation::tree::Expression;
//!
//! let syntax = LatexSyntax::new();
//! let expr: Expression = serde_json::from_str(r#"["Multiply", ["Add", "a", "b"], "c"]"#).unwrap();
//! assert_eq!(syntax.serialize(&expr), r"(a+b)\times c");
//! ```
//!
//! ## Never failing
//!
//! Markup is written by people, so parsing is total. Anything that can't be understood becomes an
//! `["Error", code, ["Latex", source]]` node in the tree, and parsing carries on with whatever
//! follows, or discards the rest of the input when nothing sensible can.
//!
//! ```
//! let expr = mathjson_notation::parse(r"x \foo y");
//! assert_eq!(expr.head(), Some("Sequence"));
//! assert!(expr.has_errors());
//! ```
//!
//! Problems with configuration, like a dictionary entry without a precedence, or an expression
//! that can only be rendered on a best-effort basis, are reported as [`Warning`]s to a
//! [`WarningSink`]. By default they are logged with `tracing`.
//!
//! ## Dictionaries
//!
//! Everything the parser and serializer know about particular operators lives in a
//! [dictionary][dictionary] of [`Entry`][dictionary::Entry] records. An entry binds a trigger,
//! such as `<` `=`, to a canonical name such as `LessEqual`, a syntactic kind and a precedence. Many
//! triggers can alias one name, and the last entry registered for a name wins, so built in
//! entries can be overridden by appending to the [default
//! dictionary][dictionary::default_dictionary].
//!
//! Indexing a dictionary builds [`TriggerMap`][trigger_map::TriggerMap]s, longest-prefix lookup
//! tables over token sequences, one per kind. Several backends are provided, picked with cargo
//! features the same way for all of them.
//!
//! ## Lower level pieces
//!
//! 1. [`Tokenizer`] splits markup into `(&str, Token)` pairs without allocating, and
//!    [`parse_tokens`] parses any such iterator, so custom tokenization can be slotted in.
//! 2. [`Parser`] and [`Serializer`] are handed to custom parse and serialize routines of
//!    dictionary entries, and expose the building blocks those need.
//! 3. [`encode`], [`decode`] and [`parse_identifier`] convert between symbol names like
//!    `x_hat_dot` and their markup.
//!
//! ```
//! use mathjson_notation::{decode, encode, IdentifierStyle};
//!
//! assert_eq!(encode("x_hat_dot", IdentifierStyle::Auto), r"\dot{\hat{x}}");
//! assert_eq!(decode(r"\mathfrak{g}").as_deref(), Some("g_fraktur"));
//! ```
#![warn(missing_docs)]
pub mod dictionary;
mod identifier;
mod number;
pub mod options;
mod parse;
mod serialize;
mod symbols;
mod syntax;
mod tokenizer;
pub mod tree;
pub mod trigger_map;
mod warning;

pub use identifier::{decode, encode, parse_identifier, IdentifierStyle};
pub use parse::{parse, parse_tokens, Parser};
pub use serialize::{replace_latex, Serializer};
pub use syntax::{LatexSyntax, SerializeOptions};
pub use tokenizer::{
    append_latex, count_tokens, join_latex, tokens_to_string, Token, Tokenizer, TEXT_COMMANDS,
};
pub use warning::{ignore_warnings, log_warnings, Warning, WarningSink};
