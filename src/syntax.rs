//! A configured parser and serializer pair
use crate::dictionary::{
    default_dictionary, index, Entry, IndexedDictionary, LibraryCategory, DEFAULT_INDEX,
};
use crate::options::{Options, PartialOptions};
use crate::parse::Parser;
use crate::serialize::Serializer;
use crate::tokenizer::Tokenizer;
use crate::tree::Expression;
use crate::warning::{log_warnings, WarningSink};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Per call serialization settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Ignore the source markup attached to annotated expressions and render them from their
    /// structure instead
    pub canonical: bool,
}

/// A dictionary, a set of options and a warning sink
///
/// Parsing borrows a reference counted handle to the current index, so replacing the dictionary
/// never disturbs a parse already in progress.
///
/// ```
/// use mathjson_notation::LatexSyntax;
///
/// let syntax = LatexSyntax::new();
/// let expr = syntax.parse(r"x^2 \le 1");
/// assert_eq!(expr.to_string(), r#"["LessEqual",["Power","x",2],1]"#);
/// assert_eq!(syntax.serialize(&expr), r"x^{2}\le1");
/// ```
#[derive(Clone)]
pub struct LatexSyntax {
    entries: Option<Arc<Vec<Entry>>>,
    dictionary: Arc<IndexedDictionary>,
    options: Options,
    on_warning: WarningSink,
}

impl Default for LatexSyntax {
    fn default() -> Self {
        LatexSyntax::new()
    }
}

impl fmt::Debug for LatexSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatexSyntax")
            .field("entries", &self.entries.as_ref().map(|entries| entries.len()))
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl LatexSyntax {
    /// The default dictionary and options, reporting warnings through `tracing`
    pub fn new() -> Self {
        LatexSyntax {
            entries: None,
            dictionary: DEFAULT_INDEX.clone(),
            options: Options::default(),
            on_warning: log_warnings(),
        }
    }

    /// Replace the dictionary
    pub fn with_dictionary(mut self, entries: Vec<Entry>) -> Self {
        self.set_dictionary(entries);
        self
    }

    /// Replace the options
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Send warnings somewhere other than the log
    pub fn with_warning_sink(mut self, sink: WarningSink) -> Self {
        self.on_warning = sink;
        self
    }

    /// Parse markup into an expression
    ///
    /// This never fails, problems with the markup are embedded in the result as `Error`
    /// expressions. With [`preserve_latex`][Options::preserve_latex] set the result is annotated
    /// with the source.
    pub fn parse(&self, latex: &str) -> Expression {
        let dictionary = self.dictionary.clone();
        let mut parser = Parser::new(Tokenizer::new(latex), &dictionary);
        let expr = parser.parse_all();
        let warnings = parser.take_warnings();
        if !warnings.is_empty() {
            (self.on_warning)(&warnings);
        }
        if self.options.preserve_latex {
            expr.annotate(latex)
        } else {
            expr
        }
    }

    /// Render an expression as markup
    pub fn serialize(&self, expr: &Expression) -> String {
        self.serialize_with(expr, SerializeOptions::default())
    }

    /// Render an expression as markup with per call settings
    pub fn serialize_with(&self, expr: &Expression, settings: SerializeOptions) -> String {
        Serializer::new(&self.options, &self.dictionary, &self.on_warning)
            .canonical(settings.canonical)
            .serialize(expr)
    }

    /// The current index
    pub fn dictionary(&self) -> &Arc<IndexedDictionary> {
        &self.dictionary
    }

    /// Re-index with new entries
    ///
    /// Index warnings go to the warning sink. Clones of this syntax, and parses in progress, keep
    /// the index they started with.
    pub fn set_dictionary(&mut self, entries: Vec<Entry>) {
        debug!(entries = entries.len(), "indexing dictionary");
        self.dictionary = Arc::new(index(&entries, &self.on_warning));
        self.entries = Some(Arc::new(entries));
    }

    /// A snapshot of the entries of one default category, or of the whole current dictionary
    pub fn get_dictionary(&self, category: Option<LibraryCategory>) -> Vec<Entry> {
        match (category, &self.entries) {
            (Some(category), _) => category.entries(),
            (None, Some(entries)) => entries.as_ref().clone(),
            (None, None) => default_dictionary(),
        }
    }

    /// The current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Overwrite some options, reporting rejected values to the warning sink
    pub fn update_options(&mut self, partial: PartialOptions) {
        let warnings = self.options.merge(partial);
        if !warnings.is_empty() {
            (self.on_warning)(&warnings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LatexSyntax, SerializeOptions};
    use crate::dictionary::{default_dictionary, Entry, Kind, LibraryCategory};
    use crate::options::PartialOptions;
    use crate::tree::Expression;
    use crate::warning::{Warning, WarningSink};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn collecting_sink() -> (WarningSink, Arc<Mutex<Vec<Warning>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner = seen.clone();
        let sink: WarningSink = Arc::new(move |warnings: &[Warning]| {
            inner.lock().unwrap().extend_from_slice(warnings)
        });
        (sink, seen)
    }

    #[test]
    fn concrete_scenarios() {
        let syntax = LatexSyntax::default();
        assert_eq!(syntax.parse("a<=b").to_json(), json!(["LessEqual", "a", "b"]));
        let expr = syntax.parse(r"x \foo y");
        assert_eq!(expr.head(), Some("Sequence"));
        assert_eq!(expr.op(1), Some(&Expression::symbol("x")));
        assert_eq!(
            expr.op(2).map(Expression::to_json),
            Some(json!([
                "Error",
                ["ErrorCode", "'unexpected-command'", r"'\foo'"],
                ["Latex", r"'\foo y'"]
            ]))
        );
        assert_eq!(expr.nops(), 2);
    }

    #[test]
    fn preserves_source() {
        let mut syntax = LatexSyntax::new();
        syntax.update_options(PartialOptions {
            preserve_latex: Some(true),
            ..PartialOptions::default()
        });
        let expr = syntax.parse(r"\frac{1}{2}");
        assert_eq!(expr.latex(), Some(r"\frac{1}{2}"));
        assert_eq!(expr.strip().head(), Some("Divide"));
        assert_eq!(syntax.serialize(&expr), r"\frac{1}{2}");
        assert_eq!(
            syntax.serialize_with(&expr, SerializeOptions { canonical: true }),
            r"\frac{1}{2}"
        );
        let expr = syntax.parse(r"a\times  b");
        assert_eq!(syntax.serialize(&expr), r"a\times  b");
        assert_eq!(
            syntax.serialize_with(&expr, SerializeOptions { canonical: true }),
            r"a\times b"
        );
    }

    #[test]
    fn custom_dictionary() {
        let (sink, seen) = collecting_sink();
        let mut entries = default_dictionary();
        entries.push(Entry::infix(r"\oplus", 275).named("DirectSum"));
        entries.push(Entry::new(Kind::Infix).named("Broken"));
        let syntax = LatexSyntax::new()
            .with_warning_sink(sink)
            .with_dictionary(entries);
        assert_eq!(
            syntax.parse(r"a\oplus b").to_json(),
            json!(["DirectSum", "a", "b"])
        );
        assert_eq!(
            syntax.serialize(&Expression::function(
                "DirectSum",
                [Expression::symbol("a"), Expression::symbol("b")]
            )),
            r"a\oplus b"
        );
        assert!(!seen.lock().unwrap().is_empty());
        let count = syntax.get_dictionary(None).len();
        assert_eq!(count, default_dictionary().len() + 2);
    }

    #[test]
    fn replacing_the_dictionary_keeps_old_handles() {
        let mut syntax = LatexSyntax::new();
        let before = syntax.dictionary().clone();
        syntax.set_dictionary(LibraryCategory::Core.entries());
        assert!(before.by_name("LessEqual").is_some());
        assert!(syntax.dictionary().by_name("LessEqual").is_none());
        assert_eq!(syntax.parse("a").to_json(), json!("a"));
    }

    #[test]
    fn dictionary_snapshots() {
        let syntax = LatexSyntax::new();
        assert_eq!(syntax.get_dictionary(None).len(), default_dictionary().len());
        let logic = syntax.get_dictionary(Some(LibraryCategory::Logic));
        assert!(logic.iter().any(|entry| entry.name.as_deref() == Some("And")));
        assert!(logic.iter().all(|entry| entry.name.as_deref() != Some("Add")));
    }

    #[test]
    fn rejected_options_are_reported() {
        let (sink, seen) = collecting_sink();
        let mut syntax = LatexSyntax::new().with_warning_sink(sink);
        let partial: PartialOptions =
            serde_json::from_str(r#"{"invisiblePlus": "+", "multiply": "\\cdot"}"#).unwrap();
        syntax.update_options(partial);
        assert_eq!(syntax.options().multiply, r"\cdot");
        assert_eq!(syntax.options().invisible_plus, "");
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
