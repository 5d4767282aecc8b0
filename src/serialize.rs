use crate::dictionary::{Associativity, IndexedDictionary, IndexedEntry, Precedence, Role};
use crate::identifier::{encode, IdentifierStyle};
use crate::number::serialize_number;
use crate::options::{GroupStyle, Options};
use crate::tokenizer::{append_latex, join_latex};
use crate::tree::Expression;
use crate::warning::{Warning, WarningSink};

/// Substitute `#1`..`#9` in a template
///
/// Arguments are spliced in a single pass, so markup in an argument is never substituted again,
/// and a space is inserted wherever a control word would otherwise run into a following letter.
/// Missing arguments are empty.
///
/// # Example
/// ```
/// use mathjson_notation::replace_latex;
///
/// let res = replace_latex(r"#1\le#2", &[r"\alpha".into(), "b".into()]);
/// assert_eq!(res, r"\alpha\le b");
/// ```
pub fn replace_latex(template: &str, args: &[String]) -> String {
    let mut res = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('#') {
        let (before, after) = rest.split_at(pos);
        append_latex(&mut res, before);
        // `\#` is a literal hash
        let escaped = res.ends_with('\\');
        match after[1..].chars().next().and_then(|c| c.to_digit(10)) {
            Some(num) if num > 0 && !escaped => {
                let arg = args.get(num as usize - 1).map_or("", String::as_str);
                append_latex(&mut res, arg);
                rest = &after[2..];
            }
            _ => {
                res.push('#');
                rest = &after[1..];
            }
        }
    }
    append_latex(&mut res, rest);
    res
}

/// Escape the characters that end or restructure a `\text{..}` argument
fn escape_text(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '{' => res.push_str(r"\{"),
            '}' => res.push_str(r"\}"),
            '\\' => res.push_str(r"\textbackslash{}"),
            c => res.push(c),
        }
    }
    res
}

fn is_short_fenced(expr: &Expression) -> bool {
    match expr.strip() {
        Expression::Function { head, .. } => matches!(
            head.as_str(),
            "Add" | "Subtract" | "Negate" | "PlusMinus" | "Multiply"
        ),
        Expression::Number(text) => !text.bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

/// A precedence aware renderer driven by an [`IndexedDictionary`]
///
/// Rendering is total. Expressions that have no sensible rendering are reported to the warning
/// sink and render as best they can, or as nothing.
///
/// The nesting `level` threaded through the rendering methods starts at 0 for the whole
/// expression and increases by one for every nested operand. It's passed to the style selectors
/// of the [`Options`].
///
/// # Example
/// ```
/// use mathjson_notation::dictionary::DEFAULT_INDEX;
/// use mathjson_notation::options::Options;
/// use mathjson_notation::tree::Expression;
/// use mathjson_notation::{log_warnings, Serializer};
///
/// let options = Options::default();
/// let sink = log_warnings();
/// let serializer = Serializer::new(&options, &DEFAULT_INDEX, &sink);
/// let sum = Expression::function("Add", ["a", "b"]);
/// let expr = Expression::function("Multiply", [sum, Expression::symbol("c")]);
/// assert_eq!(serializer.serialize(&expr), r"(a+b)\times c");
/// ```
pub struct Serializer<'a> {
    options: &'a Options,
    dictionary: &'a IndexedDictionary,
    on_warning: &'a WarningSink,
    canonical: bool,
}

impl<'a> Serializer<'a> {
    /// Create a serializer
    pub fn new(
        options: &'a Options,
        dictionary: &'a IndexedDictionary,
        on_warning: &'a WarningSink,
    ) -> Self {
        Serializer {
            options,
            dictionary,
            on_warning,
            canonical: false,
        }
    }

    /// Ignore the source markup of annotated expressions
    pub fn canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    /// The rendering options
    pub fn options(&self) -> &'a Options {
        self.options
    }

    /// The dictionary driving the rendering
    pub fn dictionary(&self) -> &'a IndexedDictionary {
        self.dictionary
    }

    /// Report a warning
    pub fn warn(&self, warning: Warning) {
        (self.on_warning)(&[warning]);
    }

    /// Render a whole expression
    pub fn serialize(&self, expr: &Expression) -> String {
        self.serialize_at(expr, 0)
    }

    /// Render an expression at some nesting level
    pub fn serialize_at(&self, expr: &Expression, level: usize) -> String {
        match expr {
            Expression::Annotated { latex, expr } => {
                if self.canonical || latex.is_empty() {
                    self.serialize_at(expr, level)
                } else {
                    latex.clone()
                }
            }
            Expression::Number(text) => {
                serialize_number(text, &self.options.number).unwrap_or_else(|warning| {
                    self.warn(warning);
                    String::new()
                })
            }
            Expression::String(text) => format!(r"\text{{{}}}", escape_text(text)),
            Expression::Symbol(name) => self.symbol(expr, name, level),
            Expression::Dictionary(entries) => self.table(entries, level),
            Expression::Function { head, .. } => self.function(expr, head, level),
        }
    }

    /// Render the operands of a function, separated by commas
    pub fn serialize_ops(&self, expr: &Expression, level: usize) -> String {
        let ops: Vec<_> = expr
            .ops()
            .iter()
            .map(|op| self.serialize_at(op, level + 1))
            .collect();
        ops.join(", ")
    }

    /// Surround rendered markup with fences in some style, `(` and `)` unless given
    pub fn wrap_string(
        &self,
        latex: &str,
        style: GroupStyle,
        fence: Option<(&str, &str)>,
    ) -> String {
        let (open, close) = fence.unwrap_or(("(", ")"));
        match style {
            GroupStyle::Paren => format!("{open}{latex}{close}"),
            GroupStyle::LeftRight => format!(r"\left{open}{latex}\right{close}"),
            GroupStyle::Big => format!(r"\Bigl{open}{latex}\Bigr{close}"),
            GroupStyle::None => latex.to_owned(),
        }
    }

    fn fence(&self, expr: &Expression, latex: &str, level: usize) -> String {
        self.wrap_string(latex, (self.options.group_style)(expr, level), None)
    }

    fn own_precedence(&self, head: &str) -> Option<Precedence> {
        self.dictionary.by_name(head).and_then(IndexedEntry::precedence)
    }

    /// True if `expr` binds looser than `precedence`
    fn binds_looser(&self, expr: &Expression, latex: &str, precedence: Precedence) -> bool {
        match expr.strip() {
            Expression::Number(_) => {
                latex.starts_with('-')
                    && self.own_precedence("Negate").map_or(true, |negate| negate < precedence)
            }
            Expression::Function { head, .. } if head != "Delimiter" && head != "Subscript" => {
                self.own_precedence(head).map_or(false, |own| own < precedence)
            }
            _ => false,
        }
    }

    /// Render an operand, fenced if it binds looser than `precedence`
    ///
    /// Without a precedence the operand is always fenced. Atoms are never fenced, except for
    /// negative numbers in a context binding tighter than negation.
    pub fn wrap(&self, expr: &Expression, precedence: Option<Precedence>, level: usize) -> String {
        let latex = self.serialize_at(expr, level);
        let fenced = match precedence {
            Some(precedence) => self.binds_looser(expr, &latex, precedence),
            None => true,
        };
        if fenced {
            self.fence(expr, &latex, level)
        } else {
            latex
        }
    }

    /// Render an operand that needs to be visually distinct, like the base of a power
    ///
    /// Sums, differences, negations and products are fenced, as are numbers that aren't
    /// non-negative integers.
    pub fn wrap_short(&self, expr: &Expression, level: usize) -> String {
        let latex = self.serialize_at(expr, level);
        if is_short_fenced(expr) {
            self.fence(expr, &latex, level)
        } else {
            latex
        }
    }

    /// Render the base of a script like `^` or `_` bound at `precedence`
    ///
    /// The base is fenced like [`wrap_short`][Serializer::wrap_short] does, and also when it binds
    /// no tighter than the script itself, so `(a=b)^{2}` and `(x^{2})^{3}` keep their fences.
    pub fn wrap_base(&self, expr: &Expression, precedence: Precedence, level: usize) -> String {
        let latex = self.serialize_at(expr, level);
        if is_short_fenced(expr) || self.binds_looser(expr, &latex, precedence.saturating_add(1)) {
            self.fence(expr, &latex, level)
        } else {
            latex
        }
    }

    /// Render the operands of a function application like `(x, y)`
    pub fn wrap_arguments(&self, expr: &Expression, level: usize) -> String {
        let args = self.serialize_ops(expr, level);
        self.wrap_string(&args, (self.options.apply_function_style)(expr, level), None)
    }

    /// The placeholder for a missing operand
    pub fn missing(&self) -> String {
        self.options.missing_symbol.clone()
    }

    fn custom(&self, entry: &IndexedEntry, expr: &Expression, level: usize) -> Option<String> {
        let handler = entry.serialize.as_ref()?;
        Some(handler(self, expr, level).unwrap_or_else(|warning| {
            self.warn(warning);
            String::new()
        }))
    }

    fn symbol(&self, expr: &Expression, name: &str, level: usize) -> String {
        match self.dictionary.by_name(name) {
            Some(entry) if matches!(entry.role, Role::Identifier | Role::Function) => self
                .custom(entry, expr, level)
                .unwrap_or_else(|| entry.template.clone()),
            _ => encode(name, IdentifierStyle::Auto),
        }
    }

    fn table(&self, entries: &[(String, Expression)], level: usize) -> String {
        let rows: Vec<_> = entries
            .iter()
            .map(|(key, val)| {
                format!(
                    r"\textbf{{{key}}} & \rightarrow & {}",
                    self.serialize_at(val, level + 1)
                )
            })
            .collect();
        format!(
            r"\left\lbrack\begin{{array}}{{lll}}{}\end{{array}}\right\rbrack",
            rows.join(r"\\")
        )
    }

    fn function(&self, expr: &Expression, head: &str, level: usize) -> String {
        if let Some(entry) = self.dictionary.by_name(head) {
            if let Some(latex) = self.custom(entry, expr, level) {
                return latex;
            }
            return match &entry.role {
                Role::Prefix { .. } | Role::Infix { .. } | Role::Postfix { .. } => {
                    self.serialize_operator(expr, entry, level)
                }
                Role::Matchfix { .. } => {
                    replace_latex(&entry.template, &[self.serialize_ops(expr, level)])
                }
                Role::Environment => self.environment(expr, entry, level),
                Role::Identifier | Role::Function if expr.nops() == 0 => entry.template.clone(),
                Role::Identifier | Role::Function => {
                    join_latex([entry.template.clone(), self.wrap_arguments(expr, level)])
                }
            };
        }
        if head.starts_with('\\') {
            let mut latex = head.to_owned();
            for op in expr.ops() {
                latex.push('{');
                latex.push_str(&self.serialize_at(op, level + 1));
                latex.push('}');
            }
            return latex;
        }
        if head.chars().all(|c| c.is_alphanumeric() || c == '_') && !head.is_empty() {
            return join_latex([
                encode(head, IdentifierStyle::Upright),
                self.wrap_arguments(expr, level),
            ]);
        }
        self.warn(Warning::Unserializable(format!("function head `{head}`")));
        let mut args = vec![format!(r"\text{{{head}}}")];
        args.extend(expr.ops().iter().map(|op| self.serialize_at(op, level + 1)));
        format!(r"\operatorname{{apply}}({})", args.join(", "))
    }

    /// Render a prefix, infix or postfix operator with its template
    ///
    /// Infix operators fold their operands from the left. The operand on the side the operator
    /// doesn't group on is wrapped one precedence tighter, so `a-(b-c)` keeps its fences while
    /// `a-b-c` needs none.
    pub fn serialize_operator(
        &self,
        expr: &Expression,
        entry: &IndexedEntry,
        level: usize,
    ) -> String {
        let Some(precedence) = entry.precedence() else {
            return entry.template.clone();
        };
        let tighter = precedence.saturating_add(1);
        let ops = expr.ops();
        let head = entry.head();
        match entry.role {
            Role::Prefix { .. } | Role::Postfix { .. } => {
                if ops.len() != 1 {
                    self.warn(Warning::OperandCount {
                        head,
                        expected: 1,
                        actual: ops.len(),
                    });
                }
                let operand_precedence = match entry.role {
                    Role::Prefix { .. } => tighter,
                    _ => precedence,
                };
                let operand = match ops.first() {
                    Some(op) => self.wrap(op, Some(operand_precedence), level + 1),
                    None => self.missing(),
                };
                replace_latex(&entry.template, &[operand])
            }
            _ => {
                let (first_precedence, rest_precedence) = match entry.role.associativity() {
                    Associativity::Left => (precedence, tighter),
                    Associativity::Right => (tighter, precedence),
                };
                if ops.len() < 2 {
                    self.warn(Warning::OperandCount {
                        head,
                        expected: 2,
                        actual: ops.len(),
                    });
                }
                let mut latex = match ops.first() {
                    Some(op) => self.wrap(op, Some(first_precedence), level + 1),
                    None => self.missing(),
                };
                let mut folded = false;
                for op in &ops[1.min(ops.len())..] {
                    let rhs = self.wrap(op, Some(rest_precedence), level + 1);
                    latex = replace_latex(&entry.template, &[latex, rhs]);
                    folded = true;
                }
                if !folded {
                    latex = replace_latex(&entry.template, &[latex, self.missing()]);
                }
                latex
            }
        }
    }

    fn environment(&self, expr: &Expression, entry: &IndexedEntry, level: usize) -> String {
        let name = entry.trigger.concat();
        let rows: Vec<_> = expr
            .op(1)
            .map(Expression::ops)
            .unwrap_or_default()
            .iter()
            .map(|row| {
                let cells: Vec<_> = row
                    .ops()
                    .iter()
                    .map(|cell| self.serialize_at(cell, level + 1))
                    .collect();
                cells.join(" & ")
            })
            .collect();
        format!(r"\begin{{{name}}}{}\end{{{name}}}", rows.join(r"\\"))
    }
}

#[cfg(test)]
mod tests {
    use super::{replace_latex, Serializer};
    use crate::dictionary::DEFAULT_INDEX;
    use crate::options::{GroupStyle, Options};
    use crate::tree::Expression;
    use crate::warning::{ignore_warnings, Warning, WarningSink};
    use std::sync::{Arc, Mutex};

    fn func<const N: usize>(head: &str, ops: [Expression; N]) -> Expression {
        Expression::function(head, ops)
    }

    fn sym(name: &str) -> Expression {
        Expression::symbol(name)
    }

    fn num(text: &str) -> Expression {
        Expression::number(text)
    }

    fn render(expr: &Expression) -> String {
        let options = Options::default();
        let sink = ignore_warnings();
        Serializer::new(&options, &DEFAULT_INDEX, &sink).serialize(expr)
    }

    #[test]
    fn templates() {
        assert_eq!(replace_latex("#1+#2", &["a".into(), "b".into()]), "a+b");
        assert_eq!(replace_latex(r"\frac{#1}{#2}", &["#2".into(), "b".into()]), r"\frac{#2}{b}");
        assert_eq!(replace_latex(r"\#1", &[]), r"\#1");
        assert_eq!(replace_latex(r"#1\times#2", &[r"\pi".into(), "x".into()]), r"\pi\times x");
    }

    #[test]
    fn fences_by_precedence() {
        let sum = func("Add", [sym("a"), sym("b")]);
        let product = func("Multiply", [sym("a"), sym("b")]);
        assert_eq!(render(&func("Multiply", [sum.clone(), sym("c")])), r"(a+b)\times c");
        assert_eq!(render(&func("Add", [product, sym("c")])), r"a\times b+c");
        assert_eq!(render(&func("Subtract", [sym("a"), func("Subtract", [sym("b"), sym("c")])])), "a-(b-c)");
        assert_eq!(render(&func("Subtract", [func("Subtract", [sym("a"), sym("b")]), sym("c")])), "a-b-c");
        assert_eq!(render(&func("Negate", [sum.clone()])), "-(a+b)");
        assert_eq!(render(&func("Power", [sum, num("2")])), "(a+b)^{2}");
        assert_eq!(render(&func("Multiply", [num("-2"), sym("x")])), r"(-2)\times x");
        assert_eq!(render(&func("Subtract", [num("-2"), sym("x")])), "-2-x");
    }

    #[test]
    fn group_styles() {
        let options = Options {
            group_style: Arc::new(|_, level| if level > 1 { GroupStyle::Big } else { GroupStyle::LeftRight }),
            ..Options::default()
        };
        let sink = ignore_warnings();
        let serializer = Serializer::new(&options, &DEFAULT_INDEX, &sink);
        let inner = func("Add", [sym("a"), sym("b")]);
        let expr = func("Multiply", [func("Add", [func("Multiply", [inner, sym("c")]), sym("d")]), sym("e")]);
        assert_eq!(
            serializer.serialize(&expr),
            r"\left(\Bigl(a+b\Bigr)\times c+d\right)\times e"
        );
    }

    #[test]
    fn unknown_functions() {
        assert_eq!(render(&func("f", [sym("x")])), r"\mathrm{f}(x)");
        assert_eq!(render(&func("speed", [sym("x"), sym("y")])), r"\mathrm{speed}(x, y)");
        assert_eq!(render(&func(r"\foo", [sym("x"), num("1")])), r"\foo{x}{1}");
    }

    #[test]
    fn atoms() {
        assert_eq!(render(&sym("alpha_hat")), r"\hat{\alpha}");
        assert_eq!(render(&sym("Pi")), r"\pi");
        assert_eq!(render(&num("1234.5")), r"1\,234.5");
        assert_eq!(render(&Expression::string("hi")), r"\text{hi}");
        let table = Expression::Dictionary(vec![("a".into(), num("1"))]);
        assert_eq!(
            render(&table),
            r"\left\lbrack\begin{array}{lll}\textbf{a} & \rightarrow & 1\end{array}\right\rbrack"
        );
    }

    #[test]
    fn text_is_escaped() {
        let text = Expression::string(r"a}b\c{");
        let latex = render(&text);
        assert_eq!(latex, r"\text{a\}b\textbackslash{}c\{}");
        assert_eq!(crate::parse(&latex), text);
    }

    #[test]
    fn provenance() {
        let options = Options::default();
        let sink = ignore_warnings();
        let expr = sym("x").annotate(r"\mathit{x}");
        let serializer = Serializer::new(&options, &DEFAULT_INDEX, &sink);
        assert_eq!(serializer.serialize(&expr), r"\mathit{x}");
        let serializer = Serializer::new(&options, &DEFAULT_INDEX, &sink).canonical(true);
        assert_eq!(serializer.serialize(&expr), "x");
    }

    #[test]
    fn best_effort_operators() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner = seen.clone();
        let sink: WarningSink = Arc::new(move |warnings: &[Warning]| {
            inner.lock().unwrap().extend_from_slice(warnings)
        });
        let options = Options::default();
        let serializer = Serializer::new(&options, &DEFAULT_INDEX, &sink);
        assert_eq!(serializer.serialize(&func("Factorial", [sym("a"), sym("b")])), "a!");
        assert_eq!(serializer.serialize(&func("Equal", [sym("a")])), r"a=\blacksquare");
        assert_eq!(serializer.serialize(&num("x1")), "");
        assert_eq!(
            *seen.lock().unwrap(),
            [
                Warning::OperandCount {
                    head: "Factorial".into(),
                    expected: 1,
                    actual: 2
                },
                Warning::OperandCount {
                    head: "Equal".into(),
                    expected: 2,
                    actual: 1
                },
                Warning::Unserializable("number `x1`".into()),
            ]
        );
    }
}
