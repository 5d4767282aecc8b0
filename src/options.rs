//! Options controlling how expressions are rendered
//!
//! Style selectors are functions of the expression being rendered and its nesting level, so a
//! rendering can vary with depth, e.g. switching to inline fractions deep inside an expression.
//!
//! ```
//! use mathjson_notation::options::{Options, PartialOptions};
//!
//! let mut options = Options::default();
//! let partial: PartialOptions = serde_json::from_str(r#"{"multiply": "\\cdot"}"#).unwrap();
//! assert!(options.merge(partial).is_empty());
//! assert_eq!(options.multiply, r"\cdot");
//! ```
use crate::tree::Expression;
use crate::warning::Warning;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Fences placed around a subexpression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupStyle {
    /// `(..)`
    Paren,
    /// `\left(..\right)`
    LeftRight,
    /// `\Bigl(..\Bigr)`
    Big,
    /// No fences
    None,
}

/// Renderings of square roots and roots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootStyle {
    /// `\sqrt[n]{x}`
    Radical,
    /// `x^{\frac{1}{n}}`
    Quotient,
    /// `x^{1/n}`
    Solidus,
}

/// Renderings of quotients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FractionStyle {
    /// `\frac{a}{b}`
    Quotient,
    /// `a/b`
    InlineSolidus,
    /// `^{a}\!\!/\!_{b}`
    NiceSolidus,
    /// `a\cdot b^{-1}`
    Reciprocal,
    /// `\frac{1}{b}a`
    Factor,
}

/// Renderings of boolean operators and constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogicStyle {
    /// `\operatorname{and}`
    Word,
    /// `\land`
    Boolean,
    /// `\operatorname{AND}`
    UppercaseWord,
    /// `\&`
    Punctuation,
}

/// Renderings of fractional exponents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerStyle {
    /// `\sqrt{x}` for an exponent of one half
    Root,
    /// `x^{1/2}`
    Solidus,
    /// `x^{\frac{1}{2}}`
    Quotient,
    /// `\frac{1}{x}` for an exponent of minus one
    Reciprocal,
}

/// Renderings of the numeric sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumericSetStyle {
    /// `\R`
    Compact,
    /// `\mathbb{R}`
    Regular,
    /// `\rbrack-\infty, \infty\lbrack`
    Interval,
    /// `\lbrace x\in\mathbb{R}\rbrace`
    SetBuilder,
}

/// Decimal and exponent markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExponentStyle {
    /// `1.2\cdot10^{5}`
    Power,
    /// `1.2\mathrm{e}5`
    E,
}

/// Renderings of repeating decimals like `0.(3)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatingDecimalStyle {
    /// `0.\overline{3}`
    Overline,
    /// `0.(3)`
    Parentheses,
    /// The repeating part written out once, `0.3`
    None,
}

/// Number formatting
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberFormat {
    /// Separates the whole and fractional parts
    pub decimal_marker: String,
    /// Inserted between groups of digits
    pub group_separator: String,
    /// Digits per group, 0 disables grouping
    pub digit_group: usize,
    /// How exponents are written
    pub exponent_style: ExponentStyle,
    /// How repeating decimals are written
    pub repeating_decimal: RepeatingDecimalStyle,
    /// The rendering of `NaN`
    pub not_a_number: String,
    /// The rendering of `Infinity`
    pub positive_infinity: String,
    /// The rendering of `-Infinity`
    pub negative_infinity: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            decimal_marker: ".".into(),
            group_separator: r"\,".into(),
            digit_group: 3,
            exponent_style: ExponentStyle::Power,
            repeating_decimal: RepeatingDecimalStyle::Overline,
            not_a_number: r"\operatorname{NaN}".into(),
            positive_infinity: r"\infty".into(),
            negative_infinity: r"-\infty".into(),
        }
    }
}

/// A style selector, called with the expression and its nesting level
pub type StyleFn<T> = Arc<dyn Fn(&Expression, usize) -> T + Send + Sync>;

/// Returns a selector that always picks the same style
pub fn constant<T: Copy + Send + Sync + 'static>(style: T) -> StyleFn<T> {
    Arc::new(move |_, _| style)
}

/// Rendering options
#[derive(Clone)]
pub struct Options {
    /// Template between a number and a following symbol in a product, empty for `multiply`
    pub invisible_multiply: String,
    /// Template between an integer and a following fraction in a sum, empty for `+`
    pub invisible_plus: String,
    /// The explicit multiplication operator
    pub multiply: String,
    /// Rendering of a missing operand
    pub missing_symbol: String,
    /// Keep the source markup on parsed expressions
    pub preserve_latex: bool,
    /// Number formatting
    pub number: NumberFormat,
    /// Fences around function arguments
    pub apply_function_style: StyleFn<GroupStyle>,
    /// Fences around subexpressions
    pub group_style: StyleFn<GroupStyle>,
    /// Rendering of roots
    pub root_style: StyleFn<RootStyle>,
    /// Rendering of quotients
    pub fraction_style: StyleFn<FractionStyle>,
    /// Rendering of boolean operators
    pub logic_style: StyleFn<LogicStyle>,
    /// Rendering of fractional exponents
    pub power_style: StyleFn<PowerStyle>,
    /// Rendering of numeric sets
    pub numeric_set_style: StyleFn<NumericSetStyle>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            invisible_multiply: String::new(),
            invisible_plus: String::new(),
            multiply: r"\times".into(),
            missing_symbol: r"\blacksquare".into(),
            preserve_latex: false,
            number: NumberFormat::default(),
            apply_function_style: constant(GroupStyle::Paren),
            group_style: constant(GroupStyle::Paren),
            root_style: constant(RootStyle::Radical),
            fraction_style: constant(FractionStyle::Quotient),
            logic_style: constant(LogicStyle::Boolean),
            power_style: constant(PowerStyle::Quotient),
            numeric_set_style: constant(NumericSetStyle::Compact),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("invisible_multiply", &self.invisible_multiply)
            .field("invisible_plus", &self.invisible_plus)
            .field("multiply", &self.multiply)
            .field("missing_symbol", &self.missing_symbol)
            .field("preserve_latex", &self.preserve_latex)
            .field("number", &self.number)
            .finish_non_exhaustive()
    }
}

/// Options where anything not given is left alone when merged
///
/// Styles are given as constants since selector functions can't be read from configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialOptions {
    /// See [`Options::invisible_multiply`]
    pub invisible_multiply: Option<String>,
    /// See [`Options::invisible_plus`]
    pub invisible_plus: Option<String>,
    /// See [`Options::multiply`]
    pub multiply: Option<String>,
    /// See [`Options::missing_symbol`]
    pub missing_symbol: Option<String>,
    /// See [`Options::preserve_latex`]
    pub preserve_latex: Option<bool>,
    /// See [`Options::number`]
    pub number: Option<NumberFormat>,
    /// See [`Options::apply_function_style`]
    pub apply_function_style: Option<GroupStyle>,
    /// See [`Options::group_style`]
    pub group_style: Option<GroupStyle>,
    /// See [`Options::root_style`]
    pub root_style: Option<RootStyle>,
    /// See [`Options::fraction_style`]
    pub fraction_style: Option<FractionStyle>,
    /// See [`Options::logic_style`]
    pub logic_style: Option<LogicStyle>,
    /// See [`Options::power_style`]
    pub power_style: Option<PowerStyle>,
    /// See [`Options::numeric_set_style`]
    pub numeric_set_style: Option<NumericSetStyle>,
}

fn check_template(option: &'static str, value: &str) -> Result<(), Warning> {
    if value.is_empty() || (value.contains("#1") && value.contains("#2")) {
        Ok(())
    } else {
        Err(Warning::ExpectedArgument {
            option,
            value: value.to_owned(),
        })
    }
}

impl Options {
    /// Overwrite the options set in `partial`
    ///
    /// An invisible operator template without both placeholders is rejected with a warning and
    /// the previous value is kept.
    pub fn merge(&mut self, partial: PartialOptions) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if let Some(template) = partial.invisible_multiply {
            match check_template("invisibleMultiply", &template) {
                Ok(()) => self.invisible_multiply = template,
                Err(warning) => warnings.push(warning),
            }
        }
        if let Some(template) = partial.invisible_plus {
            match check_template("invisiblePlus", &template) {
                Ok(()) => self.invisible_plus = template,
                Err(warning) => warnings.push(warning),
            }
        }
        if let Some(multiply) = partial.multiply {
            self.multiply = multiply;
        }
        if let Some(missing) = partial.missing_symbol {
            self.missing_symbol = missing;
        }
        if let Some(preserve) = partial.preserve_latex {
            self.preserve_latex = preserve;
        }
        if let Some(number) = partial.number {
            self.number = number;
        }
        if let Some(style) = partial.apply_function_style {
            self.apply_function_style = constant(style);
        }
        if let Some(style) = partial.group_style {
            self.group_style = constant(style);
        }
        if let Some(style) = partial.root_style {
            self.root_style = constant(style);
        }
        if let Some(style) = partial.fraction_style {
            self.fraction_style = constant(style);
        }
        if let Some(style) = partial.logic_style {
            self.logic_style = constant(style);
        }
        if let Some(style) = partial.power_style {
            self.power_style = constant(style);
        }
        if let Some(style) = partial.numeric_set_style {
            self.numeric_set_style = constant(style);
        }
        warnings
    }
}
