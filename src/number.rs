//! Rendering of numeric literals
use crate::options::{ExponentStyle, NumberFormat, RepeatingDecimalStyle};
use crate::warning::Warning;

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn group_digits(digits: &str, format: &NumberFormat, from_left: bool) -> String {
    let size = format.digit_group;
    if size == 0 || digits.len() <= size {
        return digits.to_owned();
    }
    // number of digits before the first separator
    let first = if from_left {
        size
    } else {
        match digits.len() % size {
            0 => size,
            rem => rem,
        }
    };
    let mut res = String::with_capacity(digits.len() * 2);
    let mut start = 0;
    let mut end = first;
    while start < digits.len() {
        if start > 0 {
            res.push_str(&format.group_separator);
        }
        res.push_str(&digits[start..end]);
        start = end;
        end = (end + size).min(digits.len());
    }
    res
}

struct Parts<'a> {
    negative: bool,
    whole: &'a str,
    fraction: &'a str,
    repeating: &'a str,
    exponent: &'a str,
}

fn split(text: &str) -> Option<Parts<'_>> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let (fraction, repeating) = match fraction.split_once('(') {
        Some((fixed, repeating)) => (fixed, repeating.strip_suffix(')')?),
        None => (fraction, ""),
    };
    let exponent = exponent.map(|exp| exp.strip_prefix('+').unwrap_or(exp));
    let exponent_digits = exponent.map(|exp| exp.strip_prefix('-').unwrap_or(exp));
    let valid = is_digits(whole)
        && is_digits(fraction)
        && is_digits(repeating)
        && exponent_digits.map_or(true, |exp| !exp.is_empty() && is_digits(exp))
        && !(whole.is_empty() && fraction.is_empty() && repeating.is_empty())
        && (mantissa.contains('.') || repeating.is_empty());
    valid.then_some(Parts {
        negative,
        whole,
        fraction,
        repeating,
        exponent: exponent.unwrap_or(""),
    })
}

/// Render the textual value of a number
///
/// Accepts decimal text with an optional sign, exponent and parenthesized repeating part, along
/// with `NaN` and signed `Infinity`.
pub(crate) fn serialize_number(text: &str, format: &NumberFormat) -> Result<String, Warning> {
    match text {
        "NaN" => return Ok(format.not_a_number.clone()),
        "Infinity" | "+Infinity" => return Ok(format.positive_infinity.clone()),
        "-Infinity" => return Ok(format.negative_infinity.clone()),
        _ => {}
    }
    let parts = split(text).ok_or_else(|| Warning::Unserializable(format!("number `{text}`")))?;

    let mut res = String::new();
    if parts.negative {
        res.push('-');
    }
    let whole = parts.whole.trim_start_matches('0');
    res.push_str(&group_digits(if whole.is_empty() { "0" } else { whole }, format, false));
    if !parts.fraction.is_empty() || !parts.repeating.is_empty() {
        res.push_str(&format.decimal_marker);
        res.push_str(&group_digits(parts.fraction, format, true));
        if !parts.repeating.is_empty() {
            match format.repeating_decimal {
                RepeatingDecimalStyle::Overline => {
                    res.push_str(&format!(r"\overline{{{}}}", parts.repeating))
                }
                RepeatingDecimalStyle::Parentheses => {
                    res.push_str(&format!(r"({})", parts.repeating))
                }
                RepeatingDecimalStyle::None => res.push_str(parts.repeating),
            }
        }
    }
    if !parts.exponent.is_empty() {
        let mantissa_is_one = res == "1" || res == "-1";
        match format.exponent_style {
            ExponentStyle::Power if mantissa_is_one => {
                res.truncate(res.len() - 1);
                res.push_str(&format!("10^{{{}}}", parts.exponent));
            }
            ExponentStyle::Power => res.push_str(&format!(r"\cdot10^{{{}}}", parts.exponent)),
            ExponentStyle::E => res.push_str(&format!(r"\mathrm{{e}}{}", parts.exponent)),
        }
    }
    Ok(res)
}
