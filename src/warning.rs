//! Non-fatal signals raised while indexing, parsing or serializing
//!
//! Structural problems with the markup never surface here, they become
//! [`Error`][crate::tree::ErrorCode] nodes in the parsed tree instead. A [`Warning`] reports a
//! problem with the configuration, or an expression that can only be rendered on a best-effort
//! basis. Warnings are delivered in batches to a [`WarningSink`] and never change control flow.
use crate::dictionary::Kind;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// A problem that doesn't prevent producing a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    /// A prefix, infix or postfix entry without a precedence
    #[error("{kind} entry `{entry}` has no precedence")]
    MissingPrecedence {
        /// The kind of the entry
        kind: Kind,
        /// The entry's name or trigger
        entry: String,
    },
    /// An entry that can never be triggered
    #[error("{kind} entry `{entry}` has no trigger")]
    MissingTrigger {
        /// The kind of the entry
        kind: Kind,
        /// The entry's name or trigger
        entry: String,
    },
    /// A matchfix entry without a closing trigger
    #[error("matchfix entry `{entry}` has no close trigger")]
    MissingCloseTrigger {
        /// The entry's name or open trigger
        entry: String,
    },
    /// A parse alias that doesn't name any entry in the dictionary
    #[error("`{trigger}` parses as `{alias}` which is not defined")]
    UnknownAlias {
        /// The trigger of the aliasing entry
        trigger: String,
        /// The alias
        alias: String,
    },
    /// An operator applied to the wrong number of operands
    #[error("`{head}` expects {expected} operand(s) but has {actual}")]
    OperandCount {
        /// The operator's head
        head: String,
        /// How many operands the operator takes
        expected: usize,
        /// How many operands it was given
        actual: usize,
    },
    /// A template option that needs `#1` and `#2` placeholders
    #[error("option `{option}` must contain `#1` and `#2`, got `{value}`")]
    ExpectedArgument {
        /// The option name
        option: &'static str,
        /// The rejected value
        value: String,
    },
    /// An expression that has no rendering
    #[error("cannot serialize {0}")]
    Unserializable(String),
}

/// A callback that receives warnings in batches
pub type WarningSink = Arc<dyn Fn(&[Warning]) + Send + Sync>;

/// The default sink, which reports every warning as a `tracing` event
pub fn log_warnings() -> WarningSink {
    Arc::new(|warnings| {
        for warning in warnings {
            warn!(%warning, "notation warning");
        }
    })
}

/// A sink that drops everything
pub fn ignore_warnings() -> WarningSink {
    Arc::new(|_| {})
}

#[cfg(test)]
mod tests {
    use super::Warning;
    use crate::dictionary::Kind;

    #[test]
    fn messages() {
        let warning = Warning::MissingPrecedence {
            kind: Kind::Infix,
            entry: "<".into(),
        };
        assert_eq!(warning.to_string(), "infix entry `<` has no precedence");
        let warning = Warning::OperandCount {
            head: "Factorial".into(),
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            warning.to_string(),
            "`Factorial` expects 1 operand(s) but has 2"
        );
    }
}
