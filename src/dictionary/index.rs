use super::{Associativity, Entry, Kind, ParseHandler, ParseRule, Precedence, SerializeHandler, SerializeRule};
use crate::tokenizer::join_latex;
use crate::trigger_map::{DefaultTriggerMap, TriggerMap};
use crate::warning::{Warning, WarningSink};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// The validated syntactic role of an indexed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// A symbol
    Identifier,
    /// A function
    Function,
    /// A prefix operator
    Prefix {
        /// Binding strength
        precedence: Precedence,
    },
    /// An infix operator
    Infix {
        /// Binding strength
        precedence: Precedence,
        /// Grouping of repeated operators
        associativity: Associativity,
    },
    /// A postfix operator
    Postfix {
        /// Binding strength
        precedence: Precedence,
    },
    /// A pair of delimiters
    Matchfix {
        /// The closing delimiter tokens
        close: Vec<String>,
    },
    /// A `\begin{..}..\end{..}` block
    Environment,
}

impl Role {
    /// The kind of entry this role came from
    pub fn kind(&self) -> Kind {
        match self {
            Role::Identifier => Kind::Identifier,
            Role::Function => Kind::Function,
            Role::Prefix { .. } => Kind::Prefix,
            Role::Infix { .. } => Kind::Infix,
            Role::Postfix { .. } => Kind::Postfix,
            Role::Matchfix { .. } => Kind::Matchfix,
            Role::Environment => Kind::Environment,
        }
    }

    /// The precedence of operators
    pub fn precedence(&self) -> Option<Precedence> {
        match self {
            Role::Prefix { precedence }
            | Role::Infix { precedence, .. }
            | Role::Postfix { precedence } => Some(*precedence),
            _ => None,
        }
    }

    /// The associativity of infix operators, everything else groups left
    pub fn associativity(&self) -> Associativity {
        match self {
            Role::Infix { associativity, .. } => *associativity,
            _ => Associativity::Left,
        }
    }
}

/// A validated entry
#[derive(Clone)]
pub struct IndexedEntry {
    /// The canonical name
    pub name: Option<String>,
    /// The trigger tokens
    pub trigger: Vec<String>,
    /// The syntactic role
    pub role: Role,
    /// The name this entry parses as, when aliased
    pub alias: Option<String>,
    /// A custom parse routine
    pub parse: Option<ParseHandler>,
    /// A custom serialize routine
    pub serialize: Option<SerializeHandler>,
    /// The serialize template, given or derived from the trigger
    pub template: String,
}

impl fmt::Debug for IndexedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedEntry")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("role", &self.role)
            .field("alias", &self.alias)
            .field("parse", &self.parse.as_ref().map(|_| ".."))
            .field("serialize", &self.serialize.as_ref().map(|_| ".."))
            .field("template", &self.template)
            .finish()
    }
}

impl IndexedEntry {
    /// The head of expressions parsed by this entry
    ///
    /// This is the entry's name, else its alias, else the markup of its trigger, so an unnamed
    /// command still produces a head that can be serialized back to the command.
    pub fn head(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.alias.clone())
            .unwrap_or_else(|| join_latex(&self.trigger))
    }

    /// The precedence of operators
    pub fn precedence(&self) -> Option<Precedence> {
        self.role.precedence()
    }
}

type Triggers = DefaultTriggerMap<Box<[usize]>>;

/// A dictionary indexed for lookup by name and by trigger
///
/// Lookups by trigger return every candidate whose trigger prefixes the upcoming tokens, longest
/// trigger first, with later registrations first among triggers of the same length.
#[derive(Debug, Clone)]
pub struct IndexedDictionary {
    entries: Vec<IndexedEntry>,
    by_name: HashMap<String, usize>,
    symbols: Triggers,
    prefix: Triggers,
    infix: Triggers,
    postfix: Triggers,
    matchfix: Triggers,
    closers: Triggers,
    environments: HashMap<String, Vec<usize>>,
}

impl IndexedDictionary {
    /// All indexed entries in registration order
    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    /// The number of indexed entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last registered entry with a canonical name
    pub fn by_name(&self, name: &str) -> Option<&IndexedEntry> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    fn triggers(&self, kind: Kind) -> Option<&Triggers> {
        match kind {
            Kind::Identifier | Kind::Function => Some(&self.symbols),
            Kind::Prefix => Some(&self.prefix),
            Kind::Infix => Some(&self.infix),
            Kind::Postfix => Some(&self.postfix),
            Kind::Matchfix => Some(&self.matchfix),
            Kind::Environment => None,
        }
    }

    fn expand<'s>(&'s self, found: Vec<(usize, &'s Box<[usize]>)>) -> Vec<(usize, &'s IndexedEntry)> {
        found
            .into_iter()
            .flat_map(|(len, group)| group.iter().rev().map(move |&idx| (len, &self.entries[idx])))
            .collect()
    }

    /// Entries of a kind whose trigger prefixes the tokens, with the trigger length
    ///
    /// Identifier and function entries share triggers, so looking up either kind returns both.
    /// Environments are found by name with [`environment`][IndexedDictionary::environment].
    pub fn lookup<'t, I>(&self, kind: Kind, tokens: I) -> Vec<(usize, &IndexedEntry)>
    where
        I: IntoIterator<Item = &'t str>,
    {
        match self.triggers(kind) {
            Some(triggers) => self.expand(triggers.get_prefixes(tokens)),
            None => Vec::new(),
        }
    }

    /// The length of the longest matchfix close trigger that prefixes the tokens
    pub fn match_close<'t, I>(&self, tokens: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'t str>,
    {
        self.closers
            .get_prefixes(tokens)
            .first()
            .map(|&(len, _)| len)
    }

    /// Environment entries with a name, later registrations first
    pub fn environment(&self, name: &str) -> Vec<&IndexedEntry> {
        self.environments
            .get(name)
            .map(|group| group.iter().rev().map(|&idx| &self.entries[idx]).collect())
            .unwrap_or_default()
    }
}

fn role(entry: &Entry) -> Result<Role, Warning> {
    let missing_precedence = || Warning::MissingPrecedence {
        kind: entry.kind,
        entry: entry.label(),
    };
    let missing_trigger = || Warning::MissingTrigger {
        kind: entry.kind,
        entry: entry.label(),
    };
    match entry.kind {
        Kind::Identifier | Kind::Function if entry.trigger.is_empty() && entry.name.is_none() => {
            Err(missing_trigger())
        }
        Kind::Identifier => Ok(Role::Identifier),
        Kind::Function => Ok(Role::Function),
        _ if entry.trigger.is_empty() => Err(missing_trigger()),
        Kind::Prefix => Ok(Role::Prefix {
            precedence: entry.precedence.ok_or_else(missing_precedence)?,
        }),
        Kind::Infix => Ok(Role::Infix {
            precedence: entry.precedence.ok_or_else(missing_precedence)?,
            associativity: entry.associativity,
        }),
        Kind::Postfix => Ok(Role::Postfix {
            precedence: entry.precedence.ok_or_else(missing_precedence)?,
        }),
        Kind::Matchfix if entry.close_trigger.is_empty() => Err(Warning::MissingCloseTrigger {
            entry: entry.label(),
        }),
        Kind::Matchfix => Ok(Role::Matchfix {
            close: entry.close_trigger.clone(),
        }),
        Kind::Environment => Ok(Role::Environment),
    }
}

fn default_template(entry: &Entry) -> String {
    let trigger = join_latex(&entry.trigger);
    match entry.kind {
        Kind::Prefix => format!("{trigger}#1"),
        Kind::Infix => format!("#1{trigger}#2"),
        Kind::Postfix => format!("#1{trigger}"),
        Kind::Matchfix => format!("{trigger}#1{}", join_latex(&entry.close_trigger)),
        _ => trigger,
    }
}

fn insert(triggers: &mut Vec<(Vec<String>, Vec<usize>)>, trigger: &[String], idx: usize) {
    match triggers.iter_mut().find(|(existing, _)| existing == trigger) {
        Some((_, group)) => group.push(idx),
        None => triggers.push((trigger.to_vec(), vec![idx])),
    }
}

fn build(triggers: Vec<(Vec<String>, Vec<usize>)>) -> Triggers {
    triggers
        .into_iter()
        .map(|(trigger, group)| (trigger, group.into_boxed_slice()))
        .collect()
}

/// Validate and index dictionary entries
///
/// Entries that can't be used are reported to `on_warning` and skipped, so a malformed entry
/// never prevents indexing the rest. An alias naming an unknown entry is reported but kept.
pub fn index(entries: &[Entry], on_warning: &WarningSink) -> IndexedDictionary {
    let names: HashSet<&str> = entries.iter().filter_map(|entry| entry.name.as_deref()).collect();
    let mut warnings = Vec::new();
    let mut indexed = Vec::with_capacity(entries.len());
    let mut by_name = HashMap::new();
    let mut symbols = Vec::new();
    let mut prefix = Vec::new();
    let mut infix = Vec::new();
    let mut postfix = Vec::new();
    let mut matchfix = Vec::new();
    let mut closers = Vec::new();
    let mut environments: HashMap<String, Vec<usize>> = HashMap::new();

    for entry in entries {
        let role = match role(entry) {
            Ok(role) => role,
            Err(warning) => {
                warnings.push(warning);
                continue;
            }
        };
        let (alias, parse) = match &entry.parse {
            Some(ParseRule::Alias(alias)) => {
                if !names.contains(alias.as_str()) {
                    warnings.push(Warning::UnknownAlias {
                        trigger: join_latex(&entry.trigger),
                        alias: alias.clone(),
                    });
                }
                (Some(alias.clone()), None)
            }
            Some(ParseRule::Custom(handler)) => (None, Some(handler.clone())),
            None => (None, None),
        };
        let (template, serialize) = match &entry.serialize {
            Some(SerializeRule::Template(template)) => (template.clone(), None),
            Some(SerializeRule::Custom(handler)) => (default_template(entry), Some(handler.clone())),
            None => (default_template(entry), None),
        };

        let idx = indexed.len();
        if let Some(name) = &entry.name {
            by_name.insert(name.clone(), idx);
        }
        if !entry.trigger.is_empty() {
            match &role {
                Role::Identifier | Role::Function => insert(&mut symbols, &entry.trigger, idx),
                Role::Prefix { .. } => insert(&mut prefix, &entry.trigger, idx),
                Role::Infix { .. } => insert(&mut infix, &entry.trigger, idx),
                Role::Postfix { .. } => insert(&mut postfix, &entry.trigger, idx),
                Role::Matchfix { close } => {
                    insert(&mut matchfix, &entry.trigger, idx);
                    insert(&mut closers, close, idx);
                }
                Role::Environment => environments
                    .entry(entry.trigger.concat())
                    .or_default()
                    .push(idx),
            }
        }
        indexed.push(IndexedEntry {
            name: entry.name.clone(),
            trigger: entry.trigger.clone(),
            role,
            alias,
            parse,
            serialize,
            template,
        });
    }

    debug!(
        indexed = indexed.len(),
        skipped = entries.len() - indexed.len(),
        "indexed dictionary"
    );
    if !warnings.is_empty() {
        on_warning(&warnings);
    }
    IndexedDictionary {
        entries: indexed,
        by_name,
        symbols: build(symbols),
        prefix: build(prefix),
        infix: build(infix),
        postfix: build(postfix),
        matchfix: build(matchfix),
        closers: build(closers),
        environments,
    }
}

#[cfg(test)]
mod tests {
    use super::index;
    use crate::dictionary::{Entry, Kind, Role};
    use crate::warning::{ignore_warnings, Warning, WarningSink};
    use std::sync::{Arc, Mutex};

    fn lookup_names(entries: &[Entry], kind: Kind, tokens: &[&str]) -> Vec<(usize, String)> {
        let dict = index(entries, &ignore_warnings());
        dict.lookup(kind, tokens.iter().copied())
            .into_iter()
            .map(|(len, entry)| (len, entry.head()))
            .collect()
    }

    #[test]
    fn longest_trigger_first() {
        let entries = [
            Entry::infix(r"\lt", 245).named("Less"),
            Entry::infix("<", 245).parse_as("Less"),
            Entry::infix("<=", 241).parse_as("LessEqual"),
            Entry::infix(r"\le", 241).named("LessEqual"),
        ];
        assert_eq!(
            lookup_names(&entries, Kind::Infix, &["<", "=", "b"]),
            [(2, "LessEqual".to_owned()), (1, "Less".to_owned())]
        );
    }

    #[test]
    fn later_registrations_first() {
        let entries = [
            Entry::infix("*", 390).named("Multiply"),
            Entry::infix("*", 390).named("Star"),
        ];
        assert_eq!(
            lookup_names(&entries, Kind::Infix, &["*"]),
            [(1, "Star".to_owned()), (1, "Multiply".to_owned())]
        );
        let dict = index(&entries, &ignore_warnings());
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn last_name_wins() {
        let entries = [
            Entry::identifier(r"\pi").named("Pi"),
            Entry::identifier(r"\varpi").named("Pi"),
        ];
        let dict = index(&entries, &ignore_warnings());
        assert_eq!(dict.by_name("Pi").map(|entry| entry.template.as_str()), Some(r"\varpi"));
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner = seen.clone();
        let sink: WarningSink = Arc::new(move |warnings: &[Warning]| {
            inner.lock().unwrap().extend_from_slice(warnings)
        });
        let mut no_precedence = Entry::infix("+", 275).named("Add");
        no_precedence.precedence = None;
        let entries = [
            no_precedence,
            Entry::new(Kind::Infix).named("Nothing"),
            Entry::new(Kind::Identifier),
            Entry::matchfix("(", "").named("Open"),
            Entry::infix("<", 245).parse_as("Less"),
            Entry::infix("-", 275).named("Subtract"),
        ];
        let dict = index(&entries, &sink);
        assert_eq!(dict.len(), 2);
        assert!(dict.by_name("Subtract").is_some());
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            [
                Warning::MissingPrecedence {
                    kind: Kind::Infix,
                    entry: "Add".into()
                },
                Warning::MissingTrigger {
                    kind: Kind::Infix,
                    entry: "Nothing".into()
                },
                Warning::MissingTrigger {
                    kind: Kind::Identifier,
                    entry: "".into()
                },
                Warning::MissingCloseTrigger {
                    entry: "Open".into()
                },
                Warning::UnknownAlias {
                    trigger: "<".into(),
                    alias: "Less".into()
                },
            ]
        );
    }

    #[test]
    fn roles_and_templates() {
        let entries = [
            Entry::postfix("!", 810).named("Factorial"),
            Entry::matchfix("|", "|").named("Abs"),
            Entry::environment("pmatrix").named("Matrix"),
        ];
        let dict = index(&entries, &ignore_warnings());
        let factorial = dict.by_name("Factorial").unwrap();
        assert_eq!(factorial.role, Role::Postfix { precedence: 810 });
        assert_eq!(factorial.template, "#1!");
        assert_eq!(dict.by_name("Abs").unwrap().template, "|#1|");
        assert_eq!(dict.match_close(["|", "x"]), Some(1));
        assert_eq!(dict.environment("pmatrix").len(), 1);
        assert!(dict.lookup(Kind::Environment, ["pmatrix"]).is_empty());
    }

    #[test]
    fn debug_hides_handlers() {
        let entries = [Entry::infix("+", 275)
            .named("Add")
            .serialize_with(|_, _, _| Ok("+".into()))];
        let dict = index(&entries, &ignore_warnings());
        let shown = format!("{:?}", dict.by_name("Add").unwrap());
        assert!(shown.contains(r#"serialize: Some("..")"#), "{shown}");
        assert!(shown.contains("parse: None"), "{shown}");
        assert!(!format!("{dict:?}").is_empty());
    }
}
