//! Implicit tag resolution.
//!
//! Untagged plain scalars get their tag from a list of regular expressions,
//! consulted in registration order; the first match wins and anything that
//! matches nothing is a string. To keep lookups cheap each expression is
//! registered under the characters a matching value can start with, plus an
//! optional wildcard bucket consulted for every value.
//!
//! The YAML 1.1 int and float forms are matched with one difference: a
//! digit run made only of `_` separators (`0x_`, `0b_`, `._`) does not count
//! as a number, so such scalars resolve as strings.
//!
//! ```rust
//! use serde_yamlet::events::ImplicitFlags;
//! use serde_yamlet::nodes::NodeType;
//! use serde_yamlet::resolver::{Resolver, BOOL_TAG, INT_TAG, STR_TAG};
//!
//! let resolver = Resolver::new();
//! let plain = ImplicitFlags::new(true, false);
//! assert_eq!(resolver.resolve(NodeType::Scalar, "0x1F", plain), INT_TAG);
//! assert_eq!(resolver.resolve(NodeType::Scalar, "Yes", plain), BOOL_TAG);
//! assert_eq!(resolver.resolve(NodeType::Scalar, "hello", plain), STR_TAG);
//! ```

use crate::events::ImplicitFlags;
use crate::nodes::NodeType;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const NULL_TAG: &str = "tag:yaml.org,2002:null";
pub const BOOL_TAG: &str = "tag:yaml.org,2002:bool";
pub const INT_TAG: &str = "tag:yaml.org,2002:int";
pub const FLOAT_TAG: &str = "tag:yaml.org,2002:float";
pub const STR_TAG: &str = "tag:yaml.org,2002:str";
pub const TIMESTAMP_TAG: &str = "tag:yaml.org,2002:timestamp";
pub const BINARY_TAG: &str = "tag:yaml.org,2002:binary";
pub const MERGE_TAG: &str = "tag:yaml.org,2002:merge";
pub const VALUE_TAG: &str = "tag:yaml.org,2002:value";
pub const YAML_TAG: &str = "tag:yaml.org,2002:yaml";
pub const SEQ_TAG: &str = "tag:yaml.org,2002:seq";
pub const MAP_TAG: &str = "tag:yaml.org,2002:map";
pub const OMAP_TAG: &str = "tag:yaml.org,2002:omap";
pub const PAIRS_TAG: &str = "tag:yaml.org,2002:pairs";
pub const SET_TAG: &str = "tag:yaml.org,2002:set";

pub const DEFAULT_SCALAR_TAG: &str = STR_TAG;
pub const DEFAULT_SEQUENCE_TAG: &str = SEQ_TAG;
pub const DEFAULT_MAPPING_TAG: &str = MAP_TAG;

const BOOL_PATTERN: &str =
    r"^(?:yes|Yes|YES|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF)$";

const FLOAT_PATTERN: &str = concat!(
    r"^(?:[-+]?(?:[0-9][0-9_]*)\.[0-9_]*(?:[eE][-+][0-9]+)?",
    r"|\._*[0-9][0-9_]*(?:[eE][-+][0-9]+)?",
    r"|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*",
    r"|[-+]?\.(?:inf|Inf|INF)",
    r"|\.(?:nan|NaN|NAN))$",
);

const INT_PATTERN: &str = concat!(
    r"^(?:[-+]?0b_*[0-1][0-1_]*",
    r"|[-+]?0o_*[0-7][0-7_]*",
    r"|[-+]?0[0-7_]+",
    r"|[-+]?(?:0|[1-9][0-9_]*)",
    r"|[-+]?0x_*[0-9a-fA-F][0-9a-fA-F_]*",
    r"|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+)$",
);

const MERGE_PATTERN: &str = r"^(?:<<)$";

const NULL_PATTERN: &str = r"^(?:~|null|Null|NULL|)$";

const TIMESTAMP_PATTERN: &str = concat!(
    r"^(?:[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]",
    r"|[0-9][0-9][0-9][0-9]-[0-9][0-9]?-[0-9][0-9]?",
    r"(?:[Tt]|[ \t]+)[0-9][0-9]?",
    r":[0-9][0-9]:[0-9][0-9](?:\.[0-9]*)?",
    r"(?:[ \t]*(?:Z|[-+][0-9][0-9]?(?::[0-9][0-9])?))?)$",
);

const VALUE_PATTERN: &str = r"^(?:=)$";

const YAML_PATTERN: &str = r"^(?:!|&|\*)$";

/// Bucket an implicit resolver is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum FirstChar {
    /// The empty scalar.
    Empty,
    Char(char),
    /// Consulted for every value.
    Any,
}

#[derive(Clone, Debug)]
struct ImplicitResolver {
    tag: String,
    regex: Regex,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid resolver pattern")
}

/// `(tag, regex, first characters, matches the empty scalar)` in registration
/// order.
fn default_resolvers() -> &'static [(&'static str, Regex, &'static str, bool)] {
    static DEFAULTS: OnceLock<Vec<(&'static str, Regex, &'static str, bool)>> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        vec![
            (BOOL_TAG, compile(BOOL_PATTERN), "yYnNtTfFoO", false),
            (FLOAT_TAG, compile(FLOAT_PATTERN), "-+0123456789.", false),
            (INT_TAG, compile(INT_PATTERN), "-+0123456789", false),
            (MERGE_TAG, compile(MERGE_PATTERN), "<", false),
            (NULL_TAG, compile(NULL_PATTERN), "~nN", true),
            (TIMESTAMP_TAG, compile(TIMESTAMP_PATTERN), "0123456789", false),
            (VALUE_TAG, compile(VALUE_PATTERN), "=", false),
            (YAML_TAG, compile(YAML_PATTERN), "!&*", false),
        ]
    })
}

/// Maps untagged nodes to tags.
#[derive(Clone, Debug)]
pub struct Resolver {
    implicit: HashMap<FirstChar, Vec<ImplicitResolver>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Creates a resolver with the YAML 1.1 implicit types.
    #[must_use]
    pub fn new() -> Self {
        let mut resolver = Self::empty();
        for (tag, regex, first, empty) in default_resolvers() {
            resolver.register(tag, regex.clone(), Some(*first));
            if *empty {
                resolver.register(tag, regex.clone(), Some(""));
            }
        }
        resolver
    }

    /// Creates a resolver that resolves every scalar to `!!str`.
    #[must_use]
    pub fn empty() -> Self {
        Resolver {
            implicit: HashMap::new(),
        }
    }

    /// Registers an implicit resolver.
    ///
    /// `first` lists the characters a matching value may start with; `""`
    /// registers for the empty scalar and `None` for every value.
    pub fn add_implicit_resolver(&mut self, tag: impl Into<String>, regex: Regex, first: Option<&str>) {
        self.register(&tag.into(), regex, first);
    }

    fn register(&mut self, tag: &str, regex: Regex, first: Option<&str>) {
        let keys: Vec<FirstChar> = match first {
            None => vec![FirstChar::Any],
            Some("") => vec![FirstChar::Empty],
            Some(chars) => chars.chars().map(FirstChar::Char).collect(),
        };
        for key in keys {
            self.implicit.entry(key).or_default().push(ImplicitResolver {
                tag: tag.to_string(),
                regex: regex.clone(),
            });
        }
    }

    /// Returns the tag for a node whose tag was left implicit.
    ///
    /// Scalars are matched against the registered expressions only when
    /// `implicit.plain` is set; otherwise, and for collections, the default
    /// tag of the kind is returned.
    #[must_use]
    pub fn resolve(&self, kind: NodeType, value: &str, implicit: ImplicitFlags) -> String {
        match kind {
            NodeType::Scalar => {
                if implicit.plain {
                    let key = value.chars().next().map_or(FirstChar::Empty, FirstChar::Char);
                    let candidates = self
                        .implicit
                        .get(&key)
                        .into_iter()
                        .chain(self.implicit.get(&FirstChar::Any))
                        .flatten();
                    for resolver in candidates {
                        if resolver.regex.is_match(value) {
                            return resolver.tag.clone();
                        }
                    }
                }
                DEFAULT_SCALAR_TAG.to_string()
            }
            NodeType::Sequence => DEFAULT_SEQUENCE_TAG.to_string(),
            NodeType::Mapping => DEFAULT_MAPPING_TAG.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(value: &str) -> String {
        Resolver::new().resolve(NodeType::Scalar, value, ImplicitFlags::new(true, false))
    }

    #[test]
    fn test_null_forms() {
        for value in ["", "~", "null", "Null", "NULL"] {
            assert_eq!(resolve(value), NULL_TAG, "{:?}", value);
        }
        assert_eq!(resolve("nULL"), STR_TAG);
    }

    #[test]
    fn test_bool_forms() {
        for value in ["yes", "No", "TRUE", "off", "On"] {
            assert_eq!(resolve(value), BOOL_TAG, "{:?}", value);
        }
        assert_eq!(resolve("y"), STR_TAG);
    }

    #[test]
    fn test_int_forms() {
        for value in ["0", "-17", "+1_000", "0b1010", "0o17", "017", "0xFF", "1:30", "0x_f"] {
            assert_eq!(resolve(value), INT_TAG, "{:?}", value);
        }
        for value in ["0b_", "0x_", "-0o__", "0b2"] {
            assert_eq!(resolve(value), STR_TAG, "{:?}", value);
        }
    }

    #[test]
    fn test_float_forms() {
        for value in ["1.0", "-1.5e+3", ".5", "1:30.5", ".inf", "-.Inf", ".NaN", "1."] {
            assert_eq!(resolve(value), FLOAT_TAG, "{:?}", value);
        }
        assert_eq!(resolve("1e3"), STR_TAG);
        assert_eq!(resolve("._5"), FLOAT_TAG);
        assert_eq!(resolve("._"), STR_TAG);
    }

    #[test]
    fn test_timestamp_forms() {
        for value in [
            "2001-12-14",
            "2001-12-14t21:59:43.10-05:00",
            "2001-12-14 21:59:43.10 -5",
            "2001-12-15T02:59:43.1Z",
        ] {
            assert_eq!(resolve(value), TIMESTAMP_TAG, "{:?}", value);
        }
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(resolve("<<"), MERGE_TAG);
        assert_eq!(resolve("="), VALUE_TAG);
        assert_eq!(resolve("!"), YAML_TAG);
    }

    #[test]
    fn test_quoted_scalars_are_strings() {
        let resolver = Resolver::new();
        assert_eq!(
            resolver.resolve(NodeType::Scalar, "1", ImplicitFlags::new(false, true)),
            STR_TAG
        );
    }

    #[test]
    fn test_collections() {
        let resolver = Resolver::new();
        let flags = ImplicitFlags::default();
        assert_eq!(resolver.resolve(NodeType::Sequence, "", flags), SEQ_TAG);
        assert_eq!(resolver.resolve(NodeType::Mapping, "", flags), MAP_TAG);
    }

    #[test]
    fn test_custom_wildcard_resolver() {
        let mut resolver = Resolver::empty();
        resolver.add_implicit_resolver("!upper", Regex::new("^[A-Z]+$").unwrap(), None);
        let flags = ImplicitFlags::new(true, false);
        assert_eq!(resolver.resolve(NodeType::Scalar, "ABC", flags), "!upper");
        assert_eq!(resolver.resolve(NodeType::Scalar, "1", flags), STR_TAG);
    }
}
