//! `\newacronym` definitions from the glossaries package.

use crate::model::{AcronymEntry, AcronymTable};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Replacement short and long names for a key whose LaTeX definition does
/// not survive as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcronymOverride {
    pub shortname: String,
    pub longname: String,
}

/// Default overrides for the manuscript's acronym file.
pub fn default_overrides() -> BTreeMap<String, AcronymOverride> {
    BTreeMap::from([(
        "chidl".to_string(),
        AcronymOverride {
            shortname: "$\\chi$DL".to_string(),
            longname: "chemical description language".to_string(),
        },
    )])
}

static RE_LONG_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\newacronym\[long=(.*?)\]\{(.*?)\}\{(.*?)\}\{.*?\}").unwrap()
});

static RE_BASIC_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\newacronym\{(.*?)\}\{(.*?)\}\{(.*?)\}").unwrap());

/// Parses acronym definitions.
///
/// Definitions with a `long=` option are read first; plain three-argument
/// definitions only add keys not yet seen. A plain long name that points to
/// the glossary, e.g. `Foo (See glossary \ref{x})`, is cut before the
/// parenthesis. Overrides replace the parsed names of keys that are
/// defined; overrides for undefined keys are ignored.
pub fn parse_acronyms(
    content: &str,
    overrides: &BTreeMap<String, AcronymOverride>,
) -> AcronymTable {
    let mut table = AcronymTable::new();

    for caps in RE_LONG_FORM.captures_iter(content) {
        table.insert(AcronymEntry::new(&caps[2], &caps[3], &caps[1]));
    }

    for caps in RE_BASIC_FORM.captures_iter(content) {
        let key = &caps[1];
        if table.contains(key) {
            continue;
        }

        let mut longname = caps[3].to_string();
        if longname.contains('\\') && longname.contains("See glossary") {
            if let Some((head, _)) = longname.split_once('(') {
                longname = head.trim().to_string();
            }
        }
        table.insert(AcronymEntry::new(key, &caps[2], longname));
    }

    for (key, o) in overrides {
        if table.contains(key) {
            table.upsert(AcronymEntry::new(key, o.shortname.clone(), o.longname.clone()));
        }
    }

    table
}
