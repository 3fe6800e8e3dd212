use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

/// Which side's incoming messages a table rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// GUI-originated keys, rewritten before they reach the microcontroller.
    Gui,
    /// Microcontroller-originated keys, rewritten before they reach the GUI.
    Micro,
}

impl Direction {
    /// Short label used in logs and output.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Gui => "gui",
            Direction::Micro => "micro",
        }
    }

    /// Map a translation-file direction tag to a direction.
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'G' => Some(Direction::Gui),
            'M' => Some(Direction::Micro),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Key to substitute-key mapping for one direction.
#[derive(Debug, Clone)]
pub struct TranslationTable {
    direction: Direction,
    mapping: HashMap<String, String>,
}

impl TranslationTable {
    /// Create an empty table.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            mapping: HashMap::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Insert or overwrite a mapping. Last write wins.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        debug!(direction = %self.direction, %key, %value, "adding mapping");
        self.mapping.insert(key, value);
    }

    /// Look up the substitute for `key`.
    pub fn find(&self, key: &str) -> Option<&str> {
        let found = self.mapping.get(key).map(String::as_str);
        debug!(direction = %self.direction, key, found = found.is_some(), "lookup");
        found
    }

    /// Delete a mapping. No-op if absent.
    pub fn remove(&mut self, key: &str) {
        self.mapping.remove(key);
    }

    /// Rewrite the key portion of `message`.
    ///
    /// `key=suffix` becomes `substitute=suffix`; a bare `key` becomes
    /// `substitute`. Messages whose key is unmapped come back unchanged.
    pub fn translate<'a>(&self, message: &'a str) -> Cow<'a, str> {
        let (key, suffix) = message.split_at(message.find('=').unwrap_or(message.len()));
        match self.find(key) {
            Some(value) => Cow::Owned(format!("{value}{suffix}")),
            None => Cow::Borrowed(message),
        }
    }

    /// [`translate`](Self::translate) over raw transport bytes.
    ///
    /// Only the key has to be UTF-8; the suffix is copied byte for byte.
    pub fn translate_bytes<'a>(&self, message: &'a [u8]) -> Cow<'a, [u8]> {
        let eq = message
            .iter()
            .position(|&b| b == b'=')
            .unwrap_or(message.len());
        let (key, suffix) = message.split_at(eq);
        let Ok(key) = std::str::from_utf8(key) else {
            return Cow::Borrowed(message);
        };
        match self.find(key) {
            Some(value) => {
                let mut out = Vec::with_capacity(value.len() + suffix.len());
                out.extend_from_slice(value.as_bytes());
                out.extend_from_slice(suffix);
                Cow::Owned(out)
            }
            None => Cow::Borrowed(message),
        }
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Iterate over `(key, substitute)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mapping.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Both directions' tables, as produced by the loader.
#[derive(Debug, Clone)]
pub struct TranslationTables {
    pub gui: TranslationTable,
    pub micro: TranslationTable,
}

impl TranslationTables {
    /// Two empty tables.
    pub fn new() -> Self {
        Self {
            gui: TranslationTable::new(Direction::Gui),
            micro: TranslationTable::new(Direction::Micro),
        }
    }

    pub fn table(&self, direction: Direction) -> &TranslationTable {
        match direction {
            Direction::Gui => &self.gui,
            Direction::Micro => &self.micro,
        }
    }

    pub fn table_mut(&mut self, direction: Direction) -> &mut TranslationTable {
        match direction {
            Direction::Gui => &mut self.gui,
            Direction::Micro => &mut self.micro,
        }
    }
}

impl Default for TranslationTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "key";
    const TEST_VALUE: &str = "value";

    fn table_with(entries: &[(&str, &str)]) -> TranslationTable {
        let mut table = TranslationTable::new(Direction::Gui);
        for (k, v) in entries {
            table.add(*k, *v);
        }
        table
    }

    #[test]
    fn find_returns_added_value() {
        let table = table_with(&[(TEST_KEY, TEST_VALUE)]);
        assert_eq!(table.find(TEST_KEY), Some(TEST_VALUE));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn add_same_key_last_write_wins() {
        let table = table_with(&[(TEST_KEY, "first"), (TEST_KEY, "second")]);
        assert_eq!(table.find(TEST_KEY), Some("second"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn remove_then_find_is_missing() {
        let mut table = table_with(&[(TEST_KEY, TEST_VALUE)]);
        table.remove(TEST_KEY);
        assert_eq!(table.find(TEST_KEY), None);
        assert!(table.is_empty());

        // Removing again is a no-op.
        table.remove(TEST_KEY);
    }

    #[test]
    fn translate_bare_key_returns_substitute() {
        let table = table_with(&[("meter.value", "x")]);
        assert_eq!(table.translate("meter.value"), "x");
    }

    #[test]
    fn translate_keeps_suffix_from_equals_sign() {
        let table = table_with(&[("meter.value", "x")]);
        assert_eq!(table.translate("meter.value=5"), "x=5");
        assert_eq!(table.translate("meter.value="), "x=");
        assert_eq!(table.translate("meter.value=a=b"), "x=a=b");
    }

    #[test]
    fn translate_unknown_key_passes_through() {
        let table = table_with(&[("meter.value", "x")]);
        assert!(matches!(table.translate("notfound"), Cow::Borrowed("notfound")));
        assert!(matches!(
            table.translate("notfound=12"),
            Cow::Borrowed("notfound=12")
        ));
    }

    #[test]
    fn translate_only_matches_whole_key() {
        // A newline-terminated chunk is a different key than the bare one.
        let table = table_with(&[("sl", "slider")]);
        assert_eq!(table.translate("sl=10\n"), "slider=10\n");
        assert_eq!(table.translate("sl\n"), "sl\n");
    }

    #[test]
    fn translate_empty_key_can_be_mapped() {
        let table = table_with(&[("", "blank")]);
        assert_eq!(table.translate("=7"), "blank=7");
    }

    #[test]
    fn translate_bytes_keeps_non_utf8_suffix() {
        let table = table_with(&[("meter.value", "x")]);
        assert_eq!(
            table.translate_bytes(b"meter.value=\xff\xc3").as_ref(),
            b"x=\xff\xc3"
        );
        assert_eq!(table.translate_bytes(b"meter.value").as_ref(), b"x");
    }

    #[test]
    fn translate_bytes_passes_through_unmapped_or_invalid_keys() {
        let table = table_with(&[("sl", "slider")]);
        assert!(matches!(
            table.translate_bytes(b"other=1"),
            Cow::Borrowed(b"other=1")
        ));
        let invalid = b"s\xffl=1";
        assert!(matches!(table.translate_bytes(invalid), Cow::Borrowed(m) if m == invalid));
        assert_eq!(
            table.translate_bytes("caf\u{e9}=1".as_bytes()).as_ref(),
            "caf\u{e9}=1".as_bytes()
        );
    }

    #[test]
    fn tables_select_by_direction() {
        let mut tables = TranslationTables::new();
        tables.table_mut(Direction::Micro).add("a", "b");
        assert_eq!(tables.table(Direction::Micro).find("a"), Some("b"));
        assert_eq!(tables.table(Direction::Gui).find("a"), None);
        assert_eq!(tables.gui.direction(), Direction::Gui);
    }

    #[test]
    fn direction_tags_and_labels() {
        assert_eq!(Direction::from_tag('G'), Some(Direction::Gui));
        assert_eq!(Direction::from_tag('M'), Some(Direction::Micro));
        assert_eq!(Direction::from_tag('X'), None);
        assert_eq!(Direction::Micro.to_string(), "micro");
        assert_eq!(
            serde_json::to_string(&Direction::Gui).unwrap(),
            "\"gui\""
        );
    }
}
