//! Category classification for clue generation.
//!
//! The classifier is data, not logic: themes, affinity groups and curated
//! associations are loaded from a TOML lexicon. The engine only talks to the
//! [`CategoryClassifier`] trait so tests can inject synthetic categories.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, instrument};

const EMBEDDED_LEXICON: &str = include_str!("../../../data/lexicon.toml");

/// Reports thematic tags and associations for words.
///
/// All lookups are case-insensitive.
pub trait CategoryClassifier: Send + Sync + std::fmt::Debug {
    /// Theme names in fixed enumeration order.
    fn themes(&self) -> Vec<String>;

    /// Themes the word belongs to, in theme order.
    fn tags_of(&self, word: &str) -> Vec<String>;

    /// Representative single-word clue tokens for a theme.
    fn theme_clues(&self, theme: &str) -> Vec<String>;

    /// Curated clue tokens associated with the word.
    fn associations_of(&self, word: &str) -> Vec<String>;

    /// Contextual tokens shared by both words.
    fn shared_associations(&self, first: &str, second: &str) -> Vec<String>;

    /// Whether `word` is a member of the theme named `theme`.
    fn belongs_to(&self, word: &str, theme: &str) -> bool {
        let theme = theme.to_ascii_uppercase();
        self.tags_of(word).iter().any(|t| *t == theme)
    }

    /// Whether `token` is a known association of `word`.
    ///
    /// True for curated associations and for the representative clues of
    /// any theme the word belongs to.
    fn is_known_association(&self, word: &str, token: &str) -> bool {
        let token = token.to_ascii_uppercase();
        self.associations_of(word).iter().any(|a| *a == token)
            || self
                .tags_of(word)
                .iter()
                .any(|theme| self.theme_clues(theme).iter().any(|c| *c == token))
    }
}

/// A named theme with its members and clue vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name, also usable as a clue token.
    pub name: String,
    /// Member words.
    pub words: Vec<String>,
    /// Single-word clue tokens representative of the theme.
    #[serde(default)]
    pub clues: Vec<String>,
    /// Tokens two members of this theme share.
    #[serde(default)]
    pub shared: Vec<String>,
}

/// A cross-category association group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affinity {
    /// Group name.
    pub name: String,
    /// Member words.
    pub words: Vec<String>,
    /// Tokens two members of this group share.
    pub shared: Vec<String>,
}

/// Raw classifier tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Themes in enumeration order.
    #[serde(default)]
    pub themes: Vec<Theme>,
    /// Cross-category groups.
    #[serde(default)]
    pub affinities: Vec<Affinity>,
    /// Curated word to token table.
    #[serde(default)]
    pub associations: BTreeMap<String, Vec<String>>,
}

impl Lexicon {
    /// The lexicon shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError`] if the embedded tables fail to parse.
    #[instrument]
    pub fn embedded() -> Result<Self, LexiconError> {
        Self::from_toml(EMBEDDED_LEXICON)
    }

    /// Parses a lexicon from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError`] on malformed TOML.
    #[instrument(skip(content), fields(len = content.len()))]
    pub fn from_toml(content: &str) -> Result<Self, LexiconError> {
        let lexicon: Self = toml::from_str(content)
            .map_err(|e| LexiconError::new(format!("Failed to parse lexicon: {}", e)))?;
        debug!(
            themes = lexicon.themes.len(),
            affinities = lexicon.affinities.len(),
            associations = lexicon.associations.len(),
            "Parsed lexicon"
        );
        Ok(lexicon)
    }

    /// Loads a lexicon from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| LexiconError::new(format!("Failed to read lexicon: {}", e)))?;
        Self::from_toml(&content)
    }
}

/// Lexicon loading error.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Lexicon error: {} at {}:{}", message, file, line)]
pub struct LexiconError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LexiconError {
    /// Creates a new lexicon error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Table-driven [`CategoryClassifier`].
#[derive(Debug, Clone)]
pub struct StaticClassifier {
    lexicon: Lexicon,
    theme_index: HashMap<String, Vec<usize>>,
    affinity_index: HashMap<String, Vec<usize>>,
    associations: HashMap<String, Vec<String>>,
}

impl StaticClassifier {
    /// Indexes a lexicon for lookup. Every entry is uppercased.
    #[instrument(skip(lexicon))]
    pub fn new(lexicon: Lexicon) -> Self {
        let lexicon = Lexicon {
            themes: lexicon
                .themes
                .into_iter()
                .map(|t| Theme {
                    name: upper(&t.name),
                    words: t.words.iter().map(|w| upper(w)).collect(),
                    clues: t.clues.iter().map(|w| upper(w)).collect(),
                    shared: t.shared.iter().map(|w| upper(w)).collect(),
                })
                .collect(),
            affinities: lexicon
                .affinities
                .into_iter()
                .map(|a| Affinity {
                    name: upper(&a.name),
                    words: a.words.iter().map(|w| upper(w)).collect(),
                    shared: a.shared.iter().map(|w| upper(w)).collect(),
                })
                .collect(),
            associations: lexicon
                .associations
                .into_iter()
                .map(|(k, v)| (upper(&k), v.iter().map(|w| upper(w)).collect()))
                .collect(),
        };

        let mut theme_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, theme) in lexicon.themes.iter().enumerate() {
            for word in &theme.words {
                let entry = theme_index.entry(word.clone()).or_default();
                if !entry.contains(&i) {
                    entry.push(i);
                }
            }
        }

        let mut affinity_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, affinity) in lexicon.affinities.iter().enumerate() {
            for word in &affinity.words {
                let entry = affinity_index.entry(word.clone()).or_default();
                if !entry.contains(&i) {
                    entry.push(i);
                }
            }
        }

        let associations = lexicon
            .associations
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        info!(
            themes = lexicon.themes.len(),
            indexed_words = theme_index.len(),
            "Built static classifier"
        );

        Self {
            lexicon,
            theme_index,
            affinity_index,
            associations,
        }
    }

    /// Classifier over the embedded lexicon.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError`] if the embedded tables fail to parse.
    pub fn embedded() -> Result<Self, LexiconError> {
        Ok(Self::new(Lexicon::embedded()?))
    }

    /// The indexed lexicon.
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn theme(&self, name: &str) -> Option<&Theme> {
        let name = upper(name);
        self.lexicon.themes.iter().find(|t| t.name == name)
    }
}

impl CategoryClassifier for StaticClassifier {
    fn themes(&self) -> Vec<String> {
        self.lexicon.themes.iter().map(|t| t.name.clone()).collect()
    }

    fn tags_of(&self, word: &str) -> Vec<String> {
        self.theme_index
            .get(&upper(word))
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| self.lexicon.themes[i].name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn theme_clues(&self, theme: &str) -> Vec<String> {
        self.theme(theme).map(|t| t.clues.clone()).unwrap_or_default()
    }

    fn associations_of(&self, word: &str) -> Vec<String> {
        self.associations.get(&upper(word)).cloned().unwrap_or_default()
    }

    fn shared_associations(&self, first: &str, second: &str) -> Vec<String> {
        let (first, second) = (upper(first), upper(second));
        let mut shared: Vec<String> = Vec::new();

        let themes_a = self.theme_index.get(&first).cloned().unwrap_or_default();
        let themes_b = self.theme_index.get(&second).cloned().unwrap_or_default();
        for i in themes_a.iter().filter(|i| themes_b.contains(i)) {
            for token in &self.lexicon.themes[*i].shared {
                if !shared.contains(token) {
                    shared.push(token.clone());
                }
            }
        }

        let groups_a = self.affinity_index.get(&first).cloned().unwrap_or_default();
        let groups_b = self.affinity_index.get(&second).cloned().unwrap_or_default();
        for i in groups_a.iter().filter(|i| groups_b.contains(i)) {
            for token in &self.lexicon.affinities[*i].shared {
                if !shared.contains(token) {
                    shared.push(token.clone());
                }
            }
        }

        shared
    }
}

fn upper(word: &str) -> String {
    word.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_lexicon_parses() {
        let classifier = StaticClassifier::embedded().expect("embedded lexicon");
        assert_eq!(classifier.themes().first().map(String::as_str), Some("ANIMAL"));
        assert_eq!(classifier.themes().len(), 19);
        assert_eq!(classifier.themes().last().map(String::as_str), Some("GEOGRAPHY"));
    }

    #[test]
    fn words_in_two_themes_keep_theme_order() {
        let classifier = StaticClassifier::embedded().expect("embedded lexicon");
        assert_eq!(classifier.tags_of("fish"), vec!["ANIMAL", "FOOD"]);
        assert_eq!(classifier.tags_of("VIOLIN"), vec!["MUSIC", "INSTRUMENT"]);
        assert_eq!(classifier.tags_of("SUN"), vec!["NATURE", "WEATHER", "SPACE"]);
        assert!(classifier.tags_of("ZEPPELIN").is_empty());
    }

    #[test]
    fn shared_associations_span_themes_and_affinities() {
        let classifier = StaticClassifier::embedded().expect("embedded lexicon");
        assert_eq!(
            classifier.shared_associations("CAT", "DOG"),
            vec!["ANIMAL", "CREATURE", "WILD", "FUR"]
        );
        assert_eq!(
            classifier.shared_associations("HOT", "COLD"),
            vec!["SENSORY", "FEEL", "TOUCH"]
        );
        assert!(classifier.shared_associations("CAT", "HAMMER").is_empty());
    }
}
