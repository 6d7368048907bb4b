//! Line-delimited vulgarity and happy-word lists keyed by language

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WordListError {
    #[error("failed to read word list {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no word list for language '{lang}'")]
    UnknownLanguage { lang: String },
}

/// Supplies word lists by language code
pub trait WordListSource {
    fn vulgarities(&self, lang: &str) -> Result<Vec<String>, WordListError>;
    fn happy_words(&self, lang: &str) -> Result<Vec<String>, WordListError>;
}

/// Lists stored as `<root>/vulgarities/<lang>.txt` and `<root>/happy-words/<lang>.txt`
#[derive(Debug, Clone)]
pub struct DirectoryWordLists {
    root: PathBuf,
}

impl DirectoryWordLists {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, dir: &str, lang: &str) -> Result<Vec<String>, WordListError> {
        let path = self.root.join(dir).join(format!("{}.txt", lang));
        read_lines(&path)
    }
}

impl WordListSource for DirectoryWordLists {
    fn vulgarities(&self, lang: &str) -> Result<Vec<String>, WordListError> {
        self.read("vulgarities", lang)
    }

    fn happy_words(&self, lang: &str) -> Result<Vec<String>, WordListError> {
        self.read("happy-words", lang)
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, WordListError> {
    let content = std::fs::read_to_string(path).map_err(|source| WordListError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// In-memory lists, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct StaticWordLists {
    vulgarities: HashMap<String, Vec<String>>,
    happy_words: HashMap<String, Vec<String>>,
}

impl StaticWordLists {
    pub fn insert_vulgarities(&mut self, lang: &str, words: Vec<String>) {
        self.vulgarities.insert(lang.to_string(), words);
    }

    pub fn insert_happy_words(&mut self, lang: &str, words: Vec<String>) {
        self.happy_words.insert(lang.to_string(), words);
    }
}

impl WordListSource for StaticWordLists {
    fn vulgarities(&self, lang: &str) -> Result<Vec<String>, WordListError> {
        self.vulgarities
            .get(lang)
            .cloned()
            .ok_or_else(|| WordListError::UnknownLanguage { lang: lang.to_string() })
    }

    fn happy_words(&self, lang: &str) -> Result<Vec<String>, WordListError> {
        self.happy_words
            .get(lang)
            .cloned()
            .ok_or_else(|| WordListError::UnknownLanguage { lang: lang.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_language_files_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("vulgarities")).unwrap();
        std::fs::write(dir.path().join("vulgarities/en.txt"), "darn\r\n\n heck \n").unwrap();

        let lists = DirectoryWordLists::new(dir.path());
        assert_eq!(lists.vulgarities("en").unwrap(), vec!["darn", "heck"]);
        assert!(matches!(
            lists.happy_words("en"),
            Err(WordListError::Read { .. })
        ));
    }
}
