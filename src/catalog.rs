//! Surah catalog
//!
//! Static, ordered chapter metadata with the page range each surah occupies
//! in the bundled document. The table ships inside the binary as TOML and is
//! validated once at load.

use serde::Deserialize;

/// Number of surahs in the Quran
pub const SURAH_COUNT: u32 = 114;

const BUILTIN_TABLE: &str = include_str!("../data/surahs.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revelation {
    Mecca,
    Medina,
}

impl Revelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Revelation::Mecca => "Mecca",
            Revelation::Medina => "Medina",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chapter {
    pub number: u32,
    pub name: String,
    /// Name in Arabic script
    pub arabic: String,
    pub meaning: String,
    pub revelation: Revelation,
    pub verses: u32,
    pub start_page: usize,
    pub end_page: usize,
}

impl Chapter {
    /// One-line summary used in chapter lists
    pub fn summary(&self) -> String {
        format!(
            "{}. {} ({}) • {} • {} • {} verses",
            self.number,
            self.name,
            self.arabic,
            self.meaning,
            self.revelation.as_str(),
            self.verses
        )
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.meaning.to_lowercase().contains(needle)
            || self.arabic.to_lowercase().contains(needle)
            || self.number.to_string().contains(needle)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("failed to parse surah table: {0}")]
    Parse(String),

    #[error("surah number {0} is outside 1..=114")]
    NumberOutOfRange(u32),

    #[error("surah {current} does not follow surah {previous}")]
    NotAscending { previous: u32, current: u32 },

    #[error("surah {number} starts on page {start} after it ends on page {end}")]
    InvertedRange { number: u32, start: usize, end: usize },

    #[error("surah {number} starts on page {start}, before surah {previous} starts")]
    PagesOutOfOrder {
        previous: u32,
        number: u32,
        start: usize,
    },
}

#[derive(Deserialize)]
struct Table {
    #[serde(default)]
    surah: Vec<Chapter>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    chapters: Vec<Chapter>,
}

impl Catalog {
    /// The table compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml(BUILTIN_TABLE)
    }

    pub fn from_toml(text: &str) -> Result<Self, CatalogError> {
        let table: Table = toml::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(table.surah)
    }

    /// Build a catalog, checking numbering and page-range ordering
    pub fn new(chapters: Vec<Chapter>) -> Result<Self, CatalogError> {
        let mut previous: Option<&Chapter> = None;
        for chapter in &chapters {
            if chapter.number == 0 || chapter.number > SURAH_COUNT {
                return Err(CatalogError::NumberOutOfRange(chapter.number));
            }
            if chapter.start_page > chapter.end_page {
                return Err(CatalogError::InvertedRange {
                    number: chapter.number,
                    start: chapter.start_page,
                    end: chapter.end_page,
                });
            }
            if let Some(prev) = previous {
                if chapter.number <= prev.number {
                    return Err(CatalogError::NotAscending {
                        previous: prev.number,
                        current: chapter.number,
                    });
                }
                if chapter.start_page < prev.start_page || chapter.end_page < prev.end_page {
                    return Err(CatalogError::PagesOutOfOrder {
                        previous: prev.number,
                        number: chapter.number,
                        start: chapter.start_page,
                    });
                }
            }
            previous = Some(chapter);
        }
        Ok(Self { chapters })
    }

    pub fn all(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn lookup(&self, number: u32) -> Option<&Chapter> {
        self.chapters
            .binary_search_by_key(&number, |c| c.number)
            .ok()
            .map(|index| &self.chapters[index])
    }

    /// Chapters whose name, meaning, Arabic name or number contains `text`,
    /// ignoring case. A blank query matches everything.
    pub fn search(&self, text: &str) -> Vec<&Chapter> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.chapters.iter().collect();
        }
        self.chapters.iter().filter(|c| c.matches(&needle)).collect()
    }

    /// Chapter shown on `page`. When two chapters share a page the later
    /// one wins.
    pub fn chapter_at_page(&self, page: usize) -> Option<&Chapter> {
        self.chapters
            .iter()
            .rev()
            .find(|c| c.start_page <= page && page <= c.end_page)
    }
}
