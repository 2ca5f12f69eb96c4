//! Association-kind annotations attached to accessors in the mapping files

use strum::{Display, EnumString};

/// Annotation found on an accessor declaration
///
/// Only the association markers are interpreted. Everything else (`Id`, `Column`,
/// `Transient`, ...) is carried as `Other` so the classifier can ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Annotation {
    #[strum(to_string = "OneToMany", serialize = "one-to-many")]
    OneToMany,
    #[strum(to_string = "ManyToMany", serialize = "many-to-many")]
    ManyToMany,
    #[strum(to_string = "OneToOne", serialize = "one-to-one")]
    OneToOne,
    #[strum(to_string = "ManyToOne", serialize = "many-to-one")]
    ManyToOne,
    #[strum(to_string = "Basic")]
    Basic,
    #[strum(default)]
    Other(String),
}

impl Annotation {
    /// Parse an annotation as written in a mapping file
    ///
    /// Accepts `OneToMany`, `one-to-many`, `@OneToMany` and package-qualified
    /// names like `javax.persistence.OneToMany`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let unqualified = trimmed
            .trim_start_matches('@')
            .rsplit('.')
            .next()
            .unwrap_or(trimmed);
        match unqualified.parse() {
            Ok(Self::Other(_)) | Err(_) => Self::Other(trimmed.to_string()),
            Ok(known) => known,
        }
    }
}
