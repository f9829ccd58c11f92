//! Catalog data model shared by extraction, querying and downloading.
//!
//! Every browsable dimension of the site (rabbis, series, subjects, topics,
//! occasions) is exposed by the grid plugin as a *facet*. All of them share
//! the same record shape, [`FacetOption`]; [`FacetKind`] tells them apart.

mod filters;

pub use filters::Filters;

use serde::{Deserialize, Serialize};

/// One browsable facet of the lesson grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetKind {
    /// Speakers.
    Rabbis,
    /// Lecture series.
    Series,
    /// Subject areas.
    Subjects,
    /// Topics within a subject.
    Topics,
    /// Occasions (holidays, memorial days and similar).
    Occasions,
}

impl FacetKind {
    /// All facets in drill-down order.
    pub const ALL: [Self; 5] = [
        Self::Rabbis,
        Self::Series,
        Self::Subjects,
        Self::Topics,
        Self::Occasions,
    ];

    /// Identifier of this facet inside the `facets` map of a grid response.
    #[must_use]
    pub fn facet_id(self) -> &'static str {
        match self {
            Self::Rabbis => "1",
            Self::Series => "27",
            Self::Subjects => "28",
            Self::Topics => "29",
            Self::Occasions => "30",
        }
    }

    /// Form parameter that narrows a query to one value of this facet.
    #[must_use]
    pub fn filter_param(self) -> &'static str {
        match self {
            Self::Rabbis => "facets[rabbis]",
            Self::Series => "facets[shiurim-series]",
            Self::Subjects => "facets[rabbis_3]",
            Self::Topics => "facets[rabbis_3_2]",
            Self::Occasions => "facets[rabbis_3_2_2]",
        }
    }

    /// Path segment used by post links to entities of this facet, if any.
    ///
    /// Only rabbis and series are linked from lesson cards, so only they can
    /// be recovered from the posts fragment when the facet itself is missing.
    #[must_use]
    pub fn link_segment(self) -> Option<&'static str> {
        match self {
            Self::Rabbis => Some("rabbis"),
            Self::Series => Some("shiurim-series"),
            Self::Subjects | Self::Topics | Self::Occasions => None,
        }
    }

    /// Plural label, also used as the JSON key of the local API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rabbis => "rabbis",
            Self::Series => "series",
            Self::Subjects => "subjects",
            Self::Topics => "topics",
            Self::Occasions => "occasions",
        }
    }
}

impl std::fmt::Display for FacetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable value of a facet with its result count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    /// Value sent back in the facet's filter parameter. Never empty.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Number of lessons behind this value (0 when unknown).
    pub count: u32,
}

impl FacetOption {
    /// Builds an option from its parts.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, count: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            count,
        }
    }
}

/// A speaker.
pub type Rabbi = FacetOption;
/// A lecture series.
pub type Series = FacetOption;
/// A subject area.
pub type Subject = FacetOption;
/// A topic.
pub type Topic = FacetOption;
/// An occasion.
pub type Occasion = FacetOption;

/// One recorded lesson as listed in the posts grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Grid post id (`wpgb-post-<id>`).
    pub id: String,
    /// Id of the lesson page (`/shiurim/<id>/`); this is what downloads use.
    pub post_id: String,
    pub rabbi_id: String,
    pub rabbi_name: String,
    pub series_id: String,
    pub series_name: String,
    pub chapter: u32,
    /// Date as printed on the card, e.g. `12/3/2023`. Not parsed.
    pub date: String,
    /// Duration in minutes.
    pub duration: u32,
    pub name: String,
}

impl Lesson {
    /// Returns true when the lesson name contains `needle`, ignoring case.
    ///
    /// An empty or blank needle matches everything.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim();
        needle.is_empty() || self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Keeps only the lessons whose name matches `needle` (see [`Lesson::matches_search`]).
#[must_use]
pub fn search_lessons(lessons: Vec<Lesson>, needle: &str) -> Vec<Lesson> {
    lessons
        .into_iter()
        .filter(|lesson| lesson.matches_search(needle))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lesson(name: &str) -> Lesson {
        Lesson {
            id: "1".to_string(),
            post_id: "2".to_string(),
            rabbi_id: "3".to_string(),
            rabbi_name: "Rav".to_string(),
            series_id: "s".to_string(),
            series_name: "Series".to_string(),
            chapter: 1,
            date: "1/1/2024".to_string(),
            duration: 30,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_facet_ids_match_grid_configuration() {
        let ids: Vec<_> = FacetKind::ALL.iter().map(|k| k.facet_id()).collect();
        assert_eq!(ids, ["1", "27", "28", "29", "30"]);
    }

    #[test]
    fn test_filter_params_per_facet() {
        assert_eq!(FacetKind::Rabbis.filter_param(), "facets[rabbis]");
        assert_eq!(FacetKind::Series.filter_param(), "facets[shiurim-series]");
        assert_eq!(FacetKind::Subjects.filter_param(), "facets[rabbis_3]");
        assert_eq!(FacetKind::Topics.filter_param(), "facets[rabbis_3_2]");
        assert_eq!(FacetKind::Occasions.filter_param(), "facets[rabbis_3_2_2]");
    }

    #[test]
    fn test_only_linked_facets_have_segments() {
        assert_eq!(FacetKind::Rabbis.link_segment(), Some("rabbis"));
        assert_eq!(FacetKind::Series.link_segment(), Some("shiurim-series"));
        assert_eq!(FacetKind::Topics.link_segment(), None);
    }

    #[test]
    fn test_lesson_serializes_with_flat_field_names() {
        let value = serde_json::to_value(lesson("Intro")).unwrap();
        assert_eq!(value["post_id"], "2");
        assert_eq!(value["chapter"], 1);
        assert_eq!(value["duration"], 30);
        assert_eq!(value["name"], "Intro");
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let lessons = vec![lesson("Intro to Kuzari"), lesson("Shabbat"), lesson("kuzari 2")];
        let found = search_lessons(lessons, "KUZARI");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].name, "kuzari 2");
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let lessons = vec![lesson("a"), lesson("b")];
        assert_eq!(search_lessons(lessons, "  ").len(), 2);
    }
}
