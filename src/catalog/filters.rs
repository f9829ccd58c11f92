//! Facet filters applied to grid queries.

use super::FacetKind;

/// Optional facet selections narrowing a grid query.
///
/// Filters are strictly additive: every present value adds one form
/// parameter. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub rabbi: Option<String>,
    pub series: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub occasion: Option<String>,
}

impl Filters {
    /// Returns empty filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value for `kind`, replacing any previous one.
    #[must_use]
    pub fn with(mut self, kind: FacetKind, value: impl Into<String>) -> Self {
        *self.slot_mut(kind) = Some(value.into());
        self
    }

    /// Returns the selected value for `kind`, skipping blank strings.
    #[must_use]
    pub fn get(&self, kind: FacetKind) -> Option<&str> {
        let slot = match kind {
            FacetKind::Rabbis => &self.rabbi,
            FacetKind::Series => &self.series,
            FacetKind::Subjects => &self.subject,
            FacetKind::Topics => &self.topic,
            FacetKind::Occasions => &self.occasion,
        };
        slot.as_deref().filter(|value| !value.trim().is_empty())
    }

    /// Form parameters for every selected facet, in facet order.
    #[must_use]
    pub fn form_params(&self) -> Vec<(&'static str, &str)> {
        FacetKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind).map(|value| (kind.filter_param(), value)))
            .collect()
    }

    /// Returns true when no facet is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        FacetKind::ALL.iter().all(|kind| self.get(*kind).is_none())
    }

    fn slot_mut(&mut self, kind: FacetKind) -> &mut Option<String> {
        match kind {
            FacetKind::Rabbis => &mut self.rabbi,
            FacetKind::Series => &mut self.series,
            FacetKind::Subjects => &mut self.subject,
            FacetKind::Topics => &mut self.topic,
            FacetKind::Occasions => &mut self.occasion,
        }
    }
}
