//! Audio-attribute range filters for recommendation requests.
//!
//! Each filter maps a named audio attribute to a slider configuration: a
//! display label, the hard bounds of the slider, the currently selected
//! (low, high) range and an optional step width. The set is created with
//! defaults at session start, mutated only through [`FilterSet::set_range`]
//! (which clamps and reorders, keeping low <= high at all times) and is never
//! persisted beyond the session. The gateway turns the set into `min_*` /
//! `max_*` query parameters; no scoring happens on this side.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub low: f64,
    pub high: f64,
    pub step: Option<f64>,
}

impl FilterSpec {
    /// A filter whose selected range initially spans the whole slider.
    fn spanning(label: &'static str, min: f64, max: f64) -> Self {
        FilterSpec {
            label,
            min,
            max,
            low: min,
            high: max,
            step: None,
        }
    }

    /// A 0..1 audio-feature score with the usual 0.05 step.
    fn unit_score(label: &'static str) -> Self {
        FilterSpec {
            step: Some(0.05),
            ..Self::spanning(label, 0.0, 1.0)
        }
    }

    /// Updates the selected range, clamping both ends into [min, max] and
    /// reordering an inverted pair.
    pub fn set_range(&mut self, low: f64, high: f64) {
        let low = low.clamp(self.min, self.max);
        let high = high.clamp(self.min, self.max);
        if low <= high {
            self.low = low;
            self.high = high;
        } else {
            self.low = high;
            self.high = low;
        }
    }
}

/// Ordered set of attribute filters; iteration order is display order.
#[derive(Debug, Clone)]
pub struct FilterSet {
    specs: IndexMap<&'static str, FilterSpec>,
}

impl Default for FilterSet {
    fn default() -> Self {
        let mut specs = IndexMap::new();
        specs.insert("tempo", FilterSpec::spanning("Tempo (BPM)", 80.0, 160.0));
        specs.insert("key", FilterSpec::spanning("Key (0 = C)", 0.0, 11.0));
        specs.insert("mode", FilterSpec::spanning("Mode (1 = Major)", 0.0, 1.0));
        specs.insert("acousticness", FilterSpec::unit_score("Acousticness"));
        specs.insert("danceability", FilterSpec::unit_score("Danceability"));
        specs.insert("energy", FilterSpec::unit_score("Energy"));
        specs.insert("instrumentalness", FilterSpec::unit_score("Instrumentalness"));
        specs.insert("liveness", FilterSpec::unit_score("Liveness"));
        specs.insert("loudness", FilterSpec::spanning("Loudness (dB)", -60.0, 0.0));
        specs.insert("speechiness", FilterSpec::unit_score("Speechiness"));
        specs.insert("valence", FilterSpec::unit_score("Valence"));
        FilterSet { specs }
    }
}

impl FilterSet {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FilterSpec)> {
        self.specs.iter().map(|(name, spec)| (*name, spec))
    }

    pub fn get(&self, attribute: &str) -> Option<&FilterSpec> {
        self.specs.get(attribute)
    }

    /// Applies a user update to one attribute. Unknown attribute names are
    /// ignored and reported with `false`; the submitted values go through the
    /// clamping of [`FilterSpec::set_range`].
    pub fn set_range(&mut self, attribute: &str, low: f64, high: f64) -> bool {
        match self.specs.get_mut(attribute) {
            Some(spec) => {
                spec.set_range(low, high);
                true
            }
            None => false,
        }
    }

    /// Flattens the selected ranges into `min_<attr>` / `max_<attr>` query
    /// parameters, the shape the recommendations endpoint expects.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.specs.len() * 2);
        for (name, spec) in &self.specs {
            params.push((format!("min_{name}"), spec.low.to_string()));
            params.push((format!("max_{name}"), spec.high.to_string()));
        }
        params
    }
}
