//! Lazily computed outputs, dropped whenever the owning engine advances.

use units::Luminosity;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ObservableCache {
    pub luminosity: Option<Luminosity>,
    pub spectrum: Option<Vec<f64>>,
    pub spectrum_extincted: Option<Vec<f64>>,
    pub photometry: Option<Vec<f64>>,
    pub photometry_extincted: Option<Vec<f64>>,
    pub yields: Option<Vec<f64>>,
}

impl ObservableCache {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
