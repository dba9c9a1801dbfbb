use std::time::Duration;

/// Tunables for the map/itinerary highlighting engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightConfig {
    /// How long a POI stays highlighted after the pointer leaves its map
    /// marker, so the pointer can reach the info popup.
    pub dismiss_grace: Duration,
    pub pulse_duration: Duration,
    /// Peak extra scale of the marker pulse (0.3 = 130% at mid-pulse).
    pub pulse_amplitude: f64,
    /// Smallest span, in degrees, the map is fitted to. Keeps a one-stop
    /// trip from zooming in to street level.
    pub min_span_deg: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            dismiss_grace: Duration::from_millis(1500),
            pulse_duration: Duration::from_millis(300),
            pulse_amplitude: 0.3,
            min_span_deg: 0.05,
        }
    }
}
