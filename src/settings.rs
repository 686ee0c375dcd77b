use serde::{Deserialize, Serialize};

/// Thresholds applied to one kind of analysis run.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FilterPolicy {
    pub confidence_threshold: f32,
    /// Minimum share of foreground pixels inside a box, in percent. `None` skips the check.
    pub area_ratio_threshold: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub whole_image: FilterPolicy,
    pub selected_region: FilterPolicy,
}

impl Default for FilterSettings {
    fn default() -> Self {
        // The region run is stricter on confidence but has no area check.
        Self {
            whole_image: FilterPolicy {
                confidence_threshold: 0.4,
                area_ratio_threshold: Some(5.0),
            },
            selected_region: FilterPolicy {
                confidence_threshold: 0.5,
                area_ratio_threshold: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_the_asymmetric_policy() {
        let s = FilterSettings::default();
        assert_eq!(s.whole_image.confidence_threshold, 0.4);
        assert_eq!(s.whole_image.area_ratio_threshold, Some(5.0));
        assert_eq!(s.selected_region.confidence_threshold, 0.5);
        assert_eq!(s.selected_region.area_ratio_threshold, None);
    }

    #[test]
    fn settings_round_trip_through_json() {
        let s = FilterSettings::default();
        let json = serde_json::to_string(&s).unwrap();
        let back: FilterSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
