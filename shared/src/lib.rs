use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Serialize, Deserialize, Clone)]
pub struct PredictResponse {
    pub predicted_label: String,
    pub alert_message: String,
    pub timestamp: String,
    pub latitude: String,
    pub longitude: String,
}

/// Predicted labels that trigger an SMS alert. The serialized forms are the
/// title-cased labels the predict handler produces; matching is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum AlertCategory {
    #[strum(serialize = "Fight On A Street")]
    FightOnAStreet,
    #[strum(serialize = "Fire On A Street")]
    FireOnAStreet,
    #[strum(serialize = "Street Violence")]
    StreetViolence,
    #[strum(serialize = "Car Crash")]
    CarCrash,
    #[strum(serialize = "Violence In Office")]
    ViolenceInOffice,
    #[strum(serialize = "Fire In Office")]
    FireInOffice,
}

impl AlertCategory {
    pub fn match_label(label: &str) -> Option<AlertCategory> {
        label.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_category_matches_its_display_form() {
        for category in AlertCategory::iter() {
            assert_eq!(AlertCategory::match_label(&category.to_string()), Some(category));
        }
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(AlertCategory::match_label("fight on a street"), None);
        assert_eq!(AlertCategory::match_label("car crash"), None);
        assert_eq!(AlertCategory::match_label("CAR CRASH"), None);
    }

    #[test]
    fn non_alert_labels_do_not_match() {
        assert_eq!(AlertCategory::match_label("Normal Street Activity"), None);
        assert_eq!(AlertCategory::match_label(""), None);
    }

    #[test]
    fn car_crash_matches_exactly() {
        assert_eq!(AlertCategory::match_label("Car Crash"), Some(AlertCategory::CarCrash));
    }
}
