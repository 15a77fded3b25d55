//! The weather-report record and its wire-side draft.
//!
//! Two types, one record. [`WeatherReport`] is what the store holds and what
//! every response serializes. [`ReportDraft`] is what request bodies
//! deserialize into: every field optional, so validation can tell a missing
//! field from a present one. A `0.0` temperature is a legal reading — only an
//! absent field is rejected. Any `id` a client puts in the body is ignored;
//! ids are assigned server-side and never change.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// One stored weather observation.
///
/// JSON shape: `{"id": string, "city": string, "temperature": number,
/// "conditions": string}`. The `Default` value (empty strings, `0.0`) is what
/// the stream pushes when the store has nothing to report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub id: String,
    pub city: String,
    pub temperature: f64,
    pub conditions: String,
}

/// Deserialized request body for create and update.
///
/// Unknown fields (including `id`) are silently dropped by serde.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReportDraft {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub conditions: Option<String>,
}

impl ReportDraft {
    /// Checks city, then temperature, then conditions — first failure wins.
    ///
    /// `city` and `conditions` must be present and non-empty; `temperature`
    /// must be present.
    pub fn validate(self) -> Result<ReportFields, ApiError> {
        let city = match self.city {
            Some(city) if !city.is_empty() => city,
            _ => return Err(ApiError::Validation("city must not be empty")),
        };
        let temperature = self
            .temperature
            .ok_or(ApiError::Validation("temperature is required"))?;
        let conditions = match self.conditions {
            Some(conditions) if !conditions.is_empty() => conditions,
            _ => return Err(ApiError::Validation("conditions must not be empty")),
        };
        Ok(ReportFields { city, temperature, conditions })
    }
}

/// The validated field set of a draft. Only [`ReportDraft::validate`]
/// produces one, so a `ReportFields` is always complete.
#[derive(Debug)]
pub struct ReportFields {
    city: String,
    temperature: f64,
    conditions: String,
}

impl ReportFields {
    /// Attaches the server-chosen id, yielding a storable record.
    pub fn into_report(self, id: String) -> WeatherReport {
        WeatherReport {
            id,
            city: self.city,
            temperature: self.temperature,
            conditions: self.conditions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(city: Option<&str>, temperature: Option<f64>, conditions: Option<&str>) -> ReportDraft {
        ReportDraft {
            city: city.map(str::to_owned),
            temperature,
            conditions: conditions.map(str::to_owned),
        }
    }

    fn validation_message(draft: ReportDraft) -> &'static str {
        match draft.validate() {
            Err(ApiError::Validation(message)) => message,
            other => panic!("expected a validation failure, got {other:?}"),
        }
    }

    #[test]
    fn valid_draft_becomes_a_report() {
        let fields = draft(Some("Austin"), Some(31.5), Some("Sunny"))
            .validate()
            .expect("draft is valid");
        let report = fields.into_report("abc".to_owned());
        assert_eq!(report.id, "abc");
        assert_eq!(report.city, "Austin");
        assert_eq!(report.temperature, 31.5);
        assert_eq!(report.conditions, "Sunny");
    }

    #[test]
    fn zero_temperature_is_a_legal_reading() {
        let fields = draft(Some("Oslo"), Some(0.0), Some("Freezing"))
            .validate()
            .expect("0.0 is present, not missing");
        assert_eq!(fields.into_report("x".to_owned()).temperature, 0.0);
    }

    #[test]
    fn missing_and_empty_city_are_both_rejected() {
        assert_eq!(
            validation_message(draft(None, Some(1.0), Some("Rain"))),
            "city must not be empty"
        );
        assert_eq!(
            validation_message(draft(Some(""), Some(1.0), Some("Rain"))),
            "city must not be empty"
        );
    }

    #[test]
    fn missing_temperature_is_rejected() {
        assert_eq!(
            validation_message(draft(Some("Lima"), None, Some("Rain"))),
            "temperature is required"
        );
    }

    #[test]
    fn missing_conditions_is_rejected() {
        assert_eq!(
            validation_message(draft(Some("Lima"), Some(1.0), None)),
            "conditions must not be empty"
        );
    }

    #[test]
    fn city_is_checked_before_temperature_and_conditions() {
        // Everything is wrong; the city message wins.
        assert_eq!(validation_message(draft(None, None, None)), "city must not be empty");
        // City is fine; temperature is checked next.
        assert_eq!(
            validation_message(draft(Some("Lima"), None, None)),
            "temperature is required"
        );
    }

    #[test]
    fn client_supplied_id_is_ignored_on_decode() {
        let draft: ReportDraft =
            serde_json::from_str(r#"{"id":"evil","city":"Austin","temperature":31.5,"conditions":"Sunny"}"#)
                .expect("unknown fields are dropped");
        assert_eq!(draft.city.as_deref(), Some("Austin"));
    }
}
