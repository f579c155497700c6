//! Caller payloads. Field names follow the stored records; unknown fields
//! (caller-supplied `cts`/`uts`, `moviename` on a sale) are ignored.
use super::config::KeyCase;
use super::error::EngineError;
use super::records::SHOW_SLOTS;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

pub trait Payload: DeserializeOwned {
    /// Applies the configured identifier case policy.
    fn normalize(&mut self, case: KeyCase) -> Result<(), EngineError>;

    fn validate(&self) -> Result<(), EngineError>;
}

/// Decodes, normalizes and validates a single JSON argument.
pub fn decode<P: Payload>(raw: &str, case: KeyCase) -> Result<P, EngineError> {
    let mut payload: P = serde_json::from_str(raw).map_err(|e| EngineError::InvalidPayload {
        data: raw.to_string(),
        reason: e.to_string(),
    })?;
    payload.normalize(case)?;
    payload.validate()?;
    Ok(payload)
}

fn require(field: &str, value: &str) -> Result<(), EngineError> {
    if value.is_empty() {
        return Err(EngineError::InvalidPayload {
            data: field.to_string(),
            reason: format!("{field} must not be empty"),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TheatrePayload {
    pub thid: String,
    pub sph: BTreeMap<String, u8>,
    pub maxsoda: u8,
}

impl Payload for TheatrePayload {
    fn normalize(&mut self, case: KeyCase) -> Result<(), EngineError> {
        case.apply(&mut self.thid);

        let mut sph = BTreeMap::new();
        for (mut screen, seats) in std::mem::take(&mut self.sph) {
            case.apply(&mut screen);
            if sph.insert(screen.clone(), seats).is_some() {
                return Err(EngineError::InvalidPayload {
                    data: screen,
                    reason: "screen listed more than once".into(),
                });
            }
        }
        self.sph = sph;
        Ok(())
    }

    fn validate(&self) -> Result<(), EngineError> {
        require("thid", &self.thid)?;
        for (screen, seats) in &self.sph {
            require("screen", screen)?;
            if *seats == 0 {
                return Err(EngineError::InvalidPayload {
                    data: screen.clone(),
                    reason: "screen capacity must be positive".into(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShowPayload {
    pub thid: String,
    pub screen: String,
    pub moviename: String,
    pub showcode: [String; SHOW_SLOTS],
}

impl Payload for ShowPayload {
    fn normalize(&mut self, case: KeyCase) -> Result<(), EngineError> {
        case.apply(&mut self.thid);
        case.apply(&mut self.screen);
        self.showcode.iter_mut().for_each(|code| case.apply(code));
        Ok(())
    }

    fn validate(&self) -> Result<(), EngineError> {
        require("thid", &self.thid)?;
        require("screen", &self.screen)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SellPayload {
    pub thid: String,
    pub screen: String,
    pub showcode: String,
    pub ticketsold: i64, // signed so non-positive counts reach the quantity check
}

impl Payload for SellPayload {
    fn normalize(&mut self, case: KeyCase) -> Result<(), EngineError> {
        case.apply(&mut self.thid);
        case.apply(&mut self.screen);
        case.apply(&mut self.showcode);
        Ok(())
    }

    fn validate(&self) -> Result<(), EngineError> {
        require("thid", &self.thid)?;
        require("screen", &self.screen)?;
        require("showcode", &self.showcode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SodaPayload {
    pub thid: String,
    pub inventoryid: String,
}

impl Payload for SodaPayload {
    fn normalize(&mut self, case: KeyCase) -> Result<(), EngineError> {
        case.apply(&mut self.thid);
        case.apply(&mut self.inventoryid);
        Ok(())
    }

    fn validate(&self) -> Result<(), EngineError> {
        require("thid", &self.thid)?;
        require("inventoryid", &self.inventoryid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THEATRE: &str = r#"{"thid":"Theatre1", "maxsoda": 200, "sph": {"SC1": 100 ,"SC2": 100}, "cts":"1606791828", "uts": "1606791828"}"#;

    #[test]
    fn theatre_payload_ignores_caller_timestamps() {
        let payload: TheatrePayload = decode(THEATRE, KeyCase::Sensitive).unwrap();

        assert_eq!(payload.thid, "Theatre1");
        assert_eq!(payload.maxsoda, 200);
        assert_eq!(payload.sph.get("SC2"), Some(&100));
    }

    #[test]
    fn string_typed_numbers_are_rejected() {
        let raw = r#"{"thid":"T1","maxsoda":"200","sph":{"SC1":100}}"#;
        let err = decode::<TheatrePayload>(raw, KeyCase::Sensitive).unwrap_err();

        assert!(matches!(err, EngineError::InvalidPayload { .. }));
        assert_eq!(err.data(), raw);
    }

    #[test]
    fn capacity_beyond_u8_is_rejected() {
        let raw = r#"{"thid":"T1","maxsoda":5,"sph":{"SC1":300}}"#;
        assert!(decode::<TheatrePayload>(raw, KeyCase::Sensitive).is_err());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let raw = r#"{"thid":"T1","maxsoda":5,"sph":{"SC1":0}}"#;
        let err = decode::<TheatrePayload>(raw, KeyCase::Sensitive).unwrap_err();
        assert_eq!(err.data(), "SC1");
    }

    #[test]
    fn insensitive_case_merging_screens_is_rejected() {
        let raw = r#"{"thid":"T1","maxsoda":5,"sph":{"SC1":10,"sc1":20}}"#;

        assert!(decode::<TheatrePayload>(raw, KeyCase::Sensitive).is_ok());
        assert!(decode::<TheatrePayload>(raw, KeyCase::Insensitive).is_err());
    }

    #[test]
    fn show_needs_exactly_four_slots() {
        let ok = r#"{"moviename":"Lucy","screen":"SC1","thid":"Theatre1","showcode":["1","2","3","4"]}"#;
        let short = r#"{"moviename":"Lucy","screen":"SC1","thid":"Theatre1","showcode":["1","2","3"]}"#;

        assert!(decode::<ShowPayload>(ok, KeyCase::Sensitive).is_ok());
        assert!(decode::<ShowPayload>(short, KeyCase::Sensitive).is_err());
    }

    #[test]
    fn sell_accepts_negative_counts_for_later_checks() {
        let raw = r#"{"thid":"T1","moviename":"Lucy","screen":"SC1","showcode":"2","ticketsold":-3}"#;
        let payload: SellPayload = decode(raw, KeyCase::Sensitive).unwrap();
        assert_eq!(payload.ticketsold, -3);
    }

    #[test]
    fn insensitive_case_lowercases_identifiers() {
        let raw = r#"{"thid":"Theatre1","inventoryid":"ES13"}"#;
        let payload: SodaPayload = decode(raw, KeyCase::Insensitive).unwrap();

        assert_eq!(payload.thid, "theatre1");
        assert_eq!(payload.inventoryid, "es13");
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let raw = r#"{"thid":"","inventoryid":"ES13"}"#;
        assert!(decode::<SodaPayload>(raw, KeyCase::Sensitive).is_err());
    }
}
