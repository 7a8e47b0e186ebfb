//! Decoder for the JSON encoding ExaBGP writes to its API processes
//!
//! One JSON object per line, e.g.:
//!
//! ```json
//! {"exabgp": "4.0.1", "type": "update", "neighbor": {"address": {"peer": "172.16.20.2"},
//!  "message": {"update": {"announce": {"ipv4 unicast": {"172.16.20.2": [{"nlri": "10.0.0.0/24"}]}}}}}}
//! {"exabgp": "4.0.1", "type": "notification", "notification": "shutdown"}
//! ```
use serde_json::{Map, Value};

use super::{Event, Update};
use crate::error::DecodeError;
use crate::models::{Gateway, Prefix};

pub const DEFAULT_FAMILY: &str = "ipv4 unicast";

#[derive(Clone, Debug)]
pub struct EventDecoder {
    families: Vec<String>,
}

impl Default for EventDecoder {
    fn default() -> Self {
        Self::new(vec![DEFAULT_FAMILY.to_string()])
    }
}

impl EventDecoder {
    /// `families` are ExaBGP family names ("ipv4 unicast", "ipv6 unicast", ...)
    pub fn new(families: Vec<String>) -> Self {
        Self { families }
    }

    pub fn decode(&self, line: &str) -> Result<Event, DecodeError> {
        let message: Value = serde_json::from_str(line)?;
        let kind = message
            .get("type")
            .ok_or(DecodeError::MissingField("type"))?
            .as_str()
            .ok_or_else(|| malformed("type", "expected a string"))?;

        match kind {
            "update" => self.decode_update(&message).map(Event::Update),
            "notification" => match message.get("notification").and_then(Value::as_str) {
                Some("shutdown") => Ok(Event::Shutdown),
                Some(other) => Ok(Event::Ignored(format!("notification {}", other))),
                // BGP NOTIFICATION received from a neighbor
                None => Ok(Event::Ignored(kind.to_string())),
            },
            other => Ok(Event::Ignored(other.to_string())),
        }
    }

    fn decode_update(&self, message: &Value) -> Result<Update, DecodeError> {
        let body = message
            .get("neighbor")
            .and_then(|n| n.get("message"))
            .ok_or(DecodeError::MissingField("neighbor.message"))?;
        // End-of-RIB markers carry `eor` instead of `update`, and still reconcile
        let update = match body.get("update") {
            Some(update) => update,
            None => return Ok(Update::default()),
        };

        let mut withdrawn = Vec::new();
        let mut announced = Vec::new();
        for family in &self.families {
            if let Some(routes) = update.get("withdraw").and_then(|w| w.get(family)) {
                let path = format!("withdraw.{}", family);
                for nlri in as_array(routes, &path)? {
                    withdrawn.push(Prefix::new(nlri_str(nlri, &path)?));
                }
            }
            if let Some(next_hops) = update.get("announce").and_then(|a| a.get(family)) {
                let path = format!("announce.{}", family);
                for (next_hop, routes) in as_object(next_hops, &path)? {
                    let path = format!("{}.{}", path, next_hop);
                    let gateway = Gateway::new(next_hop);
                    for nlri in as_array(routes, &path)? {
                        announced.push((Prefix::new(nlri_str(nlri, &path)?), gateway.clone()));
                    }
                }
            }
        }
        Ok(Update::new(withdrawn, announced))
    }
}

fn malformed(path: &str, reason: &str) -> DecodeError {
    DecodeError::Malformed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, DecodeError> {
    value
        .as_array()
        .ok_or_else(|| malformed(path, "expected an array"))
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| malformed(path, "expected an object"))
}

/// NLRI entries are `{"nlri": "10.0.0.0/24", ...}` objects (may carry path-information)
/// or plain strings in older encodings
fn nlri_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, DecodeError> {
    match value {
        Value::String(nlri) => Ok(nlri.as_str()),
        Value::Object(entry) => entry
            .get("nlri")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(path, "NLRI entry without `nlri` string")),
        _ => Err(malformed(path, "expected an NLRI object or string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOUNCE: &str = r#"{ "exabgp": "4.0.1", "time": 1560371099.404008, "host" : "bgp-1", "pid" : 2611, "ppid" : 2610, "counter": 4, "type": "update", "neighbor": { "address": { "local": "172.16.20.90", "peer": "172.16.20.2" }, "asn": { "local": 65000, "peer": 65000 } , "direction": "receive", "message": { "update": { "attribute": { "origin": "igp", "local-preference": 100 }, "announce": { "ipv4 unicast": { "172.16.20.2": [ { "nlri": "10.0.0.0/24" }, { "nlri": "10.0.1.0/24" } ], "172.16.20.3": [ { "nlri": "10.0.0.0/24" } ] }, "ipv6 unicast": { "3001:1::1": [ { "nlri": "2621:a:10::/64" } ] } } } } } }"#;

    const WITHDRAW: &str = r#"{ "exabgp": "4.0.1", "time": 1560371112.9, "host" : "bgp-1", "pid" : 2611, "ppid" : 2610, "counter": 5, "type": "update", "neighbor": { "address": { "local": "172.16.20.90", "peer": "172.16.20.2" }, "asn": { "local": 65000, "peer": 65000 } , "direction": "receive", "message": { "update": { "withdraw": { "ipv4 unicast": [ { "nlri": "10.0.1.0/24" } ] } } } } }"#;

    #[test]
    fn test_decode_announce() {
        let decoder = EventDecoder::default();
        let event = decoder.decode(ANNOUNCE).unwrap();
        let update = match event {
            Event::Update(update) => update,
            _ => panic!("Expected update, got {:?}", event),
        };
        assert!(update.withdrawn.is_empty());
        assert_eq!(update.announced.len(), 3);
        assert!(update
            .announced
            .contains(&(Prefix::new("10.0.0.0/24"), Gateway::new("172.16.20.3"))));
        assert!(update
            .announced
            .contains(&(Prefix::new("10.0.1.0/24"), Gateway::new("172.16.20.2"))));
        // IPv6 isn't a configured family
        assert!(!update
            .announced
            .iter()
            .any(|(prefix, _)| prefix == &Prefix::new("2621:a:10::/64")));
    }

    #[test]
    fn test_decode_multiple_families() {
        let decoder =
            EventDecoder::new(vec!["ipv4 unicast".to_string(), "ipv6 unicast".to_string()]);
        match decoder.decode(ANNOUNCE).unwrap() {
            Event::Update(update) => {
                assert_eq!(update.announced.len(), 4);
                assert!(update
                    .announced
                    .contains(&(Prefix::new("2621:a:10::/64"), Gateway::new("3001:1::1"))));
            }
            other => panic!("Expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_withdraw() {
        let event = EventDecoder::default().decode(WITHDRAW).unwrap();
        assert_eq!(
            event,
            Event::Update(Update::new(vec![Prefix::new("10.0.1.0/24")], vec![]))
        );
    }

    #[test]
    fn test_decode_plain_string_nlri() {
        let line = r#"{"type": "update", "neighbor": {"message": {"update": {"withdraw": {"ipv4 unicast": ["10.0.1.0/24"]}}}}}"#;
        let event = EventDecoder::default().decode(line).unwrap();
        assert_eq!(
            event,
            Event::Update(Update::new(vec![Prefix::new("10.0.1.0/24")], vec![]))
        );
    }

    #[test]
    fn test_decode_notifications() {
        let decoder = EventDecoder::default();
        let shutdown = r#"{ "exabgp": "4.0.1", "time": 1560371200.1, "host" : "bgp-1", "pid" : 2611, "ppid" : 2610, "counter": 9, "type": "notification", "notification": "shutdown"}"#;
        assert_eq!(decoder.decode(shutdown).unwrap(), Event::Shutdown);

        let other = r#"{"type": "notification", "notification": "restart"}"#;
        assert_eq!(
            decoder.decode(other).unwrap(),
            Event::Ignored("notification restart".to_string())
        );
    }

    #[test]
    fn test_decode_end_of_rib() {
        let eor = r#"{ "exabgp": "4.0.1", "time": 1560371099.5, "host" : "bgp-1", "pid" : 2611, "ppid" : 2610, "counter": 6, "type": "update", "neighbor": { "address": { "local": "172.16.20.90", "peer": "172.16.20.2" }, "asn": { "local": 65000, "peer": 65000 } , "direction": "receive", "message": { "eor": { "afi" : "ipv4", "safi" : "unicast" } } } }"#;
        let event = EventDecoder::default().decode(eor).unwrap();
        assert_eq!(event, Event::Update(Update::default()));
    }

    #[test]
    fn test_decode_ignored() {
        let state = r#"{ "exabgp": "4.0.1", "time": 1560371099.3, "type": "state", "neighbor": { "address": { "local": "172.16.20.90", "peer": "172.16.20.2" }, "state": "up" } }"#;
        assert_eq!(
            EventDecoder::default().decode(state).unwrap(),
            Event::Ignored("state".to_string())
        );
    }

    #[test]
    fn test_decode_errors() {
        let decoder = EventDecoder::default();
        assert!(matches!(decoder.decode("not json"), Err(DecodeError::Json(_))));
        assert!(matches!(
            decoder.decode(r#"{"exabgp": "4.0.1"}"#),
            Err(DecodeError::MissingField("type"))
        ));
        assert!(matches!(
            decoder.decode(r#"{"type": "update"}"#),
            Err(DecodeError::MissingField("neighbor.message"))
        ));
        let bad_withdraw = r#"{"type": "update", "neighbor": {"message": {"update": {"withdraw": {"ipv4 unicast": {"nlri": "10.0.0.0/24"}}}}}}"#;
        assert!(matches!(
            decoder.decode(bad_withdraw),
            Err(DecodeError::Malformed { .. })
        ));
    }
}
