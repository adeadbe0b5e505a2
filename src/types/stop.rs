//! Stop types

use serde::de::{self, DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A single appointment to visit.
///
/// Only `id`, `lat` and `lng` are read by the optimizer. Everything else is
/// display metadata and is carried through to the result unchanged, including
/// fields this struct does not know about (kept in `extra`).
///
/// The CRM sends rows under several spellings (`latitude`, `address_street`,
/// numeric ids). A deserialized stop remembers which key and value it was
/// given and writes them back the same way unless the field was changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub name: Option<String>,
    pub address: Option<String>,
    pub appointment_time: Option<String>,
    pub extra: Map<String, Value>,
    /// Known fields exactly as received, under the caller's key
    received: Map<String, Value>,
}

// accepted spellings per field, the first one is used for new stops
const ID_KEYS: &[&str] = &["id"];
const LAT_KEYS: &[&str] = &["lat", "latitude"];
const LNG_KEYS: &[&str] = &["lng", "longitude", "lon"];
const NAME_KEYS: &[&str] = &["name"];
const ADDRESS_KEYS: &[&str] = &["address", "address_street"];
const TIME_KEYS: &[&str] = &["appointmentTime", "appointment_time"];

impl Stop {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            name: None,
            address: None,
            appointment_time: None,
            extra: Map::new(),
            received: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_appointment_time(mut self, time: impl Into<String>) -> Self {
        self.appointment_time = Some(time.into());
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    /// Label shown in itineraries: name, falling back to address, then id
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.address.as_deref().filter(|a| !a.is_empty()))
            .unwrap_or(&self.id)
    }

    /// Write one known field, preferring the received key and value
    fn put<F>(
        &self,
        out: &mut Map<String, Value>,
        keys: &[&str],
        current: Option<Value>,
        unchanged: F,
    ) where
        F: Fn(&Value) -> bool,
    {
        match keys.iter().find_map(|k| self.received.get_key_value(*k)) {
            Some((key, original)) if unchanged(original) => {
                out.insert(key.clone(), original.clone());
            }
            Some((key, _)) => {
                if let Some(value) = current {
                    out.insert(key.clone(), value);
                }
            }
            None => {
                if let Some(value) = current {
                    out.insert(keys[0].to_string(), value);
                }
            }
        }
    }
}

impl Serialize for Stop {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut out = self.extra.clone();

        self.put(&mut out, ID_KEYS, Some(Value::from(self.id.as_str())), |v| {
            id_text(v).as_deref() == Some(self.id.as_str())
        });
        self.put(&mut out, LAT_KEYS, Some(Value::from(self.lat)), |v| {
            v.as_f64() == Some(self.lat)
        });
        self.put(&mut out, LNG_KEYS, Some(Value::from(self.lng)), |v| {
            v.as_f64() == Some(self.lng)
        });
        for (keys, field) in [
            (NAME_KEYS, &self.name),
            (ADDRESS_KEYS, &self.address),
            (TIME_KEYS, &self.appointment_time),
        ] {
            self.put(&mut out, keys, field.clone().map(Value::from), |v| match v {
                Value::Null => field.is_none(),
                Value::String(s) => field.as_deref() == Some(s.as_str()),
                _ => false,
            });
        }

        out.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Stop {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut extra = Map::<String, Value>::deserialize(deserializer)?;
        let mut received = Map::new();

        let id = take(&mut extra, &mut received, ID_KEYS)
            .ok_or_else(|| D::Error::missing_field("id"))?;
        let id = id_text(&id).ok_or_else(|| {
            D::Error::custom(format!("stop id must be a string or number, got {}", id))
        })?;

        let lat = take(&mut extra, &mut received, LAT_KEYS)
            .ok_or_else(|| D::Error::missing_field("lat"))?;
        let lng = take(&mut extra, &mut received, LNG_KEYS)
            .ok_or_else(|| D::Error::missing_field("lng"))?;

        let name = take(&mut extra, &mut received, NAME_KEYS);
        let address = take(&mut extra, &mut received, ADDRESS_KEYS);
        let appointment_time = take(&mut extra, &mut received, TIME_KEYS);

        Ok(Self {
            id,
            lat: decode::<f64, D::Error>(lat)?,
            lng: decode::<f64, D::Error>(lng)?,
            name: decode_opt::<D::Error>(name)?,
            address: decode_opt::<D::Error>(address)?,
            appointment_time: decode_opt::<D::Error>(appointment_time)?,
            extra,
            received,
        })
    }
}

/// Move the first present spelling out of `fields`, remembering it
fn take(
    fields: &mut Map<String, Value>,
    received: &mut Map<String, Value>,
    keys: &[&str],
) -> Option<Value> {
    let (key, value) = keys.iter().find_map(|k| fields.remove_entry(*k))?;
    received.insert(key, value.clone());
    Some(value)
}

fn decode<T, E>(value: Value) -> Result<T, E>
where
    T: DeserializeOwned,
    E: de::Error,
{
    serde_json::from_value(value).map_err(E::custom)
}

fn decode_opt<E: de::Error>(value: Option<Value>) -> Result<Option<String>, E> {
    match value {
        Some(value) => decode(value),
        None => Ok(None),
    }
}

/// Lead ids come from the database as integers or UUID strings
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_accepts_numeric_id_and_long_field_names() {
        let json = r#"{
            "id": 42,
            "latitude": 48.137,
            "longitude": 11.575,
            "name": "Familie Huber",
            "address_street": "Marienplatz 1",
            "appointment_time": "09:30",
            "roof_area_sqm": 120
        }"#;

        let stop: Stop = serde_json::from_str(json).unwrap();

        assert_eq!(stop.id, "42");
        assert!((stop.lat - 48.137).abs() < f64::EPSILON);
        assert!((stop.lng - 11.575).abs() < f64::EPSILON);
        assert_eq!(stop.address.as_deref(), Some("Marienplatz 1"));
        assert_eq!(stop.appointment_time.as_deref(), Some("09:30"));
        assert_eq!(stop.extra.get("roof_area_sqm"), Some(&Value::from(120)));
    }

    #[test]
    fn test_stop_extra_fields_survive_serialization() {
        let json = r#"{"id":"a","lat":1.0,"lng":2.0,"isOwner":true}"#;
        let stop: Stop = serde_json::from_str(json).unwrap();

        let out = serde_json::to_value(&stop).unwrap();
        assert_eq!(out["isOwner"], Value::Bool(true));
        assert_eq!(out["id"], Value::from("a"));
    }

    #[test]
    fn test_stop_keeps_caller_spelling_on_output() {
        let row = serde_json::json!({
            "id": 1,
            "latitude": 48,
            "longitude": 11.575,
            "name": "Familie Huber",
            "address_street": "Marienplatz 1",
            "appointment_time": null,
            "roof_area_sqm": 120
        });

        let stop: Stop = serde_json::from_value(row.clone()).unwrap();
        assert_eq!(stop.id, "1");
        assert_eq!(stop.lat, 48.0);
        assert!(stop.appointment_time.is_none());

        assert_eq!(serde_json::to_value(&stop).unwrap(), row);
    }

    #[test]
    fn test_changed_field_is_written_under_received_key() {
        let row = serde_json::json!({"id": 7, "latitude": 48.0, "lon": 11.0});
        let mut stop: Stop = serde_json::from_value(row).unwrap();
        stop.lat = 48.5;
        stop.id = "7b".to_string();

        let out = serde_json::to_value(&stop).unwrap();
        assert_eq!(out["latitude"], 48.5);
        assert_eq!(out["lon"], 11.0);
        assert_eq!(out["id"], "7b");
        assert!(out.get("lat").is_none());
    }

    #[test]
    fn test_new_stop_uses_camel_case_keys() {
        let stop = Stop::new("a", 1.0, 2.0)
            .with_address("Hauptstr. 5")
            .with_appointment_time("09:00");

        let out = serde_json::to_value(&stop).unwrap();
        assert_eq!(
            out,
            serde_json::json!({
                "id": "a",
                "lat": 1.0,
                "lng": 2.0,
                "address": "Hauptstr. 5",
                "appointmentTime": "09:00"
            })
        );
    }

    #[test]
    fn test_stop_requires_coordinates() {
        assert!(serde_json::from_str::<Stop>(r#"{"id":"a","lat":1.0}"#).is_err());
        assert!(serde_json::from_str::<Stop>(r#"{"lat":1.0,"lng":2.0}"#).is_err());
        assert!(serde_json::from_str::<Stop>(r#"{"id":"a","lat":"x","lng":2.0}"#).is_err());
    }

    #[test]
    fn test_stop_rejects_object_id() {
        let json = r#"{"id":{"x":1},"lat":1.0,"lng":2.0}"#;
        assert!(serde_json::from_str::<Stop>(json).is_err());
    }

    #[test]
    fn test_label_fallbacks() {
        let stop = Stop::new("7", 0.0, 0.0);
        assert_eq!(stop.label(), "7");

        let stop = stop.with_address("Hauptstr. 5");
        assert_eq!(stop.label(), "Hauptstr. 5");

        let stop = stop.with_name("Meier");
        assert_eq!(stop.label(), "Meier");
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(50.0, 14.0).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(91.0, 14.0).is_valid());
        assert!(!Coordinates::new(50.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 14.0).is_valid());
        assert!(!Coordinates::new(50.0, f64::INFINITY).is_valid());
    }
}
