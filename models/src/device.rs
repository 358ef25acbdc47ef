use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A device record as exchanged with the `/api/devices` endpoints.
///
/// The shape belongs to the gateway, so the record is kept as the JSON object
/// it arrived as. A device read from the server, or built by a caller, is
/// serialized back with exactly the same keys and values.
///
/// The accessors below cover the fields the gateway is known to use
/// (`id`, `name`, `protocol`, ...). They never fail: a missing or
/// differently-typed field reads as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Device(Map<String, Value>);

impl Device {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style setter, mostly useful in tests and for small payloads.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Identifier as it would appear in `/api/devices/{id}`.
    ///
    /// Numeric ids are rendered with their JSON representation.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn protocol(&self) -> Option<&str> {
        self.str_field("protocol")
    }

    pub fn protocol_name(&self) -> Option<&str> {
        self.str_field("protocol_name")
    }

    /// Polling interval in seconds.
    pub fn interval(&self) -> Option<i64> {
        self.0.get("interval").and_then(Value::as_i64)
    }

    pub fn enable_ping(&self) -> Option<bool> {
        self.0.get("enable_ping").and_then(Value::as_bool)
    }

    /// Protocol specific settings (host, port, slave id, ...).
    pub fn config(&self) -> Option<&Map<String, Value>> {
        self.0.get("config").and_then(Value::as_object)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl TryFrom<Value> for Device {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}
