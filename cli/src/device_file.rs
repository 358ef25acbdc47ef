//! Reading device payloads from disk or stdin.
//!
//! Files ending in `.yaml` / `.yml` are YAML, anything else is JSON. Stdin has
//! no extension to go by, so it is tried as JSON first and then as YAML.

use anyhow::{Context, bail};
use models::device::Device;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Path argument meaning "read from stdin".
pub const STDIN: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

fn parse<T: DeserializeOwned>(contents: &str, format: Format) -> anyhow::Result<T> {
    Ok(match format {
        Format::Json => serde_json::from_str(contents)?,
        Format::Yaml => serde_yaml::from_str(contents)?,
    })
}

fn parse_any<T: DeserializeOwned>(contents: &str) -> anyhow::Result<T> {
    match serde_json::from_str(contents) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str(contents).map_err(|yaml_err| {
            anyhow::anyhow!("not valid JSON ({json_err}) nor YAML ({yaml_err})")
        }),
    }
}

pub fn parse_device(contents: &str, format: Format) -> anyhow::Result<Device> {
    parse(contents, format).context("Expected a single device object")
}

pub fn parse_devices(contents: &str, format: Format) -> anyhow::Result<Vec<Device>> {
    parse(contents, format).context("Expected a list of devices")
}

/// Reads one device from `source`, which is a file path or `-` for stdin.
pub async fn read_device(source: &str) -> anyhow::Result<Device> {
    if source == STDIN {
        let mut contents = String::new();
        tokio::io::stdin()
            .read_to_string(&mut contents)
            .await
            .context("Failed to read device from stdin")?;
        if contents.trim().is_empty() {
            bail!("No device given on stdin");
        }
        return parse_any(&contents).context("Expected a single device object on stdin");
    }

    let path = Path::new(source);
    let contents = read_file(path).await?;
    parse_device(&contents, Format::from_path(path))
        .with_context(|| format!("Invalid device file {}", path.display()))
}

/// Reads a list of devices for a bulk import.
pub async fn read_devices(path: &Path) -> anyhow::Result<Vec<Device>> {
    let contents = read_file(path).await?;
    parse_devices(&contents, Format::from_path(path))
        .with_context(|| format!("Invalid device list {}", path.display()))
}

async fn read_file(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEVICES_YAML: &str = r#"
- id: plc-01
  name: line 1 PLC
  protocol: modbus_tcp
  interval: 5
  enable_ping: true
  config:
    host: 10.0.0.7
    port: 502
- id: meter-02
  name: energy meter
  protocol: bacnet
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("devices.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("devices.YML")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("devices.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("devices")), Format::Json);
    }

    #[test]
    fn test_parse_yaml_list() {
        let devices = parse_devices(DEVICES_YAML, Format::Yaml).unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id().as_deref(), Some("plc-01"));
        assert_eq!(devices[0].interval(), Some(5));
        assert_eq!(
            devices[0].config().and_then(|c| c.get("port")),
            Some(&json!(502))
        );
        assert_eq!(devices[1].protocol(), Some("bacnet"));
    }

    #[test]
    fn test_parse_json_device() {
        let device = parse_device(r#"{"name":"sensor-1"}"#, Format::Json).unwrap();
        assert_eq!(
            serde_json::to_value(&device).unwrap(),
            json!({ "name": "sensor-1" })
        );
    }

    #[test]
    fn test_list_is_not_a_device() {
        assert!(parse_device(r#"[{"name":"sensor-1"}]"#, Format::Json).is_err());
        assert!(parse_devices(r#"{"name":"sensor-1"}"#, Format::Json).is_err());
    }

    #[test]
    fn test_parse_any_falls_back_to_yaml() {
        let device: Device = parse_any("name: sensor-1\ninterval: 10\n").unwrap();
        assert_eq!(device.name(), Some("sensor-1"));
        assert_eq!(device.interval(), Some(10));

        let device: Device = parse_any(r#"{"name":"sensor-2"}"#).unwrap();
        assert_eq!(device.name(), Some("sensor-2"));
    }

    #[tokio::test]
    async fn test_read_devices_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.yml");
        tokio::fs::write(&path, DEVICES_YAML).await.unwrap();

        let devices = read_devices(&path).await.unwrap();
        assert_eq!(devices.len(), 2);
    }

    #[tokio::test]
    async fn test_read_device_missing_file() {
        let err = read_device("/definitely/not/here.json").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
