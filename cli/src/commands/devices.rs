use crate::print::TablePrint;
use anyhow::{Context as _, bail};
use clap::Subcommand;
use colored::Colorize;
use models::device::Device;
use sensor_edge::api::{DeviceAPI, Reply};
use sensor_edge::device_file;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum DevicesCommands {
    /// List the devices registered on the gateway
    #[command(visible_alias = "list")]
    Ls {
        #[arg(short, long, default_value = "false")]
        json: bool,
    },
    /// Create a device from a JSON or YAML file (`-` reads stdin)
    Create {
        file: String,
    },
    /// Create every device listed in a JSON or YAML file
    Import {
        file: PathBuf,
    },
    /// Replace a device with the contents of a JSON or YAML file (`-` reads stdin)
    Update {
        /// Device ID, used verbatim in the request path
        id: String,
        file: String,
    },
    /// Remove devices
    #[command(visible_alias = "delete")]
    Rm {
        /// Device IDs, used verbatim in the request path
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

impl DevicesCommands {
    pub async fn handle(self, config: sensor_edge::config::Config) -> anyhow::Result<()> {
        let api = DeviceAPI::new(&config)?;

        match self {
            DevicesCommands::Ls { json } => handle_devices_ls(&api, json).await?,
            DevicesCommands::Create { file } => {
                let device = device_file::read_device(&file).await?;
                let reply = api
                    .create_device(&device)
                    .await
                    .with_context(|| "Failed to create device")?;
                println!("{}", "Device created".bright_green());
                print_reply(&reply);
            }
            DevicesCommands::Import { file } => {
                let devices = device_file::read_devices(&file).await?;
                let imported = import_devices(&api, &devices).await?;
                println!(
                    "{}",
                    format!("Imported {} device(s)", imported).bright_green()
                );
            }
            DevicesCommands::Update { id, file } => {
                let device = device_file::read_device(&file).await?;
                let reply = api
                    .update_device(&id, &device)
                    .await
                    .with_context(|| format!("Failed to update device '{}'", id))?;
                println!("{} {}", "Device updated:".bright_green(), id.bold());
                print_reply(&reply);
            }
            DevicesCommands::Rm { ids, yes } => handle_devices_rm(&api, ids, yes).await?,
        };

        Ok(())
    }
}

fn print_reply(reply: &Reply) {
    if reply.is_empty() {
        return;
    }

    match reply.json::<serde_json::Value>() {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", reply.body),
        },
        Err(_) => println!("{}", reply.body),
    }
}

fn ping_colored(enable_ping: Option<bool>) -> String {
    match enable_ping {
        Some(true) => "yes".bright_green().to_string(),
        Some(false) => "no".red().to_string(),
        None => "-".dimmed().to_string(),
    }
}

fn device_row(device: &Device) -> Vec<String> {
    vec![
        device.id().unwrap_or_else(|| "-".to_owned()),
        device.name().unwrap_or("-").to_owned(),
        device
            .protocol_name()
            .or(device.protocol())
            .unwrap_or("-")
            .to_owned(),
        device
            .interval()
            .map(|secs| format!("{}s", secs))
            .unwrap_or_else(|| "-".to_owned()),
        ping_colored(device.enable_ping()),
    ]
}

async fn handle_devices_ls(api: &DeviceAPI, json: bool) -> anyhow::Result<()> {
    let reply = api
        .fetch_devices()
        .await
        .with_context(|| format!("Failed to list devices from {}", api.domain()))?;

    let devices = match reply.devices() {
        Ok(devices) => devices,
        Err(err) => {
            tracing::debug!("device list is not JSON: {err}");
            if !reply.is_empty() {
                println!("{}", reply.body);
            }
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string(&devices)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!("No devices found");
        return Ok(());
    }

    let mut table =
        TablePrint::new_with_headers(vec!["ID", "Name", "Protocol", "Interval", "Ping"]);
    for device in &devices {
        table.add_row(device_row(device));
    }
    table.print();

    Ok(())
}

/// Creates the devices in file order and stops at the first failure, so a
/// rerun after fixing the file shows exactly where the import broke off.
async fn import_devices(api: &DeviceAPI, devices: &[Device]) -> anyhow::Result<usize> {
    for (index, device) in devices.iter().enumerate() {
        let label = device
            .id()
            .or_else(|| device.name().map(str::to_owned))
            .unwrap_or_else(|| format!("#{}", index + 1));

        api.create_device(device).await.with_context(|| {
            format!(
                "Failed to import device '{}' ({} of {} imported)",
                label,
                index,
                devices.len()
            )
        })?;

        println!("  {} {}", "+".bright_green(), label);
    }

    Ok(devices.len())
}

async fn handle_devices_rm(api: &DeviceAPI, ids: Vec<String>, yes: bool) -> anyhow::Result<()> {
    println!("Removing {} device(s):", ids.len());
    for id in &ids {
        println!("  - {}", id);
    }

    if !yes {
        if !io::stdin().is_terminal() {
            bail!("error: cannot prompt for confirmation without a terminal.\nUse -y/--yes to proceed.");
        }

        print!("\n{} [y/N]: ", "Proceed?".bold());
        io::Write::flush(&mut io::stdout())?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "y" {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let mut failed = 0;
    for id in &ids {
        match api.delete_device(id).await {
            Ok(_) => println!("{} {}", "Removed".bright_green(), id),
            Err(err) => {
                failed += 1;
                eprintln!("{} {}: {}", "Failed to remove".red(), id, err);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} device(s) could not be removed", failed, ids.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_import_stops_at_first_failure() {
        let server = MockServer::start().await;
        let api = DeviceAPI::with_client(reqwest::Client::new(), server.uri());

        Mock::given(method("POST"))
            .and(path("/api/devices"))
            .and(body_json(serde_json::json!({ "name": "b" })))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/devices"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let devices = ["a", "b", "c"].map(|name| Device::new().with("name", name));
        let err = import_devices(&api, &devices).await.unwrap_err();

        assert!(format!("{:#}", err).contains("Failed to import device 'b' (1 of 3 imported)"));
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_import_all_devices() {
        let server = MockServer::start().await;
        let api = DeviceAPI::with_client(reqwest::Client::new(), server.uri());

        Mock::given(method("POST"))
            .and(path("/api/devices"))
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&server)
            .await;

        let devices = [
            Device::new().with("id", "plc-01"),
            Device::new().with("id", "plc-02"),
        ];
        assert_eq!(import_devices(&api, &devices).await.unwrap(), 2);
    }

    #[test]
    fn test_device_row_falls_back_to_placeholders() {
        let device = Device::new()
            .with("id", 3)
            .with("protocol", "bacnet")
            .with("interval", 10);

        let row: Vec<String> = device_row(&device)
            .iter()
            .map(|cell| strip_ansi_escapes::strip_str(cell))
            .collect();
        assert_eq!(row, vec!["3", "-", "bacnet", "10s", "-"]);
    }
}
