//! Device listing.

use std::sync::Arc;

use tabled::Tabled;

use cleep_core::{Device, DeviceStore, connect};

use crate::cli::GlobalOpts;
use crate::config::Target;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            uuid: d.uuid.clone(),
            device_type: d.device_type.clone(),
            name: d.name.clone(),
            time: clock_time(d),
        }
    }
}

/// `HH:MM` for clock devices that received a time, `-` otherwise.
pub(super) fn clock_time(device: &Device) -> String {
    match (device.hour, device.minute) {
        (Some(h), Some(m)) => format!("{h:02}:{m:02}"),
        _ => "-".into(),
    }
}

pub async fn handle(target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    let client = connect(&target.client)?;
    let store = DeviceStore::new();
    store.fetch_module_devices(&client, &target.module).await?;

    let snap = store.snapshot();
    let out = output::render_list(
        &global.output,
        &snap,
        |d| DeviceRow::from(d),
        |d| d.uuid.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
