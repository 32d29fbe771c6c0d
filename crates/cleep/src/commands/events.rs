//! Event streaming: `cleep events watch`.

use std::sync::Arc;

use serde::Serialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};

use cleep_core::{DeviceStore, EventHub, ModuleEvent, connect, spawn_clock_sync};

use crate::cli::{EventsArgs, EventsCommand, GlobalOpts, OutputFormat};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::devices::clock_time;

#[derive(Serialize)]
struct EventLine<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<&'a str>,
    params: &'a serde_json::Value,
}

fn render_event(format: &OutputFormat, event: &ModuleEvent) -> String {
    let line = EventLine {
        event: &event.name,
        device_id: event.device_id.as_deref(),
        params: &event.params,
    };
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            serde_json::to_string(&line).unwrap_or_default()
        }
        OutputFormat::Yaml => {
            format!("---\n{}", serde_yaml::to_string(&line).unwrap_or_default())
        }
        OutputFormat::Plain => event.name.clone(),
        OutputFormat::Table => {
            let device = event.device_id.as_deref().unwrap_or("-");
            format!("{:<28} {device:<16} {}", event.name, event.params)
        }
    }
}

fn matches_filter(filter: Option<&str>, event: &ModuleEvent) -> bool {
    filter.is_none_or(|prefix| event.name.starts_with(prefix))
}

pub async fn handle(args: EventsArgs, target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        EventsCommand::Watch {
            filter,
            count,
            clock,
        } => watch(target, global, filter.as_deref(), count, clock).await,
    }
}

async fn watch(
    target: &Target,
    global: &GlobalOpts,
    filter: Option<&str>,
    count: Option<usize>,
    clock: bool,
) -> Result<(), CliError> {
    let client = Arc::new(connect(&target.client)?);
    let hub = EventHub::default();

    // Clock devices must be known before time events can be merged.
    let store = Arc::new(DeviceStore::new());
    let clock_sync = if clock {
        store
            .fetch_module_devices(client.as_ref(), &target.module)
            .await?;
        Some(spawn_clock_sync(&hub, Arc::clone(&store)))
    } else {
        None
    };
    let mut devices = store.subscribe();

    let mut stream = BroadcastStream::new(hub.subscribe());
    let listener = hub.spawn_listener(Arc::clone(&client), target.client.reconnect.clone());
    debug!(module = %target.module, "watching events");

    let mut seen = 0usize;
    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            changed = devices.changed(), if clock => {
                if changed.is_err() {
                    break;
                }
                let snap = devices.borrow_and_update().clone();
                for device in snap.iter().filter(|d| d.is_clock()) {
                    output::print_output(
                        &format!("{} {}", device.name, clock_time(device)),
                        global.quiet,
                    );
                }
            }
            item = stream.next() => match item {
                Some(Ok(event)) => {
                    if !matches_filter(filter, &event) {
                        continue;
                    }
                    output::print_output(&render_event(&global.output, &event), global.quiet);
                    seen += 1;
                    if count.is_some_and(|limit| seen >= limit) {
                        break;
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    warn!(skipped, "event output lagged behind the device");
                }
                None => break,
            },
        }
    }

    listener.close().await;
    if let Some(sync) = clock_sync {
        sync.close().await;
    }
    Ok(())
}
