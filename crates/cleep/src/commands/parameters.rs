//! Parameters panel command handlers: show, hostname, position, sun, auth.

use std::io::BufRead;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use secrecy::SecretString;
use serde::Serialize;
use tabled::Tabled;

use cleep_api::RpcClient;
use cleep_core::{
    AccountEntry, ParametersPanel, ParametersView, SunTimes, SyncOutcome, connect,
    is_valid_hostname,
};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts, HostnameArgs, PositionArgs};
use crate::config::Target;
use crate::error::CliError;
use crate::notifier::ConsoleNotifier;
use crate::output;

use super::util;

type Panel = ParametersPanel<RpcClient, ConsoleNotifier>;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Actions")]
    actions: String,
}

impl From<&Arc<AccountEntry>> for AccountRow {
    fn from(entry: &Arc<AccountEntry>) -> Self {
        Self {
            account: entry.display.label.clone(),
            actions: entry
                .display
                .actions
                .iter()
                .map(|a| a.tooltip.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Serialize)]
struct SunReport {
    sunrise: i64,
    sunset: i64,
    sunrise_local: Option<String>,
    sunset_local: Option<String>,
}

impl From<SunTimes> for SunReport {
    fn from(sun: SunTimes) -> Self {
        Self {
            sunrise: sun.sunrise,
            sunset: sun.sunset,
            sunrise_local: sun.sunrise_at().map(|t| local_time(t, "%Y-%m-%d %H:%M")),
            sunset_local: sun.sunset_at().map(|t| local_time(t, "%Y-%m-%d %H:%M")),
        }
    }
}

// ── Formatting helpers ──────────────────────────────────────────────

fn local_time(at: DateTime<Utc>, fmt: &str) -> String {
    at.with_timezone(&Local).format(fmt).to_string()
}

fn time_or_dash(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".into(), |t| local_time(t, "%H:%M"))
}

fn view_detail(view: &ParametersView) -> Vec<(&'static str, String)> {
    let position = if view.position.is_selected() {
        format!("{}, {}", view.position.latitude, view.position.longitude)
    } else {
        "-".into()
    };
    let country = match (&view.country.name, &view.country.code) {
        (Some(name), Some(code)) => format!("{name} ({code})"),
        (Some(name), None) => name.clone(),
        (None, Some(code)) => code.clone(),
        (None, None) => "-".into(),
    };
    let accounts = if view.auth_accounts.is_empty() {
        "-".into()
    } else {
        view.account_identifiers().join(", ")
    };

    vec![
        ("Hostname", view.hostname.clone()),
        ("Position", position),
        ("Sunrise", time_or_dash(view.sun.sunrise_at())),
        ("Sunset", time_or_dash(view.sun.sunset_at())),
        ("Country", country),
        ("Timezone", view.timezone.clone().unwrap_or_else(|| "-".into())),
        (
            "Secured access",
            if view.auth_enabled { "enabled" } else { "disabled" }.into(),
        ),
        ("Accounts", accounts),
    ]
}

fn sun_detail(sun: &SunReport) -> Vec<(&'static str, String)> {
    vec![
        (
            "Sunrise",
            sun.sunrise_local.clone().unwrap_or_else(|| "-".into()),
        ),
        (
            "Sunset",
            sun.sunset_local.clone().unwrap_or_else(|| "-".into()),
        ),
    ]
}

fn print_view(view: &ParametersView, global: &GlobalOpts) {
    let out = output::render_single(&global.output, view, view_detail, |v| v.hostname.clone());
    output::print_output(&out, global.quiet);
}

// ── Panel setup ─────────────────────────────────────────────────────

fn open_panel(target: &Target, global: &GlobalOpts) -> Result<Panel, CliError> {
    let client = connect(&target.client)?;
    let notifier = ConsoleNotifier::new(global.quiet, output::should_color(&global.color));
    Ok(
        ParametersPanel::with_module(target.module.clone(), client, notifier)
            .with_failure_policy(target.client.failure_policy),
    )
}

fn read_password(from_stdin: bool) -> Result<SecretString, CliError> {
    let password = if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    } else {
        rpassword::prompt_password("Password: ")?
    };
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn show(target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    let panel = open_panel(target, global)?;
    panel.initialize().await?;
    print_view(&panel.view(), global);
    Ok(())
}

pub async fn hostname(
    args: &HostnameArgs,
    target: &Target,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !is_valid_hostname(&args.name) {
        return Err(CliError::Validation {
            field: "hostname".into(),
            reason: format!(
                "'{}' must start with a letter, be at least 5 characters of letters, \
                 digits or '-', and not end with '-'",
                args.name
            ),
        });
    }

    let panel = open_panel(target, global)?;
    panel.set_hostname(&args.name).await?;
    print_view(&panel.view(), global);
    Ok(())
}

pub async fn position(
    args: &PositionArgs,
    target: &Target,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let panel = open_panel(target, global)?;
    // The unchanged-position guard compares against the device's value.
    panel.initialize().await?;
    if panel.set_position(args.latitude, args.longitude).await? == SyncOutcome::Skipped {
        return Ok(());
    }
    print_view(&panel.view(), global);
    Ok(())
}

pub async fn sun(target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    let panel = open_panel(target, global)?;
    let report = SunReport::from(panel.get_sun().await?);
    let out = output::render_single(&global.output, &report, sun_detail, |s| {
        format!("{}\n{}", s.sunrise, s.sunset)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn auth(args: AuthArgs, target: &Target, global: &GlobalOpts) -> Result<(), CliError> {
    let panel = open_panel(target, global)?;

    match args.command {
        AuthCommand::Enable => {
            panel.set_auth_enabled(true).await?;
        }
        AuthCommand::Disable => {
            panel.set_auth_enabled(false).await?;
        }
        AuthCommand::List => {
            panel.initialize().await?;
            let view = panel.view();
            let out = output::render_list(
                &global.output,
                &view.auth_accounts,
                |a| AccountRow::from(a),
                |a| a.identifier.clone(),
            );
            output::print_output(&out, global.quiet);
        }
        AuthCommand::Add {
            account,
            password_stdin,
        } => {
            if account.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "account".into(),
                    reason: "account name cannot be empty".into(),
                });
            }
            let password = read_password(password_stdin)?;
            panel.set_pending_account(account);
            panel.set_pending_password(password);
            panel.submit_pending_account().await?;
        }
        AuthCommand::Delete { account } => {
            panel.initialize().await?;
            let view = panel.view();
            let action = view
                .auth_accounts
                .iter()
                .find(|entry| entry.identifier == account)
                .and_then(|entry| entry.display.actions.first())
                .map(|row| row.action.clone())
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "account".into(),
                    identifier: account.clone(),
                    list_command: "auth list".into(),
                })?;

            if !util::confirm(
                &format!("Delete account '{account}'?"),
                "auth delete",
                global.yes,
            )? {
                return Ok(());
            }
            panel.dispatch(&action).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cleep_core::{Country, Position};

    use super::*;

    #[test]
    fn detail_marks_unset_values() {
        let view = ParametersView {
            hostname: "cleep".into(),
            ..ParametersView::default()
        };
        let detail = view_detail(&view);
        let get = |field: &str| {
            detail
                .iter()
                .find(|(f, _)| *f == field)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("Hostname").as_deref(), Some("cleep"));
        assert_eq!(get("Position").as_deref(), Some("-"));
        assert_eq!(get("Sunrise").as_deref(), Some("-"));
        assert_eq!(get("Secured access").as_deref(), Some("disabled"));
    }

    #[test]
    fn detail_formats_country_and_position() {
        let view = ParametersView {
            position: Position::new(45.5, 4.25),
            country: Country {
                name: Some("France".into()),
                code: Some("FR".into()),
            },
            ..ParametersView::default()
        };
        let detail = view_detail(&view);
        assert!(detail.contains(&("Position", "45.5, 4.25".into())));
        assert!(detail.contains(&("Country", "France (FR)".into())));
    }

    #[test]
    fn account_row_lists_row_actions() {
        let row = AccountRow::from(&Arc::new(AccountEntry::new("alice")));
        assert_eq!(row.account, "alice");
        assert_eq!(row.actions, "Delete");
    }
}
