//! Group command handlers.

use tabled::Tabled;

use huelink_core::{DeviceGroup, UpdateCommand};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Brightness")]
    brightness: u8,
    #[tabled(rename = "Type")]
    kind: String,
}

impl GroupRow {
    fn new(g: &DeviceGroup, color: bool) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            power: output::power_label(g.is_on, color),
            brightness: g.brightness,
            kind: g
                .metadata
                .get("type")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("-")
                .to_owned(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: GroupsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let bridge = super::connect(&cfg, global)?;
    let groups = bridge.refresh().await?;

    match args.command {
        GroupsCommand::List => {
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                groups.as_slice(),
                |g| GroupRow::new(g, color),
                |g| g.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Set(set) => {
            let cmd = UpdateCommand {
                group: set.name,
                is_on: set.on,
                brightness: set.brightness,
            };
            let matched = bridge.apply_update(&cmd).await;
            if matched == 0 {
                return Err(CliError::GroupNotFound { name: cmd.group });
            }

            let state = if cmd.is_on { "on" } else { "off" };
            if !global.quiet {
                eprintln!("Switched {matched} group(s) named '{}' {state}", cmd.group);
            }
            Ok(())
        }
    }
}
