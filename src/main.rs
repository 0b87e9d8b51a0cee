//! Area Window List Inspector
//!
//! Loads a window manager snapshot, builds the window list from it and
//! prints the entries and the command state of a selection.
//!
//! Usage: `area-winlist <snapshot.json> [--select id,id,...]`

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use area_winlist::WindowListConfig;
use area_winlist::wm::snapshot::{Snapshot, SnapshotController};
use area_winlist::wm::{NullSink, PopupRequest, RowLease, WindowEntry, WindowList, WindowRef};

struct Args {
    snapshot: PathBuf,
    select: Vec<WindowRef>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut snapshot = None;
    let mut select = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--select" => {
                let list = args.next().context("--select needs a list of window ids")?;
                for id in list.split(',').filter(|s| !s.is_empty()) {
                    let id = parse_window_id(id.trim())
                        .with_context(|| format!("Invalid window id {:?}", id))?;
                    select.push(id);
                }
            }
            _ if snapshot.is_none() => snapshot = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument {:?}", arg),
        }
    }

    let snapshot = snapshot.context("Usage: area-winlist <snapshot.json> [--select id,id,...]")?;
    Ok(Args { snapshot, select })
}

fn parse_window_id(text: &str) -> Result<WindowRef> {
    let id = match text.strip_prefix("0x") {
        Some(hex) => WindowRef::from_str_radix(hex, 16)?,
        None => text.parse()?,
    };
    Ok(id)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "area_winlist=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args()?;

    let config = WindowListConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {:#}", e);
        WindowListConfig::default()
    });

    let snapshot = Snapshot::load(&args.snapshot)?;
    let controller = SnapshotController::from_snapshot(&snapshot);
    let windows = controller.window_ids();

    let mut list = WindowList::new(controller, snapshot.workspace_table(), NullSink, config);
    let _leases: Vec<RowLease> = list.populate(windows);

    let rows: Vec<_> = args
        .select
        .iter()
        .filter_map(|&window| {
            let row = list.registry().row_for_window(window);
            if row.is_none() {
                warn!("Window {} is not listed, not selecting it", window);
            }
            row
        })
        .collect();
    list.set_selection(rows);
    info!("{} of {} windows selected", list.selection().len(), args.select.len());

    let len = list.registry().len();
    for position in 0..len {
        let label = list.entry_label(position).unwrap_or_default();
        let indent = list.entry_indent(position).unwrap_or_default() as usize;
        let header = list
            .registry()
            .entry(position)
            .is_some_and(WindowEntry::is_header);
        if header {
            println!("{:>4}  [{}]", position, label);
        } else {
            let depth = indent / list.config().indent_step.max(1) as usize;
            println!("{:>4}  {}{}", position, "  ".repeat(depth), label);
        }
    }

    let commands = list
        .availability()
        .iter()
        .map(|(command, state)| {
            Ok(serde_json::json!({
                "command": serde_json::to_value(command)?,
                "checked": state.checked,
                "enabled": list.availability().is_enabled(command),
            }))
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()
        .context("Failed to serialize command state")?;

    let point = snapshot
        .screens
        .first()
        .map(|screen| screen.center())
        .unwrap_or_default();
    let plan = list.show_focused(&PopupRequest {
        point,
        screens: &snapshot.screens,
        current: None,
        popup: None,
    });

    let report = serde_json::json!({
        "menu_enabled": list.availability().menu_enabled,
        "commands": commands,
        "popup": {
            "geometry": plan.geometry,
            "scroll_to": plan.scroll_to,
        },
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to format report")?
    );

    Ok(())
}
