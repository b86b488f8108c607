mod adapters;
mod config;
mod render;

use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

use meshbar_daemon_client::DaemonClient;
use meshbar_membership::{ControllerHandle, MembershipController, StateStore};
use meshbar_monitor::{MonitorConfig, StatusMonitor};
use meshbar_protocol::{JoinOptions, NetworkId};
use meshbar_tray::MenuAction;

use adapters::{GatewayAdapter, SourceAdapter};
use config::ShellConfig;
use render::Renderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,meshbar=debug")),
        )
        .init();

    let cfg = ShellConfig::load().unwrap_or_default();
    let endpoint =
        config::discover_daemon(&cfg.daemon_dir).context("is the meshd daemon running?")?;

    let client = Arc::new(DaemonClient::new(
        &endpoint.base_url,
        &endpoint.auth_token,
        cfg.request_timeout,
    )?);

    let store = Arc::new(StateStore::new());
    let mut controller = MembershipController::new(
        store.clone(),
        Arc::new(GatewayAdapter::new(client.clone())),
    );
    let events = controller
        .take_events()
        .context("controller events already taken")?;
    let handle = controller.handle();

    let monitor = StatusMonitor::spawn(
        Arc::new(SourceAdapter::new(client)),
        handle.monitor_sink(),
        MonitorConfig {
            poll_interval: cfg.poll_interval,
        },
    );

    let controller_task = tokio::spawn(controller.run());
    let render_task = tokio::spawn(Renderer::new(store.clone(), handle.clone()).run(events));

    run_command_loop(&handle, &store).await;

    monitor.shutdown().await;
    handle.shutdown().await;
    let _ = controller_task.await;
    render_task.abort();
    tracing::info!("meshbar shut down");
    Ok(())
}

/// Reads commands from stdin until quit or EOF.
async fn run_command_loop(handle: &ControllerHandle, store: &StateStore) {
    print_help();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("toggle") => match parse_id(parts.next()) {
                Some(id) => handle.request_toggle(id).await,
                None => println!("usage: toggle <network-id>"),
            },
            Some("join") => {
                let Some(id) = parse_id(parts.next()) else {
                    println!("usage: join <network-id> [default] [global] [unmanaged]");
                    continue;
                };
                let mut options = JoinOptions::default();
                for flag in parts {
                    match flag {
                        "default" => options.allow_default = true,
                        "global" => options.allow_global = true,
                        "unmanaged" => options.allow_managed = false,
                        other => println!("ignoring unknown flag {other:?}"),
                    }
                }
                handle.request_join(id, options).await;
            }
            Some("click") => {
                let Some(index) = parts.next().and_then(|s| s.parse::<usize>().ok()) else {
                    println!("usage: click <item-number>");
                    continue;
                };
                // Rebuild the menu from current snapshots, as an OS menu
                // would on open; the clicked item reflects the live state.
                let items = render::menu_state(store, handle).build_menu();
                match items.get(index) {
                    Some(item) if item.enabled => match item.action {
                        Some(MenuAction::ToggleNetwork(id)) => handle.request_toggle(id).await,
                        Some(MenuAction::CopyIdentifier) => {
                            handle.request_copy_identifier().await
                        }
                        Some(MenuAction::Refresh) => handle.request_refresh().await,
                        Some(MenuAction::Quit) => break,
                        None => {}
                    },
                    _ => println!("no clickable item {index}"),
                }
            }
            Some("copy") => handle.request_copy_identifier().await,
            Some("list") => handle.request_refresh().await,
            Some("help") => print_help(),
            Some("quit" | "exit") => break,
            Some(other) => println!("unknown command {other:?} (try help)"),
            None => {}
        }
    }
}

fn parse_id(arg: Option<&str>) -> Option<NetworkId> {
    let raw = arg?;
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            println!("{raw:?} is not a network id (expected up to 16 hex digits)");
            None
        }
    }
}

fn print_help() {
    println!(
        "commands: list | click <n> | toggle <id> | join <id> [default] [global] [unmanaged] | copy | quit"
    );
}
