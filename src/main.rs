mod config;
mod data;
mod export;
mod figure;
mod grid;
mod types;
mod ui;

use clap::Parser;
use crossterm::event::{self, Event};
use std::io;
use std::process::exit;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use config::{load_config, reset_config, save_config, Cli, SavedConfig};
use data::LoaderMsg;
use grid::{graph_click_factory, register_builtin_renderers, GridOptions, DCC_GRAPH_CLICK_DATA};
use types::{App, CommodityRowFormatted, NOTIFICATION_TIMEOUT_SECS};

fn display_startup_info(source: &str, is_json: bool, row_height: u16) {
    eprintln!("🚀 Starting sparkgrid...");
    eprintln!("📈 Data source: {}", source);
    eprintln!(
        "📊 Mode: {}",
        if is_json { "JSON output" } else { "Interactive TUI" }
    );
    if !is_json {
        eprintln!("⏱️  Preparing the commodity grid... (Press 'q' to quit)");
        eprintln!();
        eprintln!("🎯 Tip: click a point on a trend sparkline to open that commodity's price history");
        eprintln!("📊 Row height: {} lines per commodity", row_height);
        eprintln!();
    }
}

#[tokio::main]
async fn main() -> Result<(), io::Error> {
    let cli = Cli::parse();

    // Handle reset flag first
    if cli.reset {
        match reset_config() {
            Ok(true) => {
                println!("✅ Saved configuration has been reset.");
                println!("   Next time you run the program, defaults apply again.");
            }
            Ok(false) => {
                println!("ℹ️  No saved configuration found to reset.");
            }
            Err(e) => {
                eprintln!("❌ Error resetting configuration: {}", e);
                exit(1);
            }
        }
        return Ok(());
    }

    let saved = load_config().unwrap_or_default();
    let data_path = cli.data.clone().or(saved.data_path);
    let row_height = cli.row_height.unwrap_or(saved.row_height);

    // Flags given explicitly are persisted for the next run
    if cli.data.is_some() || cli.row_height.is_some() {
        let updated = SavedConfig {
            data_path: data_path.clone(),
            row_height,
        };
        match save_config(&updated) {
            Ok(()) => println!("💾 Saved configuration for future runs"),
            Err(e) => eprintln!("⚠️  Could not save configuration: {}", e),
        }
    }

    let (csv_text, data_label) = match &data_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => (text, path.clone()),
            Err(e) => {
                eprintln!("❌ Could not read '{}': {}", path, e);
                exit(1);
            }
        },
        None => (data::SAMPLE_CSV.to_string(), "built-in sample".to_string()),
    };

    let (tx, mut rx) = mpsc::channel(100);

    // Parse and aggregate off the UI thread, streaming rows as they finish
    thread::spawn(move || {
        let table = match data::parse_cmo_csv(&csv_text) {
            Ok(table) => table,
            Err(e) => {
                let _ = tx.blocking_send(LoaderMsg::Failed(e.to_string()));
                return;
            }
        };
        for row in data::build_rows(&table) {
            if tx.blocking_send(LoaderMsg::Row(row)).is_err() {
                return;
            }
        }
        let _ = tx.blocking_send(LoaderMsg::Done);
    });

    if cli.json {
        display_startup_info(&data_label, true, row_height);

        let mut rows = Vec::new();
        while let Some(msg) = rx.recv().await {
            match msg {
                LoaderMsg::Row(row) => rows.push(CommodityRowFormatted::from(&row)),
                LoaderMsg::Done => break,
                LoaderMsg::Failed(error) => {
                    eprintln!("❌ {}", error);
                    exit(1);
                }
            }
        }
        if let Ok(json_output) = serde_json::to_string_pretty(&rows) {
            println!("{}", json_output);
        }
        return Ok(());
    }

    display_startup_info(&data_label, false, row_height);

    // Small delay to let user read the information
    thread::sleep(Duration::from_millis(1500));

    let (click_tx, mut click_rx) = mpsc::unbounded_channel();

    let mut grid = GridOptions::new("Commodities", data::column_defs(None));
    register_builtin_renderers(&mut grid.registry);
    // Swap in the interactive variant so trend cells feed clicks back to the app
    grid.registry
        .register(DCC_GRAPH_CLICK_DATA, graph_click_factory());
    grid.row_height = row_height;
    grid.sync = Some(click_tx);

    let mut app = App::new(grid, &data_label);
    let mut terminal = ui::setup_terminal()?;

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        // --- Draw UI ---
        ui::render_ui(&mut app, &mut terminal)?;

        // --- Input Handling ---
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            match event::read()? {
                Event::Key(event) => {
                    if event.kind == crossterm::event::KeyEventKind::Press
                        && ui::input::handle_key_event(&mut app, event.code)
                    {
                        break; // Exit condition
                    }
                }
                Event::Mouse(event) => ui::input::handle_mouse_event(&mut app, event),
                _ => {}
            }
        }

        // --- Tick-based updates ---
        if last_tick.elapsed() >= tick_rate {
            // Drain loader messages
            while let Ok(msg) = rx.try_recv() {
                match msg {
                    LoaderMsg::Row(row) => app.push_row(row),
                    LoaderMsg::Done => app.loading = false,
                    LoaderMsg::Failed(error) => {
                        app.loading = false;
                        app.load_error = Some(error);
                    }
                }
            }

            // Drain chart click payloads relayed by the grid cells
            while let Ok(event) = click_rx.try_recv() {
                app.apply_graph_event(event);
            }

            // Cleanup export notifications that have been displayed for more than 5 seconds
            if let Some(time) = app.export_notification_time {
                if time.elapsed() > Duration::from_secs(NOTIFICATION_TIMEOUT_SECS) {
                    app.export_notification = None;
                    app.export_notification_time = None;
                }
            }

            last_tick = Instant::now();
        }
    }

    ui::restore_terminal(&mut terminal)?;
    Ok(())
}
