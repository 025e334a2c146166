//! Drives a tray through the headless presentation and prints its menu.
//!
//! ```text
//! RUST_LOG=horizon_tray_core=debug cargo run -p horizon-tray --example headless
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use horizon_tray::logging::{MenuTreeDebug, TreeFormatOptions};
use horizon_tray::{HeadlessPresentation, Tray, TrayIconData, with_on_clicked};
use parking_lot::Mutex;

fn main() -> horizon_tray::Result<()> {
    horizon_tray::logging::init()?;

    let tray = Tray::builder()
        .title("Horizon")
        .tooltip("Horizon Tray demo")
        .build()?;
    tray.set_icon(TrayIconData::from_rgba(vec![0x40; 16 * 16 * 4], 16, 16)?);

    let opened = Arc::new(AtomicUsize::new(0));
    let file = tray.add_menu_item("File", []);
    let open = {
        let opened = opened.clone();
        file.add_sub_menu_item(
            "Open",
            [with_on_clicked(move || {
                opened.fetch_add(1, Ordering::SeqCst);
            })],
        )
    };
    tray.add_separator_in(&file);
    file.add_sub_menu_item("Recent", []).disable();

    let paused = tray
        .menu_item("Paused")
        .tooltip("Stop syncing")
        .checkable(false)
        .build();
    let toggled = paused.clone();
    let pause_toggle = tray.add_menu_item(
        "Toggle pause",
        [with_on_clicked(move || {
            if toggled.is_checked() {
                toggled.uncheck();
            } else {
                toggled.check();
            }
        })],
    );

    tray.add_separator();
    let quitter = tray.clone();
    let quit = tray.add_menu_item("Quit", [with_on_clicked(move || quitter.quit())]);

    let (presentation, handle) = HeadlessPresentation::new();
    let exited = Arc::new(Mutex::new(false));
    let runner = {
        let tray = tray.clone();
        let exited = exited.clone();
        thread::spawn(move || {
            tray.run(
                presentation,
                || tracing::info!("tray ready"),
                move || *exited.lock() = true,
            )
        })
    };

    while !handle.is_registered() {
        thread::sleep(Duration::from_millis(10));
    }

    for _ in 0..3 {
        handle.click(open.id());
    }
    handle.click(pause_toggle.id());

    println!(
        "{}",
        MenuTreeDebug::with_options(TreeFormatOptions::detailed()).format(&tray)
    );
    println!("Open clicked {} times", opened.load(Ordering::SeqCst));

    handle.click(quit.id());
    runner.join().map_err(|_| {
        horizon_tray::TrayError::Presentation("presentation thread panicked".into())
    })??;

    println!("exit callback ran: {}", *exited.lock());
    Ok(())
}
