//! End-to-end tests driving a tray through the headless presentation.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use horizon_tray_core::{
    HeadlessEntry, HeadlessHandle, HeadlessPresentation, LifecycleState, MenuItemId, Result, Tray,
    with_checkable, with_on_clicked, with_parent,
};

fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

fn start(tray: &Tray) -> (thread::JoinHandle<Result<()>>, HeadlessHandle) {
    let (presentation, handle) = HeadlessPresentation::new();
    let runner = {
        let tray = tray.clone();
        thread::spawn(move || tray.run(presentation, || {}, || {}))
    };
    assert!(wait_until(|| handle.is_registered()));
    (runner, handle)
}

fn stop(tray: &Tray, runner: thread::JoinHandle<Result<()>>) {
    tray.quit();
    runner.join().unwrap().unwrap();
}

#[test]
fn file_open_clicked_three_times() {
    let tray = Tray::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let file = tray.add_menu_item("File", []);
    let counter_clone = counter.clone();
    let open = tray.add_menu_item(
        "Open",
        [
            with_parent(&file),
            with_on_clicked(move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            }),
        ],
    );
    assert!(!file.is_checked());
    assert!(!file.is_disabled());

    let (runner, handle) = start(&tray);
    for _ in 0..3 {
        assert!(handle.click(open.id()));
    }
    assert_eq!(counter.load(Ordering::SeqCst), 3);

    assert_eq!(tray.find_item(file.id()).unwrap().title(), "File");
    assert_eq!(tray.find_item(open.id()).unwrap().title(), "Open");
    assert_eq!(handle.item(open.id()).unwrap().parent, Some(file.id()));

    stop(&tray, runner);
}

#[test]
fn paused_check_uncheck_pushes_each_state() {
    let tray = Tray::new();
    let (runner, handle) = start(&tray);

    let paused = tray.add_menu_item("Paused", [with_checkable(false)]);
    paused.check();
    assert!(paused.is_checked());
    paused.uncheck();
    assert!(!paused.is_checked());

    assert!(wait_until(|| handle.history(paused.id()).len() == 3));
    let checked: Vec<bool> = handle
        .history(paused.id())
        .iter()
        .map(|snapshot| snapshot.checked)
        .collect();
    assert_eq!(checked, vec![false, true, false]);
    assert!(handle.item(paused.id()).unwrap().checkable);

    stop(&tray, runner);
}

#[test]
fn separator_consumes_id_but_is_not_registered() {
    let tray = Tray::new();
    let (runner, handle) = start(&tray);

    let a = tray.add_menu_item("A", []);
    let separator = tray.add_separator();
    let b = tray.add_menu_item("B", []);

    assert!(a.id() < separator);
    assert!(separator < b.id());
    assert!(tray.find_item(separator).is_none());
    assert!(!tray.registry().contains(separator));

    assert!(wait_until(|| handle.entries().len() == 3));
    let entries = handle.entries();
    assert_eq!(entries[1], HeadlessEntry::Separator { id: separator, parent: None });

    // Clicking the separator is a no-op.
    assert!(handle.click(separator));

    stop(&tray, runner);
}

#[test]
fn selection_of_unknown_ids_is_ignored() {
    let tray = Tray::new();
    let clicks = Arc::new(AtomicUsize::new(0));
    let clicks_clone = clicks.clone();
    tray.add_menu_item(
        "Known",
        [with_on_clicked(move || {
            clicks_clone.fetch_add(1, Ordering::SeqCst);
        })],
    );

    tray.notify_selection(MenuItemId::from_raw(0));
    tray.notify_selection(MenuItemId::from_raw(12_345));
    tray.notify_selection(tray.add_separator());
    assert_eq!(clicks.load(Ordering::SeqCst), 0);
}

#[test]
fn concurrent_quit_runs_exit_once() {
    let tray = Tray::new();
    let exits = Arc::new(AtomicUsize::new(0));
    let (presentation, handle) = HeadlessPresentation::new();

    let runner = {
        let tray = tray.clone();
        let exits = exits.clone();
        thread::spawn(move || {
            tray.run(presentation, || {}, move || {
                exits.fetch_add(1, Ordering::SeqCst);
            })
        })
    };
    assert!(wait_until(|| handle.is_registered()));

    let quitters: Vec<_> = (0..16)
        .map(|_| {
            let tray = tray.clone();
            thread::spawn(move || tray.quit())
        })
        .collect();
    for quitter in quitters {
        quitter.join().unwrap();
    }

    runner.join().unwrap().unwrap();
    assert_eq!(exits.load(Ordering::SeqCst), 1);
    assert_eq!(tray.state(), LifecycleState::Quit);
    assert!(handle.is_torn_down());
}

#[test]
fn concurrent_creation_issues_distinct_ids() {
    let tray = Tray::new();

    let creators: Vec<_> = (0..8)
        .map(|t| {
            let tray = tray.clone();
            thread::spawn(move || {
                let mut ids = Vec::new();
                for i in 0..100 {
                    if i % 10 == 0 {
                        ids.push(tray.add_separator());
                    } else {
                        ids.push(tray.add_menu_item(format!("{t}-{i}"), []).id());
                    }
                }
                ids
            })
        })
        .collect();

    let mut all = HashSet::new();
    for creator in creators {
        let ids = creator.join().unwrap();
        // Increasing in the order each thread received them.
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        all.extend(ids);
    }
    assert_eq!(all.len(), 800);
    assert_eq!(tray.registry().len(), 720);
}

#[test]
fn racing_titles_settle_on_one_value() {
    let tray = Tray::new();
    let (runner, handle) = start(&tray);
    let item = tray.add_menu_item("start", []);

    let writers: Vec<_> = ["A", "B"]
        .into_iter()
        .map(|title| {
            let item = item.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    item.set_title(title);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let settled = item.title();
    assert!(settled == "A" || settled == "B");
    assert_eq!(item.title(), settled);

    // The last snapshot the presentation sees matches the stored title.
    assert!(wait_until(|| handle.snapshot_count() == 401));
    assert_eq!(handle.item(item.id()).unwrap().title, settled);

    stop(&tray, runner);
}

#[test]
fn hidden_items_keep_their_state() {
    let tray = Tray::new();
    let (runner, handle) = start(&tray);

    let item = tray.add_menu_item("Sync", []);
    item.hide();
    item.set_title("Sync now");
    assert!(wait_until(|| {
        !handle.is_visible(item.id())
            && handle.item(item.id()).is_some_and(|s| s.title == "Sync now")
    }));

    item.show();
    assert!(wait_until(|| handle.is_visible(item.id())));

    stop(&tray, runner);
}

#[test]
fn independent_trays_do_not_share_ids() {
    let first = Tray::new();
    let second = Tray::new();

    let a = first.add_menu_item("a", []);
    let b = second.add_menu_item("b", []);

    assert_eq!(a.id(), b.id());
    assert!(first.find_item(a.id()).is_some_and(|item| item.title() == "a"));
    assert!(second.find_item(b.id()).is_some_and(|item| item.title() == "b"));
}
