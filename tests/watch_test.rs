use docdex::{
    BasicNormalizer, Config, FileSystemWatcher, PollOutcome, RescanSignal, SearchEngine,
    WatchService, WatcherState,
};
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const DEBOUNCE: Duration = Duration::from_millis(250);

fn txt_only() -> Vec<String> {
    vec!["txt".to_string()]
}

#[test]
fn test_watcher_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let mut watcher = FileSystemWatcher::new(temp_dir.path(), txt_only(), DEBOUNCE);
    assert_eq!(watcher.state(), WatcherState::Idle);

    let _signals = watcher.start().unwrap();
    assert_eq!(watcher.state(), WatcherState::Watching);

    // A second start while watching is rejected
    assert!(watcher.start().is_err());
    assert_eq!(watcher.state(), WatcherState::Watching);

    watcher.stop();
    assert_eq!(watcher.state(), WatcherState::Stopped);

    // Stopping again is fine, restarting is not
    watcher.stop();
    assert_eq!(watcher.state(), WatcherState::Stopped);
    assert!(watcher.start().is_err());
}

#[test]
fn test_stop_before_start() {
    let temp_dir = TempDir::new().unwrap();
    let mut watcher = FileSystemWatcher::new(temp_dir.path(), txt_only(), DEBOUNCE);

    watcher.stop();
    assert_eq!(watcher.state(), WatcherState::Stopped);
    assert!(watcher.start().is_err());
}

#[test]
fn test_start_errors_on_missing_root() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing");

    let mut watcher = FileSystemWatcher::new(&missing, txt_only(), DEBOUNCE);
    assert!(watcher.start().is_err());
    assert_eq!(watcher.state(), WatcherState::Idle);
}

#[test]
fn test_watcher_delivers_signal_on_change() {
    let temp_dir = TempDir::new().unwrap();
    let docs_dir = temp_dir.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();

    let mut watcher = FileSystemWatcher::new(&docs_dir, txt_only(), DEBOUNCE);
    let signals = watcher.start().unwrap();

    // Give the OS watch a moment to become effective
    thread::sleep(Duration::from_millis(200));
    fs::write(docs_dir.join("new.txt"), "fresh content").unwrap();

    assert_eq!(
        signals.recv_timeout(Duration::from_secs(10)),
        Ok(RescanSignal)
    );

    watcher.stop();
}

#[test]
fn test_watcher_ignores_other_extensions() {
    let temp_dir = TempDir::new().unwrap();
    let docs_dir = temp_dir.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();

    let mut watcher = FileSystemWatcher::new(&docs_dir, txt_only(), DEBOUNCE);
    let signals = watcher.start().unwrap();

    thread::sleep(Duration::from_millis(200));
    fs::write(docs_dir.join("image.bin"), "binary-ish payload").unwrap();

    // Long enough for the debounce window to have flushed
    assert!(signals.recv_timeout(Duration::from_secs(2)).is_err());

    watcher.stop();
}

#[test]
fn test_rapid_changes_coalesce() {
    let temp_dir = TempDir::new().unwrap();
    let docs_dir = temp_dir.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();

    let mut watcher = FileSystemWatcher::new(&docs_dir, txt_only(), DEBOUNCE);
    let signals = watcher.start().unwrap();
    thread::sleep(Duration::from_millis(200));

    for i in 0..5 {
        fs::write(docs_dir.join(format!("f{}.txt", i)), "content").unwrap();
    }

    assert!(signals.recv_timeout(Duration::from_secs(10)).is_ok());

    // Wait out any residual window, then drain what is left. Five writes
    // must not have queued five signals.
    thread::sleep(Duration::from_millis(800));
    let mut extra = 0;
    while signals.try_recv().is_ok() {
        extra += 1;
    }
    assert!(extra <= 1);

    watcher.stop();
}

#[test]
fn test_events_after_receiver_dropped_do_not_panic() {
    let temp_dir = TempDir::new().unwrap();
    let docs_dir = temp_dir.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();

    let mut watcher = FileSystemWatcher::new(&docs_dir, txt_only(), DEBOUNCE);
    let signals = watcher.start().unwrap();
    drop(signals);

    // The producer hits a disconnected channel and must swallow it
    fs::write(docs_dir.join("late.txt"), "content").unwrap();
    thread::sleep(Duration::from_millis(600));

    watcher.stop();
    assert_eq!(watcher.state(), WatcherState::Stopped);
}

/// Watcher and service together: a file written while watching becomes
/// searchable without any manual sync
#[test]
fn test_watch_pipeline_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let docs_dir = temp_dir.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(docs_dir.join("seed.txt"), "unrelated filler words").unwrap();

    let config = Config::new(Some(temp_dir.path().join("docdex"))).unwrap();
    config.init().unwrap();
    let mut engine = SearchEngine::with_cache(config, Arc::new(BasicNormalizer::new()));
    engine.sync(&docs_dir).unwrap();

    let mut watcher = FileSystemWatcher::new(&docs_dir, txt_only(), DEBOUNCE);
    let signals = watcher.start().unwrap();
    thread::sleep(Duration::from_millis(200));

    let mut service = WatchService::new(engine, &docs_dir, Duration::from_millis(50));

    fs::write(
        docs_dir.join("fresh.txt"),
        "telescope observations of distant nebulae",
    )
    .unwrap();

    // Poll until the change lands or the deadline passes
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut rebuilt = false;
    while Instant::now() < deadline {
        match service.poll_once(&signals) {
            PollOutcome::Synced(true) => {
                rebuilt = true;
                break;
            }
            PollOutcome::Disconnected => panic!("watcher disconnected"),
            _ => thread::sleep(Duration::from_millis(50)),
        }
    }
    assert!(rebuilt);

    let results = service.engine().search("telescope", 10);
    assert_eq!(results.len(), 1);
    assert!(results[0].path.ends_with("fresh.txt"));

    watcher.stop();
}
