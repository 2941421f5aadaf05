use tasklist::config;
use tasklist::task::{
    EmptyEditPolicy, FileStore, FilterMode, KeyValueStore as _, ListOptions, TaskListManager,
};

const KEY: &str = "todo_tasks_v1";

fn open(dir: &std::path::Path, options: ListOptions) -> TaskListManager<FileStore> {
    TaskListManager::load(FileStore::new(dir.to_path_buf()), KEY, options)
}

#[test]
fn mutations_survive_reload() {
    let td = tempfile::tempdir().expect("tempdir");

    let mut m = open(td.path(), ListOptions::default());
    assert!(m.is_empty());
    m.add("Buy milk", "2 liters");
    m.add("Call Bob", "");
    let milk = m.find("buy milk").expect("find").id.clone();
    m.toggle_done(&milk);
    assert!(m.last_persist_error().is_none());
    let before = m.tasks().to_vec();
    drop(m);

    let reloaded = open(td.path(), ListOptions::default());
    assert_eq!(reloaded.tasks(), before.as_slice());
    assert_eq!(reloaded.tasks()[0].title, "Call Bob");
    assert!(reloaded.tasks()[1].done);
    assert_eq!(reloaded.tasks()[1].description, "2 liters");
}

#[test]
fn documented_scenario_end_to_end() {
    let td = tempfile::tempdir().expect("tempdir");
    let mut m = open(td.path(), ListOptions::default());

    m.add("Buy milk", "");
    m.add("Call Bob", "");
    let titles: Vec<&str> = m.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Call Bob", "Buy milk"]);

    let milk = m.tasks()[1].id.clone();
    m.toggle_done(&milk);
    let completed = m.query(FilterMode::Completed, "");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].title, "Buy milk");
    assert!(completed[0].done);

    assert_eq!(m.clear_completed(), 1);
    drop(m);

    let reloaded = open(td.path(), ListOptions::default());
    let titles: Vec<&str> = reloaded.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Call Bob"]);
}

#[test]
fn corrupt_store_file_loads_empty_and_recovers() {
    let td = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(td.path().to_path_buf());
    store.ensure_dir().expect("mkdir");
    std::fs::write(store.path_for(KEY).expect("path"), "{not json").expect("write");

    let mut m = open(td.path(), ListOptions::default());
    assert!(m.is_empty());

    m.add("fresh start", "");
    assert!(m.last_persist_error().is_none());
    assert_eq!(open(td.path(), ListOptions::default()).len(), 1);
}

#[test]
fn malformed_value_loads_empty() {
    let td = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(td.path().to_path_buf());
    store.set(KEY, r#"{"not": "a list"}"#).expect("set");

    assert!(open(td.path(), ListOptions::default()).is_empty());
}

#[test]
fn browser_shaped_data_is_accepted() {
    let td = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(td.path().to_path_buf());
    store
        .set(
            KEY,
            r#"[{"id":"k1","text":"Old entry","done":true,"createdAt":"2024-01-01T00:00:00Z"}]"#,
        )
        .expect("set");

    let m = open(td.path(), ListOptions::default());
    assert_eq!(m.len(), 1);
    assert_eq!(m.tasks()[0].title, "Old entry");
    assert!(m.tasks()[0].done);
}

#[test]
fn keys_are_isolated() {
    let td = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(td.path().to_path_buf());

    let mut work = TaskListManager::load(&store, "work", ListOptions::default());
    let mut home = TaskListManager::load(&store, "home/chores", ListOptions::default());
    work.add("Ship release", "");
    home.add("Water plants", "");
    home.add("Laundry", "");

    assert_eq!(store.keys().expect("keys"), ["home/chores", "work"]);
    assert_eq!(TaskListManager::load(&store, "work", ListOptions::default()).len(), 1);
    assert_eq!(TaskListManager::load(&store, "home/chores", ListOptions::default()).len(), 2);
}

#[test]
fn options_from_config_drive_the_manager() {
    let td = tempfile::tempdir().expect("tempdir");
    let cfg_path = td.path().join("config.toml");
    config::set_value_string_at_path(&cfg_path, "list.allow_duplicate_titles", "false")
        .expect("set dup");
    config::set_value_string_at_path(&cfg_path, "list.empty_edit", "remove").expect("set edit");

    let cfg = config::load_at_path(&cfg_path).expect("load");
    let options = cfg.list.options();
    assert!(!options.allow_duplicate_titles);
    assert_eq!(options.empty_edit, EmptyEditPolicy::Remove);

    let mut m = open(&td.path().join("store"), options);
    m.add("Buy milk", "");
    m.add("Buy milk", "");
    assert_eq!(m.len(), 1);

    let id = m.tasks()[0].id.clone();
    m.edit(&id, "   ", "");
    assert!(m.is_empty());
}
