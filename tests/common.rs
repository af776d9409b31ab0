use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::Path;

pub fn gazeta() -> Command {
    cargo_bin_cmd!("gazeta")
}

/// Write a hot shard under `<root>/data/hot/<rel>` with the given items
#[allow(dead_code)]
pub fn write_hot_shard(root: &Path, rel: &str, items: serde_json::Value) {
    write_shard_file(&root.join("data/hot").join(rel), items);
}

/// Write an archive shard under `<root>/data/archive/<rel>`
#[allow(dead_code)]
pub fn write_archive_shard(root: &Path, rel: &str, items: serde_json::Value) {
    write_shard_file(&root.join("data/archive").join(rel), items);
}

fn write_shard_file(path: &Path, items: serde_json::Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let payload = serde_json::json!({ "items": items, "count": items.as_array().map_or(0, Vec::len) });
    fs::write(path, serde_json::to_string_pretty(&payload).unwrap()).unwrap();
}

/// Parse a JSON document from a file
#[allow(dead_code)]
pub fn read_json(path: &Path) -> serde_json::Value {
    let content = fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// Parse the JSON document a command printed on stdout
#[allow(dead_code)]
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
