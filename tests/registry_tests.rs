use std::fs;
use std::io::Write;

use hostop::config::load_config_from_path;
use hostop::host::{ConnectionKind, Execution, HostRegistry};
use hostop::host::registry::MAX_HOSTS;

const HOSTS: &str = "\
# production
db:10.0.0.5:2222:alice:s3cret:ssh
web:10.0.0.6:0:deploy::ssh

legacy:10.0.0.7:23:root:toor:telnet
bad-line-without-fields
";

#[test]
fn loads_host_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(HOSTS.as_bytes()).unwrap();

    let registry = HostRegistry::load(Some(file.path()));
    let names: Vec<&str> = registry.hosts().iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["localhost", "db", "web", "legacy"]);
    assert_eq!(registry.current_index(), 0);

    let db = &registry.hosts()[1];
    assert_eq!(db.port, 2222);
    assert_eq!(db.login_target(), "alice@10.0.0.5");
    assert_eq!(db.execution(), Execution::SecureShell);

    // out-of-range ports fall back to the ssh default
    assert_eq!(registry.hosts()[2].port, 22);
    assert!(registry.hosts()[2].password.is_empty());

    assert_eq!(registry.hosts()[3].kind, ConnectionKind::Telnet);
}

#[test]
fn passwords_never_appear_in_debug_output() {
    let registry = HostRegistry::from_lines("db:10.0.0.5:22:alice:s3cret:ssh\n");
    let rendered = format!("{registry:?}");
    assert!(rendered.contains("alice"));
    assert!(!rendered.contains("s3cret"));
}

#[test]
fn oversized_host_file_is_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts.conf");
    let lines: String = (0..25)
        .map(|i| format!("node{i}:192.168.1.{i}:22:ops::ssh\n"))
        .collect();
    fs::write(&path, lines).unwrap();

    let registry = HostRegistry::load(Some(&path));
    assert_eq!(registry.len(), MAX_HOSTS);
    assert_eq!(registry.hosts().last().unwrap().name, "node8");
}

#[test]
fn directory_in_place_of_host_file_is_local_only() {
    let dir = tempfile::tempdir().unwrap();
    let registry = HostRegistry::load(Some(dir.path()));
    assert_eq!(registry.len(), 1);
    assert!(registry.current().is_local);
}

#[test]
fn config_file_points_at_hosts_file() {
    let dir = tempfile::tempdir().unwrap();
    let hosts = dir.path().join("hosts.conf");
    fs::write(&hosts, HOSTS).unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!("[general]\nhosts_file = {:?}\n", hosts.display().to_string()),
    )
    .unwrap();

    let config = load_config_from_path(&config_path);
    let registry = HostRegistry::load(config.general.hosts_file.as_deref());
    assert_eq!(registry.len(), 4);
}
