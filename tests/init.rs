use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_revu"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "revu init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".revu.toml");
    assert!(config_path.exists(), ".revu.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[context]"));
    assert!(content.contains("[diff]"));
    assert!(content.contains("[heuristics]"));

    // The generated file must load cleanly and validate.
    let _: revu_core::RevuConfig = toml::from_str(&content).unwrap();
    revu_core::RevuConfig::from_toml(&content).unwrap();
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".revu.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_revu"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".revu.toml")).unwrap();
    assert_eq!(content, "# existing");
}
