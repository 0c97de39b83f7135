//! Configuration persistence tests

use cell_editor::EditorConfig;
use tempfile::TempDir;

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let config = EditorConfig {
        wrap_width: 420.0,
        insert_ans: true,
        history_limit: 50,
        ..EditorConfig::default()
    };
    config.save_to(&path).unwrap();
    assert!(path.exists());

    let loaded = EditorConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "match_parens: false\npage_lines: 5\n").unwrap();

    let loaded = EditorConfig::load_from(&path).unwrap();
    assert!(!loaded.match_parens);
    assert_eq!(loaded.page_lines, 5);
    assert_eq!(loaded.wrap_width, EditorConfig::default().wrap_width);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "wrap_width: [not a number\n").unwrap();
    let err = EditorConfig::load_from(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(EditorConfig::load_from(&dir.path().join("absent.yaml")).is_err());
}
