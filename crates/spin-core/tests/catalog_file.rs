use std::io::Write;

use spin_core::catalog::Catalog;
use spin_core::error::CatalogError;

#[test]
fn load_or_builtin_prefers_existing_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[track]]
id = 10
source_url = "file:///music/one.mp3"
thumbnail_url = ""
name = "One"
album = "Demo"
duration_secs = 4000
"#
    )
    .unwrap();

    let c = Catalog::load_or_builtin(file.path());
    assert_eq!(c.len(), 1);
    assert_eq!(c.find(10).unwrap().name, "One");
}

#[test]
fn load_or_builtin_falls_back_on_missing_or_bad_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("catalog.toml");
    assert_eq!(Catalog::load_or_builtin(&missing).len(), 3);

    std::fs::write(&missing, "[[track]]\nid = \"nope\"\n").unwrap();
    assert_eq!(Catalog::load_or_builtin(&missing).len(), 3);
}

#[test]
fn from_toml_file_reports_read_errors_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    match Catalog::from_toml_file(&missing) {
        Err(CatalogError::Read { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected read error, got {:?}", other.map(|c| c.len())),
    }
}
