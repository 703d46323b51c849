mod common;

use pretty_assertions::assert_eq;
use virmap_stats::taxonomy::TaxonomyDb;
use virmap_stats::utils::error::TaxonomyError;

#[test]
fn test_load_from_directory() {
    let temp = tempfile::tempdir().unwrap();
    let db = TaxonomyDb::load(common::taxdump(temp.path())).unwrap();

    assert_eq!(db.len(), 3);
    assert_eq!(db.resolve(11308).unwrap(), vec!["Viruses", "Orthomyxoviridae"]);
}

#[test]
fn test_merged_ids_from_directory() {
    let temp = tempfile::tempdir().unwrap();
    let dir = common::taxdump(temp.path());
    common::write(dir.join("merged.dmp"), "555\t|\t11308\t|\n");

    let db = TaxonomyDb::load(&dir).unwrap();

    assert_eq!(db.name(555), Some("Orthomyxoviridae"));
    assert_eq!(db.resolve(555).unwrap(), db.resolve(11308).unwrap());
}

#[test]
fn test_missing_dump_file() {
    let temp = tempfile::tempdir().unwrap();
    let dir = common::taxdump(temp.path());
    std::fs::remove_file(dir.join("names.dmp")).unwrap();

    assert!(matches!(
        TaxonomyDb::load(&dir),
        Err(TaxonomyError::ReadFailed { .. })
    ));
}
