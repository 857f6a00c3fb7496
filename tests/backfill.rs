use std::path::Path;

use eclipse_clues::backfill::{extract_pending, import_dir, BackfillCounts};
use eclipse_clues::{db, extract_clues_from_html, parse_clues_from_storage, Cell, Direction};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn cells(pairs: &[(i32, i32)]) -> Option<Vec<Cell>> {
    Some(pairs.iter().map(|&(row, col)| Cell { row, col }).collect())
}

#[test]
fn farmyard_legacy_export() {
    let clues = extract_clues_from_html(&fixture("farmyard.html"));

    let across: Vec<_> = clues.across.iter().map(|c| (c.number, c.text.as_str())).collect();
    let down: Vec<_> = clues.down.iter().map(|c| (c.number, c.text.as_str())).collect();
    assert_eq!(across, vec![(1, "Pet that purrs"), (3, "Sorrow, grief")]);
    assert_eq!(down, vec![(1, "Milk \"producer\""), (2, "Foot digit")]);

    assert_eq!(clues.across[1].cells, cells(&[(2, 0), (2, 1), (2, 2)]));
    assert_eq!(clues.down[1].cells, cells(&[(0, 2), (1, 2), (2, 2)]));
    assert!(clues.across.iter().chain(&clues.down).all(|c| c.length == Some(3)));
    assert!(clues.down.iter().all(|c| c.direction == Direction::Down));
}

#[test]
fn garden_markup_fallback() {
    let clues = extract_clues_from_html(&fixture("garden_markup.html"));
    let across: Vec<_> = clues.across.iter().map(|c| (c.number, c.text.as_str())).collect();
    let down: Vec<_> = clues.down.iter().map(|c| (c.number, c.text.as_str())).collect();
    assert_eq!(across, vec![(1, "Spring flower"), (5, "Garden tool & rake's cousin")]);
    assert_eq!(down, vec![(2, "Water source"), (3, "Green carpet")]);
    assert!(clues.across.iter().all(|c| c.cells.is_none() && c.length.is_none()));
}

#[test]
fn harbor_json_fallback() {
    let clues = extract_clues_from_html(&fixture("harbor_json.html"));
    assert_eq!(clues.across.len(), 2);
    assert_eq!(clues.across[1].answer.as_deref(), Some("BEAM"));
    assert_eq!(clues.down[0].length, Some(3));
}

#[test]
fn broken_export_is_empty_not_an_error() {
    let clues = extract_clues_from_html(&fixture("broken.htm"));
    assert!(clues.across.is_empty());
    assert!(clues.down.is_empty());
}

#[test]
fn import_and_backfill_fixture_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let conn = db::connect(&tmp.path().join("nested/puzzles.sqlite")).unwrap();
    db::init_schema(&conn).unwrap();

    let imported = import_dir(&conn, Path::new("tests/fixtures")).unwrap();
    assert_eq!(imported.found, 4);
    assert_eq!(imported.inserted, 4);
    assert_eq!(imported.unreadable, 0);

    let pending = db::fetch_unextracted(&conn, None, false).unwrap();
    let counts = extract_pending(&conn, &pending, 2, false).unwrap();
    assert_eq!(
        counts,
        BackfillCounts {
            puzzles: 4,
            across: 6,
            down: 5,
            with_cells: 1,
            empty: 1,
        }
    );

    assert!(db::fetch_unextracted(&conn, None, false).unwrap().is_empty());
    let stats = db::get_stats(&conn).unwrap();
    assert_eq!(stats.extracted, 4);
    assert_eq!(stats.with_cells, 1);
    assert_eq!(stats.empty, 1);

    let stored = db::fetch_clues(&conn, "farmyard").unwrap().unwrap();
    let clues = parse_clues_from_storage(stored.clues.as_deref());
    assert_eq!(clues.across[0].cells, cells(&[(0, 0), (0, 1), (0, 2)]));
    assert_eq!(clues.across[0].answer, None);

    let broken = db::fetch_clues(&conn, "broken").unwrap().unwrap();
    assert_eq!(broken.clues.as_deref(), Some(r#"{"across":[],"down":[]}"#));

    // a second import of the same directory adds nothing
    assert_eq!(import_dir(&conn, Path::new("tests/fixtures")).unwrap().inserted, 0);
}
