// tests/markdown_table.rs
use intern_scout::markdown::{convert, convert_file};
use std::fs;

const README: &str = r#"
# Summer Internships

Some intro text.

| Company | Role | Location | Application/Link | Date Posted |
| ------- | ---- | -------- | ---------------- | ----------- |
| **[Acme](https://acme.example)** | SWE Intern | Remote in USA | <a href="https://acme.example/apply"><img src="apply.png"></a> | Oct 01 |
| **[Globex](https://globex.example)** | Data Intern | NYC</br>Remote in USA | https://globex.example/jobs/1 | Oct 02 |
| Initech | PM Intern | Austin, TX | 🔒 | Oct 03 |
| Broken | row |
"#;

#[test]
fn table_is_cleaned() {
    let t = convert(README, None).unwrap();
    assert_eq!(
        t.headers,
        vec!["Company", "Company URL", "Role", "Location", "Application/Link", "Date Posted"]
    );
    assert_eq!(t.rows.len(), 3);
    assert_eq!(
        t.rows[0],
        vec![
            "Acme",
            "https://acme.example",
            "SWE Intern",
            "Remote in USA",
            "https://acme.example/apply",
            "Oct 01"
        ]
    );
    assert_eq!(t.rows[1][3], "NYC, Remote in USA");
    assert_eq!(t.rows[2][1], "");
    assert_eq!(t.rows[2][4], "");
}

#[test]
fn location_filter_is_case_insensitive() {
    let t = convert(README, Some("remote in usa")).unwrap();
    let companies: Vec<&str> = t.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(companies, vec!["Acme", "Globex"]);
}

#[test]
fn file_round_trip_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let md = dir.path().join("README.md");
    let csv_path = dir.path().join("jobs.csv");
    fs::write(&md, README).unwrap();

    let n = convert_file(&md, &csv_path, Some("Remote in USA")).unwrap();
    assert_eq!(n, 2);
    let text = fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("Company,Company URL,Role,Location,Application/Link,Date Posted"));
    assert!(text.contains("\"NYC, Remote in USA\""));
}

#[test]
fn text_without_table_is_an_error() {
    assert!(convert("no tables here", None).is_err());
}
