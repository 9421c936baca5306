//! Script file to rendered output, against the mock client.

use std::io::Write;

use pgscript::app::execute_script;
use pgscript::db::{ColumnInfo, MockDatabaseClient, QueryResult, Value};
use pgscript::render::{FixedWidthFormatter, Overflow};
use pgscript::script::load_statements;
use pretty_assertions::assert_eq;

fn script_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn users() -> QueryResult {
    QueryResult::with_data(
        vec![ColumnInfo::new("id", "int4"), ColumnInfo::new("name", "text")],
        vec![
            vec![Value::Int(1), Value::from("Alice")],
            vec![Value::Int(2), Value::Null],
        ],
    )
}

#[tokio::test]
async fn test_script_file_end_to_end() {
    let file = script_file(
        "-- Seed and inspect the users table\n\
         \n\
         CREATE TABLE users (id int, name text);\n\
         INSERT INTO users VALUES (1, 'Alice'),\n\
         \x20 (2, NULL);\n\
         \n\
         select id, name\n\
         from users\n\
         order by id;\n\
         -- trailing comment\n\
         SELECT 'never terminated'\n",
    );
    let statements = load_statements(file.path()).unwrap();
    assert_eq!(statements.len(), 3);

    let query = "select id, name\nfrom users\norder by id;";
    let db = MockDatabaseClient::new().with_result(query, users());
    let formatter = FixedWidthFormatter::default();
    let mut out = Vec::new();

    let summary = execute_script(&db, &statements, &formatter, false, &mut out).await;

    assert_eq!(
        db.executed(),
        vec![
            "CREATE TABLE users (id int, name text);",
            "INSERT INTO users VALUES (1, 'Alice'),\n  (2, NULL);",
            query,
        ]
    );
    assert_eq!(summary.queries, 1);
    assert_eq!(summary.commands, 2);
    assert!(summary.is_clean());
    assert!(db.is_closed());

    let expected = [
        format!("SQL statement: {query} produces the following result:\n\n"),
        format!("{:<15}\t{:<15}\t\n", "id", "name"),
        format!("{:<15}\t{:<15}\t\n", "--", "----"),
        format!("{:<15}\t{:<15}\t\n", "1", "Alice"),
        format!("{:<15}\t{:<15}\t\n", "2", ""),
    ]
    .concat();
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[tokio::test]
async fn test_failed_statement_between_queries() {
    let file = script_file("SELECT 1;\nINSERT INTO nowhere VALUES (1);\nSELECT 2;\n");
    let statements = load_statements(file.path()).unwrap();

    let db = MockDatabaseClient::new()
        .with_failure("INSERT INTO nowhere VALUES (1);", "relation \"nowhere\" does not exist");
    let formatter = FixedWidthFormatter::new(10, Overflow::Truncate);
    let mut out = Vec::new();

    let summary = execute_script(&db, &statements, &formatter, false, &mut out).await;

    assert_eq!(summary.statements, 3);
    assert_eq!(summary.failures, 1);
    assert_eq!(summary.queries, 2);
    assert!(db.is_closed());

    let output = String::from_utf8(out).unwrap();
    let first = output.find("SQL statement: SELECT 1;").unwrap();
    let second = output.find("SQL statement: SELECT 2;").unwrap();
    assert!(first < second);
    assert!(output.contains("Mock resul\t"));
}
