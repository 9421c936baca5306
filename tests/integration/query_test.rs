//! Statement execution against a live PostgreSQL database.

use pgscript::app::execute_script;
use pgscript::config::ConnectionConfig;
use pgscript::db::{DatabaseClient, ExecutionOutcome, PostgresClient, Value};
use pgscript::render::FixedWidthFormatter;
use pgscript::script::{normalize, split_lines, Statement};

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Helper to create a test client.
async fn get_test_client() -> Option<PostgresClient> {
    let url = get_test_database_url()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    PostgresClient::connect(&config).await.ok()
}

fn stmt(sql: &str) -> Statement {
    Statement::parse(sql).unwrap()
}

#[tokio::test]
async fn test_execute_simple_select() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let outcome = client
        .execute(&stmt("SELECT 1 as num, 'hello' as greeting;"))
        .await
        .unwrap();

    let ExecutionOutcome::Rows(result) = outcome else {
        panic!("Expected rows for a SELECT");
    };
    assert_eq!(result.columns.len(), 2);
    assert_eq!(result.columns[0].name, "num");
    assert_eq!(result.columns[1].name, "greeting");
    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows[0], vec![Value::Int(1), Value::from("hello")]);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_typed_values() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let outcome = client
        .execute(&stmt(
            "SELECT true AS flag, 2.5::float8 AS ratio, DATE '2024-02-29' AS day, \
             '\\x0102'::bytea AS raw, NULL::int AS missing;",
        ))
        .await
        .unwrap();

    let ExecutionOutcome::Rows(result) = outcome else {
        panic!("Expected rows for a SELECT");
    };
    let cells: Vec<Option<String>> = result.rows[0].iter().map(Value::as_cell).collect();
    assert_eq!(
        cells,
        vec![
            Some("t".to_string()),
            Some("2.5".to_string()),
            Some("2024-02-29".to_string()),
            Some("\\x0102".to_string()),
            None,
        ]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_cells_use_server_text() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    client.execute(&stmt("SET TIME ZONE 'UTC';")).await.unwrap();
    let outcome = client
        .execute(&stmt(
            "SELECT 12.50::numeric AS price, \
             (SELECT sum(x) FROM (VALUES (1.5::numeric), (1.5)) AS v(x)) AS total, \
             0.1::real AS ratio, \
             '2024-01-02 03:04:05+00'::timestamptz AS at, \
             interval '1 day' AS span, \
             ARRAY[1,2] AS ids;",
        ))
        .await
        .unwrap();

    let ExecutionOutcome::Rows(result) = outcome else {
        panic!("Expected rows for a SELECT");
    };
    let cells: Vec<Option<String>> = result.rows[0].iter().map(Value::as_cell).collect();
    assert_eq!(
        cells,
        vec![
            Some("12.50".to_string()),
            Some("3.0".to_string()),
            Some("0.1".to_string()),
            Some("2024-01-02 03:04:05+00".to_string()),
            Some("1 day".to_string()),
            Some("{1,2}".to_string()),
        ]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_script_with_temp_table() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    // The pool holds a single connection, so the temp table stays visible.
    let statements = normalize(split_lines(
        "-- scratch table\n\
         CREATE TEMP TABLE pgscript_people (id int, name text);\n\
         INSERT INTO pgscript_people VALUES (1, 'Alice'), (2, NULL);\n\
         SELECT id, name FROM pgscript_people ORDER BY id;\n\
         SELECT * FROM pgscript_missing_table;\n",
    ));
    let formatter = FixedWidthFormatter::default();
    let mut out = Vec::new();

    let summary = execute_script(&client, &statements, &formatter, false, &mut out).await;

    assert_eq!(summary.statements, 4);
    assert_eq!(summary.commands, 2);
    assert_eq!(summary.rows_affected, 2);
    assert_eq!(summary.queries, 1);
    assert_eq!(summary.failures, 1);

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains(&format!("{:<15}\t{:<15}\t\n", "2", "")));
}

#[tokio::test]
async fn test_execute_query_with_syntax_error() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client.execute(&stmt("SELEC * FROM users;")).await;

    let error = result.unwrap_err();
    let error_msg = error.to_string().to_lowercase();
    assert!(
        error_msg.contains("syntax") || error_msg.contains("error"),
        "Expected syntax error, got: {}",
        error_msg
    );

    client.close().await.unwrap();
}
