use pgselect::{ExecutorConfig, InstrumentedExecutor, SelectError, SelectResult, StatementBuilder};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_postgres::NoTls;

async fn connect() -> SelectResult<Option<tokio_postgres::Client>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping");
            return Ok(None);
        }
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls).await?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(client))
}

fn table_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("pgselect_test_{}_{}", std::process::id(), nanos)
}

#[tokio::test]
async fn fetch_scalar_and_count_rows() -> SelectResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };
    let table = table_name();
    client
        .batch_execute(&format!(
            "CREATE TEMP TABLE {table} (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL, age INT NOT NULL);
             INSERT INTO {table} (name, age) VALUES ('Ann', 34), ('Bob', 17), ('Cid', 52);"
        ))
        .await?;

    let adults = StatementBuilder::new()
        .select(["id", "name"])
        .from_as(&table, "u")
        .where_("u.age > :age")
        .set_param("age", 18)
        .order_by("name", "ASC");

    assert_eq!(adults.count_rows(&client).await?, 2);
    assert_eq!(
        adults.fetch_scalar(&client, "name").await?.as_deref(),
        Some("Ann")
    );
    assert_eq!(
        adults.clone().limit(1).page(2).fetch_scalar(&client, "name").await?.as_deref(),
        Some("Cid")
    );

    let nobody = StatementBuilder::new()
        .from(&table)
        .where_("name = :name")
        .set_param("name", "Zed");
    assert_eq!(nobody.fetch_scalar(&client, "name").await?, None);
    assert_eq!(nobody.count_rows(&client).await?, 0);
    Ok(())
}

#[tokio::test]
async fn reused_placeholder_and_cast() -> SelectResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };

    let qb = StatementBuilder::new()
        .select("(:n)::int + (:n)::int AS doubled")
        .from("generate_series(1, 1) g");
    let qb = qb.set_param("n", 21);
    assert_eq!(qb.fetch_scalar(&client, "doubled").await?.as_deref(), Some("42"));
    Ok(())
}

#[tokio::test]
async fn unbound_placeholder_is_reported() -> SelectResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };

    let err = StatementBuilder::new()
        .from("generate_series(1, 3) g")
        .where_("g > :min")
        .count_rows(&client)
        .await
        .unwrap_err();
    assert!(matches!(err, SelectError::UnboundParam(ref n) if n == "min"));
    Ok(())
}

#[tokio::test]
async fn database_errors_propagate() -> SelectResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };

    let err = StatementBuilder::new()
        .from("pgselect_table_that_does_not_exist")
        .count_rows(&client)
        .await
        .unwrap_err();
    assert!(matches!(err, SelectError::Query(_)));
    Ok(())
}

#[tokio::test]
async fn params_bind_to_numeric_columns() -> SelectResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };
    let table = table_name();
    client
        .batch_execute(&format!(
            "CREATE TEMP TABLE {table} (price NUMERIC(10, 2) NOT NULL);
             INSERT INTO {table} (price) VALUES (5), (50);"
        ))
        .await?;

    let over = |min: pgselect::Value| {
        StatementBuilder::new()
            .from(&table)
            .where_("price > :min")
            .set_param("min", min)
    };
    assert_eq!(over(18.into()).count_rows(&client).await?, 1);
    assert_eq!(over(4.5.into()).count_rows(&client).await?, 2);
    assert_eq!(over("49.99".into()).count_rows(&client).await?, 1);

    let err = StatementBuilder::new()
        .from(&table)
        .where_("price > :min")
        .set_param("min", true)
        .count_rows(&client)
        .await
        .unwrap_err();
    assert!(matches!(err, SelectError::Query(_)));

    assert_eq!(
        over(0.into()).order_by("price", "DESC").fetch_scalar(&client, "price").await?.as_deref(),
        Some("50.00")
    );
    Ok(())
}

#[tokio::test]
async fn float_param_in_integer_slot_is_rejected() -> SelectResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };

    let err = StatementBuilder::new()
        .from("generate_series(1::bigint, 3::bigint) g")
        .where_("g > :min")
        .set_param("min", 1.5)
        .count_rows(&client)
        .await
        .unwrap_err();
    assert!(matches!(err, SelectError::Query(_)));
    Ok(())
}

#[tokio::test]
async fn rows_with_uncommon_column_types() -> SelectResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };
    let table = table_name();
    client
        .batch_execute(&format!(
            "CREATE TEMP TABLE {table} (id INT, price NUMERIC, tags TEXT[], data BYTEA, span INTERVAL, addr INET);
             INSERT INTO {table} VALUES
               (1, 'NaN', '{{a,\"b c\"}}', '\\xdead', '1 day 02:00:00', '10.0.0.1'),
               (2, 12.5, NULL, NULL, NULL, NULL);"
        ))
        .await?;

    let all = StatementBuilder::new().from(&table).order_by("id", "ASC");
    assert_eq!(all.count_rows(&client).await?, 2);
    assert_eq!(all.fetch_scalar(&client, "id").await?.as_deref(), Some("1"));
    assert_eq!(all.fetch_scalar(&client, "price").await?.as_deref(), Some("NaN"));
    assert_eq!(all.fetch_scalar(&client, "tags").await?.as_deref(), Some("{a,\"b c\"}"));
    assert_eq!(all.fetch_scalar(&client, "data").await?.as_deref(), Some("\\xdead"));
    assert_eq!(all.fetch_scalar(&client, "span").await?.as_deref(), Some("1 day 02:00:00"));
    assert!(all.fetch_scalar(&client, "addr").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn duplicate_column_names_take_the_last() -> SelectResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };

    let qb = pgselect::select(["'a' AS name", "'b' AS name"]).from("generate_series(1, 1) g");
    assert_eq!(qb.fetch_scalar(&client, "name").await?.as_deref(), Some("b"));
    Ok(())
}

#[tokio::test]
async fn timed_out_query_is_cancelled() -> SelectResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };

    let exec = InstrumentedExecutor::new(client)
        .with_config(ExecutorConfig::new().with_query_timeout(Duration::from_millis(100)));
    let err = pgselect::select("pg_sleep(5)")
        .from("generate_series(1, 1) g")
        .count_rows(&exec)
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    Ok(())
}
