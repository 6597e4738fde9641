use sqlweave_core::{
    ConnectionConfig, Database, Driver, ExecutableModification, ExecutableQuery, Executor,
    QueryBuilder, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConnectionConfig::new(Driver::Sqlite, ":memory:").with_max_connections(1);
    let db = Database::connect(&config).await?;
    let sql = db.sql();

    db.execute(
        &sql.literal("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER)")
            .render()?,
    )
    .await?;

    for (name, age) in [("Alice", 25), ("Bob", 30), ("Charlie", 35)] {
        let result = sql
            .insert()
            .into("users")?
            .set("name", name)
            .set("age", age)
            .execute(&db)
            .await?;
        println!("inserted {} as id {:?}", name, result.last_insert_id);
    }

    let adults = sql
        .select()
        .from("users")?
        .columns(("id", "name"))
        .where_(("age", ">", 26))?
        .order_by_desc("age")
        .fetch_all(&db)
        .await?;
    for row in &adults {
        println!("{}", serde_json::to_string(row)?);
    }

    let updated = sql
        .update()
        .table("users")?
        .set("age", 31)
        .where_(("name", "Bob"))?
        .execute(&db)
        .await?;
    println!("updated {} row(s)", updated.rows_affected);

    let deleted = sql
        .delete()
        .from("users")?
        .where_(("age", "<", 30))?
        .execute(&db)
        .await?;
    println!("deleted {} row(s)", deleted.rows_affected);

    let bob = sql
        .select()
        .from("users")?
        .where_(("name", "Bob"))?
        .fetch_optional(&db)
        .await?;
    println!("Bob: {:?}", bob);

    db.close().await;
    Ok(())
}
