use sqlweave_core::{func, op, QueryBuilder, Result, Sql};

fn main() -> Result<()> {
    let sql = Sql::mysql();

    // SELECT with tuple conditions
    let select = sql
        .select()
        .from(("u", "users"))?
        .columns(("u.id", "u.name", "u.email"))
        .where_(("u.age", op::GT, 18))? // Using op constants
        .where_(("u.status", "active"))? // Defaults to EQ
        .where_(("u.city", "LIKE", "%York%"))? // Using string operators
        .order_by_asc("u.name")
        .limit(10)
        .offset(5)
        .render()?;
    println!("SELECT: {}\n  params: {:?}", select.sql, select.params);

    // INSERT, values bound under their column names
    let insert = sql
        .insert()
        .into("users")?
        .set("name", "John Doe")
        .set("email", "john@example.com")
        .set("created_at", func("NOW()"))
        .render()?;
    println!("INSERT: {}\n  params: {:?}", insert.sql, insert.params);

    // UPDATE
    let update = sql
        .update()
        .table("users")?
        .values([("email", "new@example.com"), ("last_login", "2024-01-15")])
        .where_(("id", 123))?
        .and_where(("active", true))?
        .render()?;
    println!("UPDATE: {}\n  params: {:?}", update.sql, update.params);

    // DELETE with an aliased table
    let delete = sql
        .delete()
        .from([("s", "sessions")])?
        .where_(("s.user_id", op::IN, vec![4, 8, 15]))?
        .or_where(("s.expires_at", op::LT, func("NOW()")))?
        .render()?;
    println!("DELETE: {}\n  params: {:?}", delete.sql, delete.params);

    // where_ after or_where groups everything before it
    let grouped = Sql::generic()
        .select()
        .from("users")?
        .where_(("age", op::GTE, 18))?
        .or_where(("role", "admin"))?
        .where_(("verified", true))?
        .to_sql()?;
    println!("Grouped: {}", grouped);

    Ok(())
}
