use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_restaurant_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let operator_id = ensure_operator(&pool, "kitchen@example.com", "kitchen123").await?;
    let customer_id = ensure_customer(&pool, "customer@example.com", "customer123").await?;
    seed_items(&pool, operator_id).await?;

    println!("Seed completed. Operator ID: {operator_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_operator(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_flag(pool, email, password, true).await
}

async fn ensure_customer(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_flag(pool, email, password, false).await
}

async fn ensure_user_with_flag(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    is_operator: bool,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, is_operator)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET is_operator = EXCLUDED.is_operator
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(is_operator)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (operator={is_operator})");
    Ok(row.0)
}

async fn seed_items(pool: &sqlx::PgPool, owner_id: Uuid) -> anyhow::Result<()> {
    let items = vec![
        (
            "Margherita Pizza",
            "margherita-pizza",
            "Tomato, mozzarella and basil",
            1200,
            8,
            Some("best-seller"),
            Some("danger"),
        ),
        (
            "Spring Rolls",
            "spring-rolls",
            "Crispy vegetable rolls with dip",
            650,
            6,
            Some("new"),
            Some("success"),
        ),
        (
            "Butter Chicken",
            "butter-chicken",
            "Slow-cooked chicken in tomato gravy",
            1450,
            1,
            Some("tasty"),
            Some("primary"),
        ),
        (
            "Lemon Tart",
            "lemon-tart",
            "Sharp citrus curd on shortcrust",
            500,
            1,
            None,
            None,
        ),
    ];

    for (title, slug, desc, price, pieces, label, label_colour) in items {
        sqlx::query(
            r#"
            INSERT INTO items (id, created_by, title, slug, description, price, pieces, label, label_colour)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(title)
        .bind(slug)
        .bind(desc)
        .bind(price)
        .bind(pieces)
        .bind(label)
        .bind(label_colour)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu items");
    Ok(())
}
