use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use marketplace_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin", "admin123", true).await?;
    let user_id = ensure_user(&pool, "user@example.com", "user", "user123", false).await?;

    let electronics_id = ensure_category(&pool, "Electronics").await?;
    let books_id = ensure_category(&pool, "Books").await?;
    seed_products(&pool, electronics_id, books_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    username: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, username, password_hash, is_active, is_admin)
        VALUES ($1, $2, $3, $4, TRUE, $5)
        ON CONFLICT (email) DO UPDATE SET is_admin = EXCLUDED.is_admin
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .bind(is_admin)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (admin={is_admin})");
    Ok(user_id)
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<Uuid> {
    sqlx::query(
        r#"
        INSERT INTO categories (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .execute(pool)
    .await?;

    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await?;

    println!("Ensured category {name}");
    Ok(id)
}

async fn seed_products(
    pool: &sqlx::PgPool,
    electronics_id: Uuid,
    books_id: Uuid,
) -> anyhow::Result<()> {
    let products = vec![
        (
            "Wireless Headphones",
            "Over-ear headphones with noise cancelling",
            1250000,
            40,
            electronics_id,
        ),
        (
            "Mechanical Keyboard",
            "Tenkeyless board with hot-swappable switches",
            890000,
            25,
            electronics_id,
        ),
        (
            "USB-C Charger",
            "65W charger with two ports",
            350000,
            120,
            electronics_id,
        ),
        (
            "The Pragmatic Programmer",
            "Classic book on software craftsmanship",
            420000,
            60,
            books_id,
        ),
        (
            "Designing Data-Intensive Applications",
            "Deep dive into storage and distributed systems",
            510000,
            35,
            books_id,
        ),
    ];

    for (title, desc, price, stock, category_id) in products {
        // Products have no unique title, so guard the insert by hand.
        sqlx::query(
            r#"
            INSERT INTO products (id, title, description, price, stock, category_id)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE title = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(desc)
        .bind(price as i64)
        .bind(stock)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
