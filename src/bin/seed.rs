use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use angohost_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin@angohost.ao", "admin123").await?;
    let user_id = ensure_user(&pool, "cliente@example.ao", "cliente123").await?;
    seed_plans(&pool).await?;
    seed_extensions(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, email, password, "admin").await
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, email, password, "user").await
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
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

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_plans(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // Yearly prices in whole Kwanzas.
    let plans = vec![
        ("Hosting Start", "2 GB SSD, 5 mailboxes", 25_000, "hosting"),
        ("Hosting Pro", "10 GB SSD, 30 mailboxes", 60_000, "hosting"),
        ("Hosting Business", "40 GB SSD, unlimited mailboxes", 140_000, "hosting"),
        ("Email Essencial", "10 mailboxes, webmail + IMAP", 18_000, "email"),
        ("Email Corporativo", "50 mailboxes, shared calendars", 75_000, "email"),
    ];

    for (name, desc, price, category) in plans {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, category)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded plans");
    Ok(())
}

async fn seed_extensions(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let extensions = vec![
        (".ao", 25_000_i64, 23_000_i64),
        (".co.ao", 35_000, 33_000),
        (".it.ao", 35_000, 33_000),
        (".edu.ao", 35_000, 33_000),
        (".org.ao", 35_000, 33_000),
        (".com", 12_000, 14_000),
        (".net", 14_000, 16_000),
    ];

    for (name, base_price, renewal_price) in extensions {
        sqlx::query(
            r#"
            INSERT INTO domain_extensions (id, name, base_price, renewal_price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(base_price)
        .bind(renewal_price)
        .execute(pool)
        .await?;
    }

    println!("Seeded domain extensions");
    Ok(())
}
