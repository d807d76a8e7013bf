//! Development seed: two managers, ten employees, and a month of
//! randomized weekday attendance. Wipes existing rows first.

use anyhow::Context;
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use dotenvy::dotenv;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::PgPool;

const PASSWORD: &str = "password123";

const MANAGERS: [(&str, &str, &str, &str); 2] = [
    ("John Manager", "john.manager@company.com", "MGR001", "Engineering"),
    ("Sarah Admin", "sarah.admin@company.com", "MGR002", "HR"),
];

const EMPLOYEES: [(&str, &str, &str, &str); 10] = [
    ("Alice Johnson", "alice.johnson@company.com", "EMP001", "Engineering"),
    ("Bob Smith", "bob.smith@company.com", "EMP002", "Engineering"),
    ("Charlie Davis", "charlie.davis@company.com", "EMP003", "Engineering"),
    ("Diana Prince", "diana.prince@company.com", "EMP004", "Sales"),
    ("Ethan Hunt", "ethan.hunt@company.com", "EMP005", "Sales"),
    ("Fiona Green", "fiona.green@company.com", "EMP006", "Sales"),
    ("George Wilson", "george.wilson@company.com", "EMP007", "HR"),
    ("Hannah Lee", "hannah.lee@company.com", "EMP008", "HR"),
    ("Ian Brown", "ian.brown@company.com", "EMP009", "Marketing"),
    ("Julia White", "julia.white@company.com", "EMP010", "Marketing"),
];

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url).await?;
    sqlx::migrate!().run(&pool).await?;
    println!("Connected to PostgreSQL");

    sqlx::query("TRUNCATE TABLE attendance, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await?;
    println!("Cleared existing data");

    let hashed = hash_password(PASSWORD);

    for (name, email, code, department) in MANAGERS {
        insert_user(&pool, name, email, &hashed, code, department, "manager").await?;
    }
    let mut employee_ids = Vec::with_capacity(EMPLOYEES.len());
    for (name, email, code, department) in EMPLOYEES {
        let id = insert_user(&pool, name, email, &hashed, code, department, "employee").await?;
        employee_ids.push(id);
    }
    println!("Created {} managers and {} employees", MANAGERS.len(), EMPLOYEES.len());

    let mut rng = StdRng::from_entropy();
    let today = Local::now().date_naive();
    let mut rows = 0usize;

    for days_back in 1..=30 {
        let day = today - Duration::days(days_back);
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        for &user_id in &employee_ids {
            // 85% chance of attendance
            if rng.gen_bool(0.85) {
                insert_worked_day(&pool, user_id, day, &mut rng).await?;
            } else {
                insert_absent_day(&pool, user_id, day).await?;
            }
            rows += 1;
        }
    }
    println!("Created {rows} attendance records for the last 30 weekdays");

    println!();
    println!("Sample login credentials:");
    println!("  Manager:  john.manager@company.com / {PASSWORD}");
    println!("  Employee: alice.johnson@company.com / {PASSWORD}");

    Ok(())
}

fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 hashing failed")
        .to_string()
}

async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
    employee_code: &str,
    department: &str,
    role: &str,
) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (name, email, password, role, employee_code, department)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password)
    .bind(role)
    .bind(employee_code)
    .bind(department)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn insert_worked_day(
    pool: &PgPool,
    user_id: i64,
    day: NaiveDate,
    rng: &mut StdRng,
) -> anyhow::Result<()> {
    // Check-in between 08:00 and 10:30, check-out between 17:00 and 19:59
    let in_hour: u32 = rng.gen_range(8..=10);
    let in_minute: u32 = if in_hour == 10 { rng.gen_range(0..=30) } else { rng.gen_range(0..=59) };
    let out_hour: u32 = rng.gen_range(17..=19);
    let out_minute: u32 = rng.gen_range(0..=59);

    let check_in = day.and_hms_opt(in_hour, in_minute, 0).expect("valid time");
    let check_out = day.and_hms_opt(out_hour, out_minute, 0).expect("valid time");
    let total_hours = (check_out - check_in).num_seconds() as f64 / 3600.0;

    let status = if total_hours < 4.0 {
        "half-day"
    } else if in_hour > 9 || (in_hour == 9 && in_minute > 30) {
        "late"
    } else {
        "present"
    };

    sqlx::query(
        r#"
        INSERT INTO attendance (user_id, day, check_in_at, check_out_at, total_hours, status, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6::attendance_status, $4)
        "#,
    )
    .bind(user_id)
    .bind(day)
    .bind(check_in)
    .bind(check_out)
    .bind(total_hours)
    .bind(status)
    .execute(pool)
    .await?;
    Ok(())
}

async fn insert_absent_day(pool: &PgPool, user_id: i64, day: NaiveDate) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO attendance (user_id, day, total_hours, status)
        VALUES ($1, $2, 0, 'absent')
        "#,
    )
    .bind(user_id)
    .bind(day)
    .execute(pool)
    .await?;
    Ok(())
}
