use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    models::{LoginReq, RegisterReq, UserProfile, UserSql},
    utils::validators::validate_register,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

fn profile_of(user: &UserSql) -> UserProfile {
    UserProfile {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        employee_code: user.employee_code.clone(),
        department: user.department.clone(),
    }
}

/// User registration handler. Role defaults to employee; the employee code
/// is stored uppercased.
pub async fn register(
    req: web::Json<RegisterReq>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let (role, department) = match validate_register(&req) {
        Ok(parsed) => parsed,
        Err(message) => {
            return HttpResponse::BadRequest().json(json!({ "message": message }));
        }
    };

    let email = req.email.trim().to_lowercase();
    let employee_code = req.employee_code.trim().to_uppercase();

    let existing = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
    )
    .bind(&email)
    .fetch_one(pool.get_ref())
    .await;

    match existing {
        Ok(true) => {
            return HttpResponse::BadRequest().json(json!({
                "message": "User with this email already exists"
            }));
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error while checking email");
            return HttpResponse::InternalServerError().finish();
        }
    }

    let hashed = hash_password(&req.password);

    let inserted = sqlx::query_as::<_, UserSql>(
        r#"
        INSERT INTO users (name, email, password, role, employee_code, department)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, email, password, role, employee_code, department, is_active
        "#,
    )
    .bind(req.name.trim())
    .bind(&email)
    .bind(&hashed)
    .bind(role.to_string())
    .bind(&employee_code)
    .bind(department.to_string())
    .fetch_one(pool.get_ref())
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(e) => {
            // Lost a race on the email or employee code unique keys.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23505") {
                    return HttpResponse::Conflict().json(json!({
                        "message": "Email or employee code already taken"
                    }));
                }
            }
            error!(error = %e, "Failed to register user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!(user_id = user.id, "User registered");

    let token = generate_token(
        user.id,
        user.email.clone(),
        user.role.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "data": profile_of(&user),
        "token": token,
    }))
}

#[instrument(
    name = "auth_login",
    skip(pool, config, req),
    fields(email = %req.email)
)]
pub async fn login(
    req: web::Json<LoginReq>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if req.email.trim().is_empty() || req.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().json(json!({
            "message": "Email and password are required"
        }));
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, name, email, password, role, employee_code, department, is_active
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(req.email.trim().to_lowercase())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !db_user.is_active {
        info!("Invalid credentials: user deactivated");
        return HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }));
    }

    debug!("Verifying password");

    if verify_password(&req.password, &db_user.password).is_err() {
        info!("Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }));
    }

    let token = generate_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    );

    // Non-fatal: login still succeeds if this write fails.
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "data": profile_of(&db_user),
        "token": token,
    }))
}

/// Current bearer's profile.
pub async fn me(auth: AuthUser, pool: web::Data<PgPool>) -> impl Responder {
    let profile = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT id, name, email, role, employee_code, department
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await;

    match profile {
        Ok(Some(profile)) => HttpResponse::Ok().json(json!({ "data": profile })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "User not found" })),
        Err(e) => {
            error!(error = %e, user_id = auth.user_id, "Failed to load profile");
            HttpResponse::InternalServerError().finish()
        }
    }
}
