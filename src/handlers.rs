use actix_web::{get, post, web, HttpResponse};
use log::{debug, info};
use serde_json::json;

use crate::config::{AppConfig, DbPool};
use crate::errors::ApiError;
use crate::forms::{self, ApplicationForm, JobForm, LoginForm, SignupForm};
use crate::middleware::{AuthenticatedUser, MaybeAuthenticated};
use crate::models::{LoginResponse, RefreshRequest};
use crate::services::{ApplicationService, AuthService, JobService, SubmitOutcome, UserService};

fn application_form_descriptor() -> serde_json::Value {
    json!({
        "fields": [
            { "name": "name", "required": true },
            { "name": "email", "required": true, "format": "email" },
            { "name": "portfolio", "required": false },
            { "name": "resume", "required": true, "format": "file" },
            { "name": "cover_letter", "required": true },
        ]
    })
}

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[get("/login")]
async fn login_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "view": "login",
        "form": {
            "fields": [
                { "name": "email", "required": true, "format": "email" },
                { "name": "password", "required": true, "format": "password" },
                { "name": "is_employer", "required": false, "format": "bool" },
            ]
        }
    }))
}

#[post("/login")]
async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    form: web::Json<LoginForm>
) -> Result<HttpResponse, ApiError> {
    let credentials = forms::validate_login(&form).map_err(ApiError::FormInvalid)?;
    debug!("Login attempt for user: {}", credentials.email);

    // Missing account and wrong password get the same answer: no hint
    // about which one it was.
    let user = match UserService::find_by_email(&credentials.email, &pool).await? {
        Some(user) => user,
        None => {
            debug!("Login failed: no user with email {}", credentials.email);
            return Err(ApiError::AuthError(
                "Login unsuccessful. Please check email and password".to_string(),
            ));
        }
    };

    let valid = AuthService::verify_password(&credentials.password, &user.password_hash)?;
    if !valid {
        debug!("Login failed: invalid password for user {}", credentials.email);
        return Err(ApiError::AuthError(
            "Login unsuccessful. Please check email and password".to_string(),
        ));
    }

    if credentials.is_employer != user.is_employer {
        debug!("Login failed: employer flag mismatch for user {}", credentials.email);
        return Err(ApiError::RoleMismatch(
            "Employer/Employee status mismatch".to_string(),
        ));
    }

    let token = AuthService::generate_token(user.user_id, &user.email, user.is_employer, &config)?;
    let refresh_token = AuthService::generate_refresh_token();
    AuthService::store_refresh_token(user.user_id, &refresh_token, &config, &pool).await?;

    info!("User {} logged in successfully", user.email);

    let auth = LoginResponse {
        token,
        refresh_token,
        user_id: user.user_id,
        username: user.username,
        email: user.email,
        is_employer: user.is_employer,
    };

    Ok(HttpResponse::Ok().json(json!({
        "auth": auth,
        "redirect": "/job-list"
    })))
}

#[get("/logout")]
async fn logout(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    AuthService::revoke_refresh_tokens(user.user_id, &pool).await?;
    info!("User {} logged out", user.email);
    Ok(HttpResponse::Ok().json(json!({
        "message": "You have been logged out."
    })))
}

#[post("/refresh-token")]
async fn refresh_session(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    body: web::Json<RefreshRequest>
) -> Result<HttpResponse, ApiError> {
    let presented = body
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::ValidationError("Refresh token is required".to_string()))?;

    // Rotation: the presented token is consumed whether or not a new one
    // gets issued.
    let record = AuthService::consume_refresh_token(presented, &pool)
        .await?
        .ok_or_else(|| ApiError::AuthError("Invalid or expired refresh token".to_string()))?;

    let user = UserService::get_user_by_id(record.user_id, &pool).await?;
    let token = AuthService::generate_token(user.user_id, &user.email, user.is_employer, &config)?;
    let refresh_token = AuthService::generate_refresh_token();
    AuthService::store_refresh_token(user.user_id, &refresh_token, &config, &pool).await?;

    info!("Token refreshed for user {}", user.email);

    Ok(HttpResponse::Ok().json(json!({
        "token": token,
        "refresh_token": refresh_token,
        "user_id": user.user_id,
        "email": user.email
    })))
}

#[get("/signup")]
async fn signup_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "view": "signup",
        "form": {
            "fields": [
                { "name": "username", "required": true },
                { "name": "email", "required": true, "format": "email" },
                { "name": "password", "required": true, "format": "password" },
                { "name": "confirm_password", "required": true, "format": "password" },
                { "name": "is_employer", "required": false, "format": "bool" },
                { "name": "company_name", "required": "when is_employer" },
                { "name": "company_description", "required": false },
            ]
        }
    }))
}

#[post("/signup")]
async fn signup(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    form: web::Json<SignupForm>
) -> Result<HttpResponse, ApiError> {
    let validated = forms::validate_signup(&form).map_err(ApiError::FormInvalid)?;
    debug!("Signup attempt for username: {}", validated.username);

    // Friendly duplicate checks; the unique constraints have the last word
    // if a concurrent signup slips past these.
    if UserService::find_by_username(&validated.username, &pool).await?.is_some() {
        return Err(ApiError::ValidationError("Username already exists".to_string()));
    }
    if UserService::find_by_email(&validated.email, &pool).await?.is_some() {
        return Err(ApiError::ValidationError("Email already exists".to_string()));
    }

    let user_id = UserService::register(&validated, &pool).await?;

    // Auto-login after signup
    let token = AuthService::generate_token(user_id, &validated.email, validated.is_employer, &config)?;
    let refresh_token = AuthService::generate_refresh_token();
    AuthService::store_refresh_token(user_id, &refresh_token, &config, &pool).await?;

    info!("User {} registered successfully", validated.username);

    let redirect = if validated.is_employer { "/dashboard" } else { "/job-list" };

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Your account has been created!",
        "token": token,
        "refresh_token": refresh_token,
        "user_id": user_id,
        "username": validated.username,
        "email": validated.email,
        "is_employer": validated.is_employer,
        "redirect": redirect
    })))
}

#[get("/job-list")]
async fn job_list(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let jobs = JobService::list_jobs(&pool).await?;
    Ok(HttpResponse::Ok().json(json!({
        "view": "job-list",
        "jobs": jobs
    })))
}

#[get("/job-detail/{job_id}")]
async fn job_detail(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, ApiError> {
    let job = JobService::get_job(path.into_inner(), &pool).await?;
    Ok(HttpResponse::Ok().json(json!({
        "view": "job-detail",
        "job": job,
        "form": application_form_descriptor()
    })))
}

#[get("/apply/{job_id}")]
async fn apply_form(
    pool: web::Data<DbPool>,
    path: web::Path<i32>
) -> Result<HttpResponse, ApiError> {
    let job = JobService::get_job(path.into_inner(), &pool).await?;
    Ok(HttpResponse::Ok().json(json!({
        "view": "job-detail",
        "job": job,
        "form": application_form_descriptor(),
        "application_success": false,
        "already_applied": false
    })))
}

#[post("/apply/{job_id}")]
async fn apply(
    pool: web::Data<DbPool>,
    identity: MaybeAuthenticated,
    path: web::Path<i32>,
    form: web::Json<ApplicationForm>
) -> Result<HttpResponse, ApiError> {
    let target_job = path.into_inner();
    let job = JobService::get_job(target_job, &pool).await?;

    let submitter = identity.0.as_ref().map(|u| u.user_id);
    // The guard runs on the raw submission, before validation gets a say.
    // Anonymous callers are identified by the email they typed in; logged-in
    // callers also match on their account email as a fallback.
    let guard_email = form
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| identity.0.as_ref().map(|u| u.email.clone()));

    if ApplicationService::already_applied(target_job, submitter, guard_email, &pool).await? {
        return Ok(HttpResponse::Ok().json(json!({
            "view": "job-detail",
            "job": job,
            "already_applied": true,
            "application_success": false,
            "message": "You have already applied for this job."
        })));
    }

    let validated = forms::validate_application(&form).map_err(ApiError::FormInvalid)?;

    match ApplicationService::submit(validated, submitter, target_job, &pool).await? {
        SubmitOutcome::Created(application_id) => {
            Ok(HttpResponse::Created().json(json!({
                "view": "job-detail",
                "job": job,
                "already_applied": false,
                "application_success": true,
                "application_id": application_id,
                "message": "Your application has been submitted!"
            })))
        }
        SubmitOutcome::AlreadyApplied => {
            Ok(HttpResponse::Ok().json(json!({
                "view": "job-detail",
                "job": job,
                "already_applied": true,
                "application_success": false,
                "message": "You have already applied for this job."
            })))
        }
    }
}

#[post("/post-job")]
async fn post_job(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    form: web::Json<JobForm>
) -> Result<HttpResponse, ApiError> {
    if !user.is_employer {
        return Err(ApiError::RoleMismatch(
            "Only employer accounts can post jobs".to_string(),
        ));
    }

    let company = UserService::company_for_user(user.user_id, &pool)
        .await?
        .ok_or_else(|| ApiError::NotFoundError("No company registered for this account".to_string()))?;

    let validated = forms::validate_job(&form).map_err(ApiError::FormInvalid)?;
    let job_id = JobService::create_job(validated, company.company_id, &pool).await?;
    let job = JobService::get_job(job_id, &pool).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Job posted successfully",
        "job": job
    })))
}

#[get("/applications")]
async fn applications(
    pool: web::Data<DbPool>,
    identity: MaybeAuthenticated
) -> Result<HttpResponse, ApiError> {
    match identity.0 {
        Some(user) => {
            let rows = ApplicationService::list_for_user(user.user_id, &pool).await?;
            debug!("Listed {} applications for user {}", rows.len(), user.user_id);
            Ok(HttpResponse::Ok().json(json!({
                "view": "applications",
                "applications": rows
            })))
        }
        None => Err(ApiError::AuthError(
            "Please log in to view your applications".to_string(),
        )),
    }
}

#[get("/dashboard")]
async fn dashboard(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let profile = UserService::get_profile(user.user_id, &pool).await?;
    let company = if user.is_employer {
        UserService::company_for_user(user.user_id, &pool).await?
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(json!({
        "view": "dashboard",
        "message": format!("Welcome to the dashboard, {}!", user.email),
        "profile": profile,
        "company": company
    })))
}

#[get("/")]
async fn home(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let categories = JobService::category_vacancies(&pool).await?;
    let jobs = JobService::list_jobs(&pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "view": "index",
        "categories": categories,
        "jobs": jobs
    })))
}

#[get("/about")]
async fn about() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "view": "about" }))
}

#[get("/category")]
async fn category() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "view": "category" }))
}

#[get("/contact")]
async fn contact() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "view": "contact" }))
}

#[get("/testimonial")]
async fn testimonial() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "view": "testimonial" }))
}

/// Fallback for any unmatched path.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "view": "404",
        "error": "Page not found"
    }))
}

/// Registers every route; shared between the server binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(login_form)
        .service(login)
        .service(logout)
        .service(refresh_session)
        .service(signup_form)
        .service(signup)
        .service(job_list)
        .service(job_detail)
        .service(apply_form)
        .service(apply)
        .service(post_job)
        .service(applications)
        .service(dashboard)
        .service(home)
        .service(about)
        .service(category)
        .service(contact)
        .service(testimonial);
}
