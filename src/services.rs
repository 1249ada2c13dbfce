use crate::models::*;
use crate::config::{AppConfig, DbPool};
use crate::errors::ApiError;
use crate::forms::{ValidatedApplication, ValidatedJob, ValidatedSignup};
use actix_web::web;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error, info};
use uuid::Uuid;

pub struct AuthService;

impl AuthService {
    pub fn hash_password(password: &str) -> Result<String, ApiError> {
        hash(password, DEFAULT_COST)
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                ApiError::InternalError("Failed to hash password".to_string())
            })
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
        verify(password, hash)
            .map_err(|e| {
                error!("Failed to verify password: {}", e);
                ApiError::InternalError("Failed to verify password".to_string())
            })
    }

    pub fn generate_token(user_id: i32, email: &str, is_employer: bool, config: &AppConfig) -> Result<String, ApiError> {
        let now = Utc::now();
        let iat = now.timestamp() as usize;
        let exp = (now + Duration::hours(config.jwt_expiry)).timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            exp,
            iat,
            user_id,
            email: email.to_string(),
            is_employer,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes())
        )
        .map_err(|e| {
            error!("Failed to generate token: {}", e);
            ApiError::InternalError("Failed to generate token".to_string())
        })
    }

    pub fn decode_token(token: &str, config: &AppConfig) -> Result<Claims, ApiError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default()
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Token rejected: {}", e);
            ApiError::AuthError("Invalid or expired token".to_string())
        })
    }

    pub fn generate_refresh_token() -> String {
        Uuid::new_v4().to_string()
    }

    pub async fn store_refresh_token(
        user_id: i32,
        token: &str,
        config: &AppConfig,
        pool: &DbPool
    ) -> Result<(), ApiError> {
        let expires_at = (Utc::now() + Duration::days(config.refresh_expiry)).naive_utc();

        let new_token = NewRefreshToken {
            user_id,
            token: token.to_string(),
            expires_at,
        };

        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        web::block(move || {
            use crate::schema::refresh_token::dsl::*;
            let mut conn = conn;
            diesel::insert_into(refresh_token)
                .values(&new_token)
                .execute(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to store refresh token: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    /// Deletes every refresh token the user holds. Backs the logout flow:
    /// the access token still expires on its own, but nothing can be renewed.
    pub async fn revoke_refresh_tokens(user_id_param: i32, pool: &DbPool) -> Result<(), ApiError> {
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        web::block(move || {
            use crate::schema::refresh_token::dsl::*;
            let mut conn = conn;
            diesel::delete(refresh_token.filter(user_id.eq(user_id_param)))
                .execute(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to revoke refresh tokens: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    /// Looks up an unexpired refresh token and deletes it in the same
    /// round-trip. Returns None for unknown or expired tokens.
    pub async fn consume_refresh_token(token_value: &str, pool: &DbPool) -> Result<Option<RefreshToken>, ApiError> {
        let token_copy = token_value.to_string();
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let record = web::block(move || -> Result<Option<RefreshToken>, diesel::result::Error> {
            use crate::schema::refresh_token::dsl::*;
            let mut conn = conn;
            let found = refresh_token
                .filter(token.eq(&token_copy))
                .filter(expires_at.gt(Utc::now().naive_utc()))
                .first::<RefreshToken>(&mut conn)
                .optional()?;
            if found.is_some() {
                diesel::delete(refresh_token.filter(token.eq(&token_copy)))
                    .execute(&mut conn)?;
            }
            Ok(found)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to consume refresh token: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(record)
    }
}

pub struct UserService;

impl UserService {
    pub async fn find_by_email(email_addr: &str, pool: &DbPool) -> Result<Option<UserAccount>, ApiError> {
        let email_copy = email_addr.to_string();
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let user = web::block(move || {
            use crate::schema::user_account::dsl::*;
            let mut conn = conn;
            user_account
                .filter(email.eq(email_copy))
                .first::<UserAccount>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Error finding user by email: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    pub async fn find_by_username(name: &str, pool: &DbPool) -> Result<Option<UserAccount>, ApiError> {
        let name_copy = name.to_string();
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let user = web::block(move || {
            use crate::schema::user_account::dsl::*;
            let mut conn = conn;
            user_account
                .filter(username.eq(name_copy))
                .first::<UserAccount>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Error finding user by username: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    pub async fn get_user_by_id(id: i32, pool: &DbPool) -> Result<UserAccount, ApiError> {
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let user = web::block(move || {
            use crate::schema::user_account::dsl::*;
            let mut conn = conn;
            user_account.find(id).first::<UserAccount>(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            debug!("User not found with ID {}: {}", id, e);
            ApiError::NotFoundError("User not found".to_string())
        })?;

        Ok(user)
    }

    /// Creates the user row and, for employer signups, the paired company row
    /// in one transaction: both commit or neither does.
    pub async fn register(signup: &ValidatedSignup, pool: &DbPool) -> Result<i32, ApiError> {
        let password_hash = AuthService::hash_password(&signup.password)?;

        let new_user = NewUserAccount {
            username: signup.username.clone(),
            email: signup.email.clone(),
            password_hash,
            is_employer: signup.is_employer,
        };
        let company_fields = signup.company.as_ref()
            .map(|c| (c.name.clone(), c.description.clone()));

        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let created_id = web::block(move || {
            let mut conn = conn;
            conn.transaction::<i32, diesel::result::Error, _>(|conn| {
                let new_id = {
                    use crate::schema::user_account::dsl::*;
                    diesel::insert_into(user_account)
                        .values(&new_user)
                        .returning(user_id)
                        .get_result::<i32>(conn)?
                };
                if let Some((company_name, company_description)) = company_fields {
                    use crate::schema::company::dsl::*;
                    diesel::insert_into(company)
                        .values(&NewCompany {
                            name: company_name,
                            description: company_description,
                            user_id: new_id,
                        })
                        .execute(conn)?;
                }
                Ok(new_id)
            })
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                debug!("Signup rejected: username or email already taken");
                ApiError::ValidationError("Username or email already exists".to_string())
            }
            other => {
                error!("Failed to create user: {}", other);
                ApiError::DatabaseError(other.to_string())
            }
        })?;

        info!("Created new user with ID: {}", created_id);
        Ok(created_id)
    }

    pub async fn get_profile(user_id_param: i32, pool: &DbPool) -> Result<Option<Profile>, ApiError> {
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let profile = web::block(move || {
            use crate::schema::profile::dsl::*;
            let mut conn = conn;
            profile
                .filter(user_id.eq(user_id_param))
                .first::<Profile>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Error loading profile: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(profile)
    }

    pub async fn company_for_user(user_id_param: i32, pool: &DbPool) -> Result<Option<Company>, ApiError> {
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let found = web::block(move || {
            use crate::schema::company::dsl::*;
            let mut conn = conn;
            company
                .filter(user_id.eq(user_id_param))
                .first::<Company>(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Error loading company: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(found)
    }
}

pub struct JobService;

impl JobService {
    /// The listing order: date_posted descending, ties left to the database.
    fn newest_first() -> crate::schema::job::BoxedQuery<'static, diesel::pg::Pg> {
        use crate::schema::job::dsl::*;
        job.order(date_posted.desc()).into_boxed()
    }

    /// All jobs, newest first.
    pub async fn list_jobs(pool: &DbPool) -> Result<Vec<Job>, ApiError> {
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let jobs = web::block(move || {
            let mut conn = conn;
            Self::newest_first().load::<Job>(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to list jobs: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        debug!("Listed {} jobs", jobs.len());
        Ok(jobs)
    }

    pub async fn get_job(id: i32, pool: &DbPool) -> Result<Job, ApiError> {
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let found = web::block(move || {
            use crate::schema::job::dsl::*;
            let mut conn = conn;
            job.find(id).first::<Job>(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            debug!("Job not found with ID {}: {}", id, e);
            ApiError::NotFoundError("Job not found".to_string())
        })?;

        Ok(found)
    }

    pub async fn jobs_for_company(company_id_param: i32, pool: &DbPool) -> Result<Vec<Job>, ApiError> {
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let jobs = web::block(move || {
            use crate::schema::job::dsl::*;
            let mut conn = conn;
            job.filter(company_id.eq(company_id_param))
                .order(date_posted.desc())
                .load::<Job>(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to list company jobs: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(jobs)
    }

    pub async fn create_job(job_fields: ValidatedJob, company_id_param: i32, pool: &DbPool) -> Result<i32, ApiError> {
        let new_job = NewJob {
            title: job_fields.title,
            description: job_fields.description,
            company_id: company_id_param,
            location: job_fields.location,
            company_logo: job_fields.company_logo,
            salary: job_fields.salary,
            category: job_fields.category,
        };

        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let created_id = web::block(move || {
            use crate::schema::job::dsl::*;
            let mut conn = conn;
            diesel::insert_into(job)
                .values(&new_job)
                .returning(job_id)
                .get_result::<i32>(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to create job: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        info!("Created job with ID: {}", created_id);
        Ok(created_id)
    }

    /// Vacancy counts for the fixed category catalog. Jobs whose label
    /// matches no catalog title are counted nowhere.
    pub async fn category_vacancies(pool: &DbPool) -> Result<Vec<CategoryVacancies>, ApiError> {
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let counts = web::block(move || -> Result<Vec<CategoryVacancies>, diesel::result::Error> {
            use crate::schema::job::dsl::*;
            let mut conn = conn;
            let mut counts = Vec::with_capacity(CATEGORY_CATALOG.len());
            for info in CATEGORY_CATALOG {
                let vacancies: i64 = job
                    .filter(category.eq(info.title))
                    .count()
                    .get_result(&mut conn)?;
                counts.push(CategoryVacancies {
                    icon: info.icon,
                    title: info.title,
                    vacancies,
                });
            }
            Ok(counts)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to count category vacancies: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(counts)
    }
}

/// Outcome of an application insert. The unique index over
/// (job_id, submitter_key) turns a lost check-then-insert race into
/// `AlreadyApplied` instead of a second row.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(i32),
    AlreadyApplied,
}

pub struct ApplicationService;

impl ApplicationService {
    /// Normalized submitter identity: the user id when authenticated, else
    /// the submitted email, trimmed and lowercased.
    pub fn submitter_key(user_id: Option<i32>, email: &str) -> String {
        match user_id {
            Some(id) => format!("user:{}", id),
            None => format!("email:{}", email.trim().to_lowercase()),
        }
    }

    /// Builds the guard scan: applications for this job matching the
    /// submitter's user id or the submitted email. Anonymous submitters
    /// match on email alone.
    fn duplicate_scan(
        target_job: i32,
        submitter: Option<i32>,
        submitted_email: Option<String>,
    ) -> crate::schema::application::BoxedQuery<'static, diesel::pg::Pg> {
        use crate::schema::application::dsl::*;
        let scan = application.filter(job_id.eq(target_job)).into_boxed();
        match (submitter, submitted_email) {
            (Some(uid), Some(addr)) => {
                scan.filter(user_id.eq(Some(uid)).or(email.eq(addr).nullable()))
            }
            (Some(uid), None) => scan.filter(user_id.eq(Some(uid))),
            (None, Some(addr)) => scan.filter(email.eq(addr)),
            // No identity to match; already_applied returns early before
            // this, but the scan should still match nothing.
            (None, None) => scan.limit(0),
        }
    }

    /// The duplicate guard: true if an application for this job already
    /// exists under the submitter's user id or the submitted email.
    /// An anonymous submission under an email that later becomes a
    /// registered account stays unlinked; there is no reconciliation.
    pub async fn already_applied(
        target_job: i32,
        submitter: Option<i32>,
        submitted_email: Option<String>,
        pool: &DbPool
    ) -> Result<bool, ApiError> {
        if submitter.is_none() && submitted_email.is_none() {
            return Ok(false);
        }

        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let exists = web::block(move || -> Result<bool, diesel::result::Error> {
            let mut conn = conn;
            let found = Self::duplicate_scan(target_job, submitter, submitted_email)
                .first::<Application>(&mut conn)
                .optional()?;
            Ok(found.is_some())
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to check for existing application: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        debug!("Duplicate check for job {}: exists={}", target_job, exists);
        Ok(exists)
    }

    pub async fn submit(
        fields: ValidatedApplication,
        submitter: Option<i32>,
        target_job: i32,
        pool: &DbPool
    ) -> Result<SubmitOutcome, ApiError> {
        let new_application = NewApplication {
            submitter_key: Self::submitter_key(submitter, &fields.email),
            name: fields.name,
            email: fields.email,
            portfolio: fields.portfolio,
            resume: fields.resume,
            cover_letter: fields.cover_letter,
            user_id: submitter,
            job_id: target_job,
        };

        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let outcome = web::block(move || {
            use crate::schema::application::dsl::*;
            let mut conn = conn;
            diesel::insert_into(application)
                .values(&new_application)
                .returning(application_id)
                .get_result::<i32>(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Self::insert_outcome(target_job, outcome)
    }

    /// Maps the insert result: a unique violation on (job_id, submitter_key)
    /// means another submission won the race, which gets the same non-fatal
    /// notice as the guard tripping.
    fn insert_outcome(
        target_job: i32,
        result: Result<i32, diesel::result::Error>,
    ) -> Result<SubmitOutcome, ApiError> {
        match result {
            Ok(created_id) => {
                info!("Stored application {} for job {}", created_id, target_job);
                Ok(SubmitOutcome::Created(created_id))
            }
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                debug!("Concurrent duplicate application for job {}", target_job);
                Ok(SubmitOutcome::AlreadyApplied)
            }
            Err(e) => {
                error!("Failed to store application: {}", e);
                Err(ApiError::DatabaseError(e.to_string()))
            }
        }
    }

    pub async fn list_for_user(user_id_param: i32, pool: &DbPool) -> Result<Vec<Application>, ApiError> {
        let conn = pool.get()
            .map_err(|e| {
                error!("Failed to get database connection: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let applications = web::block(move || {
            use crate::schema::application::dsl::*;
            let mut conn = conn;
            application
                .filter(user_id.eq(Some(user_id_param)))
                .order(date_applied.desc())
                .load::<Application>(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("Database operation error: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to list applications: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;
    use diesel::pg::Pg;

    fn test_config() -> AppConfig {
        AppConfig {
            jwt_secret: "unit-test-secret".to_string(),
            jwt_expiry: 1,
            refresh_expiry: 1,
        }
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hashed = AuthService::hash_password("hammond128").unwrap();
        assert_ne!(hashed, "hammond128");
        assert!(AuthService::verify_password("hammond128", &hashed).unwrap());
        assert!(!AuthService::verify_password("wrong-password", &hashed).unwrap());
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let config = test_config();
        let token = AuthService::generate_token(7, "a@x.com", true, &config).unwrap();
        let claims = AuthService::decode_token(&token, &config).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.email, "a@x.com");
        assert!(claims.is_employer);
        assert_eq!(claims.sub, "7");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = test_config();
        let other = AppConfig {
            jwt_secret: "some-other-secret".to_string(),
            ..test_config()
        };
        let token = AuthService::generate_token(7, "a@x.com", false, &other).unwrap();
        assert!(AuthService::decode_token(&token, &config).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let config = test_config();
        assert!(AuthService::decode_token("not-a-jwt", &config).is_err());
    }

    #[test]
    fn submitter_key_prefers_user_id() {
        assert_eq!(ApplicationService::submitter_key(Some(42), "A@X.com"), "user:42");
    }

    #[test]
    fn submitter_key_normalizes_anonymous_email() {
        assert_eq!(
            ApplicationService::submitter_key(None, "  Ada@Example.COM "),
            "email:ada@example.com"
        );
        // Same mailbox, different casing: same key, so the unique index
        // blocks the second anonymous submission.
        assert_eq!(
            ApplicationService::submitter_key(None, "ada@example.com"),
            ApplicationService::submitter_key(None, "ADA@EXAMPLE.COM")
        );
    }

    fn where_clause(sql: &str) -> &str {
        sql.split("WHERE").nth(1).expect("query has a WHERE clause")
    }

    #[test]
    fn duplicate_scan_for_authenticated_matches_user_id_or_email() {
        let query = ApplicationService::duplicate_scan(7, Some(3), Some("a@x.com".to_string()));
        let sql = debug_query::<Pg, _>(&query).to_string();
        let clause = where_clause(&sql);
        assert!(clause.contains(r#""application"."job_id""#), "{sql}");
        assert!(clause.contains(r#""application"."user_id""#), "{sql}");
        assert!(clause.contains(" OR "), "{sql}");
        assert!(clause.contains(r#""application"."email""#), "{sql}");
    }

    #[test]
    fn duplicate_scan_for_anonymous_matches_email_only() {
        let query = ApplicationService::duplicate_scan(7, None, Some("a@x.com".to_string()));
        let sql = debug_query::<Pg, _>(&query).to_string();
        let clause = where_clause(&sql);
        assert!(clause.contains(r#""application"."email""#), "{sql}");
        assert!(!clause.contains(r#""application"."user_id""#), "{sql}");
        assert!(!clause.contains(" OR "), "{sql}");
    }

    #[test]
    fn duplicate_scan_without_submitted_email_matches_user_id_only() {
        let query = ApplicationService::duplicate_scan(7, Some(3), None);
        let sql = debug_query::<Pg, _>(&query).to_string();
        let clause = where_clause(&sql);
        assert!(clause.contains(r#""application"."user_id""#), "{sql}");
        assert!(!clause.contains(r#""application"."email""#), "{sql}");
    }

    #[test]
    fn unique_violation_on_insert_reports_already_applied() {
        // A second submission losing the check-then-insert race hits the
        // (job_id, submitter_key) index; only one row survives.
        let race = diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        );
        assert_eq!(
            ApplicationService::insert_outcome(7, Err(race)).unwrap(),
            SubmitOutcome::AlreadyApplied
        );
        assert_eq!(
            ApplicationService::insert_outcome(7, Ok(5)).unwrap(),
            SubmitOutcome::Created(5)
        );
        // Anything else stays a hard storage error.
        assert!(ApplicationService::insert_outcome(7, Err(diesel::result::Error::NotFound)).is_err());
    }

    #[test]
    fn job_listing_orders_by_date_posted_descending() {
        let sql = debug_query::<Pg, _>(&JobService::newest_first()).to_string();
        assert!(sql.contains(r#"ORDER BY "job"."date_posted" DESC"#), "{sql}");
    }
}
