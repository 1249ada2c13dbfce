use diesel::r2d2::{self, ConnectionManager};
use diesel::pg::PgConnection;
use std::env;
use log::warn;
use rand::{thread_rng, Rng};
use rand::distributions::Alphanumeric;

// Type aliases
pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

// Database initialization SQL
pub const DB_INIT_SQL: &str = r#"
-- Create tables if they don't exist
CREATE TABLE IF NOT EXISTS user_account (
    user_id SERIAL PRIMARY KEY,
    username VARCHAR(50) UNIQUE NOT NULL,
    email VARCHAR(120) UNIQUE NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    is_employer BOOLEAN NOT NULL DEFAULT FALSE,
    date_registered TIMESTAMP NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS company (
    company_id SERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    user_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS profile (
    profile_id SERIAL PRIMARY KEY,
    user_id INTEGER UNIQUE NOT NULL,
    bio TEXT,
    resume TEXT
);

CREATE TABLE IF NOT EXISTS job (
    job_id SERIAL PRIMARY KEY,
    title VARCHAR(100) NOT NULL,
    description TEXT NOT NULL,
    date_posted TIMESTAMP NOT NULL DEFAULT NOW(),
    company_id INTEGER NOT NULL,
    location VARCHAR(100) NOT NULL,
    company_logo VARCHAR(255) NOT NULL,
    salary INTEGER NOT NULL,
    category VARCHAR(50) NOT NULL
);

CREATE TABLE IF NOT EXISTS application (
    application_id SERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    email VARCHAR(120) NOT NULL,
    portfolio VARCHAR(200),
    resume VARCHAR(200) NOT NULL,
    cover_letter TEXT NOT NULL,
    user_id INTEGER,
    job_id INTEGER NOT NULL,
    date_applied TIMESTAMP NOT NULL DEFAULT NOW(),
    submitter_key VARCHAR(150) NOT NULL
);

CREATE TABLE IF NOT EXISTS refresh_token (
    token_id SERIAL PRIMARY KEY,
    user_id INTEGER NOT NULL,
    token VARCHAR(255) NOT NULL,
    expires_at TIMESTAMP NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT NOW()
);

-- One application per job per submitter identity, enforced at the storage
-- layer so the check-then-insert in the apply flow cannot race.
CREATE UNIQUE INDEX IF NOT EXISTS uq_application_job_submitter
    ON application (job_id, submitter_key);

-- Add foreign keys if not exist
DO $$
BEGIN
    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint WHERE conname = 'fk_company_owner'
    ) THEN
        ALTER TABLE company ADD CONSTRAINT fk_company_owner
        FOREIGN KEY (user_id) REFERENCES user_account(user_id) ON DELETE CASCADE;
    END IF;

    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint WHERE conname = 'fk_profile_user'
    ) THEN
        ALTER TABLE profile ADD CONSTRAINT fk_profile_user
        FOREIGN KEY (user_id) REFERENCES user_account(user_id) ON DELETE CASCADE;
    END IF;

    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint WHERE conname = 'fk_job_company'
    ) THEN
        ALTER TABLE job ADD CONSTRAINT fk_job_company
        FOREIGN KEY (company_id) REFERENCES company(company_id) ON DELETE CASCADE;
    END IF;

    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint WHERE conname = 'fk_application_job'
    ) THEN
        ALTER TABLE application ADD CONSTRAINT fk_application_job
        FOREIGN KEY (job_id) REFERENCES job(job_id) ON DELETE CASCADE;
    END IF;

    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint WHERE conname = 'fk_application_user'
    ) THEN
        ALTER TABLE application ADD CONSTRAINT fk_application_user
        FOREIGN KEY (user_id) REFERENCES user_account(user_id) ON DELETE SET NULL;
    END IF;

    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint WHERE conname = 'fk_refresh_token_user'
    ) THEN
        ALTER TABLE refresh_token ADD CONSTRAINT fk_refresh_token_user
        FOREIGN KEY (user_id) REFERENCES user_account(user_id) ON DELETE CASCADE;
    END IF;
END $$;
"#;

// Config
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub jwt_expiry: i64, // In hours
    pub refresh_expiry: i64, // In days
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(val) => val,
            Err(e) => {
                warn!("Failed to load JWT_SECRET: {}", e);
                warn!("Using default JWT secret - THIS IS NOT SECURE FOR PRODUCTION!");
                "your_jwt_secret_key_here".to_string()
            }
        };

        let jwt_expiry = env::var("JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(24);

        let refresh_expiry = env::var("REFRESH_EXPIRY_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(30);

        Self { jwt_secret, jwt_expiry, refresh_expiry }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret == "your_jwt_secret_key_here" {
            warn!("Using default JWT secret is not secure for production!");
        }

        if self.jwt_expiry <= 0 {
            return Err("JWT_EXPIRY_HOURS must be positive".to_string());
        }

        if self.refresh_expiry <= 0 {
            return Err("REFRESH_EXPIRY_DAYS must be positive".to_string());
        }

        Ok(())
    }

    pub fn generate_secure_secret() -> String {
        thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_positive_expiries() {
        let config = AppConfig {
            jwt_secret: "secret".to_string(),
            jwt_expiry: 0,
            refresh_expiry: 30,
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            jwt_secret: "secret".to_string(),
            jwt_expiry: 24,
            refresh_expiry: -1,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn generated_secret_is_32_alphanumeric_chars() {
        let secret = AppConfig::generate_secure_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
