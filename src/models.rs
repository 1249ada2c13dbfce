use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use diesel::prelude::*;

#[derive(Queryable, Serialize, Debug)]
pub struct UserAccount {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_employer: bool,
    pub date_registered: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::user_account)]
pub struct NewUserAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_employer: bool,
}

#[derive(Queryable, Serialize, Debug)]
pub struct Company {
    pub company_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::company)]
pub struct NewCompany {
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
}

#[derive(Queryable, Serialize, Debug)]
pub struct Profile {
    pub profile_id: i32,
    pub user_id: i32,
    pub bio: Option<String>,
    pub resume: Option<String>,
}

#[derive(Queryable, Serialize, Debug)]
pub struct Job {
    pub job_id: i32,
    pub title: String,
    pub description: String,
    pub date_posted: NaiveDateTime,
    pub company_id: i32,
    pub location: String,
    pub company_logo: String,
    pub salary: i32,
    pub category: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::job)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub company_id: i32,
    pub location: String,
    pub company_logo: String,
    pub salary: i32,
    pub category: String,
}

#[derive(Queryable, Serialize, Debug)]
pub struct Application {
    pub application_id: i32,
    pub name: String,
    pub email: String,
    pub portfolio: Option<String>,
    pub resume: String,
    pub cover_letter: String,
    pub user_id: Option<i32>,
    pub job_id: i32,
    pub date_applied: NaiveDateTime,
    #[serde(skip_serializing)]
    pub submitter_key: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::application)]
pub struct NewApplication {
    pub name: String,
    pub email: String,
    pub portfolio: Option<String>,
    pub resume: String,
    pub cover_letter: String,
    pub user_id: Option<i32>,
    pub job_id: i32,
    pub submitter_key: String,
}

#[derive(Queryable, Serialize, Debug)]
pub struct RefreshToken {
    pub token_id: i32,
    pub user_id: i32,
    pub token: String,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::refresh_token)]
pub struct NewRefreshToken {
    pub user_id: i32,
    pub token: String,
    pub expires_at: NaiveDateTime,
}

// DTOs
#[derive(Deserialize, Debug)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub is_employer: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,      // Subject (user_id)
    pub exp: usize,       // Expiration time
    pub iat: usize,       // Issued at
    pub user_id: i32,
    pub email: String,
    pub is_employer: bool,
}

/// One entry of the fixed category catalog shown on the home view.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub icon: &'static str,
    pub title: &'static str,
}

/// Category descriptor with its vacancy count attached.
#[derive(Serialize, Debug)]
pub struct CategoryVacancies {
    pub icon: &'static str,
    pub title: &'static str,
    pub vacancies: i64,
}

/// The eight categories the home view aggregates over. Job rows carry a
/// free-form category label; only exact matches against these titles are
/// counted, anything else is simply not shown.
pub const CATEGORY_CATALOG: [CategoryInfo; 8] = [
    CategoryInfo { icon: "fa-mail-bulk", title: "Marketing" },
    CategoryInfo { icon: "fa-headset", title: "Customer Service" },
    CategoryInfo { icon: "fa-user-tie", title: "Health" },
    CategoryInfo { icon: "fa-tasks", title: "Project Management" },
    CategoryInfo { icon: "fa-chart-line", title: "Business Development" },
    CategoryInfo { icon: "fa-hands-helping", title: "Sales & Communication" },
    CategoryInfo { icon: "fa-book-reader", title: "Teaching & Education" },
    CategoryInfo { icon: "fa-drafting-compass", title: "Design & Creative" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn category_catalog_has_eight_distinct_titles() {
        assert_eq!(CATEGORY_CATALOG.len(), 8);
        let mut titles: Vec<&str> = CATEGORY_CATALOG.iter().map(|c| c.title).collect();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), 8);
        assert!(titles.contains(&"Marketing"));
        assert!(titles.contains(&"Health"));
    }

    #[test]
    fn user_serialization_skips_password_hash() {
        let user = UserAccount {
            user_id: 1,
            username: "candidate".to_string(),
            email: "candidate@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            is_employer: false,
            date_registered: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "candidate");
    }
}
