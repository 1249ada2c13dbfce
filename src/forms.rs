//! Form validation as plain functions: each form has a raw record with
//! optional fields (whatever the client sent) and a `validate_*` function
//! returning either the typed, validated record or the list of field-level
//! errors to redisplay.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        FieldError { field, message: message.to_string() }
    }
}

/// Display-level email shape check: one `@`, non-empty local part, domain
/// with a dot. Deliverability is not our problem here.
pub fn is_email_shaped(value: &str) -> bool {
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
        }
        _ => false,
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// Login

#[derive(Deserialize, Debug, Default)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_employer: Option<bool>,
}

#[derive(Debug)]
pub struct ValidatedLogin {
    pub email: String,
    pub password: String,
    pub is_employer: bool,
}

pub fn validate_login(form: &LoginForm) -> Result<ValidatedLogin, Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = match trimmed(&form.email) {
        Some(e) if is_email_shaped(&e) => Some(e),
        Some(_) => {
            errors.push(FieldError::new("email", "Enter a valid email address"));
            None
        }
        None => {
            errors.push(FieldError::new("email", "Email is required"));
            None
        }
    };

    let password = match form.password.as_deref().filter(|p| !p.is_empty()) {
        Some(p) => Some(p.to_string()),
        None => {
            errors.push(FieldError::new("password", "Password is required"));
            None
        }
    };

    if errors.is_empty() {
        Ok(ValidatedLogin {
            email: email.unwrap(),
            password: password.unwrap(),
            is_employer: form.is_employer.unwrap_or(false),
        })
    } else {
        Err(errors)
    }
}

// Signup

#[derive(Deserialize, Debug, Default)]
pub struct SignupForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub is_employer: Option<bool>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
}

#[derive(Debug)]
pub struct CompanyFields {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct ValidatedSignup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_employer: bool,
    pub company: Option<CompanyFields>,
}

pub fn validate_signup(form: &SignupForm) -> Result<ValidatedSignup, Vec<FieldError>> {
    let mut errors = Vec::new();

    let username = match trimmed(&form.username) {
        Some(u) if (3..=50).contains(&u.chars().count()) => Some(u),
        Some(_) => {
            errors.push(FieldError::new("username", "Username must be between 3 and 50 characters"));
            None
        }
        None => {
            errors.push(FieldError::new("username", "Username is required"));
            None
        }
    };

    let email = match trimmed(&form.email) {
        Some(e) if is_email_shaped(&e) => Some(e),
        Some(_) => {
            errors.push(FieldError::new("email", "Enter a valid email address"));
            None
        }
        None => {
            errors.push(FieldError::new("email", "Email is required"));
            None
        }
    };

    let password = match form.password.as_deref().filter(|p| !p.is_empty()) {
        Some(p) if p.chars().count() >= 8 => Some(p.to_string()),
        Some(_) => {
            errors.push(FieldError::new("password", "Password must be at least 8 characters"));
            None
        }
        None => {
            errors.push(FieldError::new("password", "Password is required"));
            None
        }
    };

    if let Some(ref p) = password {
        if form.confirm_password.as_deref() != Some(p.as_str()) {
            errors.push(FieldError::new("confirm_password", "Passwords do not match"));
        }
    }

    let is_employer = form.is_employer.unwrap_or(false);

    // Employer signup carries the paired company record; its name is
    // mandatory or the signup fails as a whole.
    let company = if is_employer {
        match trimmed(&form.company_name) {
            Some(name) => Some(CompanyFields {
                name,
                description: trimmed(&form.company_description),
            }),
            None => {
                errors.push(FieldError::new("company_name", "Company name is required for employer accounts"));
                None
            }
        }
    } else {
        None
    };

    if errors.is_empty() {
        Ok(ValidatedSignup {
            username: username.unwrap(),
            email: email.unwrap(),
            password: password.unwrap(),
            is_employer,
            company,
        })
    } else {
        Err(errors)
    }
}

// Application

#[derive(Deserialize, Debug, Default)]
pub struct ApplicationForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub portfolio: Option<String>,
    pub resume: Option<String>,
    pub cover_letter: Option<String>,
}

#[derive(Debug)]
pub struct ValidatedApplication {
    pub name: String,
    pub email: String,
    pub portfolio: Option<String>,
    pub resume: String,
    pub cover_letter: String,
}

pub fn validate_application(form: &ApplicationForm) -> Result<ValidatedApplication, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = match trimmed(&form.name) {
        Some(n) => Some(n),
        None => {
            errors.push(FieldError::new("name", "Name is required"));
            None
        }
    };

    let email = match trimmed(&form.email) {
        Some(e) if is_email_shaped(&e) => Some(e),
        Some(_) => {
            errors.push(FieldError::new("email", "Enter a valid email address"));
            None
        }
        None => {
            errors.push(FieldError::new("email", "Email is required"));
            None
        }
    };

    let resume = match trimmed(&form.resume) {
        Some(r) => Some(r),
        None => {
            errors.push(FieldError::new("resume", "A resume file is required"));
            None
        }
    };

    let cover_letter = match trimmed(&form.cover_letter) {
        Some(c) => Some(c),
        None => {
            errors.push(FieldError::new("cover_letter", "Cover letter is required"));
            None
        }
    };

    if errors.is_empty() {
        Ok(ValidatedApplication {
            name: name.unwrap(),
            email: email.unwrap(),
            portfolio: trimmed(&form.portfolio),
            resume: resume.unwrap(),
            cover_letter: cover_letter.unwrap(),
        })
    } else {
        Err(errors)
    }
}

// Job posting

#[derive(Deserialize, Debug, Default)]
pub struct JobForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub company_logo: Option<String>,
    pub salary: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug)]
pub struct ValidatedJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub company_logo: String,
    pub salary: i32,
    pub category: String,
}

pub fn validate_job(form: &JobForm) -> Result<ValidatedJob, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = match trimmed(&form.title) {
        Some(t) if t.chars().count() <= 100 => Some(t),
        Some(_) => {
            errors.push(FieldError::new("title", "Title must be at most 100 characters"));
            None
        }
        None => {
            errors.push(FieldError::new("title", "Title is required"));
            None
        }
    };

    let description = match trimmed(&form.description) {
        Some(d) => Some(d),
        None => {
            errors.push(FieldError::new("description", "Description is required"));
            None
        }
    };

    let location = match trimmed(&form.location) {
        Some(l) => Some(l),
        None => {
            errors.push(FieldError::new("location", "Location is required"));
            None
        }
    };

    let company_logo = match trimmed(&form.company_logo) {
        Some(l) => Some(l),
        None => {
            errors.push(FieldError::new("company_logo", "Company logo is required"));
            None
        }
    };

    let salary = match form.salary {
        Some(s) if s >= 0 => Some(s),
        Some(_) => {
            errors.push(FieldError::new("salary", "Salary must not be negative"));
            None
        }
        None => {
            errors.push(FieldError::new("salary", "Salary is required"));
            None
        }
    };

    let category = match trimmed(&form.category) {
        Some(c) => Some(c),
        None => {
            errors.push(FieldError::new("category", "Category is required"));
            None
        }
    };

    if errors.is_empty() {
        Ok(ValidatedJob {
            title: title.unwrap(),
            description: description.unwrap(),
            location: location.unwrap(),
            company_logo: company_logo.unwrap(),
            salary: salary.unwrap(),
            category: category.unwrap(),
        })
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_names(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn email_shape_accepts_ordinary_addresses() {
        assert!(is_email_shaped("a@x.com"));
        assert!(is_email_shaped("first.last@sub.example.org"));
    }

    #[test]
    fn email_shape_rejects_malformed_addresses() {
        assert!(!is_email_shaped(""));
        assert!(!is_email_shaped("nodomain@"));
        assert!(!is_email_shaped("@x.com"));
        assert!(!is_email_shaped("two@@x.com"));
        assert!(!is_email_shaped("no-at-sign"));
        assert!(!is_email_shaped("dotless@example"));
    }

    #[test]
    fn login_requires_email_and_password() {
        let errors = validate_login(&LoginForm::default()).unwrap_err();
        assert_eq!(field_names(&errors), vec!["email", "password"]);
    }

    #[test]
    fn login_defaults_employer_claim_to_false() {
        let form = LoginForm {
            email: Some("a@x.com".to_string()),
            password: Some("hunter22".to_string()),
            is_employer: None,
        };
        let validated = validate_login(&form).unwrap();
        assert!(!validated.is_employer);
    }

    #[test]
    fn signup_rejects_password_mismatch() {
        let form = SignupForm {
            username: Some("candidate".to_string()),
            email: Some("a@x.com".to_string()),
            password: Some("longenough".to_string()),
            confirm_password: Some("different".to_string()),
            ..SignupForm::default()
        };
        let errors = validate_signup(&form).unwrap_err();
        assert_eq!(field_names(&errors), vec!["confirm_password"]);
    }

    #[test]
    fn employer_signup_requires_company_name() {
        let form = SignupForm {
            username: Some("employer".to_string()),
            email: Some("boss@x.com".to_string()),
            password: Some("longenough".to_string()),
            confirm_password: Some("longenough".to_string()),
            is_employer: Some(true),
            ..SignupForm::default()
        };
        let errors = validate_signup(&form).unwrap_err();
        assert_eq!(field_names(&errors), vec!["company_name"]);
    }

    #[test]
    fn employer_signup_with_company_carries_company_fields() {
        let form = SignupForm {
            username: Some("employer".to_string()),
            email: Some("boss@x.com".to_string()),
            password: Some("longenough".to_string()),
            confirm_password: Some("longenough".to_string()),
            is_employer: Some(true),
            company_name: Some("Tech Innovators".to_string()),
            company_description: Some("Leading tech company".to_string()),
        };
        let validated = validate_signup(&form).unwrap();
        let company = validated.company.unwrap();
        assert_eq!(company.name, "Tech Innovators");
        assert_eq!(company.description.as_deref(), Some("Leading tech company"));
    }

    #[test]
    fn candidate_signup_has_no_company() {
        let form = SignupForm {
            username: Some("candidate".to_string()),
            email: Some("a@x.com".to_string()),
            password: Some("longenough".to_string()),
            confirm_password: Some("longenough".to_string()),
            is_employer: Some(false),
            // Stray company fields on a candidate signup are ignored.
            company_name: Some("Not A Company".to_string()),
            company_description: None,
        };
        let validated = validate_signup(&form).unwrap();
        assert!(validated.company.is_none());
    }

    #[test]
    fn application_requires_all_mandatory_fields() {
        let errors = validate_application(&ApplicationForm::default()).unwrap_err();
        assert_eq!(
            field_names(&errors),
            vec!["name", "email", "resume", "cover_letter"]
        );
    }

    #[test]
    fn application_portfolio_is_optional() {
        let form = ApplicationForm {
            name: Some("Ada".to_string()),
            email: Some("ada@x.com".to_string()),
            portfolio: None,
            resume: Some("resume.pdf".to_string()),
            cover_letter: Some("I would like to apply.".to_string()),
        };
        let validated = validate_application(&form).unwrap();
        assert!(validated.portfolio.is_none());
        assert_eq!(validated.resume, "resume.pdf");
    }

    #[test]
    fn application_fields_are_trimmed() {
        let form = ApplicationForm {
            name: Some("  Ada  ".to_string()),
            email: Some(" ada@x.com ".to_string()),
            portfolio: Some("   ".to_string()),
            resume: Some("resume.pdf".to_string()),
            cover_letter: Some("Hello".to_string()),
        };
        let validated = validate_application(&form).unwrap();
        assert_eq!(validated.name, "Ada");
        assert_eq!(validated.email, "ada@x.com");
        assert!(validated.portfolio.is_none());
    }

    #[test]
    fn job_form_rejects_negative_salary() {
        let form = JobForm {
            title: Some("Software Developer".to_string()),
            description: Some("Develop software applications.".to_string()),
            location: Some("New York".to_string()),
            company_logo: Some("logo.png".to_string()),
            salary: Some(-1),
            category: Some("Marketing".to_string()),
        };
        let errors = validate_job(&form).unwrap_err();
        assert_eq!(field_names(&errors), vec!["salary"]);
    }
}
