// Database schema definitions
diesel::table! {
    user_account (user_id) {
        user_id -> Int4,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        is_employer -> Bool,
        date_registered -> Timestamp,
    }
}

diesel::table! {
    company (company_id) {
        company_id -> Int4,
        name -> Varchar,
        description -> Nullable<Text>,
        user_id -> Int4,
    }
}

diesel::table! {
    profile (profile_id) {
        profile_id -> Int4,
        user_id -> Int4,
        bio -> Nullable<Text>,
        resume -> Nullable<Text>,
    }
}

diesel::table! {
    job (job_id) {
        job_id -> Int4,
        title -> Varchar,
        description -> Text,
        date_posted -> Timestamp,
        company_id -> Int4,
        location -> Varchar,
        company_logo -> Varchar,
        salary -> Int4,
        category -> Varchar,
    }
}

diesel::table! {
    application (application_id) {
        application_id -> Int4,
        name -> Varchar,
        email -> Varchar,
        portfolio -> Nullable<Varchar>,
        resume -> Varchar,
        cover_letter -> Text,
        user_id -> Nullable<Int4>,
        job_id -> Int4,
        date_applied -> Timestamp,
        submitter_key -> Varchar,
    }
}

diesel::table! {
    refresh_token (token_id) {
        token_id -> Int4,
        user_id -> Int4,
        token -> Varchar,
        expires_at -> Timestamp,
        created_at -> Timestamp,
    }
}

diesel::joinable!(company -> user_account (user_id));
diesel::joinable!(profile -> user_account (user_id));
diesel::joinable!(job -> company (company_id));
diesel::joinable!(application -> job (job_id));
diesel::joinable!(application -> user_account (user_id));
diesel::joinable!(refresh_token -> user_account (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    user_account, company, profile, job,
    application, refresh_token,
);
