//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations/` exactly. Regenerate with
//! `diesel print-schema` against a migrated database when the SQL changes.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        /// Lower-cased; unique via `users_email_key`.
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Varchar,
        /// `student` or `admin`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Discussion communities. Rows are never deleted.
    communities (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        created_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Memberships keyed by `(user_id, community_id)`.
    community_members (user_id, community_id) {
        user_id -> Uuid,
        community_id -> Uuid,
        /// `owner` or `member`.
        role -> Varchar,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Posts with their cached vote score.
    posts (id) {
        id -> Uuid,
        community_id -> Uuid,
        author_id -> Uuid,
        title -> Varchar,
        content -> Text,
        vote_score -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments with their cached vote score.
    comments (id) {
        id -> Uuid,
        post_id -> Uuid,
        author_id -> Uuid,
        parent_comment_id -> Nullable<Uuid>,
        content -> Text,
        vote_score -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per voter per target; exactly one of `post_id`/`comment_id` is set.
    votes (id) {
        id -> Uuid,
        voter_id -> Uuid,
        post_id -> Nullable<Uuid>,
        comment_id -> Nullable<Uuid>,
        /// `UPVOTE` or `DOWNVOTE`.
        vote_type -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    communities,
    community_members,
    posts,
    comments,
    votes,
);
