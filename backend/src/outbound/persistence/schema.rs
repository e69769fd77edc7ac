//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When a
//! migration changes a table, regenerate with `diesel print-schema` or edit
//! by hand.

diesel::table! {
    /// Commits mirrored from the repository host, keyed by `(repo, id)`.
    bb_commits (repo, id) {
        /// Commit hash.
        id -> Text,
        /// `workspace/slug` the commit was read from.
        repo -> Text,
        /// Display identity of the author.
        author -> Text,
        /// Stable author id (account uuid or email).
        author_id -> Nullable<Text>,
        /// Full commit message.
        message -> Text,
        /// Commit date.
        created_at -> Timestamptz,
        /// Unified diff, filled in by the backfill pass.
        diff -> Nullable<Text>,
    }
}

diesel::table! {
    /// Pull requests mirrored from the repository host.
    bb_pullrequests (repo, id) {
        /// Host id, unique per repository.
        id -> Int8,
        /// `workspace/slug`.
        repo -> Text,
        /// Title line.
        title -> Text,
        /// Body text.
        description -> Text,
        /// `OPEN`, `MERGED`, `DECLINED` or `SUPERSEDED`.
        state -> Text,
        /// Display identity of the author.
        author -> Text,
        /// Stable author id.
        author_id -> Nullable<Text>,
        /// Creation time.
        created_at -> Timestamptz,
        /// Last update time.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sync watermarks keyed by `(tbl, repo)`.
    bb_sync_history (tbl, repo) {
        /// Record table name.
        tbl -> Text,
        /// `workspace/slug`.
        repo -> Text,
        /// Newest record timestamp stored by the last complete walk.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Commits collected by the last successful MTR sweep.
    bb_mtr (id) {
        /// Surrogate key.
        id -> Int8,
        /// Commit hash.
        commit_id -> Text,
        /// Display identity of the author.
        author -> Text,
        /// Stable author id.
        author_id -> Nullable<Text>,
        /// `workspace/slug`.
        repository -> Text,
        /// Commit date.
        created_at -> Timestamptz,
        /// Full commit message.
        commit_message -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(bb_commits, bb_pullrequests, bb_sync_history, bb_mtr);
