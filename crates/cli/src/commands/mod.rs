//! CLI subcommands.

pub mod admin;
pub mod migrate;

/// Database URL from `SLIPBOOK_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) fn database_url() -> Option<String> {
    std::env::var("SLIPBOOK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.trim().is_empty())
}
