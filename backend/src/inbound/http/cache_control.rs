//! Cache policies for HTTP handlers.

/// Admin responses expose table contents and must never be stored.
pub const ADMIN_NO_STORE: &str = "private, no-store";

/// Reference data changes only through the admin portal; clients revalidate.
pub const CATALOGUE_REVALIDATE: &str = "public, no-cache";

/// Header tuple for admin responses.
pub const fn admin_no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", ADMIN_NO_STORE)
}

/// Header tuple for public catalogue responses.
pub const fn catalogue_revalidate_header() -> (&'static str, &'static str) {
    ("Cache-Control", CATALOGUE_REVALIDATE)
}
