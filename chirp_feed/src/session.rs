use chrono::Utc;
use diesel::prelude::*;

use chirp_core::{Database, Result};

/// Resolve the user behind a session token. Expired or unknown tokens resolve to nobody.
pub fn viewer_for_token(db: Database, token: &str) -> Result<Option<String>> {
    use chirp_core::schema::session;

    let user_id = session::table
        .filter(session::token.eq(token))
        .filter(session::expires.gt(Utc::now().naive_utc()))
        .select(session::user_id)
        .first::<String>(db)
        .optional()?;
    Ok(user_id)
}
