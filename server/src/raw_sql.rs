//! Raw SQL that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! User input is always passed via `.bind()` parameters, never interpolated.

use diesel::sql_types::{BigInt, Double, Nullable, Text, Uuid as SqlUuid};
use diesel::QueryableByName;
use uuid::Uuid;

/// Per-cuisine recipe count and mean rating, one page at a time.
///
/// The two LEFT JOINs fan out to one row per rating, so recipes are counted
/// with DISTINCT while AVG sees every rating exactly once.
///
/// Binds: `$1` offset, `$2` limit (both BIGINT).
///
/// # Why raw SQL?
/// Diesel's group-by support can't mix `COUNT(DISTINCT ...)` with a nullable
/// aggregate over a second LEFT JOIN.
pub const CUISINE_STATS_QUERY: &str = "SELECT c.id AS cuisine_id, \
    c.name AS cuisine_name, \
    COUNT(DISTINCT r.id) AS recipe_count, \
    AVG(rt.score)::float8 AS average_rating \
    FROM cuisines c \
    LEFT JOIN recipes r ON r.cuisine_id = c.id \
    LEFT JOIN ratings rt ON rt.recipe_id = r.id \
    GROUP BY c.id, c.name \
    ORDER BY c.name, c.id \
    OFFSET $1 LIMIT $2";

#[derive(QueryableByName, Debug)]
pub struct CuisineStatRow {
    #[diesel(sql_type = SqlUuid)]
    pub cuisine_id: Uuid,
    #[diesel(sql_type = Text)]
    pub cuisine_name: String,
    #[diesel(sql_type = BigInt)]
    pub recipe_count: i64,
    #[diesel(sql_type = Nullable<Double>)]
    pub average_rating: Option<f64>,
}
