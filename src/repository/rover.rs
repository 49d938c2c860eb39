use crate::model::rover::Rover;
use crate::schema::rovers;
use diesel::pg::expression::expression_methods::PgTextExpressionMethods;
use diesel::prelude::*;

pub fn find_by_id(conn: &mut PgConnection, rover_id: i64) -> QueryResult<Option<Rover>> {
    rovers::table.find(rover_id).select(Rover::as_select()).first(conn).optional()
}

/// Rover names are matched case-insensitively (§6.1, §4.6.1) — a rover
/// stored as "Curiosity" must still resolve for `name=curiosity`.
pub fn find_rover_by_name(conn: &mut PgConnection, name: &str) -> QueryResult<Option<Rover>> {
    rovers::table
        .filter(rovers::name.ilike(name))
        .select(Rover::as_select())
        .first(conn)
        .optional()
}

pub fn all_rovers(conn: &mut PgConnection) -> QueryResult<Vec<Rover>> {
    rovers::table.select(Rover::as_select()).order(rovers::id.asc()).load(conn)
}

pub fn max_sol(conn: &mut PgConnection, rover_id: i64) -> QueryResult<Option<i32>> {
    use crate::schema::photos;
    photos::table
        .filter(photos::rover_id.eq(rover_id))
        .select(diesel::dsl::max(photos::sol))
        .first(conn)
}
