use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};

use crate::filter::SqlParam;

pub fn bind_param_query_as<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    p: &SqlParam,
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match p {
        SqlParam::Text(v) => q.bind(v.clone()),
        SqlParam::Int(v) => q.bind(*v),
        SqlParam::Numeric(v) => q.bind(*v),
        SqlParam::Bool(b) => q.bind(*b),
    }
}

/// Bind every parameter in order
pub fn bind_all_as<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for p in params {
        q = bind_param_query_as(q, p);
    }
    q
}
