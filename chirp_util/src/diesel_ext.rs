use diesel::prelude::*;
use diesel::query_builder::*;
use diesel::query_dsl::methods::LoadQuery;
use diesel::sql_types::BigInt;
use diesel::sqlite::Sqlite;

pub trait LookAhead: Sized {
    fn look_ahead(self, page_size: i64) -> LookAheadPaginated<Self>;
}

impl<T> LookAhead for T {
    /// Limit an ordered query to one page plus a single look-ahead row.
    /// The look-ahead row is never returned; it only tells whether another page exists.
    fn look_ahead(self, page_size: i64) -> LookAheadPaginated<Self> {
        let page_size = page_size.max(0);
        LookAheadPaginated {
            query: self,
            page_size,
            limit: page_size + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, QueryId)]
pub struct LookAheadPaginated<T> {
    query: T,
    page_size: i64,
    limit: i64,
}

impl<T> LookAheadPaginated<T> {
    /// Load at most `page_size` records, and whether more records follow them.
    pub fn load_page<'a, U>(self, conn: &mut SqliteConnection) -> QueryResult<(Vec<U>, bool)>
    where
        Self: LoadQuery<'a, SqliteConnection, U>,
    {
        let page_size = self.page_size as usize;
        let mut records = self.load::<U>(conn)?;
        let has_more = records.len() > page_size;
        if has_more {
            records.pop();
        }
        Ok((records, has_more))
    }
}

impl<T: Query> Query for LookAheadPaginated<T> {
    type SqlType = T::SqlType;
}

impl<T> RunQueryDsl<SqliteConnection> for LookAheadPaginated<T> {}

impl<T> QueryFragment<Sqlite> for LookAheadPaginated<T>
where
    T: QueryFragment<Sqlite>,
{
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Sqlite>) -> QueryResult<()> {
        out.push_sql("SELECT * FROM (");
        self.query.walk_ast(out.reborrow())?;
        out.push_sql(") t LIMIT ");
        out.push_bind_param::<BigInt, _>(&self.limit)?;
        Ok(())
    }
}
