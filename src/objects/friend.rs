use diesel::{
    BoolExpressionMethods, ExpressionMethods, Insertable, OptionalExtension, QueryDsl, Queryable,
    Selectable, SelectableHelper, delete, insert_into,
};
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::{Conn, error::Error, schema::friends};

use super::load_or_empty;

/// One direction of a friendship. An active friendship is two rows, one
/// per direction, sharing a timestamp.
#[derive(Serialize, Queryable, Selectable, Insertable, Clone)]
#[diesel(table_name = friends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Friend {
    pub user_id: String,
    pub friend_id: String,
    pub category_id: Option<i64>,
    pub note: Option<String>,
    pub created_ts: i64,
}

impl Friend {
    pub async fn fetch_all(conn: &mut Conn, user_id: &str) -> Result<Vec<Self>, Error> {
        use friends::dsl;
        let friends = load_or_empty(
            dsl::friends
                .filter(dsl::user_id.eq(user_id))
                .select(Friend::as_select())
                .load(conn)
                .await,
        )?;

        Ok(friends)
    }

    pub async fn exists(conn: &mut Conn, user_id: &str, friend_id: &str) -> Result<bool, Error> {
        use friends::dsl;
        let row: Option<Friend> = dsl::friends
            .filter(dsl::user_id.eq(user_id))
            .filter(dsl::friend_id.eq(friend_id))
            .select(Friend::as_select())
            .first(conn)
            .await
            .optional()?;

        Ok(row.is_some())
    }

    /// Inserts both directions of a friendship with one shared timestamp.
    pub async fn create_pair(
        conn: &mut Conn,
        user_id: &str,
        friend_id: &str,
        created_ts: i64,
    ) -> Result<(), Error> {
        use friends::dsl;
        let rows = vec![
            Friend {
                user_id: user_id.to_string(),
                friend_id: friend_id.to_string(),
                category_id: None,
                note: None,
                created_ts,
            },
            Friend {
                user_id: friend_id.to_string(),
                friend_id: user_id.to_string(),
                category_id: None,
                note: None,
                created_ts,
            },
        ];

        insert_into(friends::table)
            .values(&rows)
            .on_conflict((dsl::user_id, dsl::friend_id))
            .do_nothing()
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Deletes both directions of a friendship. Absent rows are not an
    /// error, so removal is idempotent.
    pub async fn remove_pair(
        conn: &mut Conn,
        user_id: &str,
        friend_id: &str,
    ) -> Result<(), Error> {
        use friends::dsl;
        delete(friends::table)
            .filter(
                dsl::user_id
                    .eq(user_id)
                    .and(dsl::friend_id.eq(friend_id))
                    .or(dsl::user_id.eq(friend_id).and(dsl::friend_id.eq(user_id))),
            )
            .execute(conn)
            .await?;

        Ok(())
    }
}
