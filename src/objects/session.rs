use diesel::{
    ExpressionMethods, Insertable, OptionalExtension, QueryDsl, Queryable, Selectable,
    SelectableHelper, delete, insert_into, update,
};
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::{Conn, error::Error, schema::private_chat_sessions};

use super::load_or_empty;

/// Conversational metadata for one (owner, counterpart) pair. Message
/// content never lands here; transport is someone else's job.
#[derive(Serialize, Queryable, Selectable, Clone)]
#[diesel(table_name = private_chat_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PrivateChatSession {
    pub session_id: i64,
    pub user_id: String,
    pub friend_id: String,
    pub created_ts: i64,
    pub updated_ts: i64,
    pub last_message_ts: Option<i64>,
}

#[derive(Insertable)]
#[diesel(table_name = private_chat_sessions)]
struct NewPrivateChatSession<'a> {
    user_id: &'a str,
    friend_id: &'a str,
    created_ts: i64,
    updated_ts: i64,
}

impl PrivateChatSession {
    /// Returns the caller's sessions, most recently updated first.
    pub async fn fetch_all(conn: &mut Conn, user_id: &str) -> Result<Vec<Self>, Error> {
        use private_chat_sessions::dsl;
        let sessions = load_or_empty(
            dsl::private_chat_sessions
                .filter(dsl::user_id.eq(user_id))
                .order(dsl::updated_ts.desc())
                .select(PrivateChatSession::as_select())
                .load(conn)
                .await,
        )?;

        Ok(sessions)
    }

    /// Returns the session for (user, friend), creating it if absent. The
    /// unique (user_id, friend_id) constraint plus `ON CONFLICT DO NOTHING`
    /// keeps concurrent callers from ever producing two rows.
    pub async fn get_or_create(
        conn: &mut Conn,
        user_id: &str,
        friend_id: &str,
        now_ts: i64,
    ) -> Result<Self, Error> {
        use private_chat_sessions::dsl;

        insert_into(private_chat_sessions::table)
            .values(NewPrivateChatSession {
                user_id,
                friend_id,
                created_ts: now_ts,
                updated_ts: now_ts,
            })
            .on_conflict((dsl::user_id, dsl::friend_id))
            .do_nothing()
            .execute(conn)
            .await?;

        let session = dsl::private_chat_sessions
            .filter(dsl::user_id.eq(user_id))
            .filter(dsl::friend_id.eq(friend_id))
            .select(PrivateChatSession::as_select())
            .get_result(conn)
            .await?;

        Ok(session)
    }

    /// Stamps the session with a message at `now_ts`.
    pub async fn touch(&self, conn: &mut Conn, now_ts: i64) -> Result<(), Error> {
        use private_chat_sessions::dsl;
        update(private_chat_sessions::table)
            .filter(dsl::session_id.eq(self.session_id))
            .set((
                dsl::updated_ts.eq(now_ts),
                dsl::last_message_ts.eq(Some(now_ts)),
            ))
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Fetches a session only if it belongs to `user_id`; anything else is
    /// `NotFound`, including sessions owned by other users.
    pub async fn find_owned(
        conn: &mut Conn,
        session_id: i64,
        user_id: &str,
    ) -> Result<Self, Error> {
        use private_chat_sessions::dsl;
        dsl::private_chat_sessions
            .filter(dsl::session_id.eq(session_id))
            .filter(dsl::user_id.eq(user_id))
            .select(PrivateChatSession::as_select())
            .first(conn)
            .await
            .optional()?
            .ok_or(Error::NotFound("Session not found".to_string()))
    }

    pub async fn delete(self, conn: &mut Conn) -> Result<(), Error> {
        use private_chat_sessions::dsl;
        delete(private_chat_sessions::table)
            .filter(dsl::session_id.eq(self.session_id))
            .execute(conn)
            .await?;

        Ok(())
    }
}
