use diesel::{
    ExpressionMethods, Insertable, OptionalExtension, QueryDsl, Queryable, Selectable,
    SelectableHelper, insert_into, update,
};
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use serde::Serialize;

use crate::{Conn, error::Error, schema::friend_requests};

use super::Friend;

pub const PENDING: &str = "pending";
pub const ACCEPTED: &str = "accepted";
pub const REJECTED: &str = "rejected";

/// An asymmetric friendship proposal. State moves exactly once, from
/// `pending` to `accepted` or `rejected`, and never back.
#[derive(Serialize, Queryable, Selectable, Clone)]
#[diesel(table_name = friend_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FriendRequest {
    pub request_id: i64,
    pub from_user_id: String,
    pub to_user_id: String,
    pub message: String,
    pub state: String,
    pub created_ts: i64,
}

#[derive(Insertable)]
#[diesel(table_name = friend_requests)]
struct NewFriendRequest<'a> {
    from_user_id: &'a str,
    to_user_id: &'a str,
    message: &'a str,
    state: &'a str,
    created_ts: i64,
}

impl FriendRequest {
    pub async fn create(
        conn: &mut Conn,
        from_user_id: &str,
        to_user_id: &str,
        message: &str,
        created_ts: i64,
    ) -> Result<Self, Error> {
        let request = insert_into(friend_requests::table)
            .values(NewFriendRequest {
                from_user_id,
                to_user_id,
                message,
                state: PENDING,
                created_ts,
            })
            .returning(FriendRequest::as_returning())
            .get_result(conn)
            .await?;

        Ok(request)
    }

    pub async fn pending_exists(
        conn: &mut Conn,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<bool, Error> {
        use friend_requests::dsl;
        let row: Option<FriendRequest> = dsl::friend_requests
            .filter(dsl::from_user_id.eq(from_user_id))
            .filter(dsl::to_user_id.eq(to_user_id))
            .filter(dsl::state.eq(PENDING))
            .select(FriendRequest::as_select())
            .first(conn)
            .await
            .optional()?;

        Ok(row.is_some())
    }

    /// Looks up a pending request addressed to `to_user_id`. A request that
    /// is absent, already settled, or addressed to someone else is the same
    /// `NotFound` to the caller.
    pub async fn find_pending(
        conn: &mut Conn,
        request_id: i64,
        to_user_id: &str,
    ) -> Result<Self, Error> {
        use friend_requests::dsl;
        dsl::friend_requests
            .filter(dsl::request_id.eq(request_id))
            .filter(dsl::to_user_id.eq(to_user_id))
            .filter(dsl::state.eq(PENDING))
            .select(FriendRequest::as_select())
            .first(conn)
            .await
            .optional()?
            .ok_or(Error::NotFound("Friend request not found".to_string()))
    }

    /// Settles the request as accepted and creates both friendship rows,
    /// all inside one transaction.
    pub async fn accept(&self, conn: &mut Conn, accepted_ts: i64) -> Result<(), Error> {
        conn.transaction::<_, Error, _>(|conn| {
            async move {
                self.settle(conn, ACCEPTED).await?;

                Friend::create_pair(conn, &self.to_user_id, &self.from_user_id, accepted_ts)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    /// Settles the request as rejected. No friendship rows are created.
    pub async fn reject(&self, conn: &mut Conn) -> Result<(), Error> {
        self.settle(conn, REJECTED).await
    }

    /// Moves a pending request into a terminal state. The update filters on
    /// `state = 'pending'`, so a request that lost a settle race surfaces as
    /// `NotFound` instead of flipping between terminal states.
    async fn settle(&self, conn: &mut Conn, new_state: &str) -> Result<(), Error> {
        use friend_requests::dsl;
        let updated = update(friend_requests::table)
            .filter(dsl::request_id.eq(self.request_id))
            .filter(dsl::state.eq(PENDING))
            .set(dsl::state.eq(new_state))
            .execute(conn)
            .await?;

        if updated == 0 {
            return Err(Error::NotFound("Friend request not found".to_string()));
        }

        Ok(())
    }
}
