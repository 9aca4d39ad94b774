use diesel::{ExpressionMethods, QueryDsl, Queryable, Selectable, SelectableHelper};
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::{Conn, error::Error, schema::friend_categories};

use super::load_or_empty;

#[derive(Serialize, Queryable, Selectable, Clone)]
#[diesel(table_name = friend_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FriendCategory {
    pub category_id: i64,
    pub name: String,
    pub order_index: i32,
}

impl FriendCategory {
    /// Returns the caller's categories in display order.
    pub async fn fetch_all(conn: &mut Conn, user_id: &str) -> Result<Vec<Self>, Error> {
        use friend_categories::dsl;
        let categories = load_or_empty(
            dsl::friend_categories
                .filter(dsl::user_id.eq(user_id))
                .order(dsl::order_index.asc())
                .select(FriendCategory::as_select())
                .load(conn)
                .await,
        )?;

        Ok(categories)
    }
}
