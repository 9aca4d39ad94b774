mod category;
mod friend;
mod friend_request;
mod session;

pub use category::FriendCategory;
pub use friend::Friend;
pub use friend_request::FriendRequest;
pub use session::PrivateChatSession;

fn load_or_empty<T>(
    query_result: Result<Vec<T>, diesel::result::Error>,
) -> Result<Vec<T>, diesel::result::Error> {
    match query_result {
        Ok(vec) => Ok(vec),
        Err(diesel::result::Error::NotFound) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
