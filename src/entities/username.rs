use derive_more::{From, Into};
use serde::Serialize;

/// Owner of a record, taken from the verified token's username claim.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, From, Into, Serialize)]
pub struct Username(String);

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Username(s.to_owned())
    }
}
