//! Order number and group id generation.
//!
//! Order numbers combine the checkout timestamp with a short random suffix. The suffix keeps concurrent checkouts
//! in the same second from colliding in the common case; the database's uniqueness constraint catches the rest, and
//! the materializer regenerates once on conflict rather than silently overwriting.

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::{GroupId, OrderNumber};

const ORDER_NUMBER_PREFIX: &str = "FC";
const SUFFIX_LEN: usize = 4;

pub fn generate_order_number() -> OrderNumber {
    let ts = Utc::now().timestamp();
    let suffix = random_suffix(SUFFIX_LEN).to_ascii_uppercase();
    OrderNumber(format!("{ORDER_NUMBER_PREFIX}-{ts}-{suffix}"))
}

pub fn generate_group_id() -> GroupId {
    GroupId(format!("grp_{}", random_suffix(12).to_ascii_lowercase()))
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}
