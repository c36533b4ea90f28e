//! The selection stages, orchestrated in fixed order by the deck builder:
//! priority cards, special lands, basic lands, category filling, fallback
//! filling, then finalize. Each stage reads and writes the shared
//! [`BuildContext`](crate::context::BuildContext); none runs twice except
//! basic lands, which finalize re-invokes to top up a short deck.

pub mod categories;
pub mod fallback;
pub mod finalize;
pub mod lands;
pub mod priority;
