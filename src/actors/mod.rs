pub mod lookup_session;

pub use lookup_session::{LookupSession, LookupSessionMessage};
