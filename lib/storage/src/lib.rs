pub mod profiles;

pub use profiles::{Profile, ProfileStore, SessionState};
