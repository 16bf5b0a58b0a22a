pub mod profile;
pub mod store;
pub mod visibility;

pub use store::{AuthSnapshot, SessionStore, StoreOptions};
pub use visibility::{Visibility, VisibilitySignal};
