pub mod account;
pub mod target;

pub use account::{AccountView, Credentials, ManagedAccount};
pub use target::{Target, TargetView};
