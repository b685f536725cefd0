mod account;
mod rotate;
mod target;

pub use account::{cmd_account_delete, cmd_account_get, cmd_account_list, cmd_account_set};
pub use rotate::{cmd_creds, cmd_rotate, cmd_tick};
pub use target::{cmd_target_delete, cmd_target_get, cmd_target_list, cmd_target_set};
