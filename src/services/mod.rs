pub mod account_service;
pub use account_service::{AccountError, AccountService, AccountUpdate};

pub mod account_service_impl;
pub use account_service_impl::StoreAccountService;

pub mod auto_rotate;
pub use auto_rotate::{AutoRotator, TickReport};

pub mod password;
pub use password::{PasswordError, generate_password};

pub mod rotation_service;
pub use rotation_service::{RotationError, RotationOutcome, RotationService};

pub mod rotation_service_impl;
pub use rotation_service_impl::StoreRotationService;

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod target_service;
pub use target_service::{TargetError, TargetService, TargetUpdate};

pub mod target_service_impl;
pub use target_service_impl::StoreTargetService;

pub mod validation;

#[cfg(test)]
pub(crate) mod testing;
