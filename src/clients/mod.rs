pub mod semp;

pub use semp::{PasswordChanger, SempClient, SempError};
