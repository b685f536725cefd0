pub mod storage {

    pub const TARGET_PREFIX: &str = "config/targets/";

    pub const ACCOUNT_PREFIX: &str = "accounts/";
}

pub mod password {

    pub const MIN_LENGTH: usize = 16;

    pub const MAX_LENGTH: usize = 128;

    pub const DEFAULT_LENGTH: usize = 32;
}

pub mod rotation {

    /// Minimum time between two completed rotations of the same account.
    pub const MIN_ROTATION_COOLDOWN_SECS: i64 = 60;
}

pub mod semp {

    pub const ENDPOINT_PATH: &str = "/SEMP";

    pub const SUCCESS_CODE: &str = "ok";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1 << 20;
}
