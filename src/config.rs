use std::env;

use chrono_tz::Tz;
use dotenvy::dotenv;

use crate::model::schedule::ScheduleDefaults;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,

    /// Deployment timezone, used to stamp "now" on clock-in/clock-out.
    /// The engine itself only ever sees naive local instants.
    pub timezone: Tz,

    /// Fallback schedule applied when an employee has no configured row.
    pub default_schedule: ScheduleDefaults,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            timezone: env::var("TIMEZONE")
                .unwrap_or_else(|_| "UTC".to_string())
                .parse()
                .expect("TIMEZONE must be a valid IANA timezone name"),
            default_schedule: ScheduleDefaults {
                start_time: env::var("DEFAULT_SCHEDULE_START").unwrap_or_else(|_| "09:00".to_string()),
                end_time: env::var("DEFAULT_SCHEDULE_END").unwrap_or_else(|_| "17:00".to_string()),
                expected_hours: env::var("DEFAULT_EXPECTED_HOURS")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse()
                    .unwrap(),
            },
        }
    }
}
