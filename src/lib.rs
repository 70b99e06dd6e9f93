pub mod cap;
pub mod environment;
pub mod feed;
pub mod logging;
pub mod map;
pub mod shuffle;
pub mod util;
pub mod web;
pub mod xml;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_VALIDATION: &str = "cap_validation";
