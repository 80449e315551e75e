//! User-agent parsing for visit ingestion
//!
//! A thin wrapper over woothee that maps its device categories onto the
//! vocabulary the analytics views group by. Called once per ingested event;
//! side-effect-free.

use woothee::parser::Parser;

/// Device bucket used when the parser cannot classify the client. Real
/// desktops and unparseable agents land here indistinguishably.
pub const DEFAULT_DEVICE_TYPE: &str = "desktop";

/// Client software derived from a raw User-Agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device_type: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            browser: None,
            os: None,
            device_type: DEFAULT_DEVICE_TYPE.to_string(),
        }
    }
}

/// Parse a User-Agent string into browser, OS and device type.
pub fn parse(user_agent: &str) -> ClientInfo {
    let parser = Parser::new();
    let Some(result) = parser.parse(user_agent) else {
        return ClientInfo::default();
    };

    let browser = (result.name != "UNKNOWN" && !result.name.is_empty())
        .then(|| result.name.to_string());
    let os = (result.os != "UNKNOWN" && !result.os.is_empty()).then(|| result.os.to_string());

    let device_type = match result.category {
        "smartphone" | "mobilephone" => "mobile",
        "appliance" => "smarttv",
        "crawler" => "crawler",
        _ => DEFAULT_DEVICE_TYPE,
    };

    ClientInfo {
        browser,
        os,
        device_type: device_type.to_string(),
    }
}
