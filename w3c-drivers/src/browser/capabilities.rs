use serde_json::json;
use webdriver::capabilities::Capabilities;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

#[derive(Debug, Clone, PartialEq, Eq)]
/// How the WebDriver session is created.
pub struct BrowserOptions {
    /// WebDriver endpoint (Chromedriver by default).
    pub webdriver_url: String,
    pub headless: bool,
    pub window_size: (u32, u32),
    pub user_agent: Option<String>,
    /// Appended verbatim after the built-in arguments.
    pub extra_args: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            window_size: (1920, 1080),
            user_agent: None,
            extra_args: Vec::new(),
        }
    }
}

/// Construct Chrome command-line arguments for the session.
pub fn chrome_arguments(options: &BrowserOptions) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        format!(
            "--window-size={},{}",
            options.window_size.0, options.window_size.1
        ),
        "--lang=en-US".to_string(),
    ];
    if let Some(user_agent) = &options.user_agent {
        args.push(format!("--user-agent={user_agent}"));
    }
    if options.headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    args.extend(options.extra_args.iter().cloned());
    args
}

/// WebDriver capabilities carrying the Chrome options.
pub fn build_capabilities(options: &BrowserOptions) -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": chrome_arguments(options) }),
    );
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_adds_headless_flags() {
        let args = chrome_arguments(&BrowserOptions::default());
        assert!(args.iter().any(|a| a == "--headless"));
        assert!(args.iter().any(|a| a == "--window-size=1920,1080"));
        assert!(!args.iter().any(|a| a.starts_with("--user-agent=")));
    }

    #[test]
    fn headed_session_with_user_agent_and_extras() {
        let options = BrowserOptions {
            headless: false,
            user_agent: Some("w3c-harvest/0.1".into()),
            extra_args: vec!["--proxy-server=socks5://127.0.0.1:1080".into()],
            ..BrowserOptions::default()
        };
        let args = chrome_arguments(&options);
        assert!(!args.iter().any(|a| a == "--headless"));
        assert!(args.contains(&"--user-agent=w3c-harvest/0.1".to_string()));
        assert_eq!(
            args.last().map(String::as_str),
            Some("--proxy-server=socks5://127.0.0.1:1080")
        );
    }

    #[test]
    fn capabilities_nest_args_under_chrome_options() {
        let caps = build_capabilities(&BrowserOptions::default());
        let args = caps["goog:chromeOptions"]["args"]
            .as_array()
            .expect("args array");
        assert!(args.contains(&json!("--no-sandbox")));
    }
}
