//! Browser and OS detection.

use std::sync::OnceLock;

/// What the user agent says about the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Platform {
    pub ios: bool,
    pub mac: bool,
    pub android: bool,
    pub chrome: bool,
    pub safari: bool,
    pub gecko: bool,
    pub mobile: bool,
}

impl Platform {
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ios = user_agent.contains("iPhone")
            || user_agent.contains("iPad")
            || user_agent.contains("iPod");
        let android = user_agent.contains("Android");
        let chrome = user_agent.contains("Chrome/") || user_agent.contains("CriOS/");
        let gecko = user_agent.contains("Gecko/") && user_agent.contains("Firefox/");
        let safari = user_agent.contains("Safari/") && !chrome && !android;
        Self {
            ios,
            mac: ios || user_agent.contains("Macintosh") || user_agent.contains("Mac OS X"),
            android,
            chrome,
            safari,
            gecko,
            mobile: ios || android || user_agent.contains("Mobile"),
        }
    }

    fn detect() -> Self {
        let user_agent = web_sys::window()
            .and_then(|window| window.navigator().user_agent().ok())
            .unwrap_or_default();
        Self::from_user_agent(&user_agent)
    }
}

static PLATFORM: OnceLock<Platform> = OnceLock::new();

/// Platform of the running browser, detected once.
pub fn platform() -> &'static Platform {
    PLATFORM.get_or_init(Platform::detect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_safari() {
        let p = Platform::from_user_agent(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        );
        assert!(p.mac && p.safari);
        assert!(!p.chrome && !p.gecko && !p.mobile);
    }

    #[test]
    fn test_linux_firefox() {
        let p = Platform::from_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
        );
        assert!(p.gecko);
        assert!(!p.mac && !p.safari && !p.chrome);
    }

    #[test]
    fn test_android_chrome() {
        let p = Platform::from_user_agent(
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Mobile Safari/537.36",
        );
        assert!(p.android && p.chrome && p.mobile);
        assert!(!p.safari && !p.mac);
    }
}
