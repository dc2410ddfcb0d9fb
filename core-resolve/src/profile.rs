//! Client profiles for upstream extraction.
//!
//! A profile is a named combination of declared client identity, credential
//! eligibility, and proof-of-origin token use. The set is fixed at compile
//! time and tried in priority order: non-browser identities first, because
//! they are empirically more likely to yield a directly fetchable URL than
//! a restricted browser variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named upstream resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientProfile {
    /// Android music app identity. Must not carry stored credentials.
    Android,
    /// iOS music app identity. Must not carry stored credentials.
    Ios,
    /// Embedded TV player identity. Works with credentials for gated media.
    TvEmbedded,
    /// Browser identity. Last resort; most likely to return gated variants.
    Web,
}

impl ClientProfile {
    /// All profiles in the fixed priority order used per resolution attempt.
    pub fn in_priority_order() -> &'static [ClientProfile] {
        &[
            ClientProfile::Android,
            ClientProfile::Ios,
            ClientProfile::TvEmbedded,
            ClientProfile::Web,
        ]
    }

    /// The upstream-facing request shape for this profile.
    pub fn params(&self) -> ProfileParams {
        match self {
            ClientProfile::Android => ProfileParams {
                client_name: "ANDROID_MUSIC",
                client_version: "6.42.52",
                user_agent: "com.google.android.apps.youtube.music/6.42.52 (Linux; U; Android 11)",
                // Mixing account cookies with the app client identity is
                // rejected by the upstream.
                attach_credentials: false,
                request_po_token: false,
            },
            ClientProfile::Ios => ProfileParams {
                client_name: "IOS_MUSIC",
                client_version: "6.42",
                user_agent: "com.google.ios.youtubemusic/6.42 (iPhone14,3; U; CPU iOS 16_6 like Mac OS X)",
                attach_credentials: false,
                request_po_token: false,
            },
            ClientProfile::TvEmbedded => ProfileParams {
                client_name: "TVHTML5_SIMPLY_EMBEDDED_PLAYER",
                client_version: "2.0",
                user_agent: "Mozilla/5.0 (PlayStation; PlayStation 4/12.00) AppleWebKit/605.1.15",
                attach_credentials: true,
                request_po_token: false,
            },
            ClientProfile::Web => ProfileParams {
                client_name: "WEB_REMIX",
                client_version: "1.20240918.01.00",
                user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
                attach_credentials: true,
                request_po_token: true,
            },
        }
    }

    /// Stable lowercase tag, used in logs and cache entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientProfile::Android => "android",
            ClientProfile::Ios => "ios",
            ClientProfile::TvEmbedded => "tv_embedded",
            ClientProfile::Web => "web",
        }
    }
}

impl fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream-facing request parameters for one profile.
#[derive(Debug, Clone, Copy)]
pub struct ProfileParams {
    /// Declared client name sent in the request context.
    pub client_name: &'static str,
    /// Declared client version sent in the request context.
    pub client_version: &'static str,
    /// User agent to present to the upstream.
    pub user_agent: &'static str,
    /// Whether stored credentials (cookies) may be attached.
    pub attach_credentials: bool,
    /// Whether a proof-of-origin token should be fetched and attached.
    pub request_po_token: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_puts_non_browser_first() {
        let order = ClientProfile::in_priority_order();
        assert_eq!(order.first(), Some(&ClientProfile::Android));
        assert_eq!(order.last(), Some(&ClientProfile::Web));
    }

    #[test]
    fn test_app_identities_never_attach_credentials() {
        assert!(!ClientProfile::Android.params().attach_credentials);
        assert!(!ClientProfile::Ios.params().attach_credentials);
        assert!(ClientProfile::Web.params().attach_credentials);
    }

    #[test]
    fn test_profile_tags_are_stable() {
        assert_eq!(ClientProfile::TvEmbedded.as_str(), "tv_embedded");
        assert_eq!(ClientProfile::TvEmbedded.to_string(), "tv_embedded");
    }
}
