//! The catalog of share destinations.
//!
//! Every destination the plugin knows about is a [`Channel`] variant, and all
//! per-channel facts (display name, Android package, iOS URL scheme, which
//! recipe handles it) are answered by exhaustive matches on that enum.

use std::fmt;

/// How the dispatcher shares to a channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Recipe {
    /// Direct-chat deep link when a phone number is given, scoped share sheet otherwise.
    DeepLinkMessenger,
    /// Requires a single media file. `stories` goes through the pasteboard hand-off.
    VisualMedia { stories: bool },
    /// Requires text. App deep link first, then the web intent URL.
    TextFirst,
    /// Share sheet restricted to the target app.
    ScopedShare,
    Email,
    Sms,
    System,
}

/// A destination for a share action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    WhatsApp,
    WhatsAppBusiness,
    Instagram,
    InstagramStories,
    Facebook,
    Twitter,
    Telegram,
    LinkedIn,
    Email,
    Sms,
    System,
}

/// The native address of an installable app.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AppTarget {
    pub package_name: &'static str,
    pub url_scheme: &'static str,
}

impl Channel {
    pub const ALL: [Channel; 11] = [
        Channel::WhatsApp,
        Channel::WhatsAppBusiness,
        Channel::Instagram,
        Channel::InstagramStories,
        Channel::Facebook,
        Channel::Twitter,
        Channel::Telegram,
        Channel::LinkedIn,
        Channel::Email,
        Channel::Sms,
        Channel::System,
    ];

    /// Parses a platform identifier. Both the camelCase spelling used by the
    /// frontend API and the kebab-case spelling are accepted.
    pub fn parse(id: &str) -> Option<Channel> {
        let channel = match id {
            "whatsapp" => Channel::WhatsApp,
            "whatsappBusiness" | "whatsapp-business" => Channel::WhatsAppBusiness,
            "instagram" => Channel::Instagram,
            "instagramStories" | "instagram-stories" => Channel::InstagramStories,
            "facebook" => Channel::Facebook,
            "twitter" => Channel::Twitter,
            "telegram" => Channel::Telegram,
            "linkedin" => Channel::LinkedIn,
            "email" => Channel::Email,
            "sms" => Channel::Sms,
            "system" => Channel::System,
            _ => return None,
        };
        Some(channel)
    }

    /// Resolves an optional identifier, falling back to the system sheet for
    /// absent or unrecognized values.
    pub fn resolve(id: Option<&str>) -> Channel {
        match id {
            None => Channel::System,
            Some(id) => Channel::parse(id).unwrap_or_else(|| {
                log::warn!("unknown share platform `{id}`, using the system share sheet");
                Channel::System
            }),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Channel::WhatsApp => "whatsapp",
            Channel::WhatsAppBusiness => "whatsappBusiness",
            Channel::Instagram => "instagram",
            Channel::InstagramStories => "instagramStories",
            Channel::Facebook => "facebook",
            Channel::Twitter => "twitter",
            Channel::Telegram => "telegram",
            Channel::LinkedIn => "linkedin",
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::System => "system",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Channel::WhatsApp => "WhatsApp",
            Channel::WhatsAppBusiness => "WhatsApp Business",
            Channel::Instagram | Channel::InstagramStories => "Instagram",
            Channel::Facebook => "Facebook",
            Channel::Twitter => "Twitter",
            Channel::Telegram => "Telegram",
            Channel::LinkedIn => "LinkedIn",
            Channel::Email => "Email",
            Channel::Sms => "SMS",
            Channel::System => "System",
        }
    }

    /// The installable app behind this channel, if any.
    pub fn app(self) -> Option<AppTarget> {
        let (package_name, url_scheme) = match self {
            Channel::WhatsApp => ("com.whatsapp", "whatsapp://"),
            Channel::WhatsAppBusiness => ("com.whatsapp.w4b", "whatsapp-business://"),
            Channel::Instagram | Channel::InstagramStories => {
                ("com.instagram.android", "instagram://")
            }
            Channel::Facebook => ("com.facebook.katana", "fb://"),
            Channel::Twitter => ("com.twitter.android", "twitter://"),
            Channel::Telegram => ("org.telegram.messenger", "tg://"),
            Channel::LinkedIn => ("com.linkedin.android", "linkedin://"),
            Channel::Email | Channel::Sms | Channel::System => return None,
        };
        Some(AppTarget {
            package_name,
            url_scheme,
        })
    }

    pub fn recipe(self) -> Recipe {
        match self {
            Channel::WhatsApp | Channel::WhatsAppBusiness => Recipe::DeepLinkMessenger,
            Channel::Instagram => Recipe::VisualMedia { stories: false },
            Channel::InstagramStories => Recipe::VisualMedia { stories: true },
            Channel::Twitter => Recipe::TextFirst,
            Channel::Facebook | Channel::Telegram | Channel::LinkedIn => Recipe::ScopedShare,
            Channel::Email => Recipe::Email,
            Channel::Sms => Recipe::Sms,
            Channel::System => Recipe::System,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
