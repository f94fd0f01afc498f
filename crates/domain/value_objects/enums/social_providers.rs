use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SocialProvider {
    Facebook,
    Instagram,
}

impl SocialProvider {
    pub const ALL: [SocialProvider; 2] = [SocialProvider::Facebook, SocialProvider::Instagram];

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialProvider::Facebook => "facebook",
            SocialProvider::Instagram => "instagram",
        }
    }
}

impl Display for SocialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialProvider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "facebook" => Ok(SocialProvider::Facebook),
            "instagram" => Ok(SocialProvider::Instagram),
            other => Err(format!("Unsupported provider: {}", other)),
        }
    }
}
