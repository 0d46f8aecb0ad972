//! Build variant and Flutter app version models.

use serde::{Deserialize, Serialize};

/// Android build variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    Debug,
    Release,
}

impl BuildVariant {
    pub const ALL: [BuildVariant; 2] = [BuildVariant::Debug, BuildVariant::Release];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildVariant::Debug => "debug",
            BuildVariant::Release => "release",
        }
    }
}

impl std::str::FromStr for BuildVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildVariant::Debug),
            "release" => Ok(BuildVariant::Release),
            _ => Err(format!("Unknown build variant: {}", s)),
        }
    }
}

impl std::fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// App version as declared by `pubspec.yaml` (`version: <name>+<code>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersion {
    pub name: String,
    pub code: u32,
}

impl std::str::FromStr for AppVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty version".to_string());
        }

        match s.split_once('+') {
            Some((name, code)) => {
                let code = code
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid version code: {}", code))?;
                Ok(AppVersion {
                    name: name.trim().to_string(),
                    code,
                })
            }
            // Flutter defaults the build number to 1 when omitted
            None => Ok(AppVersion {
                name: s.to_string(),
                code: 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!("release".parse::<BuildVariant>(), Ok(BuildVariant::Release));
        assert_eq!("Debug".parse::<BuildVariant>(), Ok(BuildVariant::Debug));
        assert!("profile".parse::<BuildVariant>().is_err());
    }

    #[test]
    fn test_app_version_with_build_number() {
        let version: AppVersion = "1.4.2+37".parse().unwrap();
        assert_eq!(version.name, "1.4.2");
        assert_eq!(version.code, 37);
    }

    #[test]
    fn test_app_version_without_build_number() {
        let version: AppVersion = "2.0.0".parse().unwrap();
        assert_eq!(version.name, "2.0.0");
        assert_eq!(version.code, 1);
    }

    #[test]
    fn test_app_version_invalid_code() {
        assert!("1.0.0+abc".parse::<AppVersion>().is_err());
        assert!("".parse::<AppVersion>().is_err());
    }
}
