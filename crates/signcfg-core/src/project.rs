//! Flutter project layout and Android module settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SigningError};
use crate::models::AppVersion;

/// Default name of the signing properties file inside `android/`.
pub const KEY_PROPERTIES_FILE: &str = "key.properties";

/// NDK version the Flutter Android module pins.
pub const DEFAULT_NDK_VERSION: &str = "27.0.12077973";

/// Java source/target compatibility of the Android module.
pub const JAVA_VERSION: &str = "1.8";

/// Flutter source directory, relative to the Android app module.
pub const FLUTTER_SOURCE: &str = "../..";

/// Locations of the files signing resolution reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    properties_file: String,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            properties_file: KEY_PROPERTIES_FILE.to_string(),
        }
    }

    /// Uses a different properties file name inside `android/`.
    pub fn with_properties_file(mut self, name: impl Into<String>) -> Self {
        self.properties_file = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The Gradle root project (`<root>/android`).
    pub fn android_dir(&self) -> PathBuf {
        self.root.join("android")
    }

    /// The Android app module (`<root>/android/app`).
    pub fn app_dir(&self) -> PathBuf {
        self.android_dir().join("app")
    }

    pub fn key_properties_path(&self) -> PathBuf {
        self.android_dir().join(&self.properties_file)
    }
}

/// Detects if a directory contains a Flutter project.
///
/// A Flutter project is identified by the presence of `pubspec.yaml`.
pub fn detect_flutter_project(root: &Path) -> bool {
    root.join("pubspec.yaml").is_file()
}

#[derive(Debug, Deserialize)]
struct Pubspec {
    name: Option<String>,
    version: Option<serde_yaml::Value>,
}

fn read_pubspec(root: &Path) -> Result<Pubspec> {
    let content = std::fs::read_to_string(root.join("pubspec.yaml"))?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Reads the app version from `pubspec.yaml`.
///
/// Returns `Ok(None)` when the pubspec declares no version.
pub fn read_pubspec_version(root: &Path) -> Result<Option<AppVersion>> {
    let pubspec = read_pubspec(root)?;

    let raw = match pubspec.version {
        Some(serde_yaml::Value::String(s)) => s,
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        Some(serde_yaml::Value::Null) | None => return Ok(None),
        Some(other) => {
            return Err(SigningError::Configuration(format!(
                "Unsupported pubspec version value: {:?}",
                other
            )));
        }
    };

    raw.parse::<AppVersion>()
        .map(Some)
        .map_err(|e| SigningError::Configuration(format!("Invalid pubspec version: {}", e)))
}

/// Android module settings of a Flutter app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AndroidModule {
    pub namespace: String,
    pub application_id: String,
    pub ndk_version: String,
    pub java_version: String,
    pub flutter_source: String,
    pub version: Option<AppVersion>,
}

impl AndroidModule {
    /// Builds the module settings of the Flutter project at `root`.
    ///
    /// Namespace and application id follow the `flutter create` template
    /// (`com.example.<package name>`).
    pub fn for_project(root: &Path) -> Result<Self> {
        if !detect_flutter_project(root) {
            return Err(SigningError::Configuration(format!(
                "No pubspec.yaml found in {}",
                root.display()
            )));
        }

        let pubspec = read_pubspec(root)?;
        let name = pubspec.name.ok_or_else(|| {
            SigningError::Configuration("pubspec.yaml has no 'name' field".to_string())
        })?;
        let namespace = format!("com.example.{}", name);

        Ok(Self {
            application_id: namespace.clone(),
            namespace,
            ndk_version: DEFAULT_NDK_VERSION.to_string(),
            java_version: JAVA_VERSION.to_string(),
            flutter_source: FLUTTER_SOURCE.to_string(),
            version: read_pubspec_version(root)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_pubspec(dir: &Path, content: &str) {
        std::fs::write(dir.join("pubspec.yaml"), content).unwrap();
    }

    #[test]
    fn test_layout_paths() {
        let layout = ProjectLayout::new("/work/app");
        assert_eq!(layout.android_dir(), PathBuf::from("/work/app/android"));
        assert_eq!(layout.app_dir(), PathBuf::from("/work/app/android/app"));
        assert_eq!(
            layout.key_properties_path(),
            PathBuf::from("/work/app/android/key.properties")
        );

        let custom = layout.with_properties_file("upload.properties");
        assert_eq!(
            custom.key_properties_path(),
            PathBuf::from("/work/app/android/upload.properties")
        );
    }

    #[test]
    fn test_detect_flutter_project() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!detect_flutter_project(dir.path()));
        write_pubspec(dir.path(), "name: demo\n");
        assert!(detect_flutter_project(dir.path()));
    }

    #[test]
    fn test_read_pubspec_version() {
        let dir = tempfile::tempdir().unwrap();
        write_pubspec(dir.path(), "name: weekend_gateway\nversion: 1.0.0+7\n");

        let version = read_pubspec_version(dir.path()).unwrap().unwrap();
        assert_eq!(version.name, "1.0.0");
        assert_eq!(version.code, 7);
    }

    #[test]
    fn test_read_pubspec_without_version() {
        let dir = tempfile::tempdir().unwrap();
        write_pubspec(dir.path(), "name: demo\n");
        assert_eq!(read_pubspec_version(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_android_module_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_pubspec(dir.path(), "name: weekend_gateway\nversion: 2.1.0+12\n");

        let module = AndroidModule::for_project(dir.path()).unwrap();
        assert_eq!(module.namespace, "com.example.weekend_gateway");
        assert_eq!(module.application_id, "com.example.weekend_gateway");
        assert_eq!(module.ndk_version, DEFAULT_NDK_VERSION);
        assert_eq!(module.java_version, "1.8");
        assert_eq!(module.flutter_source, "../..");
        assert_eq!(module.version.unwrap().code, 12);
    }

    #[test]
    fn test_android_module_requires_pubspec() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AndroidModule::for_project(dir.path()).is_err());
    }
}
