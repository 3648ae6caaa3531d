//! Platform and display backend detection
//!
//! Capture and scroll injection only work under X11, so the default backend
//! factory checks the session type before opening any connection.

use std::env;

use crate::model::{BackendType, PlatformInfo};

/// Detects the current platform and display backend
///
/// On Linux `$WAYLAND_DISPLAY` wins over `$DISPLAY`: a Wayland session that
/// also runs XWayland still cannot inject input into native Wayland clients.
/// Empty variables count as unset.
///
/// # Examples
///
/// ```
/// use scrollshot_core::util::detect::detect_platform;
///
/// let platform = detect_platform();
/// println!("Running on: {} with backend: {}", platform.os, platform.backend);
/// ```
pub fn detect_platform() -> PlatformInfo {
    detect_platform_with_env(|key| env::var(key).ok())
}

fn detect_platform_with_env<F>(env_provider: F) -> PlatformInfo
where
    F: Fn(&str) -> Option<String>,
{
    let os = env::consts::OS;
    let backend = match os {
        "linux" => detect_linux_backend(&env_provider),
        "windows" => BackendType::Windows,
        "macos" => BackendType::MacOS,
        _ => BackendType::None,
    };

    PlatformInfo::new(os.to_string(), backend)
}

fn detect_linux_backend<F>(env_provider: &F) -> BackendType
where
    F: Fn(&str) -> Option<String>,
{
    let is_set = |key: &str| env_provider(key).is_some_and(|value| !value.is_empty());

    if is_set("WAYLAND_DISPLAY") {
        BackendType::Wayland
    } else if is_set("DISPLAY") {
        BackendType::X11
    } else {
        BackendType::None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn mock_env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_linux_x11() {
        let backend = detect_linux_backend(&mock_env(&[("DISPLAY", ":0")]));
        assert_eq!(backend, BackendType::X11);
    }

    #[test]
    fn test_linux_wayland_takes_precedence() {
        let backend =
            detect_linux_backend(&mock_env(&[("WAYLAND_DISPLAY", "wayland-0"), ("DISPLAY", ":0")]));
        assert_eq!(backend, BackendType::Wayland);
    }

    #[test]
    fn test_linux_empty_vars_treated_as_none() {
        let backend = detect_linux_backend(&mock_env(&[("WAYLAND_DISPLAY", ""), ("DISPLAY", "")]));
        assert_eq!(backend, BackendType::None);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_detect_linux_platform() {
        let platform = detect_platform_with_env(mock_env(&[("DISPLAY", ":1")]));
        assert_eq!(platform.os, "linux");
        assert_eq!(platform.backend, BackendType::X11);
    }

    #[test]
    fn test_detect_platform_public_api() {
        let platform = detect_platform();
        assert!(!platform.os.is_empty());
    }
}
