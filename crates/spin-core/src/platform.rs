//! Per-OS paths: app directories, the mpv IPC endpoint, the mpv binary.

use std::path::{Path, PathBuf};

const APP: &str = "spin";

#[cfg(unix)]
const MPV_EXE: &str = "mpv";
#[cfg(windows)]
const MPV_EXE: &str = "mpv.exe";

/// Logs and mpv stderr. `~/.local/share/spin` on unix, even on macOS.
pub fn data_dir() -> PathBuf {
    #[cfg(unix)]
    let base = dirs::home_dir().map(|h| h.join(".local").join("share"));
    #[cfg(windows)]
    let base = dirs::data_local_dir();
    base.unwrap_or_else(std::env::temp_dir).join(APP)
}

/// `config.toml` and the default `catalog.toml`.
pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    let base = dirs::home_dir().map(|h| h.join(".config"));
    #[cfg(windows)]
    let base = dirs::config_dir();
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP)
}

/// Socket path on unix, bare pipe name on windows. Unique per process.
pub fn mpv_socket_name() -> String {
    let name = format!("{}-mpv-{}", APP, std::process::id());
    #[cfg(unix)]
    let name = std::env::temp_dir()
        .join(format!("{}.sock", name))
        .display()
        .to_string();
    name
}

pub fn mpv_socket_arg() -> String {
    #[cfg(unix)]
    let endpoint = mpv_socket_name();
    #[cfg(windows)]
    let endpoint = format!(r"\\.\pipe\{}", mpv_socket_name());
    format!("--input-ipc-server={}", endpoint)
}

/// Resolution order: the configured path, then a copy beside our own
/// executable (skipped with `use_system`), then `PATH`.
pub fn find_mpv_binary(configured: Option<&PathBuf>, use_system: bool) -> Option<PathBuf> {
    if let Some(p) = configured.filter(|p| p.exists()) {
        return Some(p.clone());
    }
    let bundled = (!use_system)
        .then(|| std::env::current_exe().ok())
        .flatten()
        .and_then(|exe| exe.parent().map(|dir| dir.join(MPV_EXE)))
        .filter(|p| p.exists());
    bundled.or_else(|| {
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join(MPV_EXE))
            .find(|p| is_file(p))
    })
}

fn is_file(p: &Path) -> bool {
    p.metadata().map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_binary_wins_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-mpv");
        std::fs::write(&fake, b"").unwrap();
        assert_eq!(find_mpv_binary(Some(&fake), true), Some(fake));
    }

    #[test]
    fn test_missing_configured_binary_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_ne!(find_mpv_binary(Some(&missing), true), Some(missing));
    }

    #[test]
    fn test_dirs_end_with_app_name() {
        assert!(config_dir().ends_with(APP));
        assert!(data_dir().ends_with(APP));
    }

    #[cfg(unix)]
    #[test]
    fn test_socket_arg_points_at_socket() {
        assert_eq!(
            mpv_socket_arg(),
            format!("--input-ipc-server={}", mpv_socket_name())
        );
        assert!(mpv_socket_name().ends_with(".sock"));
    }
}
