use async_trait::async_trait;
use scoutgate_core::PresentationContext;
use scoutgate_domain::{AuthError, Result};
use tokio::process::Command;
use tracing::{debug, warn};
use url::Url;

/// Opens the authorization page in the user's default browser
#[derive(Debug, Clone, Default)]
pub struct SystemBrowser {
    /// Program and leading arguments; the URL is appended
    launcher: Option<Vec<String>>,
}

impl SystemBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific launcher instead of the platform opener
    pub fn with_command(program: impl Into<String>, args: &[&str]) -> Self {
        let mut launcher = vec![program.into()];
        launcher.extend(args.iter().map(|a| (*a).to_string()));
        Self { launcher: Some(launcher) }
    }

    fn command(&self, url: &Url) -> Command {
        let launcher = self.launcher.clone().unwrap_or_else(platform_launcher);
        let mut parts = launcher.into_iter();
        let mut command = Command::new(parts.next().unwrap_or_default());
        command.args(parts).arg(url.as_str());
        command
    }
}

fn platform_launcher() -> Vec<String> {
    launcher_for(std::env::consts::OS)
}

// `cmd /C start` would split the query at `&`, so Windows goes through the
// URL protocol handler, which takes the URL as a single argument.
fn launcher_for(os: &str) -> Vec<String> {
    let parts: &[&str] = match os {
        "macos" => &["open"],
        "windows" => &["rundll32", "url.dll,FileProtocolHandler"],
        _ => &["xdg-open"],
    };
    parts.iter().map(|s| (*s).to_string()).collect()
}

#[async_trait]
impl PresentationContext for SystemBrowser {
    fn is_available(&self) -> bool {
        if self.launcher.is_some() || cfg!(any(target_os = "macos", target_os = "windows")) {
            return true;
        }
        ["DISPLAY", "WAYLAND_DISPLAY", "BROWSER"]
            .iter()
            .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
    }

    async fn present(&self, url: &Url) -> Result<()> {
        let mut command = self.command(url);
        debug!(host = url.host_str().unwrap_or_default(), "launching browser");

        match command.status().await {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => {
                warn!(%status, "browser launcher exited with failure");
                Err(AuthError::RedirectUnavailable(format!("browser launcher exited with {status}"))
                    .into())
            }
            Err(err) => {
                warn!(error = %err, "browser launcher could not be started");
                Err(AuthError::RedirectUnavailable(format!("failed to launch browser: {err}"))
                    .into())
            }
        }
    }
}

#[cfg(test)]
mod launcher_tests {
    use std::ffi::OsStr;

    use super::*;

    const AUTHORIZE: &str = "https://db.scout.example/oauth/authorize?response_type=code&client_id=app&state=abc&scope=openid+name";

    fn argv(os: &str) -> (String, Vec<String>) {
        let browser = SystemBrowser { launcher: Some(launcher_for(os)) };
        let command = browser.command(&Url::parse(AUTHORIZE).unwrap());
        let std = command.as_std();
        let program = std.get_program().to_string_lossy().into_owned();
        let args = std.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        (program, args)
    }

    #[test]
    fn windows_passes_full_url_as_one_argument() {
        let (program, args) = argv("windows");
        assert_eq!(program, "rundll32");
        assert_eq!(args, vec!["url.dll,FileProtocolHandler".to_string(), AUTHORIZE.to_string()]);
    }

    #[test]
    fn no_platform_goes_through_a_shell() {
        for os in ["windows", "macos", "linux", "freebsd"] {
            let browser = SystemBrowser { launcher: Some(launcher_for(os)) };
            let command = browser.command(&Url::parse(AUTHORIZE).unwrap());
            let std = command.as_std();
            assert_ne!(std.get_program(), OsStr::new("cmd"));
            assert_eq!(std.get_args().last(), Some(OsStr::new(AUTHORIZE)));
        }
    }

    #[test]
    fn unix_openers() {
        assert_eq!(argv("macos").0, "open");
        assert_eq!(argv("linux").0, "xdg-open");
    }
}
