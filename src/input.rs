// src/input.rs

//! Input driver fallback for a display with no window system.
//!
//! The X11 input driver cannot work on a bare KMS console. When it is the
//! configured driver, the context driver substitutes udev, then linuxraw.

use log::{debug, info, warn};
use nix::unistd::{access, isatty, AccessFlags};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Name of the input driver that needs a window system.
pub const X11_INPUT_DRIVER: &str = "x";

const INPUT_DEVICE_DIR: &str = "/dev/input";

/// An initialized input backend handed back to the frontend.
pub trait InputDriver: Debug {
    fn ident(&self) -> &'static str;

    /// Joypad driver the input backend was initialized for.
    fn joypad_name(&self) -> &str;
}

/// Tries to bring up the input backends the fallback can choose from.
pub trait InputProber {
    fn init_udev(&self, joypad_name: &str) -> Option<Box<dyn InputDriver>>;

    fn init_linuxraw(&self, joypad_name: &str) -> Option<Box<dyn InputDriver>>;
}

/// evdev input through the device nodes udev manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdevInput {
    joypad_name: String,
}

impl InputDriver for UdevInput {
    fn ident(&self) -> &'static str {
        "udev"
    }

    fn joypad_name(&self) -> &str {
        &self.joypad_name
    }
}

/// Keyboard input read from the controlling tty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxRawInput {
    joypad_name: String,
}

impl InputDriver for LinuxRawInput {
    fn ident(&self) -> &'static str {
        "linuxraw"
    }

    fn joypad_name(&self) -> &str {
        &self.joypad_name
    }
}

/// Probes the real system.
#[derive(Debug, Clone)]
pub struct SystemInputProber {
    device_dir: PathBuf,
}

impl Default for SystemInputProber {
    fn default() -> Self {
        SystemInputProber {
            device_dir: PathBuf::from(INPUT_DEVICE_DIR),
        }
    }
}

impl SystemInputProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe event devices under `dir` instead of /dev/input.
    pub fn with_device_dir(dir: impl Into<PathBuf>) -> Self {
        SystemInputProber {
            device_dir: dir.into(),
        }
    }
}

fn readable_event_devices(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut devices: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("event"))
        })
        .filter(|path| access(path.as_path(), AccessFlags::R_OK).is_ok())
        .collect();
    devices.sort();
    devices
}

impl InputProber for SystemInputProber {
    fn init_udev(&self, joypad_name: &str) -> Option<Box<dyn InputDriver>> {
        let devices = readable_event_devices(&self.device_dir);
        if devices.is_empty() {
            debug!(
                "udev input: no readable event devices in {}",
                self.device_dir.display()
            );
            return None;
        }
        debug!("udev input: event devices {:?}", devices);
        Some(Box::new(UdevInput {
            joypad_name: joypad_name.to_string(),
        }))
    }

    fn init_linuxraw(&self, joypad_name: &str) -> Option<Box<dyn InputDriver>> {
        match isatty(std::io::stdin()) {
            Ok(true) => Some(Box::new(LinuxRawInput {
                joypad_name: joypad_name.to_string(),
            })),
            Ok(false) => {
                debug!("linuxraw input: stdin is not a tty");
                None
            }
            Err(e) => {
                debug!("linuxraw input: isatty failed: {}", e);
                None
            }
        }
    }
}

/// Select a replacement input driver for `configured`, or `None` if the
/// configured driver is usable or nothing else initializes.
pub fn select_fallback(
    configured: &str,
    joypad_name: &str,
    prober: &dyn InputProber,
) -> Option<Box<dyn InputDriver>> {
    if configured != X11_INPUT_DRIVER {
        return None;
    }

    if let Some(driver) = prober.init_udev(joypad_name) {
        info!("Input driver '{}' unusable on KMS, using udev", configured);
        return Some(driver);
    }
    if let Some(driver) = prober.init_linuxraw(joypad_name) {
        info!("Input driver '{}' unusable on KMS, using linuxraw", configured);
        return Some(driver);
    }

    warn!("Input driver '{}' unusable on KMS and no fallback initialized", configured);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use test_log::test;

    struct ScriptedProber {
        udev: bool,
        linuxraw: bool,
        attempts: RefCell<Vec<&'static str>>,
    }

    impl ScriptedProber {
        fn new(udev: bool, linuxraw: bool) -> Self {
            ScriptedProber {
                udev,
                linuxraw,
                attempts: RefCell::new(Vec::new()),
            }
        }
    }

    impl InputProber for ScriptedProber {
        fn init_udev(&self, joypad_name: &str) -> Option<Box<dyn InputDriver>> {
            self.attempts.borrow_mut().push("udev");
            self.udev.then(|| {
                Box::new(UdevInput {
                    joypad_name: joypad_name.to_string(),
                }) as Box<dyn InputDriver>
            })
        }

        fn init_linuxraw(&self, joypad_name: &str) -> Option<Box<dyn InputDriver>> {
            self.attempts.borrow_mut().push("linuxraw");
            self.linuxraw.then(|| {
                Box::new(LinuxRawInput {
                    joypad_name: joypad_name.to_string(),
                }) as Box<dyn InputDriver>
            })
        }
    }

    #[test]
    fn it_should_leave_a_usable_input_driver_alone() {
        let prober = ScriptedProber::new(true, true);
        assert!(select_fallback("udev", "udev", &prober).is_none());
        assert!(prober.attempts.borrow().is_empty());
    }

    #[test]
    fn it_should_prefer_udev_over_linuxraw() {
        let prober = ScriptedProber::new(true, true);
        let driver = select_fallback("x", "udev", &prober).expect("fallback driver");
        assert_eq!(driver.ident(), "udev");
        assert_eq!(driver.joypad_name(), "udev");
        assert_eq!(*prober.attempts.borrow(), vec!["udev"]);
    }

    #[test]
    fn it_should_fall_back_to_linuxraw_when_udev_fails() {
        let prober = ScriptedProber::new(false, true);
        let driver = select_fallback("x", "linuxraw", &prober).expect("fallback driver");
        assert_eq!(driver.ident(), "linuxraw");
        assert_eq!(*prober.attempts.borrow(), vec!["udev", "linuxraw"]);
    }

    #[test]
    fn it_should_give_up_when_no_backend_initializes() {
        let prober = ScriptedProber::new(false, false);
        assert!(select_fallback("x", "udev", &prober).is_none());
    }

    #[test]
    fn it_should_find_no_udev_devices_in_an_empty_directory() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("kms-context-input-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("mouse0"), b"")?;

        let prober = SystemInputProber::with_device_dir(&dir);
        assert!(prober.init_udev("udev").is_none());

        std::fs::write(dir.join("event3"), b"")?;
        let driver = prober.init_udev("udev").expect("udev driver");
        assert_eq!(driver.ident(), "udev");

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
