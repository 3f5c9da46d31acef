//! Directory exchange.
//!
//! On Linux two directories are exchanged in one `renameat2(2)` call with
//! `RENAME_EXCHANGE`, so every path lookup sees either the old or the new
//! directory. Elsewhere the exchange is two renames through a temporary
//! name; between them the target path briefly does not exist.

use std::path::Path;

use nix_search_core::{Error, Result};

/// Whether [`exchange`] is atomic on this platform.
pub const ATOMIC_EXCHANGE: bool = cfg!(target_os = "linux");

/// Exchange the directories at `a` and `b`. Both must exist.
pub fn exchange(a: &Path, b: &Path) -> Result<()> {
    log::debug!("exchanging {} and {}", a.display(), b.display());
    imp::exchange(a, b)
}

#[cfg(target_os = "linux")]
mod imp {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    use nix_search_core::{Error, Result};

    fn c_path(path: &Path) -> Result<CString> {
        CString::new(path.as_os_str().as_bytes()).map_err(|_| {
            Error::io_with_path(
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path contains NUL byte"),
                path,
            )
        })
    }

    pub(super) fn exchange(a: &Path, b: &Path) -> Result<()> {
        let a_c = c_path(a)?;
        let b_c = c_path(b)?;

        // SAFETY: both pointers come from live CStrings and AT_FDCWD makes
        // the kernel resolve them relative to the working directory.
        let rc = unsafe {
            libc::renameat2(
                libc::AT_FDCWD,
                a_c.as_ptr(),
                libc::AT_FDCWD,
                b_c.as_ptr(),
                libc::RENAME_EXCHANGE,
            )
        };
        if rc == 0 {
            Ok(())
        } else {
            Err(Error::io_with_path(std::io::Error::last_os_error(), b))
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use std::path::Path;

    use nix_search_core::{Error, Result};

    pub(super) fn exchange(a: &Path, b: &Path) -> Result<()> {
        let parking = b.with_file_name(format!(
            ".{}.swap",
            b.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));
        std::fs::rename(b, &parking).map_err(|e| Error::io_with_path(e, b))?;
        if let Err(e) = std::fs::rename(a, b) {
            // Put the old directory back before reporting.
            if let Err(restore) = std::fs::rename(&parking, b) {
                log::error!(
                    "cannot restore {} from {}: {restore}",
                    b.display(),
                    parking.display()
                );
            }
            return Err(Error::io_with_path(e, a));
        }
        std::fs::rename(&parking, a).map_err(|e| Error::io_with_path(e, a))
    }
}

/// Check that both paths exist before exchanging.
pub(crate) fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::not_found(path.display().to_string(), "directory"))
    }
}
