//! Console attachment for the Windows GUI-subsystem build.

/// Reuse the parent's console when started from a terminal, so `locate` and
/// log output are visible. Browser launches have no parent console and stay
/// silent.
#[cfg(target_os = "windows")]
pub fn attach_parent_console() {
    use windows::Win32::System::Console::{ATTACH_PARENT_PROCESS, AttachConsole};

    // SAFETY: AttachConsole only changes which console this process uses.
    let _ = unsafe { AttachConsole(ATTACH_PARENT_PROCESS) };
}

#[cfg(not(target_os = "windows"))]
pub fn attach_parent_console() {}
