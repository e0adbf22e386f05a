/// Operating-system queries needed to build an execution context.
///
/// Everything the resolvers learn about the running process goes through
/// [`SystemProbe`], so identity and hostname resolution can be exercised with
/// a fake in tests. [`OsProbe`] is the real implementation backed by `libc`.
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use super::identity::Identity;

/// Fallback buffer size when `sysconf(_SC_GETPW_R_SIZE_MAX)` is indeterminate.
const PW_BUF_FALLBACK: usize = 16 * 1024;

/// Upper bound for the passwd buffer when `getpw*_r` keeps returning `ERANGE`.
const PW_BUF_MAX: usize = 1024 * 1024;

/// Capabilities the identity and hostname resolvers consult.
pub trait SystemProbe {
    /// Effective user id of the process.
    fn effective_uid(&self) -> u32;

    /// Real user id of the process.
    fn real_uid(&self) -> u32;

    /// Value of an environment variable, if set and valid UTF-8.
    fn env_var(&self, name: &str) -> Option<String>;

    /// Look up a passwd record by login name.
    fn passwd_by_name(&self, name: &str) -> Option<Identity>;

    /// Look up a passwd record by numeric uid.
    fn passwd_by_uid(&self, uid: u32) -> Option<Identity>;

    /// Local hostname as reported by the OS, `None` if the query fails.
    fn hostname(&self) -> Option<String>;
}

/// [`SystemProbe`] backed by the C library of the running system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProbe;

impl SystemProbe for OsProbe {
    fn effective_uid(&self) -> u32 {
        // SAFETY: geteuid() takes no arguments and cannot fail.
        unsafe { libc::geteuid() }
    }

    fn real_uid(&self) -> u32 {
        // SAFETY: getuid() takes no arguments and cannot fail.
        unsafe { libc::getuid() }
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn passwd_by_name(&self, name: &str) -> Option<Identity> {
        let c_name = CString::new(name).ok()?;
        lookup_passwd(|pwd, buf, len, result| {
            // SAFETY: all pointers are valid for the duration of the call;
            // `buf` points to `len` writable bytes owned by `lookup_passwd`.
            unsafe { libc::getpwnam_r(c_name.as_ptr(), pwd, buf, len, result) }
        })
    }

    fn passwd_by_uid(&self, uid: u32) -> Option<Identity> {
        lookup_passwd(|pwd, buf, len, result| {
            // SAFETY: see `passwd_by_name`.
            unsafe { libc::getpwuid_r(uid, pwd, buf, len, result) }
        })
    }

    fn hostname(&self) -> Option<String> {
        let mut buf = [0u8; 256];
        // SAFETY: `buf` is writable for `buf.len()` bytes.
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<c_char>(), buf.len()) };
        if rc != 0 {
            return None;
        }
        // POSIX does not guarantee termination on truncation.
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        let name = String::from_utf8_lossy(&buf[..end]).into_owned();
        if name.is_empty() { None } else { Some(name) }
    }
}

/// Run a reentrant passwd lookup, growing the scratch buffer on `ERANGE`.
fn lookup_passwd<F>(mut call: F) -> Option<Identity>
where
    F: FnMut(*mut libc::passwd, *mut c_char, usize, *mut *mut libc::passwd) -> c_int,
{
    // SAFETY: sysconf() has no memory-safety preconditions.
    let hint = unsafe { libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) };
    let mut len = usize::try_from(hint)
        .ok()
        .filter(|&n| n > 0)
        .unwrap_or(PW_BUF_FALLBACK);

    loop {
        let mut buf: Vec<c_char> = vec![0; len];
        // SAFETY: an all-zero `passwd` is a valid bit pattern (null pointers, zero ids).
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = ptr::null_mut();

        let rc = call(
            ptr::addr_of_mut!(pwd),
            buf.as_mut_ptr(),
            buf.len(),
            ptr::addr_of_mut!(result),
        );
        if rc == libc::ERANGE && len < PW_BUF_MAX {
            len *= 2;
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        // SAFETY: on success `pwd`'s string fields point into `buf`, which is
        // still alive here.
        return Some(unsafe { identity_from_passwd(&pwd) });
    }
}

/// Copy the fields of a C `passwd` record into an owned [`Identity`].
///
/// # Safety
///
/// Every non-null string pointer in `pwd` must reference a valid
/// NUL-terminated string.
unsafe fn identity_from_passwd(pwd: &libc::passwd) -> Identity {
    let field = |p: *const c_char| {
        if p.is_null() {
            String::new()
        } else {
            // SAFETY: guaranteed by the caller.
            unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
        }
    };
    Identity {
        name: field(pwd.pw_name),
        uid: pwd.pw_uid,
        gid: pwd.pw_gid,
        home: field(pwd.pw_dir),
        shell: field(pwd.pw_shell),
        gecos: field(pwd.pw_gecos),
    }
}
