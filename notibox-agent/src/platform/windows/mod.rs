pub mod browser;
pub mod toast;

use super::{Platform, ToastOutcome};
use crate::AppError;

/// Windows implementation of the cross-platform interface.
pub struct WindowsPlatform {
    toaster: toast::Toaster,
    browser_cmd: Option<Vec<String>>,
}

impl WindowsPlatform {
    pub fn new(browser_cmd: Option<Vec<String>>) -> Self {
        Self {
            toaster: toast::Toaster::new(),
            browser_cmd,
        }
    }
}

#[async_trait::async_trait]
impl Platform for WindowsPlatform {
    fn machine_name(&self) -> String {
        std::env::var("COMPUTERNAME").unwrap_or_else(|_| "pc".to_string())
    }

    fn user_name(&self) -> String {
        std::env::var("USERNAME").unwrap_or_else(|_| "user".to_string())
    }

    fn os_user_id(&self) -> String {
        // Prefer the stable SID; fall back to the user name when the token
        // cannot be queried.
        current_user_sid_string().unwrap_or_else(|| self.user_name())
    }

    fn domain_user_guid(&self) -> Option<String> {
        // Directory-service GUID lookup is not wired on this backend; the
        // hash fallback keeps the identity stable regardless.
        None
    }

    async fn show_toast(&self, count: usize) -> Result<ToastOutcome, AppError> {
        self.toaster.show(count).await
    }

    async fn clear_toast(&self) {
        self.toaster.clear().await;
    }

    async fn open_url(&self, url: &str) -> Result<(), AppError> {
        browser::open_and_wait(self.browser_cmd.as_deref(), url).await
    }
}

/// Returns the current user's SID as a string (e.g., "S-1-5-21-...")
fn current_user_sid_string() -> Option<String> {
    use windows_sys::Win32::Foundation::LocalFree;
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, HLOCAL};
    use windows_sys::Win32::Security::Authorization::ConvertSidToStringSidW;
    use windows_sys::Win32::Security::{GetTokenInformation, TOKEN_QUERY, TokenUser};
    use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    unsafe {
        let mut token: HANDLE = std::ptr::null_mut();
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) == 0 {
            return None;
        }
        let mut needed: u32 = 0;
        // First call to get required buffer size
        let _ = GetTokenInformation(token, TokenUser, std::ptr::null_mut(), 0, &mut needed);
        if needed == 0 {
            CloseHandle(token);
            return None;
        }
        let mut buf: Vec<u8> = vec![0u8; needed as usize];
        if GetTokenInformation(
            token,
            TokenUser,
            buf.as_mut_ptr() as *mut _,
            needed,
            &mut needed,
        ) == 0
        {
            CloseHandle(token);
            return None;
        }
        CloseHandle(token);

        #[repr(C)]
        #[allow(non_snake_case)]
        struct SID_AND_ATTRIBUTES {
            Sid: *mut core::ffi::c_void,
            Attributes: u32,
        }
        #[repr(C)]
        #[allow(non_snake_case)]
        struct TOKEN_USER_RS {
            User: SID_AND_ATTRIBUTES,
        }

        let tu = &*(buf.as_ptr() as *const TOKEN_USER_RS);
        let mut sid_str_ptr: *mut u16 = std::ptr::null_mut();
        if ConvertSidToStringSidW(tu.User.Sid, &mut sid_str_ptr) == 0 || sid_str_ptr.is_null() {
            return None;
        }
        // Convert PWSTR to Rust String
        let mut len = 0usize;
        while *sid_str_ptr.add(len) != 0 {
            len += 1;
        }
        let slice = core::slice::from_raw_parts(sid_str_ptr, len);
        let sid = String::from_utf16_lossy(slice);
        let _ = LocalFree(sid_str_ptr as HLOCAL);
        Some(sid)
    }
}
