use sightline_core::Display;

/// Display size from explicit overrides, falling back to the primary screen.
pub fn resolve_display(width: Option<u32>, height: Option<u32>) -> Display {
    let screen = primary_screen();
    Display::new(width.unwrap_or(screen.width), height.unwrap_or(screen.height))
}

#[cfg(target_os = "windows")]
fn primary_screen() -> Display {
    use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

    // SAFETY: GetSystemMetrics takes no pointers and has no preconditions.
    let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Display::new(w, h),
        _ => Display::default(),
    }
}

#[cfg(not(target_os = "windows"))]
fn primary_screen() -> Display {
    Display::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        assert_eq!(resolve_display(Some(2560), Some(1440)), Display::new(2560, 1440));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_fallback_is_full_hd() {
        assert_eq!(resolve_display(None, Some(900)), Display::new(1920, 900));
    }
}
