//! Frame-number stepping for time-varying volumes

/// Animation delta meaning "always show the newest data frame"
pub const FOLLOW_LATEST: i32 = i32::MAX;

/// Inclusive window of data frame numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub first: u32,
    pub last: u32,
}

impl FrameWindow {
    pub const FULL: FrameWindow = FrameWindow { first: 0, last: u32::MAX };

    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }
}

/// Frame to display now and the one to display next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStep {
    pub current: u32,
    pub next: u32,
}

/// Step the data frame number by `delta`, wrapping inside the intersection of
/// the available `data` frames and the `requested` window.
pub fn advance_frame(current: Option<u32>, data: FrameWindow, requested: FrameWindow, delta: i32) -> FrameStep {
    let start = requested.first.max(data.first);
    let last = requested.last.min(data.last);
    let current = current.unwrap_or(0).max(start);

    if delta == FOLLOW_LATEST {
        let newest = last.saturating_sub(1).max(start);
        return FrameStep { current: newest, next: newest };
    }

    let end = last.max(current);
    let interval = i64::from(end - start) + 1;
    // stepping backwards from the first frame wraps to the end
    let from = if current == start && delta < 0 { end } else { current };
    let offset = (i64::from(from - start) + i64::from(delta)).rem_euclid(interval);
    FrameStep {
        current,
        next: start + offset as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> FrameWindow {
        FrameWindow::new(0, 9)
    }

    #[test]
    fn test_forward_step_and_wrap() {
        assert_eq!(advance_frame(Some(3), data(), FrameWindow::FULL, 1).next, 4);
        assert_eq!(advance_frame(Some(9), data(), FrameWindow::FULL, 1).next, 0);
        assert_eq!(advance_frame(Some(8), data(), FrameWindow::FULL, 3).next, 1);
    }

    #[test]
    fn test_reverse_from_start_wraps_to_end() {
        let step = advance_frame(Some(0), data(), FrameWindow::FULL, -1);
        assert_eq!(step.current, 0);
        assert_eq!(step.next, 8);
        assert_eq!(advance_frame(Some(5), data(), FrameWindow::FULL, -2).next, 3);
    }

    #[test]
    fn test_still_image() {
        let step = advance_frame(Some(4), data(), FrameWindow::FULL, 0);
        assert_eq!(step, FrameStep { current: 4, next: 4 });
    }

    #[test]
    fn test_clamped_to_requested_window() {
        let requested = FrameWindow::new(3, 5);
        let step = advance_frame(None, data(), requested, 1);
        assert_eq!(step, FrameStep { current: 3, next: 4 });
        assert_eq!(advance_frame(Some(5), data(), requested, 1).next, 3);
    }

    #[test]
    fn test_follow_latest() {
        let step = advance_frame(Some(2), data(), FrameWindow::FULL, FOLLOW_LATEST);
        assert_eq!(step, FrameStep { current: 8, next: 8 });
    }
}
