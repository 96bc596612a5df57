//! Display manager
//!
//! Owns what the panel should show and decides when to push it. Content
//! changes only mark a refresh as due; the refresh itself happens on the
//! refresh cadence boundary so a burst of commands costs one panel update.

use zehardware_display::{Bitmap, DisplayError, DisplayPanel, Frame, Terminal};

use crate::console::Console;

/// Active root content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootContent {
    /// Empty screen
    Blank,
    /// Diagnostic terminal view
    Terminal,
    /// Decoded image
    Image(Bitmap),
}

/// Root content and refresh bookkeeping for one panel
pub struct DisplayManager<P> {
    panel: P,
    root: RootContent,
    refresh_due: bool,
    refresh_ticks: u32,
    refreshes: u32,
}

impl<P: DisplayPanel> DisplayManager<P> {
    /// Create a manager with a refresh already due
    pub fn new(panel: P, root: RootContent, refresh_ticks: u32) -> Self {
        Self {
            panel,
            root,
            refresh_due: true,
            refresh_ticks: refresh_ticks.max(1),
            refreshes: 0,
        }
    }

    /// Replace the root content with `bitmap`
    pub fn show(&mut self, bitmap: Bitmap) {
        self.root = RootContent::Image(bitmap);
        self.mark_due();
    }

    /// Replace the root content with the terminal view
    pub fn show_terminal(&mut self) {
        self.root = RootContent::Terminal;
        self.mark_due();
    }

    /// Request a refresh at the next cadence boundary
    pub fn mark_due(&mut self) {
        self.refresh_due = true;
    }

    /// Whether a refresh would happen at `tick`
    pub fn is_due_at(&self, tick: u32) -> bool {
        self.refresh_due && tick % self.refresh_ticks == 0
    }

    /// Refresh the panel if one is due at `tick`
    ///
    /// The request is consumed even when the panel reports an error.
    /// Returns `None` when nothing was due.
    pub async fn refresh_if_due(
        &mut self,
        tick: u32,
        console: &mut Console,
    ) -> Option<Result<(), DisplayError>> {
        if !self.is_due_at(tick) {
            return None;
        }

        log_info!(console, "Refreshing the screen...");
        self.refresh_due = false;
        self.refreshes = self.refreshes.wrapping_add(1);

        let result = self.panel.refresh(frame(&self.root, console.terminal())).await;
        if let Err(e) = result {
            log_error!(console, "Refresh failed. Reason: {}", e);
        }
        Some(result)
    }

    /// Current root content
    pub fn root(&self) -> &RootContent {
        &self.root
    }

    /// Whether a refresh request is outstanding
    pub fn refresh_due(&self) -> bool {
        self.refresh_due
    }

    /// Number of refresh attempts so far
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    /// The managed panel
    pub fn panel(&self) -> &P {
        &self.panel
    }
}

fn frame<'a>(root: &'a RootContent, terminal: &'a Terminal) -> Frame<'a> {
    match root {
        RootContent::Blank => Frame::Blank,
        RootContent::Terminal => Frame::Terminal(terminal),
        RootContent::Image(bitmap) => Frame::Image(bitmap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPanel, Shown};
    use embassy_futures::block_on;
    use zehardware_display::{Palette, Resolution};

    fn manager() -> DisplayManager<MockPanel> {
        DisplayManager::new(MockPanel::new(Resolution::new(16, 8)), RootContent::Blank, 10)
    }

    #[test]
    fn test_due_at_boot() {
        let mut display = manager();
        let mut console = Console::new();
        assert!(display.refresh_due());
        assert_eq!(block_on(display.refresh_if_due(0, &mut console)), Some(Ok(())));
        assert!(!display.refresh_due());
        assert_eq!(display.panel().shown, [Shown::Blank]);
    }

    #[test]
    fn test_waits_for_cadence_boundary() {
        let mut display = manager();
        let mut console = Console::new();
        for tick in 1..10 {
            assert_eq!(block_on(display.refresh_if_due(tick, &mut console)), None);
        }
        assert!(block_on(display.refresh_if_due(10, &mut console)).is_some());
        assert_eq!(display.refreshes(), 1);
    }

    #[test]
    fn test_not_due_means_no_refresh() {
        let mut display = manager();
        let mut console = Console::new();
        block_on(display.refresh_if_due(0, &mut console));
        assert_eq!(block_on(display.refresh_if_due(10, &mut console)), None);
        assert_eq!(display.refreshes(), 1);
    }

    #[test]
    fn test_show_replaces_root() {
        let mut display = manager();
        let mut console = Console::new();
        block_on(display.refresh_if_due(0, &mut console));

        let bitmap = Bitmap::new(Resolution::new(16, 8), Palette::TWO_TONE);
        display.show(bitmap.clone());
        assert_eq!(display.root(), &RootContent::Image(bitmap.clone()));
        assert!(display.refresh_due());

        display.show_terminal();
        assert_eq!(display.root(), &RootContent::Terminal);

        block_on(display.refresh_if_due(20, &mut console));
        assert_eq!(display.panel().shown, [Shown::Blank, Shown::Terminal]);
    }

    #[test]
    fn test_failed_refresh_clears_request() {
        let mut display = manager();
        let mut console = Console::new();
        display.panel.fail = true;

        assert_eq!(
            block_on(display.refresh_if_due(0, &mut console)),
            Some(Err(DisplayError::Communication))
        );
        assert!(!display.refresh_due());
        let transcript: std::string::String = console.terminal().lines().collect();
        assert!(transcript.contains("Refresh failed"));
    }

    #[test]
    fn test_mismatched_image_is_not_drawn() {
        let mut display = manager();
        let mut console = Console::new();
        display.show(Bitmap::new(Resolution::new(8, 8), Palette::TWO_TONE));

        assert_eq!(
            block_on(display.refresh_if_due(0, &mut console)),
            Some(Err(DisplayError::ResolutionMismatch))
        );
        assert!(display.panel().shown.is_empty());
        let transcript: std::string::String = console.terminal().lines().collect();
        assert!(transcript.contains("image does not match panel resolution"));
    }
}
