//! Component trait - Interface for UI components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

use crate::action::Action;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Trait for UI components
///
/// Tables, dialogs and demo views all implement this; the App routes
/// keys to the active tab or the top modal.
///
/// 1. `handle_key_event` - Convert key events to Actions
/// 2. `update` - Process Actions, optionally returning a follow-up
/// 3. `draw` - Render the component
///
/// Views that render state owned elsewhere (the counter, the news feed)
/// keep `draw` empty and expose a `draw_with_*` method instead.
pub trait Component {
    /// Initialize the component
    ///
    /// Called once before the first draw; the App issues its initial
    /// API requests here.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Handle a key event, returning an optional Action
    ///
    /// Text inputs edit their buffer here; everything else should just
    /// map the key to an Action.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    /// Update component state based on an Action
    ///
    /// A returned Action is fed back through the App, e.g. a table
    /// returns `FetchPage` when a server page is needed.
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    /// Draw the component to the frame
    ///
    /// Pure rendering; `area` is the region this component owns.
    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
