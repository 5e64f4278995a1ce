use std::time::Duration;

use super::debounce::TimerToken;
use crate::theme::Theme;

/// Input and host notifications handled by the viewer
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    GoToPage(usize),
    ZoomIn,
    ZoomOut,
    FitToWidth,
    ToggleTheme,
    ToggleChapterPanel,
    CloseChapterPanel,
    ChapterSearchChanged(String),
    /// Chapter list item clicked
    ChapterSelected(u32),
    /// "Jump to end" button of a chapter list item
    ChapterEndSelected(u32),
    Key(KeyPress),
    Touch(TouchEvent),
    /// The scroll position of the page container changed
    Scrolled,
    WindowResized {
        width: f32,
        height: f32,
    },
    ResizeSettled(TimerToken),
    /// A drain of the render queue finished
    RenderQueueDrained,
    Retry,
}

/// Work the host must carry out after an update
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Scroll the page into view (smoothly, centered) and report back with
    /// [`Message::Scrolled`]
    ScrollIntoView(usize),
    /// Spawn a drain of the renderer's queue
    DrainRenderQueue,
    ApplyTheme(Theme),
    /// Open the document via [`super::Viewer::load`]
    LoadDocument,
    /// Deliver [`Message::ResizeSettled`] with `token` after `delay`
    ScheduleResizeSettle { token: TimerToken, delay: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    /// Cmd on macOS
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
    /// A text field (the chapter search box) has focus
    pub in_text_input: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            in_text_input: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            modifiers: Modifiers {
                ctrl: true,
                meta: false,
            },
            ..Self::plain(key)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Touch events carry every active touch point (`Start`, `Move`) or the
/// points that changed (`End`)
#[derive(Debug, Clone, PartialEq)]
pub enum TouchEvent {
    Start(Vec<Point>),
    Move(Vec<Point>),
    End(Vec<Point>),
}
