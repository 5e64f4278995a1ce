//! Horizontal swipe detection
//!
//! A swipe is a single-finger drag that never becomes vertical-dominant and
//! ends more than `threshold` units away horizontally. Dragging right means
//! "previous page", dragging left "next page".

use super::messages::{Point, TouchEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Previous,
    Next,
}

#[derive(Debug)]
pub struct SwipeTracker {
    threshold: f32,
    start: Option<Point>,
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }

    pub fn handle(&mut self, event: &TouchEvent) -> Option<Swipe> {
        match event {
            TouchEvent::Start(touches) => {
                self.start = match touches.as_slice() {
                    [only] => Some(*only),
                    _ => None,
                };
                None
            }
            TouchEvent::Move(touches) => {
                let (Some(start), [current]) = (self.start, touches.as_slice()) else {
                    self.start = None;
                    return None;
                };
                let dx = (current.x - start.x).abs();
                let dy = (current.y - start.y).abs();
                if dy > dx {
                    self.start = None;
                }
                None
            }
            TouchEvent::End(changed) => {
                let start = self.start.take()?;
                let [end] = changed.as_slice() else {
                    return None;
                };
                let dx = end.x - start.x;
                let dy = end.y - start.y;
                if dy.abs() > dx.abs() || dx.abs() <= self.threshold {
                    return None;
                }
                Some(if dx > 0.0 { Swipe::Previous } else { Swipe::Next })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SwipeTracker {
        SwipeTracker::new(50.0)
    }

    #[test]
    fn left_drag_is_next() {
        let mut t = tracker();
        t.handle(&TouchEvent::Start(vec![Point::new(100.0, 100.0)]));
        t.handle(&TouchEvent::Move(vec![Point::new(20.0, 105.0)]));
        assert_eq!(
            t.handle(&TouchEvent::End(vec![Point::new(20.0, 105.0)])),
            Some(Swipe::Next)
        );
        assert!(!t.is_tracking());
    }

    #[test]
    fn right_drag_is_previous() {
        let mut t = tracker();
        t.handle(&TouchEvent::Start(vec![Point::new(100.0, 100.0)]));
        assert_eq!(
            t.handle(&TouchEvent::End(vec![Point::new(200.0, 90.0)])),
            Some(Swipe::Previous)
        );
    }

    #[test]
    fn vertical_drag_is_ignored() {
        let mut t = tracker();
        t.handle(&TouchEvent::Start(vec![Point::new(100.0, 100.0)]));
        assert_eq!(
            t.handle(&TouchEvent::End(vec![Point::new(100.0, 180.0)])),
            None
        );
    }

    #[test]
    fn short_drag_is_ignored() {
        let mut t = tracker();
        t.handle(&TouchEvent::Start(vec![Point::new(100.0, 100.0)]));
        assert_eq!(
            t.handle(&TouchEvent::End(vec![Point::new(50.0, 100.0)])),
            None
        );
    }

    #[test]
    fn vertical_excursion_cancels_gesture() {
        let mut t = tracker();
        t.handle(&TouchEvent::Start(vec![Point::new(100.0, 100.0)]));
        t.handle(&TouchEvent::Move(vec![Point::new(95.0, 160.0)]));
        assert_eq!(
            t.handle(&TouchEvent::End(vec![Point::new(0.0, 100.0)])),
            None
        );
    }

    #[test]
    fn multi_touch_is_not_a_gesture() {
        let mut t = tracker();
        t.handle(&TouchEvent::Start(vec![
            Point::new(100.0, 100.0),
            Point::new(200.0, 100.0),
        ]));
        assert!(!t.is_tracking());
        assert_eq!(
            t.handle(&TouchEvent::End(vec![Point::new(0.0, 100.0)])),
            None
        );

        t.handle(&TouchEvent::Start(vec![Point::new(100.0, 100.0)]));
        t.handle(&TouchEvent::Move(vec![
            Point::new(90.0, 100.0),
            Point::new(150.0, 100.0),
        ]));
        assert_eq!(
            t.handle(&TouchEvent::End(vec![Point::new(0.0, 100.0)])),
            None
        );
    }
}
