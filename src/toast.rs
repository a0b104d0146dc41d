use std::time::{Duration, Instant};

use ratatui::style::Color;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    pub fn color(self) -> Color {
        match self {
            ToastKind::Success => Color::Rgb(0x27, 0xae, 0x60),
            ToastKind::Error => Color::Rgb(0xe7, 0x4c, 0x3c),
            ToastKind::Info | ToastKind::Warning => Color::Rgb(0x34, 0x98, 0xdb),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Fraction of the slide completed, 0.0 = off screen, 1.0 = in place.
    SlidingIn(f32),
    Shown,
    /// Fraction of the slide completed, 0.0 = in place, 1.0 = off screen.
    SlidingOut(f32),
    Gone,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl Toast {
    /// Where the toast is in its life: slide in, stay for `duration`
    /// (counted from its appearance), slide out.
    pub fn phase(&self, now: Instant, duration: Duration, slide: Duration) -> Phase {
        let age = now.saturating_duration_since(self.shown_at);
        let fraction = |d: Duration| {
            if slide.is_zero() {
                1.0
            } else {
                (d.as_millis() as f32 / slide.as_millis() as f32).min(1.0)
            }
        };
        if age < slide {
            Phase::SlidingIn(fraction(age))
        } else if age < duration {
            Phase::Shown
        } else if age < duration + slide {
            Phase::SlidingOut(fraction(age - duration))
        } else {
            Phase::Gone
        }
    }
}

/// Stack of transient notifications, newest last.
pub struct Toasts {
    items: Vec<Toast>,
    duration: Duration,
    slide: Duration,
}

impl Toasts {
    pub fn new(duration: Duration, slide: Duration) -> Self {
        Self {
            items: Vec::new(),
            duration,
            slide,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.show_at(message, kind, Instant::now());
    }

    fn show_at(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        let message = message.into();
        debug!("Toast {kind:?}: {message}");
        self.items.push(Toast {
            message,
            kind,
            shown_at: now,
        });
    }

    /// Drop toasts that finished sliding out. Returns `true` if any was removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        let (duration, slide) = (self.duration, self.slide);
        self.items
            .retain(|t| t.phase(now, duration, slide) != Phase::Gone);
        before != self.items.len()
    }

    /// Live toasts with their current phase.
    pub fn visible(&self, now: Instant) -> Vec<(&Toast, Phase)> {
        self.items
            .iter()
            .map(|t| (t, t.phase(now, self.duration, self.slide)))
            .filter(|(_, p)| *p != Phase::Gone)
            .collect()
    }
}
