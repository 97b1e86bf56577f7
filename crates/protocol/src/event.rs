//! Event types for the collection pipeline
//!
//! `DataEvent` is the unit raised by the host application. It carries a type
//! tag for processor fan-out, a priority for admission control, a schedule
//! for one-shot or repeating dispatch, and an optional weakly-held payload.

use std::any::Any;
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Event type tag for processor fan-out
///
/// Each processor declares the set of types it handles; the dispatcher
/// fans an event out to every processor registered for its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventType {
    /// App lifecycle transitions (start, pause, resume)
    Lifecycle = 0,
    /// Article opened or read
    ArticleView = 1,
    /// GPS position fix
    Location = 2,
    /// Visible Wi-Fi access points
    WifiScan = 3,
    /// Nearby bluetooth devices
    BluetoothScan = 4,
    /// OS and device information
    OsInfo = 5,
}

impl EventType {
    /// Parse event type from raw byte value
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Lifecycle),
            1 => Some(Self::ArticleView),
            2 => Some(Self::Location),
            3 => Some(Self::WifiScan),
            4 => Some(Self::BluetoothScan),
            5 => Some(Self::OsInfo),
            _ => None,
        }
    }

    /// Convert to raw byte value
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get the string name of this event type
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lifecycle => "lifecycle",
            Self::ArticleView => "article_view",
            Self::Location => "location",
            Self::WifiScan => "wifi_scan",
            Self::BluetoothScan => "bluetooth_scan",
            Self::OsInfo => "os_info",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admission priority for submitted events
///
/// Ordered: `Low < Medium < High`. Only `High` events are admitted once
/// the pending queue grows past the soft cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Priority {
    /// Get the string name of this priority
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dispatch schedule for an event
///
/// `Once` fires a single dispatch after `delay`. `Repeating` fires after
/// `delay` and then again every `period` until cancelled, each firing
/// sharing the same payload reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Single dispatch after the delay
    Once { delay: Duration },
    /// Dispatch after the delay, then at a fixed period until cancelled
    Repeating { delay: Duration, period: Duration },
}

impl Schedule {
    /// Immediate one-shot schedule
    #[inline]
    pub const fn immediate() -> Self {
        Self::Once {
            delay: Duration::ZERO,
        }
    }

    /// One-shot schedule after a delay
    #[inline]
    pub const fn once(delay: Duration) -> Self {
        Self::Once { delay }
    }

    /// Repeating schedule with an initial delay and a fixed period
    #[inline]
    pub const fn repeating(delay: Duration, period: Duration) -> Self {
        Self::Repeating { delay, period }
    }

    /// Delay before the first dispatch
    #[inline]
    pub const fn initial_delay(&self) -> Duration {
        match self {
            Self::Once { delay } => *delay,
            Self::Repeating { delay, .. } => *delay,
        }
    }

    /// Period between repeated dispatches, if repeating
    #[inline]
    pub const fn period(&self) -> Option<Duration> {
        match self {
            Self::Once { .. } => None,
            Self::Repeating { period, .. } => Some(*period),
        }
    }

    /// Check if this schedule repeats
    #[inline]
    pub const fn is_repeating(&self) -> bool {
        matches!(self, Self::Repeating { .. })
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::immediate()
    }
}

/// Event payload held by weak reference
///
/// The holder (typically a short-lived UI context) may vanish before the
/// scheduled dispatch runs; the dispatcher upgrades the reference once per
/// firing and drops the event if the holder is gone.
pub type EventPayload = Weak<dyn Any + Send + Sync>;

/// An observation raised by the host application
///
/// Immutable once constructed. Consumed at most once per scheduled firing;
/// a `Repeating` event produces repeated independent firings.
#[derive(Debug, Clone)]
pub struct DataEvent {
    /// Type tag for processor fan-out
    event_type: EventType,

    /// Creation time in Unix milliseconds
    timestamp_ms: u64,

    /// Admission priority
    priority: Priority,

    /// Dispatch schedule
    schedule: Schedule,

    /// Weakly-held payload; `None` for payload-free events
    payload: Option<EventPayload>,
}

impl DataEvent {
    /// Create an event with an immediate one-shot schedule and no payload
    pub fn new(event_type: EventType, priority: Priority) -> Self {
        Self {
            event_type,
            timestamp_ms: now_ms(),
            priority,
            schedule: Schedule::immediate(),
            payload: None,
        }
    }

    /// Set the dispatch schedule
    #[must_use]
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Attach a weakly-held payload
    #[must_use]
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Override the creation timestamp (Unix milliseconds)
    #[must_use]
    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Get the event type
    #[inline]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Get the creation timestamp in Unix milliseconds
    #[inline]
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Get the admission priority
    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Get the dispatch schedule
    #[inline]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Upgrade the payload reference, if one was attached and still lives
    pub fn payload(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.payload.as_ref().and_then(Weak::upgrade)
    }

    /// Check whether an attached payload has been dropped by its holder
    ///
    /// Returns `false` for events constructed without a payload; those
    /// dispatch normally.
    pub fn payload_expired(&self) -> bool {
        match &self.payload {
            Some(weak) => weak.strong_count() == 0,
            None => false,
        }
    }
}

/// Current time in Unix milliseconds
#[inline]
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
