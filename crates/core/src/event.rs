use chrono::{DateTime, Utc};

/// A fact recorded by an aggregate.
///
/// Events are immutable, carry a stable type name and a schema version, and
/// are only ever appended to a stream.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "products.photo.attached").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
