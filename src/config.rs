//! Per-bridge configuration.

/// What a [`TypedArray`](crate::TypedArray) does with a rejected untyped write.
///
/// Either way the write itself is never partially adopted and the caller gets
/// the reason as a [`BridgeError`](crate::BridgeError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectionPolicy {
    /// Leave both views untouched; the field keeps its prior contents.
    #[default]
    KeepPrevious,
    /// Reset both views to an empty array of the bridge's element type.
    ///
    /// This is the engine's own convention for mistyped array properties. The
    /// field's previous contents are lost.
    ResetToEmpty,
}

/// Configuration of one [`TypedArray`](crate::TypedArray).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeConfig {
    pub rejection: RejectionPolicy,
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rejection(mut self, rejection: RejectionPolicy) -> Self {
        self.rejection = rejection;
        self
    }
}
