//! Module status reporting.

/// Represents the current status of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Module is initializing.
    Initializing,

    /// Module is running normally.
    Running,

    /// Module is running but its policy source is misbehaving.
    Degraded {
        /// Reason for degradation.
        reason: String,
    },

    /// Module is stopped.
    Stopped,
}

impl ModuleStatus {
    /// Returns `true` if the module is in a healthy state.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns `true` if the module is still intercepting requests.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Running | Self::Degraded { .. })
    }
}

impl std::fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Running => write!(f, "running"),
            Self::Degraded { reason } => write!(f, "degraded: {reason}"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_is_operational_but_not_healthy() {
        let status = ModuleStatus::Degraded {
            reason: "store read failed".to_string(),
        };
        assert!(status.is_operational());
        assert!(!status.is_healthy());
        assert_eq!(status.to_string(), "degraded: store read failed");
    }

    #[test]
    fn test_stopped() {
        assert!(!ModuleStatus::Stopped.is_operational());
        assert!(ModuleStatus::Running.is_healthy());
    }
}
