use std::fmt;
use std::num::NonZeroUsize;

/// How a directive's endpoints are split into execution groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// Only the first endpoint.
    Once,
    /// Consecutive batches of at most `n` endpoints, run as sequential phases.
    Serial(NonZeroUsize),
    /// Every endpoint in one group.
    AllAtOnce,
}

impl GroupMode {
    /// `once` takes precedence over `serial`; `serial == 0` means unbounded.
    pub fn from_flags(once: bool, serial: usize) -> Self {
        if once {
            return Self::Once;
        }
        match NonZeroUsize::new(serial) {
            Some(n) => Self::Serial(n),
            None => Self::AllAtOnce,
        }
    }
}

impl fmt::Display for GroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Once => write!(f, "once"),
            Self::Serial(n) => write!(f, "serial({})", n),
            Self::AllAtOnce => write!(f, "all"),
        }
    }
}

/// Partition `items` according to `mode`, preserving their order.
///
/// Deterministic: the same mode and item order always produce the same groups.
/// An empty input yields no groups.
pub fn group_for<T: Clone>(mode: GroupMode, items: &[T]) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    match mode {
        GroupMode::Once => vec![vec![items[0].clone()]],
        GroupMode::Serial(n) => items.chunks(n.get()).map(<[T]>::to_vec).collect(),
        GroupMode::AllAtOnce => vec![items.to_vec()],
    }
}
