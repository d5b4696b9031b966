use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeToLive(u32);

impl TimeToLive {
    pub const MAX: TimeToLive = TimeToLive(u32::MAX);
    pub const ZERO: TimeToLive = TimeToLive(0u32);

    /// One hour, the TTL used for every record unless configured otherwise.
    pub const DEFAULT: TimeToLive = TimeToLive(3600);

    pub const fn from_secs(secs: u32) -> Self {
        TimeToLive(secs)
    }

    pub const fn as_secs(&self) -> u32 {
        self.0
    }
}

impl Default for TimeToLive {
    fn default() -> Self {
        TimeToLive::DEFAULT
    }
}

impl fmt::Display for TimeToLive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TimeToLive {
    fn from(value: u32) -> Self {
        TimeToLive(value)
    }
}

impl From<TimeToLive> for u32 {
    fn from(value: TimeToLive) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("duration of {0:?} does not fit in a 32-bit TTL")]
pub struct TtlOverflow(Duration);

impl TryFrom<Duration> for TimeToLive {
    type Error = TtlOverflow;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        value
            .as_secs()
            .try_into()
            .map(TimeToLive)
            .map_err(|_| TtlOverflow(value))
    }
}

impl From<TimeToLive> for Duration {
    fn from(value: TimeToLive) -> Self {
        Duration::from_secs(value.0 as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_conversion() {
        let ttl = TimeToLive::try_from(Duration::from_secs(600)).unwrap();
        assert_eq!(ttl, TimeToLive::from_secs(600));
        assert_eq!(Duration::from(ttl), Duration::from_secs(600));
    }

    #[test]
    fn duration_overflow() {
        let too_long = Duration::from_secs(u64::from(u32::MAX) + 1);
        assert!(TimeToLive::try_from(too_long).is_err());
    }

    #[test]
    fn default_is_one_hour() {
        assert_eq!(TimeToLive::default().as_secs(), 3600);
        assert_eq!(TimeToLive::default().to_string(), "3600");
    }
}
