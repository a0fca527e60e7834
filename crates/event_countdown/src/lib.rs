//! Countdown to a fixed target block height.
//!
//! Given the current chain height and a target, classifies the event as
//! upcoming, happening now, or passed, and estimates the wall-clock offset
//! assuming one block every ten minutes. The interval is a fixed constant,
//! not measured from the chain.

use chrono::{DateTime, Duration, Local};
use height_relay::Height;
use serde::{Deserialize, Serialize};

/// Assumed average block interval. Fixed, not measured.
pub const BLOCK_INTERVAL_MINUTES: i64 = 10;

/// The event being counted down to. Static configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTarget {
    pub name: String,
    pub description: String,
    pub height: Height,
}

impl EventTarget {
    /// Block 210240 marks 4 years since Handshake's mainnet genesis. It is
    /// also when the reserved name claim period ends and those names become
    /// available for auction.
    pub fn handshake_anniversary() -> Self {
        EventTarget {
            name: "Handshake's 4-year anniversary".to_string(),
            description: "Block 210240 marks 4 years since Handshake's mainnet genesis. \
                 It is also the time when the reserved name claim period ends and \
                 those names are available for auction."
                .to_string(),
            height: 210_240,
        }
    }

    pub fn countdown(&self, current: Height) -> Countdown {
        Countdown::new(current, self.height)
    }
}

/// Where the current height stands relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// The target is `blocks` blocks away.
    Upcoming { blocks: Height },
    /// The current height is exactly the target.
    Now,
    /// The target was `blocks` blocks ago.
    Passed { blocks: Height },
}

impl Countdown {
    pub fn new(current: Height, target: Height) -> Self {
        if current < target {
            Countdown::Upcoming {
                blocks: target - current,
            }
        } else if current == target {
            Countdown::Now
        } else {
            Countdown::Passed {
                blocks: current - target,
            }
        }
    }

    /// Signed estimate of the event's distance from now, in minutes.
    pub fn offset_minutes(self) -> i64 {
        match self {
            Countdown::Upcoming { blocks } => i64::from(blocks) * BLOCK_INTERVAL_MINUTES,
            Countdown::Now => 0,
            Countdown::Passed { blocks } => -i64::from(blocks) * BLOCK_INTERVAL_MINUTES,
        }
    }

    /// Estimated wall-clock time of the event, measured from `from`.
    pub fn estimated_at(self, from: DateTime<Local>) -> DateTime<Local> {
        from + Duration::minutes(self.offset_minutes())
    }

    /// Block-count phrasing: "in 240 blocks", "now", "60 blocks ago".
    pub fn blocks_text(self) -> String {
        match self {
            Countdown::Upcoming { blocks } => format!("in {blocks} {}", plural_blocks(blocks)),
            Countdown::Now => "now".to_string(),
            Countdown::Passed { blocks } => format!("{blocks} {} ago", plural_blocks(blocks)),
        }
    }

    /// Humanized time phrasing: "in about 2 days", "about 10 hours ago".
    pub fn relative_text(self) -> String {
        match self {
            Countdown::Upcoming { .. } => {
                format!("in about {}", humanize_minutes(self.offset_minutes().unsigned_abs()))
            }
            Countdown::Now => "right now".to_string(),
            Countdown::Passed { .. } => {
                format!("about {} ago", humanize_minutes(self.offset_minutes().unsigned_abs()))
            }
        }
    }
}

fn plural_blocks(blocks: Height) -> &'static str {
    if blocks == 1 { "block" } else { "blocks" }
}

/// Rounds a minute count to the largest sensible unit.
fn humanize_minutes(minutes: u64) -> String {
    const HOUR: u64 = 60;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    fn round_div(n: u64, d: u64) -> u64 {
        (n + d / 2) / d
    }

    fn unit(count: u64, singular: &str) -> String {
        if count == 1 {
            format!("1 {singular}")
        } else {
            format!("{count} {singular}s")
        }
    }

    if minutes < 2 {
        "a minute".to_string()
    } else if minutes < HOUR {
        unit(minutes, "minute")
    } else if minutes < DAY {
        unit(round_div(minutes, HOUR), "hour")
    } else if minutes < MONTH {
        unit(round_div(minutes, DAY), "day")
    } else if minutes < YEAR {
        unit(round_div(minutes, MONTH), "month")
    } else {
        unit(round_div(minutes, YEAR), "year")
    }
}
