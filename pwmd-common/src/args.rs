//! # Socket Argument Vector
//!
//! Purpose: Turn the comma-separated socket option string into the positional
//! arguments of the daemon's connect call.
//!
//! ## Design Principles
//!
//! 1. **Fixed Capacity**: At most `ARG_MAX` slots; one more is a configuration
//!    error, never a truncated vector.
//! 2. **Positional Slots**: An empty segment keeps its position and reads as
//!    "daemon default", so `",ssh-key"` still targets the second slot.
//! 3. **Explicit Length**: The vector tracks how many segments were parsed and
//!    only expands to full arity in [`ArgVector::connect_args`].
//!
//! ## Parsing Rules
//!
//! ```text
//! "  ssh://host , key file ,"  ->  ["ssh://host", "key file", <empty>]
//!    ^^ skipped  ^ trimmed      interior whitespace kept
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{LookupError, LookupResult};
use crate::protocol::ConnectArgs;

/// Number of positional arguments accepted by the daemon's connect call.
pub const ARG_MAX: usize = 8;

/// Ordered, bounded list of connect arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgVector {
    /// Parsed segments; `None` marks an empty segment.
    slots: [Option<String>; ARG_MAX],
    /// Number of segments parsed (≤ ARG_MAX).
    len: usize,
}

impl ArgVector {
    /// Creates an empty vector (all slots use daemon defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a socket argument spec.
    ///
    /// Blank input yields an empty vector.
    ///
    /// # Errors
    /// Returns `LookupError::TooManyArguments` if the spec has more than
    /// `ARG_MAX` segments.
    ///
    /// # Examples
    /// ```rust
    /// use pwmd_common::ArgVector;
    ///
    /// let args = ArgVector::parse("ssh://vault, /home/me/.ssh/id_ed25519").expect("valid spec");
    /// assert_eq!(args.len(), 2);
    /// assert_eq!(args.get(1), Some("/home/me/.ssh/id_ed25519"));
    /// ```
    pub fn parse(spec: &str) -> LookupResult<Self> {
        let mut args = ArgVector::new();
        if spec.trim().is_empty() {
            return Ok(args);
        }

        let mut segment = String::with_capacity(spec.len());
        for ch in spec.chars() {
            if ch == ',' {
                args.push_segment(&segment)?;
                segment.clear();
                continue;
            }
            // Padding before the first meaningful character.
            if segment.is_empty() && ch.is_whitespace() {
                continue;
            }
            segment.push(ch);
        }

        // End of input closes the final segment.
        args.push_segment(&segment)?;
        Ok(args)
    }

    fn push_segment(&mut self, raw: &str) -> LookupResult<()> {
        if self.len >= ARG_MAX {
            return Err(LookupError::TooManyArguments { max: ARG_MAX });
        }
        let value = raw.trim_end();
        self.slots[self.len] = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        self.len += 1;
        Ok(())
    }

    /// Returns the number of parsed segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no segments were parsed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the slot capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        ARG_MAX
    }

    /// Returns the value of slot `idx`, or `None` for empty or unused slots.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.slots.get(idx).and_then(|slot| slot.as_deref())
    }

    /// Iterates over the parsed segments in order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.slots[..self.len].iter().map(|slot| slot.as_deref())
    }

    /// Expands to the full-arity form expected by the transport.
    pub fn connect_args(&self) -> ConnectArgs<'_> {
        std::array::from_fn(|idx| self.get(idx))
    }
}

impl FromStr for ArgVector {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArgVector::parse(s)
    }
}

impl fmt::Display for ArgVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for idx in 0..ARG_MAX {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "arg{}='{}'", idx + 1, self.get(idx).unwrap_or(""))?;
        }
        Ok(())
    }
}
