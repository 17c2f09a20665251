//! Finger identifiers

use std::fmt;

use crate::error::{Error, Result};

/// Finger a print belongs to
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Finger {
    #[default]
    Unknown = 0,
    LeftThumb = 1,
    LeftIndex = 2,
    LeftMiddle = 3,
    LeftRing = 4,
    LeftLittle = 5,
    RightThumb = 6,
    RightIndex = 7,
    RightMiddle = 8,
    RightRing = 9,
    RightLittle = 10,
}

impl Finger {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::LeftThumb => "left thumb",
            Self::LeftIndex => "left index",
            Self::LeftMiddle => "left middle",
            Self::LeftRing => "left ring",
            Self::LeftLittle => "left little",
            Self::RightThumb => "right thumb",
            Self::RightIndex => "right index",
            Self::RightMiddle => "right middle",
            Self::RightRing => "right ring",
            Self::RightLittle => "right little",
        }
    }
}

impl From<Finger> for u8 {
    fn from(finger: Finger) -> u8 {
        finger as u8
    }
}

impl TryFrom<u8> for Finger {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::LeftThumb),
            2 => Ok(Self::LeftIndex),
            3 => Ok(Self::LeftMiddle),
            4 => Ok(Self::LeftRing),
            5 => Ok(Self::LeftLittle),
            6 => Ok(Self::RightThumb),
            7 => Ok(Self::RightIndex),
            8 => Ok(Self::RightMiddle),
            9 => Ok(Self::RightRing),
            10 => Ok(Self::RightLittle),
            _ => Err(Error::UnknownFinger(value)),
        }
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
