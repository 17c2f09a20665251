//! Fingerprint print records
//!
//! A [`Print`] describes one enrolled finger as the host sees it: who owns it,
//! which finger it is, when it was enrolled, and an opaque driver blob that
//! lets the driver find the print again. Match-on-chip devices never hand out
//! templates, so the blob only carries an identifier.

use std::fmt;

use bytes::Bytes;
use chrono::{Datelike, NaiveDate};
use rand::Rng;

use crate::{
    error::{Error, Result},
    finger::Finger,
};

/// Prefix of user ids generated by [`Print::generate_user_id`]
pub const USER_ID_PREFIX: &str = "FP1-";

/// Username used when a print has none
pub const DEFAULT_USERNAME: &str = "nobody";

/// Kind of data stored in a print
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PrintType {
    #[default]
    Undefined,
    /// Driver defined blob
    Raw,
}

/// Metadata recovered from a generated user id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId {
    pub enroll_date: Option<NaiveDate>,
    pub finger: Finger,
    pub username: String,
}

impl UserId {
    /// Parse a `FP1-YYYYMMDD-F-RRRRRRRR-username` string
    ///
    /// The username may be cut short when the id was stored in a fixed size
    /// field; whatever remains after the random part is taken as is.
    pub fn parse(text: &str) -> Result<Self> {
        let rest = text
            .strip_prefix(USER_ID_PREFIX)
            .ok_or_else(|| Error::ForeignUserId(text.to_string()))?;

        let mut parts = rest.splitn(4, '-');
        let date = parts.next().unwrap_or_default();
        let finger = parts.next().unwrap_or_default();
        let random = parts.next().unwrap_or_default();
        let username = parts.next().unwrap_or_default();

        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_field("date", date));
        }
        if random.is_empty() || !random.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid_field("random", random));
        }

        let finger = u8::from_str_radix(finger, 16)
            .map_err(|_| invalid_field("finger", finger))
            .and_then(Finger::try_from)?;

        // An all-zero date means "unknown"
        let enroll_date = NaiveDate::parse_from_str(date, "%Y%m%d").ok();

        Ok(Self {
            enroll_date,
            finger,
            username: username.to_string(),
        })
    }
}

fn invalid_field(field: &'static str, value: &str) -> Error {
    Error::InvalidUserIdField {
        field,
        value: value.to_string(),
    }
}

/// One enrolled fingerprint
#[derive(Debug, Clone, Default)]
pub struct Print {
    pub driver: String,
    pub device_id: String,
    pub finger: Finger,
    pub username: Option<String>,
    pub enroll_date: Option<NaiveDate>,
    pub description: Option<String>,
    /// Print lives in device storage
    pub device_stored: bool,
    pub print_type: PrintType,
    data: Option<Bytes>,
}

impl Print {
    pub fn new(driver: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    pub fn with_finger(mut self, finger: Finger) -> Self {
        self.finger = finger;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_enroll_date(mut self, date: NaiveDate) -> Self {
        self.enroll_date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Driver blob, if one has been attached
    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Attach a driver blob; the print becomes [`PrintType::Raw`]
    pub fn set_data(&mut self, data: impl Into<Bytes>) {
        self.print_type = PrintType::Raw;
        self.data = Some(data.into());
    }

    /// Generate a fresh user id for this print
    ///
    /// Format is `FP1-YYYYMMDD-F-RRRRRRRR-username`: enroll date (zeros when
    /// unset), finger number in hex, 32 random bits in hex and the username.
    pub fn generate_user_id(&self) -> String {
        self.user_id_with_random(rand::thread_rng().r#gen())
    }

    fn user_id_with_random(&self, random: u32) -> String {
        let (y, m, d) = self
            .enroll_date
            .map(|date| (date.year(), date.month(), date.day()))
            .unwrap_or((0, 0, 0));

        format!(
            "{}{:04}{:02}{:02}-{:X}-{:08X}-{}",
            USER_ID_PREFIX,
            y,
            m,
            d,
            u8::from(self.finger),
            random,
            self.username.as_deref().unwrap_or(DEFAULT_USERNAME)
        )
    }

    /// Fill finger, username and enroll date from a generated user id
    pub fn fill_from_user_id(&mut self, text: &str) -> Result<()> {
        let user_id = UserId::parse(text)?;

        if let Some(date) = user_id.enroll_date {
            self.enroll_date = Some(date);
        }
        self.finger = user_id.finger;
        if !user_id.username.is_empty() {
            self.username = Some(user_id.username);
        }

        Ok(())
    }

    /// Two prints are the same when they come from the same driver and device
    /// and carry the same blob
    pub fn is_same(&self, other: &Print) -> bool {
        self.driver == other.driver
            && self.device_id == other.device_id
            && self.print_type == other.print_type
            && self.data == other.data
    }
}

impl PartialEq for Print {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for Print {}

impl fmt::Display for Print {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Print[{}, {}, user: {}]",
            self.driver,
            self.finger,
            self.username.as_deref().unwrap_or("-")
        )
    }
}
