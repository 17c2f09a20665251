//! Device identifier to print record conversion
//!
//! The device only knows 32-byte identifiers. Prints created by this driver
//! use the first 32 bytes of a generated user id, so the identifier can be
//! turned back into finger, date and username when listing. Anything else
//! on the device gets a placeholder description.
//!
//! The identifier is stored in the print's data blob as a 2-byte big-endian
//! length followed by the identifier bytes.

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use egismoc_core::PrintId;
use egismoc_core::constants::DRIVER_ID;
use egismoc_types::Print;

use crate::error::{Error, Result};

const LENGTH_FIELD_SIZE: usize = 2;

/// Serialize an identifier into a print data blob
pub fn encode_print_data(id: &PrintId) -> Bytes {
    let mut buf = BytesMut::with_capacity(LENGTH_FIELD_SIZE + PrintId::SIZE);
    buf.put_u16(PrintId::SIZE as u16);
    buf.put_slice(id.as_bytes());
    buf.freeze()
}

/// Recover the identifier stored in a print
pub fn decode_print_data(print: &Print) -> Result<PrintId> {
    let data = print
        .data()
        .ok_or_else(|| Error::DataInvalid("print carries no driver data".into()))?;

    if data.len() < LENGTH_FIELD_SIZE {
        return Err(Error::DataInvalid(format!("driver data of {} bytes", data.len())));
    }

    let declared = BigEndian::read_u16(&data[..LENGTH_FIELD_SIZE]) as usize;
    let id = &data[LENGTH_FIELD_SIZE..];
    if declared != PrintId::SIZE || id.len() != declared {
        return Err(Error::DataInvalid(format!(
            "identifier of {} bytes (declared {})",
            id.len(),
            declared
        )));
    }

    PrintId::from_slice(id).map_err(|e| Error::DataInvalid(e.to_string()))
}

/// Description for prints this driver did not create
pub fn foreign_description(id: &PrintId) -> String {
    format!(
        "Unknown (not created by {}) {}",
        DRIVER_ID,
        hex::encode(&id.as_bytes()[..4])
    )
}

/// Check whether a description names a print created by this driver
pub fn is_driver_description(description: &str) -> bool {
    description.starts_with("FP")
}

/// Attach `id` to `print`
///
/// Fills finger, date and username from the identifier when it is a user id,
/// marks the print device-stored and sets its description.
pub fn set_print_data(print: &mut Print, id: &PrintId) {
    let text = id.to_text();

    if let Err(e) = print.fill_from_user_id(&text) {
        debug!("Identifier carries no user id: {}", e);
    }
    print.device_stored = true;

    print.description = Some(if is_driver_description(&text) {
        text
    } else {
        foreign_description(id)
    });

    print.set_data(encode_print_data(id));
}

/// Build a print record for an identifier reported by the device
pub fn print_from_id(id: &PrintId, device_id: &str) -> Print {
    let mut print = Print::new(DRIVER_ID, device_id);
    set_print_data(&mut print, id);
    print
}

/// Derive a fresh device identifier for a print being enrolled
pub fn mint_print_id(print: &Print) -> PrintId {
    let user_id = print.generate_user_id();
    debug!("New fingerprint ID: {}", user_id);
    PrintId::from_prefix(user_id.as_bytes())
}
