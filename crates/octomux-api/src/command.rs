// Wire-command encoding for the matrix CGI control plane.
//
// The switch command embeds both port numbers as literal decimal tokens:
// `SW+{input}+{output}`. The `+` delimiter matches the firmware revision
// this client was captured against; some units reportedly accept a space
// instead. Confirm on hardware before changing CMD_DELIMITER.

use crate::error::Error;

/// Lowest valid port number, inputs and outputs alike.
pub const PORT_MIN: u8 = 1;
/// Highest valid port number on the 8x8 matrix.
pub const PORT_MAX: u8 = 8;

const CMD_SWITCH: &str = "SW";
const CMD_DELIMITER: char = '+';

/// Validate a port number against the matrix's fixed 1-8 domain.
pub fn check_port(value: u8) -> Result<u8, Error> {
    if (PORT_MIN..=PORT_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidPort {
            value,
            min: PORT_MIN,
            max: PORT_MAX,
        })
    }
}

/// Encode the command that routes `input` to `output`.
///
/// Pure function; fails with [`Error::InvalidPort`] for either number
/// outside 1-8. Values are never clamped.
pub fn switch_command(input: u8, output: u8) -> Result<String, Error> {
    check_port(input)?;
    check_port(output)?;
    Ok(format!(
        "{CMD_SWITCH}{CMD_DELIMITER}{input}{CMD_DELIMITER}{output}"
    ))
}
