//! Fuzz the command line parser.
//!
//! Any byte string must parse or fail without panicking, and whatever parses
//! must survive encoding back to a wire line.

#![no_main]

use libfuzzer_sys::fuzz_target;
use padlock_proto::{Command, LINE_TERMINATOR};

fuzz_target!(|data: &[u8]| {
    let Ok(command) = Command::parse(data) else {
        return;
    };

    let line = command.to_line();
    let encoded = line.as_bytes();
    assert_eq!(encoded.last(), Some(&LINE_TERMINATOR));
    assert_eq!(Command::parse(&encoded[..encoded.len() - 1]).as_ref(), Ok(&command));
});
