//! Fuzz the response parser used by the client.

#![no_main]

use libfuzzer_sys::fuzz_target;
use padlock_proto::Response;

fuzz_target!(|data: &[u8]| {
    if let Ok(response) = Response::parse(data) {
        assert_eq!(response.as_line(), [data, b"\n"].concat().as_slice());
    }
});
