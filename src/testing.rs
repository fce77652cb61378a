//! Shared test doubles.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::codec::{JsonSerializer, Serializer};
use crate::error::CodecError;

/// Value shape used across the unit tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labeled {
    pub label: String,
    pub value: i32,
}

impl Labeled {
    pub fn new(label: &str, value: i32) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// JSON serializer whose two directions can be switched to fail.
#[derive(Default)]
pub struct FlakySerializer {
    pub fail_marshal: AtomicBool,
    pub fail_unmarshal: AtomicBool,
}

impl FlakySerializer {
    pub fn set_fail_marshal(&self, fail: bool) {
        self.fail_marshal.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_unmarshal(&self, fail: bool) {
        self.fail_unmarshal.store(fail, Ordering::SeqCst);
    }
}

impl Serializer<Labeled> for FlakySerializer {
    fn marshal(&self, value: &Labeled) -> Result<Vec<u8>, CodecError> {
        if self.fail_marshal.load(Ordering::SeqCst) {
            return Err(CodecError::Serialize("forced marshal failure".to_string()));
        }
        JsonSerializer::<Labeled>::new().marshal(value)
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<Labeled, CodecError> {
        if self.fail_unmarshal.load(Ordering::SeqCst) {
            return Err(CodecError::Deserialize(
                "forced unmarshal failure".to_string(),
            ));
        }
        JsonSerializer::<Labeled>::new().unmarshal(bytes)
    }
}
