//! Class-tagged value encoding used by the reference codec runtime.

use crate::runtime::{RuntimeError, Value};
use serde::{Deserialize, Serialize};

///
/// Tagged
/// a value preceded by its runtime class, so subtypes survive a round trip
///

#[derive(Debug, Deserialize, Serialize)]
struct Tagged {
    class: Option<String>,
    value: Value,
}

/// Append the tagged encoding of `value` to `out`.
pub fn write_tagged(out: &mut Vec<u8>, value: &Value) -> Result<(), RuntimeError> {
    let tagged = Tagged {
        class: value.runtime_class().map(str::to_string),
        value: value.clone(),
    };
    let bytes = serde_cbor::to_vec(&tagged)?;
    out.extend_from_slice(&bytes);

    Ok(())
}

/// Decode one tagged value; returns its class alongside.
pub fn read_tagged(bytes: &[u8]) -> Result<(Option<String>, Value), RuntimeError> {
    let tagged: Tagged = serde_cbor::from_slice(bytes)?;

    if tagged.class.as_deref() != tagged.value.runtime_class() {
        return Err(RuntimeError::CorruptTag {
            tag: tagged.class.unwrap_or_default(),
        });
    }

    Ok((tagged.class, tagged.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Object;

    #[test]
    fn tagged_values_keep_their_class() {
        let value = Value::Object(Object::new("com.vendor.Circle").with("r", Value::Int(2)));
        let mut out = Vec::new();
        write_tagged(&mut out, &value).unwrap();

        let (class, back) = read_tagged(&out).unwrap();
        assert_eq!(class.as_deref(), Some("com.vendor.Circle"));
        assert_eq!(back, value);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(read_tagged(&[0xff, 0x00, 0x13]).is_err());
    }
}
