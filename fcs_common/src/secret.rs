//! A wrapper that keeps credentials out of logs.
//!
//! The food court server holds one high-value credential: the HMAC key shared with the payment gateway. Anything
//! that can print it is a disclosure vector, from `Debug` derives on config structs to access-log formatting, so
//! the key lives in a [`Secret`] and the value only comes out through an explicit [`Secret::reveal`] call.

use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A value that renders as `****` in both `Debug` and `Display` output.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Hands out the wrapped value. Signature verification is the only production call site.
    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn secrets_never_format_their_contents() {
        let secret = Secret::new("hmac-key-material".to_string());
        assert_eq!(format!("{secret}"), "****");
        assert_eq!(format!("{secret:?}"), "****");
        assert_eq!(secret.reveal().as_str(), "hmac-key-material");
    }
}
