//! Base64 payload transform

use crate::module::Module;
use crate::Document;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use settle_core::{Error, Result};
use std::any::Any;

/// Module that stores the serialized document base64-encoded.
///
/// Attach order matters when combined with [`crate::CipherModule`]: attach
/// the cipher first and base64 second to get encrypt-then-encode files.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Module;

impl<T: Document> Module<T> for Base64Module {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn encrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        *data = STANDARD.encode(&data).into_bytes();
        Ok(())
    }

    fn decrypt(&mut self, data: &mut Vec<u8>) -> Result<()> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::Cipher(format!("base64 payload is not ascii: {e}")))?;
        *data = STANDARD
            .decode(text.trim())
            .map_err(|e| Error::Cipher(format!("base64 decode failed: {e}")))?;
        Ok(())
    }
}
