//! Type registry for enveloped payloads.
//!
//! Check specs and check-response replies arrive as an [`Envelope`]: a tag
//! naming the payload shape plus its encoded bytes. A [`TypeRegistry`] maps
//! each tag of a closed set to a decoder producing one variant of a sum type.
//! An unknown tag decodes to `None`; a known tag with bad bytes is an error.

mod envelope;

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use envelope::Envelope;

use crate::types::payload::{
    CheckReply, CheckSpec, CloudWatchCheck, CloudWatchResponse, HttpCheck, HttpResponse,
};

/// A payload shape that can travel inside an [`Envelope`].
pub trait Payload: Serialize + DeserializeOwned {
    /// Tag written to `Envelope::type_url`
    const TAG: &'static str;
}

#[derive(Debug, Error)]
#[error("Malformed {tag} payload: {source}")]
pub struct DecodeError {
    pub tag: String,
    #[source]
    pub source: serde_json::Error,
}

type Decoder<T> = fn(&[u8]) -> Result<T, serde_json::Error>;

/// Closed mapping from envelope tag to a decoder into `T`.
pub struct TypeRegistry<T> {
    decoders: HashMap<&'static str, Decoder<T>>,
}

impl<T> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self { decoders: HashMap::new() }
    }
}

fn decode_as<P, T>(bytes: &[u8]) -> Result<T, serde_json::Error>
where
    P: Payload + Into<T>,
{
    serde_json::from_slice::<P>(bytes).map(Into::into)
}

impl<T> TypeRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `P` under its tag. Registering the same tag twice keeps the
    /// latest decoder.
    pub fn register<P>(&mut self) -> &mut Self
    where
        P: Payload + Into<T>,
    {
        self.decoders.insert(P::TAG, decode_as::<P, T>);
        self
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Decode an envelope.
    ///
    /// Returns `Ok(None)` when the tag is not registered so callers can leave
    /// the field unset and keep going.
    pub fn decode(&self, envelope: &Envelope) -> Result<Option<T>, DecodeError> {
        let Some(decoder) = self.decoders.get(envelope.type_url.as_str()) else {
            return Ok(None);
        };

        decoder(&envelope.value)
            .map(Some)
            .map_err(|source| DecodeError { tag: envelope.type_url.clone(), source })
    }
}

/// Wrap a payload in an envelope tagged with its own shape.
pub fn encode<P: Payload>(payload: &P) -> Result<Envelope, serde_json::Error> {
    Ok(Envelope::new(P::TAG, serde_json::to_vec(payload)?))
}

/// Registry for `Check::check_spec`
pub fn spec_registry() -> &'static TypeRegistry<CheckSpec> {
    static REGISTRY: OnceLock<TypeRegistry<CheckSpec>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = TypeRegistry::<CheckSpec>::new();
        registry.register::<HttpCheck>().register::<CloudWatchCheck>();
        registry
    })
}

/// Registry for `CheckResponse::response`
pub fn reply_registry() -> &'static TypeRegistry<CheckReply> {
    static REGISTRY: OnceLock<TypeRegistry<CheckReply>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = TypeRegistry::<CheckReply>::new();
        registry.register::<HttpResponse>().register::<CloudWatchResponse>();
        registry
    })
}
