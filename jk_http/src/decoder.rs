use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::errors::DecodeError;

/// Validates and converts a raw 2xx body into a typed value
///
/// Decoders must be pure: no I/O, and the same bytes always produce the same
/// result. A failure is terminal for the request and is never retried.
pub trait ResponseDecoder<T>: Send + Sync {
    fn decode(&self, body: &[u8]) -> Result<T, DecodeError>;
}

/// Decodes a body by deserializing it as JSON into `T`
pub struct JsonDecoder<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDecoder<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonDecoder<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> ResponseDecoder<T> for JsonDecoder<T>
where
    T: DeserializeOwned,
{
    fn decode(&self, body: &[u8]) -> Result<T, DecodeError> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Shorthand for [`JsonDecoder::new`]
pub fn json<T: DeserializeOwned>() -> JsonDecoder<T> {
    JsonDecoder::new()
}

/// Decoder backed by a closure, see [`decode_fn`]
pub struct FnDecoder<F> {
    f: F,
}

/// Wrap a closure as a [`ResponseDecoder`]
pub fn decode_fn<T, F>(f: F) -> FnDecoder<F>
where
    F: Fn(&[u8]) -> Result<T, DecodeError> + Send + Sync,
{
    FnDecoder { f }
}

impl<T, F> ResponseDecoder<T> for FnDecoder<F>
where
    F: Fn(&[u8]) -> Result<T, DecodeError> + Send + Sync,
{
    fn decode(&self, body: &[u8]) -> Result<T, DecodeError> {
        (self.f)(body)
    }
}

impl<T, D> ResponseDecoder<T> for &D
where
    D: ResponseDecoder<T> + ?Sized,
{
    fn decode(&self, body: &[u8]) -> Result<T, DecodeError> {
        (**self).decode(body)
    }
}

#[cfg(test)]
mod tests {
    use jk_types::ItemResponse;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_json_decoder() {
        let decoder = json::<ItemResponse<Named>>();
        let item = decoder.decode(br#"{"data":{"name":"Spike"}}"#).unwrap();
        assert_eq!(item.data, Named { name: "Spike".into() });
    }

    #[test]
    fn test_json_decoder_rejects_wrong_shape() {
        let decoder = json::<ItemResponse<Named>>();
        let err = decoder.decode(br#"{"data":{"title":"Spike"}}"#).unwrap_err();
        assert!(err.message.contains("name"), "unexpected message: {}", err.message);
    }

    #[test]
    fn test_json_decoder_is_deterministic() {
        let decoder = json::<ItemResponse<Named>>();
        let body = br#"{"data":{"name":1}}"#;
        assert_eq!(decoder.decode(body).unwrap_err(), decoder.decode(body).unwrap_err());
    }

    #[test]
    fn test_fn_decoder() {
        let decoder = decode_fn(|body: &[u8]| std::str::from_utf8(body).map(str::len).map_err(|e| DecodeError::new(e.to_string())));
        assert_eq!(decoder.decode(b"four").unwrap(), 4);
        assert!(decoder.decode(&[0xff, 0xfe]).is_err());
    }

    fn decode_with<D: ResponseDecoder<Vec<u32>>>(decoder: D, body: &[u8]) -> Result<Vec<u32>, DecodeError> {
        decoder.decode(body)
    }

    #[test]
    fn test_reference_decoder() {
        let decoder = json::<Vec<u32>>();
        assert_eq!(decode_with(&decoder, b"[1,2,3]").unwrap(), vec![1, 2, 3]);
        assert_eq!(decode_with(decoder, b"[4]").unwrap(), vec![4]);
    }
}
