//! Async field I/O over a TCP stream.
//!
//! One wire field is a 2-byte big-endian length prefix followed by the
//! field body (kind byte + payload). Reads validate the length before
//! allocating; a peer cannot make us buffer more than the field limit.

use cachet_core::frame::{WireField, LENGTH_PREFIX_SIZE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::TransportError;

/// Read one field from the stream.
pub async fn read_field<S>(stream: &mut S) -> Result<WireField, TransportError>
where
    S: AsyncReadExt + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    stream.read_exact(&mut prefix).await?;
    let length = WireField::read_length(&prefix)?;

    let mut body = vec![0u8; length];
    stream.read_exact(&mut body).await?;
    Ok(WireField::parse(&body)?)
}

/// Read exactly `count` fields from the stream.
pub async fn read_fields<S>(stream: &mut S, count: usize) -> Result<Vec<WireField>, TransportError>
where
    S: AsyncReadExt + Unpin,
{
    let mut fields = Vec::with_capacity(count);
    for _ in 0..count {
        fields.push(read_field(stream).await?);
    }
    Ok(fields)
}

/// Write one field to the stream.
pub async fn write_field<S>(stream: &mut S, field: &WireField) -> Result<(), TransportError>
where
    S: AsyncWriteExt + Unpin,
{
    stream.write_all(&field.to_wire()).await?;
    Ok(())
}

/// Write a sequence of fields and flush.
pub async fn write_fields<S>(stream: &mut S, fields: &[WireField]) -> Result<(), TransportError>
where
    S: AsyncWriteExt + Unpin,
{
    for field in fields {
        stream.write_all(&field.to_wire()).await?;
    }
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_core::ProtocolError;
    use num_bigint::BigUint;

    #[tokio::test]
    async fn test_field_round_trip_over_duplex() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        let sent = WireField::integer(&BigUint::from(65537u32)).unwrap();
        write_field(&mut a, &sent).await.unwrap();
        let received = read_field(&mut b).await.unwrap();
        assert_eq!(received, sent);
    }

    #[tokio::test]
    async fn test_many_fields_round_trip() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let fields = vec![
            WireField::integer(&BigUint::from(3u32)).unwrap(),
            WireField::text("a1b2c3d4").unwrap(),
            WireField::integer(&BigUint::parse_bytes(b"987654321987654321", 10).unwrap())
                .unwrap(),
        ];
        write_fields(&mut a, &fields).await.unwrap();
        let received = read_fields(&mut b, fields.len()).await.unwrap();
        assert_eq!(received, fields);
    }

    #[tokio::test]
    async fn test_zero_length_prefix_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&[0x00, 0x00]).await.unwrap();
        let err = read_field(&mut b).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Protocol(ProtocolError::FieldEmpty)
        ));
    }

    #[tokio::test]
    async fn test_oversize_length_prefix_rejected_before_read() {
        let (mut a, mut b) = tokio::io::duplex(64);
        // Length 0xFFFF exceeds the field limit; no body follows, yet
        // the read must fail fast on the prefix alone.
        a.write_all(&[0xFF, 0xFF]).await.unwrap();
        let err = read_field(&mut b).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Protocol(ProtocolError::FieldTooLarge)
        ));
    }

    #[tokio::test]
    async fn test_truncated_body_is_disconnect() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&[0x00, 0x05, 0x01, 0xAB]).await.unwrap();
        drop(a);
        let err = read_field(&mut b).await.unwrap_err();
        assert!(matches!(err, TransportError::PeerDisconnected));
    }

    #[tokio::test]
    async fn test_unknown_kind_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&[0x00, 0x02, 0x7F, 0x01]).await.unwrap();
        let err = read_field(&mut b).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Protocol(ProtocolError::UnknownFieldKind)
        ));
    }
}
