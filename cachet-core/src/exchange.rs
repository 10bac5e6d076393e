//! Exchange state machines.
//!
//! Sans-IO sequencing for one message exchange. The transport layer
//! feeds fields in and ships fields out; all protocol decisions live
//! here.
//!
//! Responder: Listening -> Accepted -> KeyPublished -> AwaitingPayload
//! -> Decrypting -> Verifying -> Authentic | Forged.
//! Initiator: Connecting -> Connected -> KeyReceived ->
//! SessionKeyGenerated -> KeyEncrypted -> MessageEncrypted -> Signed ->
//! Sent -> Closed.
//!
//! One message per exchange, then the connection closes. Any
//! out-of-order or malformed input faults the exchange terminally.
//! A cryptographic mismatch is not detectable at the decrypt step (ECB
//! carries no integrity tag); garbled plaintext flows into signature
//! verification and surfaces as the Forged verdict.

use std::sync::Arc;

use num_bigint::BigUint;
use rand::{CryptoRng, Rng};

use crate::dsa::{self, DomainParameters, Signature, SignatureKeyPair};
use crate::error::ProtocolError;
use crate::event::{LogSink, Severity};
use crate::feistel::{self, SymmetricKey};
use crate::frame::WireField;
use crate::rsa::{self, RsaKeyPair, RsaPublicKey};

/// Fields in the responder's public-key message: `e`, `n`.
pub const KEY_FIELD_COUNT: usize = 2;

/// Fields in the initiator's payload: encrypted session key, ciphertext,
/// `r`, `s`, `q`, `p`, `g`, `y`.
pub const PAYLOAD_FIELD_COUNT: usize = 8;

/// A signing identity: domain parameters plus keypair.
///
/// The default protocol regenerates one of these per message, so the
/// responder can never link two messages to the same sender. Callers
/// that want a persistent identity generate one up front and attach it
/// with [`InitiatorExchange::with_signer`].
#[derive(Debug, Clone)]
pub struct SignerIdentity {
    /// Shared group description.
    pub params: DomainParameters,
    /// Signing keypair under those parameters.
    pub keypair: SignatureKeyPair,
}

impl SignerIdentity {
    /// Generate a fresh identity.
    pub fn generate<R: Rng + CryptoRng>(p_bits: u64, q_bits: u64, rng: &mut R) -> Self {
        let params = dsa::generate_parameters(p_bits, q_bits, rng);
        let keypair = dsa::generate_keypair(&params, rng);
        Self { params, keypair }
    }
}

/// Responder-side exchange state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderState {
    /// Waiting for a connection (owned by the accept loop).
    Listening,
    /// Connection accepted.
    Accepted,
    /// Public key shipped to the initiator.
    KeyPublished,
    /// Waiting for the payload fields.
    AwaitingPayload,
    /// Session key and message being decrypted.
    Decrypting,
    /// Signature being checked.
    Verifying,
    /// Terminal: signature valid.
    Authentic,
    /// Terminal: signature invalid (message rejected).
    Forged,
    /// Terminal: protocol violation or transport loss.
    Faulted,
}

/// What the responder recovered from one exchange.
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    /// Recovered plaintext (lossy UTF-8; garbage when the key transport
    /// was corrupted).
    pub plaintext: String,
    /// Whether the signature verified against the transmitted key.
    pub authentic: bool,
    /// Hex form of the session key actually used for decryption.
    pub session_key_hex: String,
}

/// The responder half of one exchange.
///
/// Holds a shared reference to the long-lived RSA keypair; everything
/// else is per-exchange. Dropping the exchange in any state is safe —
/// no key material outlives it.
pub struct ResponderExchange {
    state: ResponderState,
    keypair: Arc<RsaKeyPair>,
    sink: Arc<dyn LogSink>,
}

impl ResponderExchange {
    /// Create an exchange bound to the responder's keypair.
    pub fn new(keypair: Arc<RsaKeyPair>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            state: ResponderState::Listening,
            keypair,
            sink,
        }
    }

    /// Current state.
    pub fn state(&self) -> ResponderState {
        self.state
    }

    fn fault(&mut self, err: ProtocolError) -> ProtocolError {
        self.state = ResponderState::Faulted;
        self.sink
            .log(Severity::Error, &format!("exchange faulted: {err}"));
        err
    }

    /// Mark the connection as accepted.
    pub fn on_accepted(&mut self, peer: &str) -> Result<(), ProtocolError> {
        if self.state != ResponderState::Listening {
            return Err(self.fault(ProtocolError::OutOfSequence));
        }
        self.state = ResponderState::Accepted;
        self.sink
            .log(Severity::Info, &format!("connection accepted from {peer}"));
        Ok(())
    }

    /// Produce the public-key fields (`e`, `n`) to ship to the initiator.
    ///
    /// Transitions to KeyPublished; call
    /// [`on_key_sent`](Self::on_key_sent) once the fields are on the
    /// wire.
    pub fn publish_key(&mut self) -> Result<[WireField; KEY_FIELD_COUNT], ProtocolError> {
        if self.state != ResponderState::Accepted {
            return Err(self.fault(ProtocolError::OutOfSequence));
        }
        let public = &self.keypair.public;
        let fields = [WireField::integer(&public.e)?, WireField::integer(&public.n)?];
        self.state = ResponderState::KeyPublished;
        self.sink.log(
            Severity::Info,
            &format!("public key published (e={}, n={})", public.e, public.n),
        );
        Ok(fields)
    }

    /// Mark the public-key fields as written to the wire.
    pub fn on_key_sent(&mut self) -> Result<(), ProtocolError> {
        if self.state != ResponderState::KeyPublished {
            return Err(self.fault(ProtocolError::OutOfSequence));
        }
        self.state = ResponderState::AwaitingPayload;
        self.sink.log(Severity::Info, "awaiting payload");
        Ok(())
    }

    /// Process the initiator's payload: decrypt the session key and
    /// message, then verify the signature.
    ///
    /// Ends in Authentic or Forged; a Forged verdict is an outcome, not
    /// an error. Malformed fields fault the exchange instead.
    pub fn on_payload(
        &mut self,
        fields: &[WireField],
    ) -> Result<ExchangeOutcome, ProtocolError> {
        if self.state != ResponderState::AwaitingPayload {
            return Err(self.fault(ProtocolError::OutOfSequence));
        }
        if fields.len() != PAYLOAD_FIELD_COUNT {
            return Err(self.fault(ProtocolError::WrongFieldCount));
        }

        let parsed = (|| -> Result<_, ProtocolError> {
            let encrypted_key = fields[0].as_integer()?;
            let ciphertext = fields[1].as_text()?.to_string();
            let r = fields[2].as_integer()?;
            let s = fields[3].as_integer()?;
            let q = fields[4].as_integer()?;
            let p = fields[5].as_integer()?;
            let g = fields[6].as_integer()?;
            let y = fields[7].as_integer()?;
            Ok((encrypted_key, ciphertext, r, s, q, p, g, y))
        })();
        let (encrypted_key, ciphertext, r, s, q, p, g, y) = match parsed {
            Ok(v) => v,
            Err(e) => return Err(self.fault(e)),
        };
        self.sink
            .log(Severity::Info, &format!("encrypted session key received: {encrypted_key}"));
        self.sink
            .log(Severity::Info, &format!("ciphertext received ({} hex chars)", ciphertext.len()));
        self.sink
            .log(Severity::Info, &format!("signature received: ({r}, {s})"));

        self.state = ResponderState::Decrypting;
        let key_int = rsa::decrypt(&encrypted_key, &self.keypair.private);
        if key_int.bits() > 64 {
            // Only reachable when the key transport was corrupted; the
            // mismatch will surface at verification.
            self.sink.log(
                Severity::Error,
                "decrypted session key exceeds 64 bits; truncating",
            );
        }
        let key = SymmetricKey::from_u64(low_u64(&key_int));
        self.sink.log(
            Severity::Info,
            &format!("decrypted session key: {}", key.to_hex()),
        );

        let recovered = match feistel::ecb_decrypt(&ciphertext, &key) {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fault(e)),
        };
        let plaintext = String::from_utf8_lossy(&recovered).into_owned();
        self.sink.log(
            Severity::Info,
            &format!("recovered plaintext: {plaintext}"),
        );

        self.state = ResponderState::Verifying;
        let params = DomainParameters { p, q, g };
        let signature = Signature { r, s };
        let authentic = dsa::verify(plaintext.trim().as_bytes(), &signature, &y, &params);

        if authentic {
            self.state = ResponderState::Authentic;
            self.sink.log(Severity::Success, "signature valid");
        } else {
            self.state = ResponderState::Forged;
            self.sink.log(Severity::Error, "signature check failed; message rejected");
        }

        Ok(ExchangeOutcome {
            plaintext,
            authentic,
            session_key_hex: key.to_hex(),
        })
    }

    /// Mark the connection as lost mid-exchange.
    pub fn on_disconnected(&mut self) {
        if !matches!(
            self.state,
            ResponderState::Authentic | ResponderState::Forged | ResponderState::Faulted
        ) {
            let _ = self.fault(ProtocolError::ExchangeFaulted);
        }
    }
}

/// Initiator-side exchange state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiatorState {
    /// Dialing the responder.
    Connecting,
    /// Connection established.
    Connected,
    /// Responder's public key received.
    KeyReceived,
    /// Fresh session key generated.
    SessionKeyGenerated,
    /// Session key encrypted under the responder's public key.
    KeyEncrypted,
    /// Message encrypted under the session key.
    MessageEncrypted,
    /// Message signed.
    Signed,
    /// Payload shipped.
    Sent,
    /// Terminal: connection closed.
    Closed,
    /// Terminal: protocol violation or transport loss.
    Faulted,
}

/// The initiator half of one exchange.
pub struct InitiatorExchange {
    state: InitiatorState,
    sink: Arc<dyn LogSink>,
    /// Persistent signing identity, if the caller opted in.
    signer: Option<SignerIdentity>,
    /// Widths used when regenerating a fresh identity per message.
    signer_p_bits: u64,
    signer_q_bits: u64,
    peer_key: Option<RsaPublicKey>,
}

impl InitiatorExchange {
    /// Create an exchange that regenerates its signing identity per
    /// message (the default protocol behavior).
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            state: InitiatorState::Connecting,
            sink,
            signer: None,
            signer_p_bits: dsa::DEFAULT_P_BITS,
            signer_q_bits: dsa::DEFAULT_Q_BITS,
            peer_key: None,
        }
    }

    /// Create an exchange with a persistent signing identity.
    pub fn with_signer(sink: Arc<dyn LogSink>, signer: SignerIdentity) -> Self {
        let mut exchange = Self::new(sink);
        exchange.signer = Some(signer);
        exchange
    }

    /// Override the widths used for per-message identity generation.
    pub fn with_signer_bits(mut self, p_bits: u64, q_bits: u64) -> Self {
        self.signer_p_bits = p_bits;
        self.signer_q_bits = q_bits;
        self
    }

    /// Current state.
    pub fn state(&self) -> InitiatorState {
        self.state
    }

    fn fault(&mut self, err: ProtocolError) -> ProtocolError {
        self.state = InitiatorState::Faulted;
        self.sink
            .log(Severity::Error, &format!("exchange faulted: {err}"));
        err
    }

    /// Mark the connection as established.
    pub fn on_connected(&mut self, peer: &str) -> Result<(), ProtocolError> {
        if self.state != InitiatorState::Connecting {
            return Err(self.fault(ProtocolError::OutOfSequence));
        }
        self.state = InitiatorState::Connected;
        self.sink
            .log(Severity::Info, &format!("connected to {peer}"));
        Ok(())
    }

    /// Process the responder's public-key fields (`e`, `n`).
    pub fn on_public_key(&mut self, fields: &[WireField]) -> Result<(), ProtocolError> {
        if self.state != InitiatorState::Connected {
            return Err(self.fault(ProtocolError::OutOfSequence));
        }
        if fields.len() != KEY_FIELD_COUNT {
            return Err(self.fault(ProtocolError::WrongFieldCount));
        }
        let e = match fields[0].as_integer() {
            Ok(v) => v,
            Err(err) => return Err(self.fault(err)),
        };
        let n = match fields[1].as_integer() {
            Ok(v) => v,
            Err(err) => return Err(self.fault(err)),
        };
        self.sink.log(
            Severity::Info,
            &format!("responder public key received (e={e}, n={n})"),
        );
        self.peer_key = Some(RsaPublicKey { e, n });
        self.state = InitiatorState::KeyReceived;
        Ok(())
    }

    /// Encrypt and sign `message`, producing the payload fields.
    ///
    /// Generates a fresh session key from `rng`; use
    /// [`seal_with_key`](Self::seal_with_key) to pin the key for
    /// deterministic runs.
    pub fn seal<R: Rng + CryptoRng>(
        &mut self,
        message: &str,
        rng: &mut R,
    ) -> Result<Vec<WireField>, ProtocolError> {
        let key = SymmetricKey::generate(rng);
        self.seal_with_key(message, key, rng)
    }

    /// Encrypt and sign `message` with an explicit session key.
    ///
    /// Surrounding whitespace is dropped before both encryption and
    /// signing; the responder trims the recovered plaintext the same
    /// way, so the two sides always verify the same bytes.
    ///
    /// Walks SessionKeyGenerated -> KeyEncrypted -> MessageEncrypted ->
    /// Signed.
    pub fn seal_with_key<R: Rng + CryptoRng>(
        &mut self,
        message: &str,
        key: SymmetricKey,
        rng: &mut R,
    ) -> Result<Vec<WireField>, ProtocolError> {
        if self.state != InitiatorState::KeyReceived {
            return Err(self.fault(ProtocolError::OutOfSequence));
        }
        let peer_key = match self.peer_key.as_ref() {
            Some(k) => k.clone(),
            None => return Err(self.fault(ProtocolError::OutOfSequence)),
        };
        let message = message.trim();

        self.state = InitiatorState::SessionKeyGenerated;
        self.sink.log(
            Severity::Info,
            &format!("session key generated: {}", key.to_hex()),
        );

        // The modulus must exceed the 64-bit key (caller obligation on
        // keypair width); a violation wraps and surfaces as Forged on
        // the responder.
        let encrypted_key = rsa::encrypt(&BigUint::from(key.as_u64()), &peer_key);
        self.state = InitiatorState::KeyEncrypted;
        self.sink.log(
            Severity::Info,
            &format!("session key encrypted: {encrypted_key}"),
        );

        let ciphertext = feistel::ecb_encrypt(message.as_bytes(), &key);
        self.state = InitiatorState::MessageEncrypted;
        self.sink.log(
            Severity::Info,
            &format!("message encrypted ({} hex chars)", ciphertext.len()),
        );

        let signer = match self.signer.as_ref() {
            Some(identity) => identity.clone(),
            None => {
                let identity =
                    SignerIdentity::generate(self.signer_p_bits, self.signer_q_bits, rng);
                self.sink.log(
                    Severity::Info,
                    &format!("signature keypair generated (y={})", identity.keypair.y),
                );
                identity
            }
        };
        let signature = dsa::sign(message.as_bytes(), &signer.keypair.x, &signer.params, rng);
        self.state = InitiatorState::Signed;
        self.sink.log(
            Severity::Success,
            &format!("message signed: ({}, {})", signature.r, signature.s),
        );

        Ok(vec![
            WireField::integer(&encrypted_key)?,
            WireField::text(&ciphertext)?,
            WireField::integer(&signature.r)?,
            WireField::integer(&signature.s)?,
            WireField::integer(&signer.params.q)?,
            WireField::integer(&signer.params.p)?,
            WireField::integer(&signer.params.g)?,
            WireField::integer(&signer.keypair.y)?,
        ])
    }

    /// Mark the payload as shipped.
    pub fn on_sent(&mut self) -> Result<(), ProtocolError> {
        if self.state != InitiatorState::Signed {
            return Err(self.fault(ProtocolError::OutOfSequence));
        }
        self.state = InitiatorState::Sent;
        self.sink.log(Severity::Success, "payload sent");
        Ok(())
    }

    /// Mark the connection as closed (normal completion).
    pub fn on_closed(&mut self) {
        if self.state == InitiatorState::Sent {
            self.state = InitiatorState::Closed;
            self.sink.log(Severity::Info, "connection closed");
        } else if self.state != InitiatorState::Closed && self.state != InitiatorState::Faulted {
            let _ = self.fault(ProtocolError::ExchangeFaulted);
        }
    }
}

/// Low 64 bits of an arbitrary-precision integer.
fn low_u64(value: &BigUint) -> u64 {
    value.iter_u64_digits().next().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NullSink;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sink() -> Arc<dyn LogSink> {
        Arc::new(NullSink)
    }

    fn toy_keypair(rng: &mut StdRng) -> Arc<RsaKeyPair> {
        Arc::new(rsa::generate_keypair(128, rng))
    }

    fn run_exchange(
        message: &str,
        key_hex: Option<&str>,
        tamper: Option<usize>,
        rng: &mut StdRng,
    ) -> ExchangeOutcome {
        let keypair = toy_keypair(rng);
        let mut responder = ResponderExchange::new(keypair, sink());
        responder.on_accepted("test").unwrap();
        let key_fields = responder.publish_key().unwrap();
        responder.on_key_sent().unwrap();

        let mut initiator = InitiatorExchange::new(sink()).with_signer_bits(128, 64);
        initiator.on_connected("test").unwrap();
        initiator.on_public_key(&key_fields).unwrap();
        let mut payload = match key_hex {
            Some(hex) => {
                let key = SymmetricKey::from_hex(hex).unwrap();
                initiator.seal_with_key(message, key, rng).unwrap()
            }
            None => initiator.seal(message, rng).unwrap(),
        };
        initiator.on_sent().unwrap();
        initiator.on_closed();
        assert_eq!(initiator.state(), InitiatorState::Closed);

        if let Some(index) = tamper {
            // Flip one ciphertext nibble in transit.
            let text = payload[1].as_text().unwrap();
            let mut bytes = text.as_bytes().to_vec();
            bytes[index] = if bytes[index] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(bytes).unwrap();
            payload[1] = WireField::text(&tampered).unwrap();
        }

        responder.on_payload(&payload).unwrap()
    }

    #[test]
    fn test_end_to_end_hello_authentic() {
        let mut rng = StdRng::seed_from_u64(31);
        let outcome = run_exchange("HELLO", Some("A1B2C3D4E5F60718"), None, &mut rng);
        assert!(outcome.authentic);
        assert_eq!(outcome.plaintext, "HELLO");
        assert_eq!(outcome.session_key_hex, "A1B2C3D4E5F60718");
    }

    #[test]
    fn test_end_to_end_random_key_authentic() {
        let mut rng = StdRng::seed_from_u64(32);
        let outcome = run_exchange("attack at dawn", None, None, &mut rng);
        assert!(outcome.authentic);
        assert_eq!(outcome.plaintext, "attack at dawn");
    }

    #[test]
    fn test_tampered_ciphertext_is_forged() {
        let mut rng = StdRng::seed_from_u64(33);
        let outcome = run_exchange("HELLO", Some("A1B2C3D4E5F60718"), Some(3), &mut rng);
        // ECB corruption is undetectable structurally; it must surface
        // as a verification failure, not an error.
        assert!(!outcome.authentic);
        assert_ne!(outcome.plaintext, "HELLO");
    }

    #[test]
    fn test_persistent_signer_reused_across_exchanges() {
        let mut rng = StdRng::seed_from_u64(34);
        let identity = SignerIdentity::generate(128, 64, &mut rng);
        let keypair = toy_keypair(&mut rng);

        for message in ["first", "second"] {
            let mut responder = ResponderExchange::new(keypair.clone(), sink());
            responder.on_accepted("test").unwrap();
            let key_fields = responder.publish_key().unwrap();
            responder.on_key_sent().unwrap();

            let mut initiator = InitiatorExchange::with_signer(sink(), identity.clone());
            initiator.on_connected("test").unwrap();
            initiator.on_public_key(&key_fields).unwrap();
            let payload = initiator.seal(message, &mut rng).unwrap();

            // Same public value y on every exchange.
            assert_eq!(
                payload[7].as_integer().unwrap(),
                identity.keypair.y
            );
            let outcome = responder.on_payload(&payload).unwrap();
            assert!(outcome.authentic);
            assert_eq!(outcome.plaintext, message);
        }
    }

    #[test]
    fn test_whitespace_edged_message_verifies() {
        let mut rng = StdRng::seed_from_u64(41);
        // Untampered input with whitespace on both edges must not be
        // mistaken for a forgery; both sides work on the trimmed bytes.
        let outcome = run_exchange("  HELLO \n", Some("A1B2C3D4E5F60718"), None, &mut rng);
        assert!(outcome.authentic);
        assert_eq!(outcome.plaintext, "HELLO");
    }

    #[test]
    fn test_payload_before_key_sent_is_out_of_sequence() {
        let mut rng = StdRng::seed_from_u64(42);
        let keypair = toy_keypair(&mut rng);
        let mut responder = ResponderExchange::new(keypair, sink());
        responder.on_accepted("test").unwrap();
        let _ = responder.publish_key().unwrap();
        assert_eq!(responder.state(), ResponderState::KeyPublished);
        // The payload is only legal once the key is on the wire.
        assert_eq!(
            responder.on_payload(&[]).unwrap_err(),
            ProtocolError::OutOfSequence
        );
        assert_eq!(responder.state(), ResponderState::Faulted);
    }

    #[test]
    fn test_responder_rejects_out_of_order_payload() {
        let mut rng = StdRng::seed_from_u64(35);
        let keypair = toy_keypair(&mut rng);
        let mut responder = ResponderExchange::new(keypair, sink());
        responder.on_accepted("test").unwrap();
        // Payload before the key was published.
        let result = responder.on_payload(&[]);
        assert_eq!(result.unwrap_err(), ProtocolError::OutOfSequence);
        assert_eq!(responder.state(), ResponderState::Faulted);
    }

    #[test]
    fn test_responder_rejects_wrong_field_count() {
        let mut rng = StdRng::seed_from_u64(36);
        let keypair = toy_keypair(&mut rng);
        let mut responder = ResponderExchange::new(keypair, sink());
        responder.on_accepted("test").unwrap();
        let _ = responder.publish_key().unwrap();
        responder.on_key_sent().unwrap();
        let short = vec![WireField::integer(&BigUint::from(1u32)).unwrap()];
        assert_eq!(
            responder.on_payload(&short).unwrap_err(),
            ProtocolError::WrongFieldCount
        );
        assert_eq!(responder.state(), ResponderState::Faulted);
    }

    #[test]
    fn test_responder_rejects_wrong_field_kind() {
        let mut rng = StdRng::seed_from_u64(37);
        let keypair = toy_keypair(&mut rng);
        let mut responder = ResponderExchange::new(keypair, sink());
        responder.on_accepted("test").unwrap();
        let _ = responder.publish_key().unwrap();
        responder.on_key_sent().unwrap();

        // Text where the encrypted session key integer belongs.
        let mut fields = Vec::new();
        fields.push(WireField::text("not an integer").unwrap());
        for _ in 0..PAYLOAD_FIELD_COUNT - 1 {
            fields.push(WireField::integer(&BigUint::from(1u32)).unwrap());
        }
        assert_eq!(
            responder.on_payload(&fields).unwrap_err(),
            ProtocolError::UnexpectedFieldKind
        );
        assert_eq!(responder.state(), ResponderState::Faulted);
    }

    #[test]
    fn test_initiator_seal_requires_key() {
        let mut rng = StdRng::seed_from_u64(38);
        let mut initiator = InitiatorExchange::new(sink());
        initiator.on_connected("test").unwrap();
        assert_eq!(
            initiator.seal("hi", &mut rng).unwrap_err(),
            ProtocolError::OutOfSequence
        );
        assert_eq!(initiator.state(), InitiatorState::Faulted);
    }

    #[test]
    fn test_disconnect_mid_exchange_faults() {
        let mut rng = StdRng::seed_from_u64(39);
        let keypair = toy_keypair(&mut rng);
        let mut responder = ResponderExchange::new(keypair, sink());
        responder.on_accepted("test").unwrap();
        let _ = responder.publish_key().unwrap();
        responder.on_disconnected();
        assert_eq!(responder.state(), ResponderState::Faulted);
    }

    #[test]
    fn test_disconnect_after_verdict_keeps_verdict() {
        let mut rng = StdRng::seed_from_u64(40);
        let keypair = toy_keypair(&mut rng);
        let mut responder = ResponderExchange::new(keypair.clone(), sink());
        responder.on_accepted("test").unwrap();
        let key_fields = responder.publish_key().unwrap();
        responder.on_key_sent().unwrap();

        let mut initiator = InitiatorExchange::new(sink()).with_signer_bits(128, 64);
        initiator.on_connected("test").unwrap();
        initiator.on_public_key(&key_fields).unwrap();
        let payload = initiator.seal("done", &mut rng).unwrap();
        let outcome = responder.on_payload(&payload).unwrap();
        assert!(outcome.authentic);

        responder.on_disconnected();
        assert_eq!(responder.state(), ResponderState::Authentic);
    }
}
