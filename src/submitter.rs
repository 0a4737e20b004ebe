//! Two-phase transfer submission
//!
//! A transfer is signed by the ledger and then submitted to it. The ledger
//! verifies the signature against the fields it receives on submission, so
//! both calls must carry the exact same fields. [`TransferIntent`] captures
//! those fields, timestamp included, once and before any call is made;
//! both request records are borrowed views of that one intent.
//!
//! ```text
//! Idle -> Validating -> Signing -> Submitting -> Done
//!             |            |           |
//!             +------------+-----------+------> Failed
//! ```
//!
//! There are no retries. A failed attempt is abandoned together with any
//! signature it obtained and its error stays on the submitter; the next
//! attempt starts from `Idle` on a fresh submitter and samples a fresh
//! timestamp. An attempt whose future was dropped mid-call stays in its
//! in-flight phase and is refused as well.

use chrono::Utc;

use crate::client::LedgerClient;
use crate::error::ClientError;
use crate::session::WalletSession;
use crate::types::{ActionResult, Amount, SignRequest, SubmitRequest, Timestamp};
use crate::Result;

/// Source of transfer timestamps
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock, microsecond resolution
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let micros = Utc::now().timestamp_micros();
        Timestamp::from_secs_f64(micros as f64 / 1_000_000.0)
    }
}

impl<F> Clock for F
where
    F: Fn() -> Timestamp,
{
    fn now(&self) -> Timestamp {
        self()
    }
}

/// The complete, immutable field set of one proposed transfer
#[derive(Clone, Debug, PartialEq)]
pub struct TransferIntent {
    sender: String,
    recipient: String,
    amount: Amount,
    timestamp: Timestamp,
}

impl TransferIntent {
    /// Build an intent, sampling the clock exactly once
    pub fn capture(sender: &str, recipient: &str, amount: Amount, clock: &impl Clock) -> Self {
        Self {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            amount,
            timestamp: clock.now(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn sign_request<'a>(&'a self, private_key: &'a str) -> SignRequest<'a> {
        SignRequest {
            private_key,
            sender: &self.sender,
            recipient: &self.recipient,
            amount: self.amount,
            timestamp: self.timestamp,
        }
    }

    /// Attach the signature the ledger produced for this intent
    pub fn into_signed(self, signature: String) -> SignedTransaction {
        SignedTransaction {
            intent: self,
            signature,
        }
    }
}

/// A transfer intent plus the signature obtained for it
#[derive(Clone, Debug, PartialEq)]
pub struct SignedTransaction {
    intent: TransferIntent,
    signature: String,
}

impl SignedTransaction {
    pub fn intent(&self) -> &TransferIntent {
        &self.intent
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn submit_request(&self) -> SubmitRequest<'_> {
        SubmitRequest {
            sender: &self.intent.sender,
            recipient: &self.intent.recipient,
            amount: self.intent.amount,
            signature: &self.signature,
            timestamp: self.intent.timestamp,
        }
    }
}

/// What a successful submission leaves behind
#[derive(Clone, Debug, PartialEq)]
pub struct TransferReceipt {
    pub transaction: SignedTransaction,
    /// The ledger's answer, verbatim
    pub result: ActionResult,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Signing,
    Submitting,
    Done,
    Failed,
}

impl SubmissionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// True while a re-submission should be disabled
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, Self::Idle) && !self.is_terminal()
    }
}

/// Runs one sign-then-submit attempt
///
/// A submitter is single-use: once it leaves `Idle` it never returns there.
pub struct TransactionSubmitter<'c, C: Clock = SystemClock> {
    client: &'c LedgerClient,
    clock: C,
    phase: SubmissionPhase,
    trail: Vec<SubmissionPhase>,
    failure: Option<ClientError>,
}

impl<'c> TransactionSubmitter<'c, SystemClock> {
    pub fn new(client: &'c LedgerClient) -> Self {
        Self::with_clock(client, SystemClock)
    }
}

impl<'c, C: Clock> TransactionSubmitter<'c, C> {
    pub fn with_clock(client: &'c LedgerClient, clock: C) -> Self {
        Self {
            client,
            clock,
            phase: SubmissionPhase::Idle,
            trail: vec![SubmissionPhase::Idle],
            failure: None,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Every phase entered so far, starting with `Idle`
    pub fn trail(&self) -> &[SubmissionPhase] {
        &self.trail
    }

    /// Why the attempt ended in `Failed`
    pub fn failure(&self) -> Option<&ClientError> {
        self.failure.as_ref()
    }

    /// Validate raw form input, sign it, submit it
    ///
    /// The wallet's credentials are borrowed for this call only.
    pub async fn submit(
        &mut self,
        session: &WalletSession,
        recipient: &str,
        amount: &str,
    ) -> Result<TransferReceipt> {
        if self.phase.is_in_flight() {
            return Err(ClientError::precondition(format!(
                "A submission is still in progress ({:?}).",
                self.phase
            )));
        }
        if self.phase != SubmissionPhase::Idle {
            return Err(ClientError::precondition(
                "This submission was already attempted. Start a new one.",
            ));
        }

        self.enter(SubmissionPhase::Validating);
        match self.run(session, recipient, amount).await {
            Ok(receipt) => {
                self.enter(SubmissionPhase::Done);
                Ok(receipt)
            }
            Err(e) => {
                log::warn!("Transfer failed: {}", e);
                self.enter(SubmissionPhase::Failed);
                self.failure = Some(e.clone());
                Err(e)
            }
        }
    }

    async fn run(
        &mut self,
        session: &WalletSession,
        recipient: &str,
        amount: &str,
    ) -> Result<TransferReceipt> {
        let wallet = session.require()?;

        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(ClientError::validation("recipient is required"));
        }
        let amount = Amount::parse(amount)?;

        let intent = TransferIntent::capture(wallet.address(), recipient, amount, &self.clock);
        log::debug!(
            "Transfer intent: {} -> {} amount={} timestamp={}",
            intent.sender(),
            intent.recipient(),
            intent.amount(),
            intent.timestamp()
        );

        self.enter(SubmissionPhase::Signing);
        let signed = self
            .client
            .sign_transfer(&intent.sign_request(wallet.private_key()))
            .await
            .map_err(ClientError::remote_sign)?;
        if signed.signature.is_empty() {
            return Err(ClientError::remote_sign(ClientError::InvalidResponse(
                "signing returned an empty signature".into(),
            )));
        }
        let transaction = intent.into_signed(signed.signature);

        self.enter(SubmissionPhase::Submitting);
        let result = self
            .client
            .submit_transfer(&transaction.submit_request())
            .await
            .map_err(ClientError::submission)?;

        log::info!(
            "💸 Transfer of {} to {} accepted: {}",
            transaction.intent().amount(),
            transaction.intent().recipient(),
            result.message
        );
        Ok(TransferReceipt {
            transaction,
            result,
        })
    }

    fn enter(&mut self, next: SubmissionPhase) {
        log::debug!("Submission {:?} -> {:?}", self.phase, next);
        self.phase = next;
        self.trail.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use std::cell::Cell;

    fn offline_client() -> LedgerClient {
        // Port 9 (discard) on loopback; nothing in these tests may reach it
        LedgerClient::new(&ClientConfig::with_ledger_url("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn test_capture_samples_clock_once() {
        let calls = Cell::new(0u32);
        let clock = || {
            calls.set(calls.get() + 1);
            Timestamp::from_secs_f64(1_700_000_000.0 + calls.get() as f64 * 0.333)
        };
        let amount = Amount::new(5.0).unwrap();
        let intent = TransferIntent::capture("A1", "B2", amount, &clock);
        let signed = intent.clone().into_signed("SIG".into());

        let sign_json = serde_json::to_value(intent.sign_request("K1")).unwrap();
        let submit_json = serde_json::to_value(signed.submit_request()).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(sign_json["timestamp"], submit_json["timestamp"]);
        assert_eq!(sign_json["private_key"], "K1");
        assert!(submit_json.get("private_key").is_none());
        assert_eq!(submit_json["signature"], "SIG");
    }

    #[test]
    fn test_request_field_sets() {
        let clock = || Timestamp::from_secs_f64(1_700_000_000.123);
        let intent = TransferIntent::capture("A1", "B2", Amount::new(5.0).unwrap(), &clock);
        let sign_json = serde_json::to_value(intent.sign_request("K1")).unwrap();
        assert_eq!(
            sign_json,
            serde_json::json!({
                "private_key": "K1",
                "sender": "A1",
                "recipient": "B2",
                "amount": 5.0,
                "timestamp": 1_700_000_000.123
            })
        );
    }

    #[tokio::test]
    async fn test_missing_wallet_fails_before_any_call() {
        let client = offline_client();
        let session = WalletSession::new();
        let mut submitter = TransactionSubmitter::new(&client);

        let err = submitter.submit(&session, "B2", "5").await.unwrap_err();
        assert!(matches!(err, ClientError::Precondition(_)));
        assert_eq!(submitter.failure(), Some(&err));
        assert_eq!(
            submitter.trail(),
            &[
                SubmissionPhase::Idle,
                SubmissionPhase::Validating,
                SubmissionPhase::Failed
            ]
        );
    }

    #[tokio::test]
    async fn test_submitter_is_single_use() {
        let client = offline_client();
        let session = WalletSession::new();
        let mut submitter = TransactionSubmitter::new(&client);

        let first = submitter.submit(&session, "B2", "5").await.unwrap_err();
        let err = submitter.submit(&session, "B2", "5").await.unwrap_err();
        assert!(err.to_string().contains("already attempted"));
        assert_eq!(submitter.phase(), SubmissionPhase::Failed);
        // The refusal does not replace the original failure
        assert_eq!(submitter.failure(), Some(&first));
        assert_eq!(submitter.trail().len(), 3);
    }

    #[test]
    fn test_in_flight_phases() {
        assert!(!SubmissionPhase::Idle.is_in_flight());
        assert!(SubmissionPhase::Signing.is_in_flight());
        assert!(SubmissionPhase::Submitting.is_in_flight());
        assert!(!SubmissionPhase::Done.is_in_flight());
        assert!(SubmissionPhase::Failed.is_terminal());
    }
}
