//! Command dispatcher: log, route, call providers, reply.

use std::sync::Arc;

use crate::{
    activity::{ActivityLog, ActivityRecord},
    address::WalletAddress,
    command::Command,
    domain::AssetId,
    errors::Error,
    formatting::{capitalize, split_message},
    messaging::{port::MessagingPort, types::InboundMessage},
    ports::{BalanceSource, PriceSource},
    roast::RoastGenerator,
    Result,
};

pub const HELP_TEXT: &str = "Welcome to CryptoBot! Here are the commands you can use:\n\n\
/roast <wallet_address> - Get a roast of your crypto wallet.\n\
/price <coin_name> - Get the current price of a cryptocurrency.\n\
/balance <wallet_address> - Check the ETH balance of a wallet.\n\
\nExample usage:\n\
/roast 0x1234567890abcdef1234567890abcdef12345678\n\
/price bitcoin\n\
/balance 0x1234567890abcdef1234567890abcdef12345678\n";

pub const INVALID_ROAST_ADDRESS: &str = "Please send a valid crypto wallet address after the /roast command, for example: /roast 0x1234567890abcdef1234567890abcdef12345678";
pub const INVALID_BALANCE_ADDRESS: &str = "Please send a valid crypto wallet address after the /balance command, for example: /balance 0x1234567890abcdef1234567890abcdef12345678";
pub const BALANCE_UNAVAILABLE: &str =
    "Could not fetch the wallet balance. Make sure the wallet address is correct.";
pub const PRICE_USAGE: &str =
    "Please enter a crypto name after the /price command, for example: /price bitcoin";
pub const PRICE_NOT_FOUND: &str =
    "Could not find a price for the requested crypto. Make sure the crypto name is correct.";
pub const ROAST_UNAVAILABLE: &str =
    "Could not roast this wallet right now. Please try again later.";

/// Routes inbound commands to the service handles it owns.
pub struct CommandDispatcher {
    prices: Arc<dyn PriceSource>,
    balances: Arc<dyn BalanceSource>,
    roaster: RoastGenerator,
    activity: Arc<dyn ActivityLog>,
}

impl CommandDispatcher {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        balances: Arc<dyn BalanceSource>,
        roaster: RoastGenerator,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            prices,
            balances,
            roaster,
            activity,
        }
    }

    /// Compute the reply for `msg`, or `None` when the bot stays silent.
    ///
    /// The activity record is written first, for every message.
    pub async fn handle(&self, msg: &InboundMessage) -> Option<String> {
        self.activity.record(&ActivityRecord::from_message(msg));

        let command = Command::parse(&msg.text)?;
        let reply = match command {
            Command::Start => HELP_TEXT.to_string(),
            Command::Roast(arg) => self.roast(&arg).await,
            Command::Price(arg) => self.price(&arg).await,
            Command::Balance(arg) => self.balance(&arg).await,
        };
        Some(reply)
    }

    /// Handle `msg` and send the reply (if any) through `messenger`.
    ///
    /// Returns the number of messages sent; long replies are split to fit the
    /// messenger's limit.
    pub async fn respond(
        &self,
        msg: &InboundMessage,
        messenger: &dyn MessagingPort,
    ) -> Result<usize> {
        let Some(reply) = self.handle(msg).await else {
            return Ok(0);
        };

        let caps = messenger.capabilities();
        let reply_to = caps.supports_replies.then_some(msg.message_id);
        let chunks = split_message(&reply, caps.max_message_len);
        for chunk in &chunks {
            messenger.send_text(msg.chat_id, chunk, reply_to).await?;
        }
        Ok(chunks.len())
    }

    async fn roast(&self, arg: &str) -> String {
        let Ok(address) = WalletAddress::parse(arg) else {
            return INVALID_ROAST_ADDRESS.to_string();
        };

        let balance = match self.balances.fetch_balance(&address).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(address = %address, "balance lookup failed: {e}");
                return BALANCE_UNAVAILABLE.to_string();
            }
        };

        match self.roaster.generate(&address, &balance).await {
            Ok(roast) if !roast.trim().is_empty() => roast,
            Ok(_) => {
                tracing::warn!(address = %address, "completion returned an empty roast");
                ROAST_UNAVAILABLE.to_string()
            }
            Err(e) => {
                tracing::error!(address = %address, "roast generation failed: {e}");
                ROAST_UNAVAILABLE.to_string()
            }
        }
    }

    async fn price(&self, arg: &str) -> String {
        let asset = match AssetId::parse(arg) {
            Ok(asset) => asset,
            Err(Error::EmptyAsset) => return PRICE_USAGE.to_string(),
            Err(e) => {
                tracing::warn!("rejected price argument: {e}");
                return PRICE_USAGE.to_string();
            }
        };

        match self.prices.fetch_price(&asset).await {
            Ok(price) => format!(
                "The current price of {} is ${price}.",
                capitalize(asset.as_str())
            ),
            Err(e) => {
                tracing::error!(asset = %asset, "price lookup failed: {e}");
                PRICE_NOT_FOUND.to_string()
            }
        }
    }

    async fn balance(&self, arg: &str) -> String {
        let Ok(address) = WalletAddress::parse(arg) else {
            return INVALID_BALANCE_ADDRESS.to_string();
        };

        match self.balances.fetch_balance(&address).await {
            Ok(balance) => format!("The balance of {address} is {balance} ETH."),
            Err(e) => {
                tracing::error!(address = %address, "balance lookup failed: {e}");
                BALANCE_UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use async_trait::async_trait;
    use futures_util::{stream, StreamExt};
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        activity::{ActivityFile, TracingActivityLog},
        domain::{Balance, ChatId, MessageId, MessageRef, Price, UserId},
        messaging::types::MessagingCapabilities,
        ports::{CompletionClient, CompletionRequest, FragmentStream},
    };

    const ADDR: &str = "0x1234567890abcdef1234567890abcdef12345678";

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Event {
        Activity(String),
        Sent(String),
    }

    type Journal = Arc<Mutex<Vec<Event>>>;

    struct JournalActivity(Journal);

    impl ActivityLog for JournalActivity {
        fn record(&self, record: &ActivityRecord) {
            self.0
                .lock()
                .unwrap()
                .push(Event::Activity(format!("{}:{}", record.username, record.command)));
        }
    }

    struct JournalMessenger {
        journal: Journal,
        max_len: usize,
        replies: bool,
    }

    #[async_trait]
    impl MessagingPort for JournalMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_replies: self.replies,
                max_message_len: self.max_len,
            }
        }

        async fn send_text(
            &self,
            chat_id: ChatId,
            text: &str,
            reply_to: Option<MessageId>,
        ) -> Result<MessageRef> {
            let expected = self.replies.then_some(MessageId(7));
            assert_eq!(reply_to, expected);
            self.journal.lock().unwrap().push(Event::Sent(text.to_string()));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(100),
            })
        }
    }

    struct FixedPrices(Option<Price>);

    #[async_trait]
    impl PriceSource for FixedPrices {
        async fn fetch_price(&self, asset: &AssetId) -> Result<Price> {
            self.0
                .ok_or_else(|| Error::lookup("coingecko", format!("no price for {asset}")))
        }
    }

    struct FixedBalances {
        balance: Option<Balance>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BalanceSource for FixedBalances {
        async fn fetch_balance(&self, _address: &WalletAddress) -> Result<Balance> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.balance
                .ok_or_else(|| Error::lookup("etherscan", "NOTOK: Invalid API Key"))
        }
    }

    struct CountingCompletion {
        fragments: Option<Vec<&'static str>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for CountingCompletion {
        async fn stream_completion(&self, _req: CompletionRequest) -> Result<FragmentStream> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fragments {
                Some(frags) => {
                    let items: Vec<Result<String>> =
                        frags.iter().map(|f| Ok(f.to_string())).collect();
                    Ok(stream::iter(items).boxed())
                }
                None => Err(Error::Completion("rate limited".into())),
            }
        }
    }

    struct Harness {
        dispatcher: CommandDispatcher,
        balances: Arc<FixedBalances>,
        completion: Arc<CountingCompletion>,
        journal: Journal,
    }

    fn harness(
        price: Option<Price>,
        balance: Option<Balance>,
        fragments: Option<Vec<&'static str>>,
    ) -> Harness {
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));
        let balances = Arc::new(FixedBalances {
            balance,
            calls: AtomicUsize::new(0),
        });
        let completion = Arc::new(CountingCompletion {
            fragments,
            calls: AtomicUsize::new(0),
        });
        let dispatcher = CommandDispatcher::new(
            Arc::new(FixedPrices(price)),
            balances.clone(),
            RoastGenerator::new(completion.clone(), "roast persona"),
            Arc::new(JournalActivity(journal.clone())),
        );
        Harness {
            dispatcher,
            balances,
            completion,
            journal,
        }
    }

    fn message(text: &str) -> InboundMessage {
        InboundMessage {
            chat_id: ChatId(1),
            message_id: MessageId(7),
            user_id: UserId(99),
            username: Some("alice".into()),
            text: text.to_string(),
        }
    }

    fn wei(n: u128) -> Option<Balance> {
        Balance::from_wei(n)
    }

    #[tokio::test]
    async fn start_replies_with_help() {
        let h = harness(None, None, None);
        let reply = h.dispatcher.handle(&message("/start")).await.unwrap();
        for cmd in ["/roast", "/price", "/balance"] {
            assert!(reply.contains(cmd));
        }
    }

    #[tokio::test]
    async fn price_reply_capitalizes_asset() {
        let h = harness(Some(Price::new(Decimal::from(65000))), None, None);
        let reply = h.dispatcher.handle(&message("/price BITCOIN ")).await.unwrap();
        assert_eq!(reply, "The current price of Bitcoin is $65000.");
    }

    #[tokio::test]
    async fn price_lookup_failure_is_not_found() {
        let h = harness(None, None, None);
        let reply = h.dispatcher.handle(&message("/price unknownasset")).await;
        assert_eq!(reply.as_deref(), Some(PRICE_NOT_FOUND));
    }

    #[tokio::test]
    async fn empty_price_argument_gets_usage() {
        let h = harness(Some(Price::new(Decimal::ONE)), None, None);
        let reply = h.dispatcher.handle(&message("/price   ")).await;
        assert_eq!(reply.as_deref(), Some(PRICE_USAGE));
    }

    #[tokio::test]
    async fn balance_reply_states_ether() {
        let h = harness(None, wei(2_500_000_000_000_000_000), None);
        let reply = h
            .dispatcher
            .handle(&message(&format!("/balance {ADDR}")))
            .await
            .unwrap();
        assert_eq!(reply, format!("The balance of {ADDR} is 2.5 ETH."));
    }

    #[tokio::test]
    async fn balance_rejects_bad_address_without_lookup() {
        let h = harness(None, wei(1), None);
        let reply = h.dispatcher.handle(&message("/balance 0x123")).await;
        assert_eq!(reply.as_deref(), Some(INVALID_BALANCE_ADDRESS));
        assert_eq!(h.balances.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn balance_failure_is_generic() {
        let h = harness(None, None, None);
        let reply = h
            .dispatcher
            .handle(&message(&format!("/balance {ADDR}")))
            .await
            .unwrap();
        assert_eq!(reply, BALANCE_UNAVAILABLE);
        assert!(!reply.contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn roast_streams_completion() {
        let h = harness(None, wei(10), Some(vec!["Broke ", "", "and proud."]));
        let reply = h
            .dispatcher
            .handle(&message(&format!("/roast {ADDR}")))
            .await
            .unwrap();
        assert_eq!(reply, "Broke and proud.");
        assert_eq!(h.completion.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn roast_skips_completion_when_balance_fails() {
        let h = harness(None, None, Some(vec!["never"]));
        let reply = h
            .dispatcher
            .handle(&message(&format!("/roast {ADDR}")))
            .await;
        assert_eq!(reply.as_deref(), Some(BALANCE_UNAVAILABLE));
        assert_eq!(h.balances.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn roast_rejects_bad_address() {
        let h = harness(None, wei(1), Some(vec!["never"]));
        let reply = h.dispatcher.handle(&message("/roast")).await;
        assert_eq!(reply.as_deref(), Some(INVALID_ROAST_ADDRESS));
        assert_eq!(h.balances.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn completion_failure_becomes_a_reply() {
        let h = harness(None, wei(1), None);
        let reply = h
            .dispatcher
            .handle(&message(&format!("/roast {ADDR}")))
            .await;
        assert_eq!(reply.as_deref(), Some(ROAST_UNAVAILABLE));
    }

    #[tokio::test]
    async fn empty_roast_becomes_a_reply() {
        let h = harness(None, wei(1), Some(vec!["", "  "]));
        let reply = h
            .dispatcher
            .handle(&message(&format!("/roast {ADDR}")))
            .await;
        assert_eq!(reply.as_deref(), Some(ROAST_UNAVAILABLE));
    }

    #[tokio::test]
    async fn unknown_commands_are_logged_but_silent() {
        let h = harness(None, None, None);
        assert!(h.dispatcher.handle(&message("/help")).await.is_none());
        assert!(h.dispatcher.handle(&message("gm")).await.is_none());
        assert_eq!(
            *h.journal.lock().unwrap(),
            vec![
                Event::Activity("alice:/help".into()),
                Event::Activity("alice:gm".into()),
            ]
        );
    }

    #[tokio::test]
    async fn every_message_logs_once_before_reply() {
        let h = harness(None, None, None);
        let messenger = JournalMessenger {
            journal: h.journal.clone(),
            max_len: 4096,
            replies: true,
        };

        let inputs = ["/start", "/price ", "/balance nope", "/nope"];
        for text in inputs {
            h.dispatcher.respond(&message(text), &messenger).await.unwrap();
        }

        let events = h.journal.lock().unwrap().clone();
        let activities = events
            .iter()
            .filter(|e| matches!(e, Event::Activity(_)))
            .count();
        assert_eq!(activities, inputs.len());
        assert_eq!(
            events,
            vec![
                Event::Activity("alice:/start".into()),
                Event::Sent(HELP_TEXT.into()),
                Event::Activity("alice:/price ".into()),
                Event::Sent(PRICE_USAGE.into()),
                Event::Activity("alice:/balance nope".into()),
                Event::Sent(INVALID_BALANCE_ADDRESS.into()),
                Event::Activity("alice:/nope".into()),
            ]
        );
    }

    #[tokio::test]
    async fn long_replies_are_split() {
        let h = harness(None, wei(1), Some(vec!["roast line\n"; 20]));
        let messenger = JournalMessenger {
            journal: h.journal.clone(),
            max_len: 50,
            replies: true,
        };

        let sent = h
            .dispatcher
            .respond(&message(&format!("/roast {ADDR}")), &messenger)
            .await
            .unwrap();
        assert!(sent > 1);

        let events = h.journal.lock().unwrap().clone();
        let body: String = events
            .iter()
            .filter_map(|e| match e {
                Event::Sent(s) => Some(s.as_str()),
                Event::Activity(_) => None,
            })
            .collect();
        assert_eq!(body, "roast line\n".repeat(20));
    }

    #[tokio::test]
    async fn messengers_without_replies_get_plain_messages() {
        let h = harness(None, None, None);
        let messenger = JournalMessenger {
            journal: h.journal.clone(),
            max_len: 4096,
            replies: false,
        };

        let sent = h.dispatcher.respond(&message("/start"), &messenger).await.unwrap();
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn unwritable_activity_file_still_replies() {
        let dispatcher = CommandDispatcher::new(
            Arc::new(FixedPrices(Some(Price::new(Decimal::from(3000))))),
            Arc::new(FixedBalances {
                balance: None,
                calls: AtomicUsize::new(0),
            }),
            RoastGenerator::new(
                Arc::new(CountingCompletion {
                    fragments: None,
                    calls: AtomicUsize::new(0),
                }),
                "roast persona",
            ),
            Arc::new(TracingActivityLog::with_file(ActivityFile::new(
                std::env::temp_dir(),
                true,
            ))),
        );

        let reply = dispatcher.handle(&message("/price ethereum")).await;
        assert_eq!(
            reply.as_deref(),
            Some("The current price of Ethereum is $3000.")
        );
    }
}
