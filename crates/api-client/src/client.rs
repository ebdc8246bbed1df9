//! Generic lookup client
//!
//! One [`Client`] drives every API family. The family supplies the
//! validation, wire encoding, decoding and result placement through the
//! [`Family`] trait; the client owns the control flow around the sender
//! chain.

use crate::error::{ApiError, ApiResult};
use crate::request::{Request, Response};
use crate::sender::Sender;
use crate::serializer::Serializer;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, Span};
use uuid::Uuid;

/// Per-API strategy plugged into [`Client`]
pub trait Family: Send + Sync + 'static {
    /// Name used in logs
    const NAME: &'static str;

    /// Well-known endpoint used when no URL override is configured
    const DEFAULT_URL: &'static str;

    /// Largest number of lookups accepted per request
    const MAX_BATCH_SIZE: usize;

    /// Caller-owned input, with a slot for its results
    type Lookup: Send + Sync;

    /// Decoded output for a single lookup
    type Results: Send;

    /// Reject a lookup that cannot produce a meaningful request
    fn validate(lookup: &Self::Lookup) -> ApiResult<()>;

    /// Build the relative request for a validated batch
    fn encode(lookups: &[Self::Lookup], serializer: &dyn Serializer) -> ApiResult<Request>;

    /// Decode one results value per lookup, in lookup order
    fn decode(
        lookups: &[Self::Lookup],
        response: &Response,
        serializer: &dyn Serializer,
    ) -> ApiResult<Vec<Self::Results>>;

    /// Store `results` on `lookup`
    fn attach(lookup: &mut Self::Lookup, results: Self::Results);
}

/// Client for one API family
///
/// Cheap to clone; clones share the sender chain and serializer.
pub struct Client<F: Family> {
    sender: Arc<dyn Sender>,
    serializer: Arc<dyn Serializer>,
    timeout: Option<Duration>,
    _family: PhantomData<fn() -> F>,
}

impl<F: Family> Clone for Client<F> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
            serializer: Arc::clone(&self.serializer),
            timeout: self.timeout,
            _family: PhantomData,
        }
    }
}

impl<F: Family> fmt::Debug for Client<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("family", &F::NAME).finish_non_exhaustive()
    }
}

impl<F: Family> Client<F> {
    /// Create a client over an assembled sender chain
    pub fn new(sender: Arc<dyn Sender>, serializer: Arc<dyn Serializer>) -> Self {
        Self {
            sender,
            serializer,
            timeout: None,
            _family: PhantomData,
        }
    }

    /// Timeout stamped on requests that do not carry their own
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send a single lookup and attach its results
    pub async fn send(&self, lookup: &mut F::Lookup) -> ApiResult<()> {
        self.send_batch(std::slice::from_mut(lookup)).await
    }

    /// Send a batch of lookups in one request and attach their results
    ///
    /// On error no lookup is modified.
    pub async fn send_batch(&self, lookups: &mut [F::Lookup]) -> ApiResult<()> {
        let results = self.dispatch(lookups).await?;
        for (lookup, results) in lookups.iter_mut().zip(results) {
            F::attach(lookup, results);
        }
        Ok(())
    }

    #[instrument(
        name = "smarty_lookup",
        skip_all,
        fields(family = F::NAME, batch_size = lookups.len(), request_id)
    )]
    pub(crate) async fn dispatch(&self, lookups: &[F::Lookup]) -> ApiResult<Vec<F::Results>> {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        if lookups.is_empty() {
            return Err(ApiError::precondition("at least one lookup is required"));
        }
        if lookups.len() > F::MAX_BATCH_SIZE {
            return Err(ApiError::precondition(format!(
                "batch of {} exceeds the {} limit of {}",
                lookups.len(),
                F::NAME,
                F::MAX_BATCH_SIZE
            )));
        }
        for lookup in lookups {
            F::validate(lookup)?;
        }

        let mut request = F::encode(lookups, self.serializer.as_ref())?;
        if request.timeout.is_none() {
            request.timeout = self.timeout;
        }
        let response = self.sender.send(request).await?;
        let results = F::decode(lookups, &response, self.serializer.as_ref())?;

        if results.len() != lookups.len() {
            return Err(ApiError::result_count_mismatch(lookups.len(), results.len()));
        }

        debug!(status = response.status, "lookup completed");
        Ok(results)
    }
}

/// Group indexed items into one bucket per lookup
///
/// Items whose index is out of range make the whole response unusable.
pub(crate) fn group_by_index<T>(
    len: usize,
    items: Vec<T>,
    index_of: impl Fn(&T) -> usize,
) -> ApiResult<Vec<Vec<T>>> {
    let mut buckets: Vec<Vec<T>> = std::iter::repeat_with(Vec::new).take(len).collect();
    for item in items {
        let index = index_of(&item);
        let bucket = buckets.get_mut(index).ok_or_else(|| {
            ApiError::DataIntegrity(format!(
                "result references input {index} but only {len} lookup(s) were sent"
            ))
        })?;
        bucket.push(item);
    }
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::{decode, encode, JsonSerializer};
    use crate::test_support::ScriptedTransport;
    use serde::{Deserialize, Serialize};

    struct Echo;

    #[derive(Debug, Default, Serialize)]
    struct EchoLookup {
        text: String,
        #[serde(skip)]
        result: Option<String>,
    }

    #[derive(Deserialize)]
    struct EchoResult {
        input_index: usize,
        text: String,
    }

    impl Family for Echo {
        const NAME: &'static str = "echo";
        const DEFAULT_URL: &'static str = "https://echo.test";
        const MAX_BATCH_SIZE: usize = 3;
        type Lookup = EchoLookup;
        type Results = Option<String>;

        fn validate(lookup: &EchoLookup) -> ApiResult<()> {
            if lookup.text.is_empty() {
                return Err(ApiError::precondition("text is required"));
            }
            Ok(())
        }

        fn encode(lookups: &[EchoLookup], serializer: &dyn Serializer) -> ApiResult<Request> {
            Ok(Request::post(encode(serializer, lookups)?, "application/json"))
        }

        fn decode(
            lookups: &[EchoLookup],
            response: &Response,
            serializer: &dyn Serializer,
        ) -> ApiResult<Vec<Option<String>>> {
            let items: Vec<EchoResult> = decode(serializer, &response.payload)?;
            let groups = group_by_index(lookups.len(), items, |item| item.input_index)?;
            Ok(groups
                .into_iter()
                .map(|group| group.into_iter().next().map(|item| item.text))
                .collect())
        }

        fn attach(lookup: &mut EchoLookup, results: Option<String>) {
            lookup.result = results;
        }
    }

    fn client(transport: &Arc<ScriptedTransport>) -> Client<Echo> {
        Client::new(
            Arc::clone(transport) as Arc<dyn Sender>,
            Arc::new(JsonSerializer),
        )
    }

    fn lookup(text: &str) -> EchoLookup {
        EchoLookup {
            text: text.to_string(),
            result: None,
        }
    }

    #[tokio::test]
    async fn test_send_attaches_results() {
        let transport = Arc::new(ScriptedTransport::ok(
            200,
            r#"[{"input_index":1,"text":"b"},{"input_index":0,"text":"a"}]"#,
        ));
        let mut lookups = [lookup("x"), lookup("y")];

        client(&transport).send_batch(&mut lookups).await.unwrap();

        assert_eq!(lookups[0].result.as_deref(), Some("a"));
        assert_eq!(lookups[1].result.as_deref(), Some("b"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_lookup_makes_no_call() {
        let transport = Arc::new(ScriptedTransport::ok(200, "[]"));
        let mut lookups = [lookup("x"), lookup("")];

        let err = client(&transport).send_batch(&mut lookups).await.unwrap_err();

        assert!(matches!(err, ApiError::Precondition(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_limits() {
        let transport = Arc::new(ScriptedTransport::ok(200, "[]"));
        let client = client(&transport);

        let empty = client.send_batch(&mut Vec::<EchoLookup>::new()).await.unwrap_err();
        assert!(matches!(empty, ApiError::Precondition(_)));

        let mut oversized: Vec<EchoLookup> = (0..4).map(|_| lookup("x")).collect();
        let too_many = client.send_batch(&mut oversized).await.unwrap_err();
        assert!(matches!(too_many, ApiError::Precondition(msg) if msg.contains("limit of 3")));

        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_index_leaves_lookups_untouched() {
        let transport = Arc::new(ScriptedTransport::ok(
            200,
            r#"[{"input_index":0,"text":"a"},{"input_index":7,"text":"z"}]"#,
        ));
        let mut lookups = [lookup("x"), lookup("y")];

        let err = client(&transport).send_batch(&mut lookups).await.unwrap_err();

        assert!(matches!(err, ApiError::DataIntegrity(_)));
        assert!(lookups.iter().all(|l| l.result.is_none()));
    }

    #[tokio::test]
    async fn test_transport_error_leaves_lookups_untouched() {
        let transport = Arc::new(ScriptedTransport::always(Err(ApiError::status(404, ""))));
        let mut single = lookup("x");

        let err = client(&transport).send(&mut single).await.unwrap_err();

        assert_eq!(err.status_code(), Some(404));
        assert!(single.result.is_none());
    }

    #[tokio::test]
    async fn test_client_timeout_is_stamped_on_requests() {
        let transport = Arc::new(ScriptedTransport::ok(200, r#"[{"input_index":0,"text":"a"}]"#));
        let mut single = lookup("x");

        client(&transport).send(&mut single).await.unwrap();
        assert_eq!(transport.last_request().timeout, None);

        client(&transport)
            .with_timeout(Duration::from_millis(750))
            .clone()
            .send(&mut single)
            .await
            .unwrap();
        assert_eq!(transport.last_request().timeout, Some(Duration::from_millis(750)));
    }

    #[test]
    fn test_group_by_index() {
        let groups = group_by_index(3, vec![2, 0, 2], |i| *i).unwrap();
        assert_eq!(groups, vec![vec![0], vec![], vec![2, 2]]);
        assert!(group_by_index(1, vec![1], |i| *i).is_err());
    }
}
